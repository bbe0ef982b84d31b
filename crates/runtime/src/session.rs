use std::collections::VecDeque;

use foundation::{CoordError, LonLat};
use geometry::{GeoProvider, GeometryProvider};
use labs::{LabError, LabState, StatePatch};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ConfigError, SessionConfig};
use crate::event::InteractionEvent;
use crate::event_bus::{Event, EventBus};
use crate::registry::{LabRegistry, RegistryError};
use crate::surface::Publication;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("unknown lab `{0}`")]
    UnknownLab(String),
    #[error("no lab is selected")]
    NoActiveLab,
    #[error("invalid click")]
    Coord(#[from] CoordError),
    #[error(transparent)]
    Lab(#[from] LabError),
}

/// Interaction controller: owns one state per registered lab and the
/// currently selected lab, and funnels every state change through a single
/// recompute-and-publish step.
///
/// States persist across selections; switching labs never touches another
/// lab's state.
#[derive(Debug)]
pub struct Session<P = GeoProvider> {
    registry: LabRegistry,
    states: Vec<LabState>,
    active: Option<usize>,
    provider: P,
    sequence: u64,
    bus: EventBus,
}

impl Session<GeoProvider> {
    pub fn with_builtin_labs() -> Result<Self, RegistryError> {
        Ok(Self::new(LabRegistry::builtin()?, GeoProvider))
    }
}

impl<P: GeometryProvider> Session<P> {
    pub fn new(registry: LabRegistry, provider: P) -> Self {
        let states = registry
            .entries()
            .iter()
            .map(|entry| entry.initial_state())
            .collect();
        Self {
            registry,
            states,
            active: None,
            provider,
            sequence: 0,
            bus: EventBus::new(),
        }
    }

    pub fn registry(&self) -> &LabRegistry {
        &self.registry
    }

    pub fn active_id(&self) -> Option<&'static str> {
        self.active.map(|i| self.registry.entries()[i].id())
    }

    pub fn state(&self, id: &str) -> Option<&LabState> {
        self.registry.position(id).map(|i| &self.states[i])
    }

    /// Number of publications so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Most recent interactions, oldest first. Bounded by the bus capacity.
    pub fn events(&self) -> &VecDeque<Event> {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    /// Applies one event. Returns the publication it caused, if any.
    pub fn handle(&mut self, event: InteractionEvent) -> Result<Option<Publication>, SessionError> {
        let kind = event.kind();
        let outcome = match event {
            InteractionEvent::Select(id) => self.select(&id).map(Some),
            InteractionEvent::Deselect => {
                self.deselect();
                Ok(None)
            }
            InteractionEvent::Click(at) => self.click(at),
            InteractionEvent::Edit(patch) => self.edit(&patch).map(Some),
            InteractionEvent::Reset => self.reset().map(Some),
        };
        if let Err(err) = &outcome {
            debug!(kind, %err, "interaction rejected");
            self.bus.emit(self.sequence, "rejected", format!("{kind}: {err}"));
        }
        outcome
    }

    pub fn select(&mut self, id: &str) -> Result<Publication, SessionError> {
        let index = self
            .registry
            .position(id)
            .ok_or_else(|| SessionError::UnknownLab(id.to_string()))?;
        self.active = Some(index);
        self.bus.emit(self.sequence, "select", id);
        Ok(self.recompute_and_publish(index))
    }

    pub fn deselect(&mut self) {
        if let Some(index) = self.active.take() {
            let id = self.registry.entries()[index].id();
            self.bus.emit(self.sequence, "deselect", id);
        }
    }

    /// A click with no lab selected is ignored.
    pub fn click(&mut self, at: LonLat) -> Result<Option<Publication>, SessionError> {
        let Some(index) = self.active else {
            trace!(%at, "click ignored, no active lab");
            return Ok(None);
        };
        let at = LonLat::try_new(at.lon, at.lat)?;
        self.states[index] = self.states[index].click(at);
        self.bus.emit(self.sequence, "click", at.to_string());
        Ok(Some(self.recompute_and_publish(index)))
    }

    /// Merges `patch` into the active lab's state. Nothing changes on error.
    pub fn edit(&mut self, patch: &StatePatch) -> Result<Publication, SessionError> {
        let index = self.active.ok_or(SessionError::NoActiveLab)?;
        self.states[index] = self.states[index].patch(patch)?;
        let fields: Vec<_> = patch.fields().collect();
        self.bus.emit(self.sequence, "edit", fields.join(","));
        Ok(self.recompute_and_publish(index))
    }

    /// Restores the active lab's default state.
    pub fn reset(&mut self) -> Result<Publication, SessionError> {
        let index = self.active.ok_or(SessionError::NoActiveLab)?;
        self.states[index] = self.states[index].reset();
        self.bus
            .emit(self.sequence, "reset", self.registry.entries()[index].id());
        Ok(self.recompute_and_publish(index))
    }

    /// Applies initial patches, then selects `active_lab`. All patches are
    /// validated before any state is replaced.
    pub fn apply_config(&mut self, config: &SessionConfig) -> Result<Option<Publication>, ConfigError> {
        let mut staged = self.states.clone();
        for (id, patch) in &config.labs {
            let index = self
                .registry
                .position(id)
                .ok_or_else(|| ConfigError::UnknownLab(id.clone()))?;
            staged[index] = staged[index]
                .patch(patch)
                .map_err(|source| ConfigError::Patch {
                    lab: id.clone(),
                    source,
                })?;
        }
        if let Some(id) = &config.active_lab {
            if self.registry.position(id).is_none() {
                return Err(ConfigError::UnknownLab(id.clone()));
            }
        }
        self.states = staged;
        debug!(labs = config.labs.len(), "session config applied");
        match &config.active_lab {
            Some(id) => self
                .select(id)
                .map(Some)
                .map_err(|_| ConfigError::UnknownLab(id.clone())),
            None => Ok(None),
        }
    }

    fn recompute_and_publish(&mut self, index: usize) -> Publication {
        let state = &self.states[index];
        let result = state.compute(&self.provider);
        let panel = state.panel(result.as_ref());
        self.sequence += 1;
        let lab_id = self.registry.entries()[index].id();
        debug!(
            lab = lab_id,
            sequence = self.sequence,
            ready = result.is_some(),
            layers = result.as_ref().map_or(0, |r| r.len()),
            "published"
        );
        Publication {
            sequence: self.sequence,
            lab_id,
            result,
            panel,
        }
    }
}
