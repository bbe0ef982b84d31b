use std::fmt;

use foundation::LonLat;
use formats::FeatureCollection;
use geometry::GeometryProvider;
use serde::{Deserialize, Serialize};

use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch};

/// Initial map camera for a lab. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl Viewport {
    pub const fn at(longitude: f64, latitude: f64, zoom: f64) -> Self {
        Self {
            longitude,
            latitude,
            zoom,
        }
    }
}

/// Display metadata. Never consulted by `compute`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabMeta {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub viewport: Viewport,
}

/// Ordered feature collections produced by one compute call.
///
/// Position is meaningful (e.g. `[buffer, circle]`). An empty vector is a
/// ready result with nothing to draw; "not ready" is `None` at the call site.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeometryResult(pub Vec<FeatureCollection>);

impl GeometryResult {
    pub fn new(collections: Vec<FeatureCollection>) -> Self {
        Self(collections)
    }

    pub fn single(collection: FeatureCollection) -> Self {
        Self(vec![collection])
    }

    pub fn collections(&self) -> &[FeatureCollection] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&FeatureCollection> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The Lab Unit contract. The implementing type *is* the lab's state.
///
/// All methods are pure: they take `&self` and return new values. The
/// runtime replaces its stored state with whatever `click`/`patch` return.
pub trait Lab: Clone + Default + PartialEq + fmt::Debug {
    const ID: &'static str;

    fn meta() -> LabMeta;

    /// Applies this lab's accumulation policy to a new click. Parameters not
    /// touched by clicks are carried over unchanged.
    fn click(&self, at: LonLat) -> Self;

    /// Field-level merge of panel edits. Either every field applies or the
    /// error is returned and `self` is untouched.
    fn patch(&self, patch: &StatePatch) -> Result<Self, LabError>;

    /// `None` while the state lacks the clicks the lab needs.
    fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult>;

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView;
}
