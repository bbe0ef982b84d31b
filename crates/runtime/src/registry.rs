use labs::{LabFactory, LabMeta, LabState};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("lab id `{0}` is registered twice")]
    DuplicateId(String),
    #[error("lab `{registered}` was registered with a factory for `{built}`")]
    FactoryMismatch {
        registered: &'static str,
        built: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct LabEntry {
    pub meta: LabMeta,
    factory: LabFactory,
}

impl LabEntry {
    pub fn id(&self) -> &'static str {
        self.meta.id
    }

    pub fn initial_state(&self) -> LabState {
        (self.factory)()
    }
}

/// Ordered, read-only list of labs. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct LabRegistry {
    entries: Vec<LabEntry>,
}

impl LabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven built-in labs.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (meta, factory) in LabState::catalogue() {
            registry.register(meta, factory)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, meta: LabMeta, factory: LabFactory) -> Result<(), RegistryError> {
        if self.get(meta.id).is_some() {
            return Err(RegistryError::DuplicateId(meta.id.to_string()));
        }
        let built = factory().id();
        if built != meta.id {
            return Err(RegistryError::FactoryMismatch {
                registered: meta.id,
                built,
            });
        }
        self.entries.push(LabEntry { meta, factory });
        Ok(())
    }

    pub fn entries(&self) -> &[LabEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&LabEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(LabEntry::id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{LabRegistry, RegistryError};
    use labs::{DistanceLab, Lab, LabState, RewindLab};

    #[test]
    fn builtin_keeps_catalogue_order() {
        let registry = LabRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.ids().next(), Some("distance"));
        assert_eq!(registry.ids().last(), Some("simplify"));
        assert_eq!(registry.position("point-in-polygon"), Some(3));
    }

    #[test]
    fn duplicate_id_fails_fast() {
        let mut registry = LabRegistry::builtin().unwrap();
        let err = registry
            .register(DistanceLab::meta(), || LabState::Distance(DistanceLab::default()))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("distance".into()));
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn factory_must_build_the_registered_lab() {
        let mut registry = LabRegistry::new();
        let err = registry
            .register(DistanceLab::meta(), || LabState::Rewind(RewindLab::default()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::FactoryMismatch { built: "rewind", .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_id_is_absent() {
        let registry = LabRegistry::builtin().unwrap();
        assert!(registry.get("voronoi").is_none());
    }
}
