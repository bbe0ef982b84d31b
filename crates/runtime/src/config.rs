use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use labs::{LabError, StatePatch};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::InteractionEvent;
use crate::registry::RegistryError;

/// Environment variable naming the default session config file.
pub const CONFIG_ENV: &str = "LABS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON")]
    Parse(#[from] serde_json::Error),
    #[error("config names unknown lab `{0}`")]
    UnknownLab(String),
    #[error("initial state for `{lab}` rejected")]
    Patch {
        lab: String,
        #[source]
        source: LabError,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Startup configuration: initial parameter patches per lab and an optional
/// lab to select once they are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_lab: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labs: BTreeMap<String, StatePatch>,
}

impl SessionConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path)?)
    }
}

/// A recorded or hand-written sequence of interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SessionConfig>,
    pub events: Vec<InteractionEvent>,
}

impl Scenario {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Scenario, SessionConfig};
    use crate::event::InteractionEvent;
    use foundation::LonLat;
    use labs::StatePatch;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_config_with_patches() {
        let config = SessionConfig::from_json_str(
            r#"{"active_lab": "buffer-circle", "labs": {"buffer-circle": {"radius_km": 250}}}"#,
        )
        .unwrap();
        assert_eq!(config.active_lab.as_deref(), Some("buffer-circle"));
        assert_eq!(
            config.labs.get("buffer-circle"),
            Some(&StatePatch::new().with("radius_km", 250))
        );
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(SessionConfig::from_json_str("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SessionConfig::from_json_str(r#"{"activeLab": "distance"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parses_scenario_events() {
        let scenario = Scenario::from_json_str(
            r#"{"events": [{"select": "distance"}, {"click": [0, 0]}, {"click": [0, 1]}]}"#,
        )
        .unwrap();
        assert!(scenario.config.is_none());
        assert_eq!(scenario.events[2], InteractionEvent::Click(LonLat::new(0.0, 1.0)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Scenario::from_path(std::path::Path::new("/nonexistent/scenario.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }
}
