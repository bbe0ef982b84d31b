use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabError {
    #[error("state patch names no field")]
    EmptyPatch,
    #[error("lab `{lab}` has no editable field `{field}`")]
    UnknownField { lab: String, field: String },
    #[error("invalid value for `{lab}.{field}`: {reason}")]
    InvalidField {
        lab: String,
        field: String,
        reason: String,
    },
}

impl LabError {
    pub fn unknown(lab: &str, field: &str) -> Self {
        Self::UnknownField {
            lab: lab.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid(lab: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            lab: lab.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Partial state edit from a panel control or a config file.
///
/// Only the named fields change; everything else is carried over from the
/// current state by [`StatePatch::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePatch(Map<String, Value>);

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Clones `state`, hands every `(field, value)` to `set`, and returns the
    /// merged copy. The first error aborts the whole patch.
    pub fn apply<S, F>(&self, lab: &str, state: &S, mut set: F) -> Result<S, LabError>
    where
        S: Clone,
        F: FnMut(&mut S, &str, &Value) -> Result<(), LabError>,
    {
        if self.is_empty() {
            return Err(LabError::EmptyPatch);
        }
        let mut next = state.clone();
        for (field, value) in &self.0 {
            set(&mut next, field, value).inspect_err(|err| {
                tracing::debug!(lab, field = field.as_str(), %err, "rejected state patch");
            })?;
        }
        Ok(next)
    }
}

impl From<Map<String, Value>> for StatePatch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Typed readers for patch values, producing `InvalidField` on mismatch.
pub mod field {
    use super::*;

    pub fn boolean(lab: &str, field: &str, value: &Value) -> Result<bool, LabError> {
        value
            .as_bool()
            .ok_or_else(|| LabError::invalid(lab, field, format!("expected a boolean, got {value}")))
    }

    pub fn positive_f64(lab: &str, field: &str, value: &Value) -> Result<f64, LabError> {
        let v = value
            .as_f64()
            .ok_or_else(|| LabError::invalid(lab, field, format!("expected a number, got {value}")))?;
        if !(v.is_finite() && v > 0.0) {
            return Err(LabError::invalid(lab, field, format!("{v} must be greater than 0")));
        }
        Ok(v)
    }

    /// Integer in `min..=max`.
    pub fn integer_in(
        lab: &str,
        field: &str,
        value: &Value,
        min: u64,
        max: u64,
    ) -> Result<usize, LabError> {
        let v = value.as_u64().ok_or_else(|| {
            LabError::invalid(lab, field, format!("expected a non-negative integer, got {value}"))
        })?;
        if v < min {
            return Err(LabError::invalid(lab, field, format!("{v} is below the minimum {min}")));
        }
        if v > max {
            return Err(LabError::invalid(lab, field, format!("{v} is above the maximum {max}")));
        }
        usize::try_from(v).map_err(|_| LabError::invalid(lab, field, format!("{v} is too large")))
    }

    pub fn variant<T: DeserializeOwned>(lab: &str, field: &str, value: &Value) -> Result<T, LabError> {
        T::deserialize(value)
            .map_err(|err| LabError::invalid(lab, field, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{LabError, StatePatch, field};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Params {
        on: bool,
        size: f64,
    }

    fn set(p: &mut Params, f: &str, v: &serde_json::Value) -> Result<(), LabError> {
        match f {
            "on" => p.on = field::boolean("t", f, v)?,
            "size" => p.size = field::positive_f64("t", f, v)?,
            _ => return Err(LabError::unknown("t", f)),
        }
        Ok(())
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let base = Params { on: true, size: 2.0 };
        let next = StatePatch::new().with("size", 5.0).apply("t", &base, set).unwrap();
        assert_eq!(next, Params { on: true, size: 5.0 });
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = StatePatch::new().apply("t", &Params::default(), set).unwrap_err();
        assert_eq!(err, LabError::EmptyPatch);
    }

    #[test]
    fn any_bad_field_rejects_whole_patch() {
        let patch = StatePatch::new().with("on", true).with("size", -1.0);
        let err = patch.apply("t", &Params::default(), set).unwrap_err();
        assert!(matches!(err, LabError::InvalidField { ref field, .. } if field == "size"));

        let patch = StatePatch::new().with("colour", "red");
        assert_eq!(
            patch.apply("t", &Params::default(), set).unwrap_err(),
            LabError::unknown("t", "colour")
        );
    }

    #[test]
    fn integer_reader_enforces_range() {
        assert_eq!(field::integer_in("t", "n", &json!(3), 3, 10), Ok(3));
        assert_eq!(field::integer_in("t", "n", &json!(10), 3, 10), Ok(10));
        assert!(field::integer_in("t", "n", &json!(2), 3, 10).is_err());
        assert!(field::integer_in("t", "n", &json!(11), 3, 10).is_err());
        assert!(field::integer_in("t", "n", &json!(u64::MAX), 3, 10).is_err());
        assert!(field::integer_in("t", "n", &json!(3.5), 3, 10).is_err());
        assert!(field::integer_in("t", "n", &json!(null), 3, 10).is_err());
    }

    #[test]
    fn deserializes_from_json_object() {
        let patch: StatePatch = serde_json::from_value(json!({"size": 1.5})).unwrap();
        assert_eq!(patch.fields().collect::<Vec<_>>(), vec!["size"]);
    }
}
