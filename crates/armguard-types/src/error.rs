use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global error type spanning configuration, kinematic and runtime failures.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardError {
    #[error("Unknown collision model kind `{kind}` requested by model `{model}`")]
    UnknownModel { model: String, kind: String },

    #[error("Collision model `{0}` is configured more than once")]
    DuplicateModel(String),

    #[error("Failed to instantiate collision model `{model}`: {details}")]
    ModelInstantiation { model: String, details: String },

    #[error("Collision model `{model}` faulted: {details}")]
    ModelFault { model: String, details: String },

    #[error("Invalid range for joint `{joint}`: {details}")]
    InvalidRange { joint: String, details: String },

    #[error("Invalid state: expected {expected}, found {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("Kinematic topology error: {0}")]
    Topology(String),

    #[error("Status source error: {0}")]
    Status(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GuardError {
    /// Name of the collision model this error is attributed to, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            GuardError::UnknownModel { model, .. }
            | GuardError::ModelInstantiation { model, .. }
            | GuardError::ModelFault { model, .. } => Some(model),
            GuardError::DuplicateModel(model) => Some(model),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_offending_model() {
        let err = GuardError::UnknownModel {
            model: "base_keep_out".into(),
            kind: "no_such_kind".into(),
        };
        let text = err.to_string();
        assert!(text.contains("base_keep_out"));
        assert!(text.contains("no_such_kind"));
        assert_eq!(err.model(), Some("base_keep_out"));
    }

    #[test]
    fn non_model_errors_have_no_model() {
        assert_eq!(GuardError::Topology("cycle".into()).model(), None);
        assert_eq!(GuardError::Status("offline".into()).model(), None);
    }

    #[test]
    fn error_serialization_roundtrip() {
        let err = GuardError::InvalidRange {
            joint: "arm".into(),
            details: "lower 0.6 > upper 0.4".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: GuardError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
