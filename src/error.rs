//! Error taxonomy for the RCM engine
//!
//! Every failure is recoverable at the level of the single attempted
//! mutation: the session graph is left untouched whenever an operation
//! returns `Err`. [`RcmError::kind`] folds the concrete variants onto the
//! four user-facing categories (validation, referential integrity,
//! serialization, persistence) plus the ambient collaborator categories.

use thiserror::Error;

/// Coarse category of an [`RcmError`], used by front ends to decide how
/// to present the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ReferentialIntegrity,
    Serialization,
    Persistence,
    Configuration,
    Authorization,
    Storage,
}

/// A workflow step on a failure mode. Steps must be recorded in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Effects,
    Consequence,
    ManagementTask,
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStep::Effects => write!(f, "failure effects"),
            WorkflowStep::Consequence => write!(f, "consequence category"),
            WorkflowStep::ManagementTask => write!(f, "management task"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RcmError {
    /// Empty required field, missing selection, infeasible task, etc.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An asset cannot be deleted while it still owns components.
    #[error("Asset '{asset}' still has {} component(s): {}", components.len(), components.join(", "))]
    HasComponents {
        asset: String,
        components: Vec<String>,
    },

    /// The operation would leave dangling references.
    #[error("{entity} is referenced by: {}", dependents.join(", "))]
    ReferentialIntegrity {
        entity: String,
        dependents: Vec<String>,
    },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// A failure mode workflow step was requested before its precursor.
    #[error("{failure_mode}: {missing} must be recorded first")]
    PrecursorMissing {
        failure_mode: String,
        missing: WorkflowStep,
    },

    #[error("Invalid {field} rating {value}: expected 1-5")]
    InvalidRating { field: &'static str, value: u8 },

    /// Malformed import document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Autosave or export write failure.
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl RcmError {
    pub fn validation(message: impl Into<String>) -> Self {
        RcmError::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        RcmError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RcmError::Validation(_)
            | RcmError::PrecursorMissing { .. }
            | RcmError::InvalidRating { .. } => ErrorKind::Validation,
            RcmError::HasComponents { .. }
            | RcmError::ReferentialIntegrity { .. }
            | RcmError::NotFound { .. } => ErrorKind::ReferentialIntegrity,
            RcmError::Serialization(_) => ErrorKind::Serialization,
            RcmError::Persistence(_) => ErrorKind::Persistence,
            RcmError::Config(_) => ErrorKind::Configuration,
            RcmError::Forbidden(_) => ErrorKind::Authorization,
            RcmError::Database(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, RcmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_components_message_lists_components() {
        let err = RcmError::HasComponents {
            asset: "Pump A".to_string(),
            components: vec!["Bearing".to_string(), "Seal".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Pump A"));
        assert!(msg.contains("2 component(s)"));
        assert!(msg.contains("Bearing, Seal"));
        assert_eq!(err.kind(), ErrorKind::ReferentialIntegrity);
    }

    #[test]
    fn test_precursor_missing_is_validation() {
        let err = RcmError::PrecursorMissing {
            failure_mode: "FM-FF-1.1-1".to_string(),
            missing: WorkflowStep::Effects,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "FM-FF-1.1-1: failure effects must be recorded first"
        );
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: RcmError = parse_err.into();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_io_error_maps_to_persistence() {
        let err: RcmError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}
