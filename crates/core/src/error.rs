//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only deterministic failures belong here: a bad field value, a broken
/// invariant, a command issued in the wrong lifecycle state. Collaborator
/// faults (network, remote validation) are modelled by the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed local validation (e.g. empty search term).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A command is not valid from the current lifecycle state.
    #[error("cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    /// A conflicting operation is already in progress.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested record does not exist.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_transition(state: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidTransition {
            state: state.into(),
            action: action.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Whether the error came from a local precondition rather than state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_state_and_action() {
        let err = DomainError::invalid_transition("submitting", "submit");
        assert_eq!(err.to_string(), "cannot submit while submitting");
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_helpers_classify() {
        assert!(DomainError::validation("enter a search term").is_validation());
        assert!(DomainError::invalid_id("EmployeeId: bad").is_validation());
        assert!(!DomainError::not_found().is_validation());
    }
}
