//! Error types for the Vegiscale backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Vegiscale backend.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Variants map one-to-one to
/// the outcome kinds surfaced to API bindings (400/403/404/409/504-style),
/// but the mapping itself is a binding concern.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WeighError {
    /// Malformed or missing required input, detected before any write
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found error with type information
    #[error("{entity} not found: '{id}'")]
    NotFound { entity: &'static str, id: String },

    /// Authorization failure (authenticated, but not permitted)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation illegal in the current lifecycle state
    /// (e.g. mutating a completed session)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Concurrent state transition collision
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An upstream collaborator did not answer within the deadline
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// An upstream collaborator (classifier, store) failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal error (should not happen in normal operation); the message
    /// is operator-facing, untrusted callers receive only the kind
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WeighError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates an Upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an InvalidArgument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is an UpstreamTimeout error
    pub fn is_upstream_timeout(&self) -> bool {
        matches!(self, Self::UpstreamTimeout(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WeighError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for WeighError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArgument(format!("JSON: {err}"))
    }
}

/// Conversion from anyhow::Error (adapter edges only)
impl From<anyhow::Error> for WeighError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, WeighError>`.
pub type Result<T> = std::result::Result<T, WeighError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = WeighError::not_found("session", "prod_abc");
        assert_eq!(err.to_string(), "session not found: 'prod_abc'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_predicates_match_variants() {
        assert!(WeighError::invalid_argument("x").is_invalid_argument());
        assert!(WeighError::forbidden("x").is_forbidden());
        assert!(WeighError::invalid_state("x").is_invalid_state());
        assert!(WeighError::conflict("x").is_conflict());
        assert!(WeighError::UpstreamTimeout("x".into()).is_upstream_timeout());
        assert!(!WeighError::internal("x").is_not_found());
    }
}
