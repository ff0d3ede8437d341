//! Session domain model.
//!
//! This module contains the core `Session` entity that represents one
//! tracked weighing workflow instance in the domain layer.

use super::kind::SessionKind;
use super::status::SessionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents one tracked weighing workflow instance.
///
/// A session is created by an authenticated user (`initiate`), mutated by
/// weight-reporting devices and the identification step while in progress,
/// and frozen by `complete`. The `total_weight` accumulator is updated only
/// through the store's atomic delta primitives and is monotonically
/// non-decreasing while the session is in progress.
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier, prefixed by kind at creation time
    /// (`prod_` / `rompes_`)
    pub id: String,
    /// Session kind; immutable after creation and always consistent with
    /// the id prefix
    pub kind: SessionKind,
    /// Principal id of the user who initiated the session; immutable
    pub owner_id: String,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Accumulated weight in grams; product sessions sum their readings,
    /// rompes sessions carry a single declared weight
    pub total_weight: f64,
    /// Produce variety discriminator; required for rompes sessions
    #[serde(default)]
    pub variety: Option<String>,
    /// Machine-identified vegetable label, if identification has run
    #[serde(default)]
    pub vegetable_type: Option<String>,
    /// Classifier confidence for `vegetable_type`
    #[serde(default)]
    pub confidence: Option<f64>,
    /// URL of the retained identification image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of completion; `None` until the session completes
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a fresh in-progress session with a newly minted prefixed id
    /// and a zeroed accumulator.
    pub fn new(kind: SessionKind, owner_id: impl Into<String>, variety: Option<String>) -> Self {
        Self {
            id: kind.new_id(),
            kind,
            owner_id: owner_id.into(),
            status: SessionStatus::InProgress,
            total_weight: 0.0,
            variety,
            vegetable_type: None,
            confidence: None,
            image_url: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Returns true once the session has reached its terminal state.
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// A single weight observation, owned exclusively by its session.
///
/// Readings are child records of product sessions; they are never
/// independently addressable by clients. Rompes sessions keep no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightReading {
    /// Observed weight in grams
    pub value: f64,
    /// Device that reported the reading
    pub source_device_id: String,
    /// Timestamp of the observation as recorded by the backend
    pub timestamp: DateTime<Utc>,
}

impl WeightReading {
    /// Creates a reading stamped with the current time.
    pub fn now(value: f64, source_device_id: impl Into<String>) -> Self {
        Self {
            value,
            source_device_id: source_device_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The identification triple attached to a session after a classification
/// result is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub vegetable_type: String,
    pub confidence: f64,
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_in_progress() {
        let session = Session::new(SessionKind::Product, "u1", None);
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.total_weight, 0.0);
        assert!(session.completed_at.is_none());
        assert!(session.id.starts_with("prod_"));
        assert!(!session.is_completed());
    }

    #[test]
    fn test_new_rompes_session_keeps_variety() {
        let session = Session::new(SessionKind::Rompes, "u1", Some("bayam merah".to_string()));
        assert!(session.id.starts_with("rompes_"));
        assert_eq!(session.variety.as_deref(), Some("bayam merah"));
    }
}
