//! Session store trait.
//!
//! Defines the interface for durable session persistence. Callers may be
//! distributed across processes and devices, so all mutation goes through
//! three conditional primitives: create-if-absent, atomic delta against the
//! accumulator, and compare-and-set status transition. A plain
//! read-check-then-update at the engine would lose updates under
//! concurrency and is deliberately not expressible through this interface.

use super::kind::SessionKind;
use super::model::{Identification, Session, WeightReading};
use super::status::SessionStatus;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An abstract store for weighing sessions.
///
/// Implementations back this with a document database in production and an
/// in-memory map in tests; the engine depends only on this contract.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a freshly created session.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a session with the same id already exists in
    /// the partition.
    async fn create(&self, session: Session) -> Result<()>;

    /// Point-reads a session from its partition.
    ///
    /// Returns `Ok(None)` when the id does not resolve; store failures are
    /// errors.
    async fn get(&self, kind: SessionKind, id: &str) -> Result<Option<Session>>;

    /// Appends a reading and applies its value as an atomic delta to the
    /// accumulator, in one conditional write. Product sessions only.
    ///
    /// Returns the new total.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session is completed
    async fn record_reading(
        &self,
        kind: SessionKind,
        id: &str,
        reading: WeightReading,
    ) -> Result<f64>;

    /// Applies an atomic delta to the accumulator without recording any
    /// history. Rompes sessions are single-shot and use this path.
    ///
    /// Returns the new total.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session is completed
    async fn increment_total_weight(&self, kind: SessionKind, id: &str, delta: f64) -> Result<f64>;

    /// Atomically transitions `status` from `from` to `to`, stamping
    /// `completed_at` when provided.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// session was not in the expected `from` state (the caller lost the
    /// race or the transition already happened).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist.
    async fn compare_and_set_status(
        &self,
        kind: SessionKind,
        id: &str,
        from: SessionStatus,
        to: SessionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<bool>;

    /// Overwrites the identification triple on an in-progress session.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session is completed
    async fn set_identification(
        &self,
        kind: SessionKind,
        id: &str,
        identification: Identification,
    ) -> Result<()>;

    /// Lists sessions owned by a principal across both partitions, newest
    /// first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Session>>;

    /// Lists sessions in the given status across both partitions, newest
    /// first.
    async fn list_by_status(&self, status: SessionStatus) -> Result<Vec<Session>>;

    /// Returns the reading history of a session (empty for rompes).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist.
    async fn readings(&self, kind: SessionKind, id: &str) -> Result<Vec<WeightReading>>;
}
