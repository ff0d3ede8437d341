//! In-memory SessionStore implementation.
//!
//! Backs the engine in tests and single-process deployments. All mutation
//! happens under one write lock per call, which makes every store primitive
//! linearizable: the conditional increment and the status CAS observe and
//! modify the record in a single critical section, matching the semantics
//! a document database provides with atomic field increments and
//! conditional updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use vegiscale_core::error::{Result, WeighError};
use vegiscale_core::session::{
    Identification, Session, SessionKind, SessionStatus, SessionStore, WeightReading,
};

/// A session record together with its reading history.
#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    readings: Vec<WeightReading>,
}

/// In-memory session store, partitioned by `SessionKind`.
///
/// Records are keyed by `(kind, id)`, so an id suffix colliding across
/// partitions can never cross over.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<HashMap<(SessionKind, String), StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: Session) -> Result<()> {
        let mut inner = self.inner.write().await;
        let key = (session.kind, session.id.clone());
        if inner.contains_key(&key) {
            return Err(WeighError::conflict(format!(
                "session '{}' already exists",
                session.id
            )));
        }
        inner.insert(
            key,
            StoredSession {
                session,
                readings: Vec::new(),
            },
        );
        Ok(())
    }

    async fn get(&self, kind: SessionKind, id: &str) -> Result<Option<Session>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(&(kind, id.to_string()))
            .map(|stored| stored.session.clone()))
    }

    async fn record_reading(
        &self,
        kind: SessionKind,
        id: &str,
        reading: WeightReading,
    ) -> Result<f64> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| WeighError::not_found("session", id))?;
        if stored.session.is_completed() {
            return Err(WeighError::invalid_state(format!(
                "session '{id}' is completed"
            )));
        }
        stored.session.total_weight += reading.value;
        stored.readings.push(reading);
        Ok(stored.session.total_weight)
    }

    async fn increment_total_weight(&self, kind: SessionKind, id: &str, delta: f64) -> Result<f64> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| WeighError::not_found("session", id))?;
        if stored.session.is_completed() {
            return Err(WeighError::invalid_state(format!(
                "session '{id}' is completed"
            )));
        }
        stored.session.total_weight += delta;
        Ok(stored.session.total_weight)
    }

    async fn compare_and_set_status(
        &self,
        kind: SessionKind,
        id: &str,
        from: SessionStatus,
        to: SessionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| WeighError::not_found("session", id))?;
        if stored.session.status != from {
            return Ok(false);
        }
        stored.session.status = to;
        if completed_at.is_some() {
            stored.session.completed_at = completed_at;
        }
        Ok(true)
    }

    async fn set_identification(
        &self,
        kind: SessionKind,
        id: &str,
        identification: Identification,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| WeighError::not_found("session", id))?;
        if stored.session.is_completed() {
            return Err(WeighError::invalid_state(format!(
                "session '{id}' is completed"
            )));
        }
        stored.session.vegetable_type = Some(identification.vegetable_type);
        stored.session.confidence = Some(identification.confidence);
        stored.session.image_url = Some(identification.image_url);
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Session>> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<Session> = inner
            .values()
            .filter(|stored| stored.session.owner_id == owner_id)
            .map(|stored| stored.session.clone())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn list_by_status(&self, status: SessionStatus) -> Result<Vec<Session>> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<Session> = inner
            .values()
            .filter(|stored| stored.session.status == status)
            .map(|stored| stored.session.clone())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn readings(&self, kind: SessionKind, id: &str) -> Result<Vec<WeightReading>> {
        let inner = self.inner.read().await;
        inner
            .get(&(kind, id.to_string()))
            .map(|stored| stored.readings.clone())
            .ok_or_else(|| WeighError::not_found("session", id))
    }
}
