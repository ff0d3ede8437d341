//! Weighing session use cases.
//!
//! `WeighingService` is the session engine: it owns the lifecycle state
//! machine, routes incoming weight observations to the correct partition by
//! id prefix, and applies the ownership policy. It holds no session state
//! of its own; every mutation goes through the store's conditional
//! primitives, so concurrent callers across processes and devices cannot
//! lose updates or resurrect a completed session.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vegiscale_core::config::RompesSettings;
use vegiscale_core::error::{Result, WeighError};
use vegiscale_core::identity::{DeviceIdentity, Principal};
use vegiscale_core::session::{
    Session, SessionKind, SessionStatus, SessionStore, WeightReading,
};

/// Client-supplied arguments for `initiate_session`.
///
/// There is deliberately no owner field here; ownership always comes from
/// the authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateSessionRequest {
    /// Session type name (`product` / `rompes`)
    pub session_type: String,
    /// Produce variety; required for rompes sessions
    #[serde(default)]
    pub variety: Option<String>,
}

/// A session together with its reading history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session: Session,
    pub readings: Vec<WeightReading>,
}

/// Outcome of a weight observation.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightOutcome {
    /// The observation was applied to a session's accumulator.
    Recorded { session_id: String, new_total: f64 },
    /// The observation carried no session reference. Received and logged,
    /// but attached to nothing; a valid terminal outcome, not an error.
    Unassigned,
}

/// The session engine.
pub struct WeighingService {
    store: Arc<dyn SessionStore>,
    rompes: RompesSettings,
}

impl WeighingService {
    /// Creates the engine over a session store.
    pub fn new(store: Arc<dyn SessionStore>, rompes: RompesSettings) -> Self {
        Self { store, rompes }
    }

    /// Starts a new weighing session owned by the authenticated principal.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the session type is not one of the recognized
    ///   values, or the type is rompes and the variety is absent or not in
    ///   the recognized set
    /// - `Conflict` if the freshly minted id collides (not expected in
    ///   practice)
    pub async fn initiate_session(
        &self,
        principal: &Principal,
        request: InitiateSessionRequest,
    ) -> Result<Session> {
        let kind = SessionKind::parse(&request.session_type).ok_or_else(|| {
            WeighError::invalid_argument(format!(
                "unknown session type '{}'",
                request.session_type
            ))
        })?;

        let variety = match kind {
            SessionKind::Product => None,
            SessionKind::Rompes => {
                let variety = request.variety.ok_or_else(|| {
                    WeighError::invalid_argument("variety is required for rompes sessions")
                })?;
                if !self.rompes.recognizes(&variety) {
                    return Err(WeighError::invalid_argument(format!(
                        "unrecognized rompes variety '{variety}'"
                    )));
                }
                Some(variety)
            }
        };

        // Ownership is forced from the credential, never from the payload
        let session = Session::new(kind, &principal.user_id, variety);
        self.store.create(session.clone()).await?;

        tracing::info!(
            "Session initiated: {} ({}) by {}",
            session.id,
            session.kind,
            principal.user_id
        );
        Ok(session)
    }

    /// Completes a session, freezing its accumulator and identification
    /// fields.
    ///
    /// Completion is idempotent: re-issuing the call on an already
    /// completed session returns the terminal record unchanged, with the
    /// original `completed_at` stamp. The transition itself is a
    /// compare-and-set at the store, so a concurrent completion race
    /// resolves to exactly one stamp.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the reference does not resolve
    /// - `Forbidden` unless the caller owns the session or is an admin
    pub async fn complete_session(
        &self,
        session_ref: &str,
        principal: &Principal,
    ) -> Result<Session> {
        let kind = SessionKind::from_ref(session_ref);
        let session = self
            .store
            .get(kind, session_ref)
            .await?
            .ok_or_else(|| WeighError::not_found("session", session_ref))?;
        principal.ensure_can_access(&session.owner_id)?;

        if session.is_completed() {
            return Ok(session);
        }

        let won = self
            .store
            .compare_and_set_status(
                kind,
                session_ref,
                SessionStatus::InProgress,
                SessionStatus::Completed,
                Some(Utc::now()),
            )
            .await?;

        if won {
            tracing::info!("Session completed: {session_ref}");
        } else {
            tracing::debug!("Session {session_ref} was completed concurrently");
        }

        // Re-read either way: the winner picks up its stamp, a loser picks
        // up the stamp of whoever won
        self.store
            .get(kind, session_ref)
            .await?
            .ok_or_else(|| WeighError::not_found("session", session_ref))
    }

    /// Reads a session with its reading history (product sessions only;
    /// rompes sessions keep none).
    ///
    /// # Errors
    ///
    /// - `NotFound` if the reference does not resolve
    /// - `Forbidden` unless the caller owns the session or is an admin
    pub async fn get_session_detail(
        &self,
        session_ref: &str,
        principal: &Principal,
    ) -> Result<SessionDetail> {
        let kind = SessionKind::from_ref(session_ref);
        let session = self
            .store
            .get(kind, session_ref)
            .await?
            .ok_or_else(|| WeighError::not_found("session", session_ref))?;
        principal.ensure_can_access(&session.owner_id)?;

        let readings = match kind {
            SessionKind::Product => self.store.readings(kind, session_ref).await?,
            SessionKind::Rompes => Vec::new(),
        };
        Ok(SessionDetail { session, readings })
    }

    /// Lists the caller's own sessions, newest first. Always self-scoped,
    /// regardless of role.
    pub async fn list_my_sessions(&self, principal: &Principal) -> Result<Vec<Session>> {
        self.store.list_by_owner(&principal.user_id).await
    }

    /// Lists every session in the system, newest first. A distinct,
    /// admin-only operation; never an implicit side effect of role on
    /// `list_my_sessions`.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin principals.
    pub async fn list_all_sessions(&self, principal: &Principal) -> Result<Vec<Session>> {
        principal.ensure_admin()?;
        let mut sessions = self
            .store
            .list_by_status(SessionStatus::InProgress)
            .await?;
        sessions.extend(self.store.list_by_status(SessionStatus::Completed).await?);
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    /// Returns the most recently created in-progress session across both
    /// partitions, if any. Polled by devices to discover where readings
    /// should go.
    pub async fn active_session(&self) -> Result<Option<Session>> {
        let sessions = self
            .store
            .list_by_status(SessionStatus::InProgress)
            .await?;
        Ok(sessions.into_iter().next())
    }

    /// Applies a weight observation from a device.
    ///
    /// The reference is routed by prefix (`prod_` / `rompes_`; unprefixed
    /// references are legacy product ids). Product sessions record the
    /// reading and apply the delta in one conditional store write; rompes
    /// sessions are single-shot and apply the delta only. An observation
    /// without a reference is accepted as `Unassigned`.
    ///
    /// Device calls are authenticated by device credential and bypass the
    /// ownership policy; only state and validity rules apply.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the value is not finite or is negative
    /// - `NotFound` if the reference does not resolve
    /// - `InvalidState` if the session is already completed
    pub async fn record_weight(
        &self,
        session_ref: Option<&str>,
        value: f64,
        device: &DeviceIdentity,
    ) -> Result<WeightOutcome> {
        if !value.is_finite() {
            return Err(WeighError::invalid_argument(
                "weight must be a finite number",
            ));
        }
        if value < 0.0 {
            return Err(WeighError::invalid_argument("weight must be non-negative"));
        }

        let Some(session_ref) = session_ref else {
            tracing::info!(
                "Received weight {value}g from device {} without session assignment",
                device.device_id
            );
            return Ok(WeightOutcome::Unassigned);
        };

        let kind = SessionKind::from_ref(session_ref);
        let new_total = match kind {
            SessionKind::Product => {
                self.store
                    .record_reading(
                        kind,
                        session_ref,
                        WeightReading::now(value, &device.device_id),
                    )
                    .await?
            }
            SessionKind::Rompes => {
                self.store
                    .increment_total_weight(kind, session_ref, value)
                    .await?
            }
        };

        tracing::info!(
            "Added weight {value}g to session {session_ref} from device {}",
            device.device_id
        );
        Ok(WeightOutcome::Recorded {
            session_id: session_ref.to_string(),
            new_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vegiscale_infrastructure::MemorySessionStore;

    fn service() -> (WeighingService, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        (
            WeighingService::new(store.clone(), RompesSettings::default()),
            store,
        )
    }

    fn product_request() -> InitiateSessionRequest {
        InitiateSessionRequest {
            session_type: "product".to_string(),
            variety: None,
        }
    }

    fn device() -> DeviceIdentity {
        DeviceIdentity::new("scale-1")
    }

    #[tokio::test]
    async fn test_initiate_product_session() {
        let (service, _) = service();
        let session = service
            .initiate_session(&Principal::user("u1"), product_request())
            .await
            .unwrap();

        assert!(session.id.starts_with("prod_"));
        assert_eq!(session.owner_id, "u1");
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.total_weight, 0.0);
    }

    #[tokio::test]
    async fn test_initiate_rejects_unknown_type() {
        let (service, _) = service();
        let err = service
            .initiate_session(
                &Principal::user("u1"),
                InitiateSessionRequest {
                    session_type: "batch".to_string(),
                    variety: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_initiate_rompes_requires_recognized_variety() {
        let (service, _) = service();
        let principal = Principal::user("u1");

        let err = service
            .initiate_session(
                &principal,
                InitiateSessionRequest {
                    session_type: "rompes".to_string(),
                    variety: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = service
            .initiate_session(
                &principal,
                InitiateSessionRequest {
                    session_type: "rompes".to_string(),
                    variety: Some("wortel".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let session = service
            .initiate_session(
                &principal,
                InitiateSessionRequest {
                    session_type: "rompes".to_string(),
                    variety: Some("bayam merah".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(session.id.starts_with("rompes_"));
        assert_eq!(session.variety.as_deref(), Some("bayam merah"));
    }

    #[tokio::test]
    async fn test_record_weight_accumulates() {
        let (service, _) = service();
        let session = service
            .initiate_session(&Principal::user("u1"), product_request())
            .await
            .unwrap();

        for value in [120.0, 80.0] {
            service
                .record_weight(Some(&session.id), value, &device())
                .await
                .unwrap();
        }
        let outcome = service
            .record_weight(Some(&session.id), 45.0, &device())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WeightOutcome::Recorded {
                session_id: session.id.clone(),
                new_total: 245.0
            }
        );

        let detail = service
            .get_session_detail(&session.id, &Principal::user("u1"))
            .await
            .unwrap();
        assert_eq!(detail.session.total_weight, 245.0);
        assert_eq!(detail.readings.len(), 3);
    }

    #[tokio::test]
    async fn test_record_weight_without_reference_is_unassigned() {
        let (service, _) = service();
        let outcome = service.record_weight(None, 150.0, &device()).await.unwrap();
        assert_eq!(outcome, WeightOutcome::Unassigned);
    }

    #[tokio::test]
    async fn test_record_weight_rejects_invalid_values() {
        let (service, _) = service();
        for value in [f64::NAN, f64::INFINITY, -1.0] {
            let err = service
                .record_weight(None, value, &device())
                .await
                .unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[tokio::test]
    async fn test_record_weight_unknown_session_is_not_found() {
        let (service, _) = service();
        let err = service
            .record_weight(Some("prod_missing"), 10.0, &device())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rompes_weight_has_no_history() {
        let (service, _) = service();
        let session = service
            .initiate_session(
                &Principal::user("u1"),
                InitiateSessionRequest {
                    session_type: "rompes".to_string(),
                    variety: Some("kangkung".to_string()),
                },
            )
            .await
            .unwrap();

        let outcome = service
            .record_weight(Some(&session.id), 500.0, &device())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WeightOutcome::Recorded {
                session_id: session.id.clone(),
                new_total: 500.0
            }
        );

        let detail = service
            .get_session_detail(&session.id, &Principal::user("u1"))
            .await
            .unwrap();
        assert_eq!(detail.session.total_weight, 500.0);
        assert!(detail.readings.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_unprefixed_reference_routes_to_product() {
        let (service, store) = service();
        let mut legacy = Session::new(SessionKind::Product, "u1", None);
        legacy.id = "4f2c9b1e-legacy".to_string();
        store.create(legacy).await.unwrap();

        let outcome = service
            .record_weight(Some("4f2c9b1e-legacy"), 75.0, &device())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WeightOutcome::Recorded {
                session_id: "4f2c9b1e-legacy".to_string(),
                new_total: 75.0
            }
        );
    }

    #[tokio::test]
    async fn test_prefix_routing_never_crosses_partitions() {
        let (service, store) = service();

        let mut product = Session::new(SessionKind::Product, "u1", None);
        product.id = "prod_abc".to_string();
        store.create(product).await.unwrap();

        let mut rompes = Session::new(SessionKind::Rompes, "u1", Some("kangkung".to_string()));
        rompes.id = "rompes_abc".to_string();
        store.create(rompes).await.unwrap();

        service
            .record_weight(Some("rompes_abc"), 300.0, &device())
            .await
            .unwrap();

        let product = store
            .get(SessionKind::Product, "prod_abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.total_weight, 0.0);

        let rompes = store
            .get(SessionKind::Rompes, "rompes_abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rompes.total_weight, 300.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readings_lose_no_updates() {
        let store = Arc::new(MemorySessionStore::new());
        let service = Arc::new(WeighingService::new(
            store.clone(),
            RompesSettings::default(),
        ));
        let session = service
            .initiate_session(&Principal::user("u1"), product_request())
            .await
            .unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let service = service.clone();
                let session_id = session.id.clone();
                tokio::spawn(async move {
                    let device = DeviceIdentity::new(format!("scale-{}", i % 3));
                    service
                        .record_weight(Some(&session_id), 10.0, &device)
                        .await
                })
            })
            .collect();
        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        let session = store
            .get(SessionKind::Product, &session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.total_weight, 200.0);
        let readings = store
            .readings(SessionKind::Product, &session.id)
            .await
            .unwrap();
        assert_eq!(readings.len(), 20);
    }

    #[tokio::test]
    async fn test_complete_is_idempotent() {
        let (service, _) = service();
        let owner = Principal::user("u1");
        let session = service
            .initiate_session(&owner, product_request())
            .await
            .unwrap();

        let completed = service.complete_session(&session.id, &owner).await.unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
        let first_stamp = completed.completed_at.unwrap();

        let again = service.complete_session(&session.id, &owner).await.unwrap();
        assert_eq!(again.status, SessionStatus::Completed);
        assert_eq!(again.completed_at, Some(first_stamp));
    }

    #[tokio::test]
    async fn test_complete_enforces_ownership() {
        let (service, _) = service();
        let session = service
            .initiate_session(&Principal::user("u1"), product_request())
            .await
            .unwrap();

        let err = service
            .complete_session(&session.id, &Principal::user("u2"))
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        // Admin may complete another user's session
        let completed = service
            .complete_session(&session.id, &Principal::admin("boss"))
            .await
            .unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_unknown_session_is_not_found() {
        let (service, _) = service();
        let err = service
            .complete_session("prod_missing", &Principal::user("u1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_writes_after_completion_fail_and_change_nothing() {
        let (service, store) = service();
        let owner = Principal::user("u1");
        let session = service
            .initiate_session(&owner, product_request())
            .await
            .unwrap();
        service
            .record_weight(Some(&session.id), 245.0, &device())
            .await
            .unwrap();
        service.complete_session(&session.id, &owner).await.unwrap();

        let err = service
            .record_weight(Some(&session.id), 10.0, &device())
            .await
            .unwrap_err();
        assert!(err.is_invalid_state());

        let frozen = store
            .get(SessionKind::Product, &session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frozen.total_weight, 245.0);
    }

    #[tokio::test]
    async fn test_detail_enforces_ownership() {
        let (service, _) = service();
        let session = service
            .initiate_session(&Principal::user("u1"), product_request())
            .await
            .unwrap();

        let err = service
            .get_session_detail(&session.id, &Principal::user("u2"))
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        assert!(service
            .get_session_detail(&session.id, &Principal::user("u1"))
            .await
            .is_ok());
        assert!(service
            .get_session_detail(&session.id, &Principal::admin("boss"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_list_my_sessions_is_self_scoped() {
        let (service, _) = service();
        service
            .initiate_session(&Principal::user("u1"), product_request())
            .await
            .unwrap();
        service
            .initiate_session(&Principal::user("u2"), product_request())
            .await
            .unwrap();

        // Self-scoped even for admins
        let mine = service
            .list_my_sessions(&Principal::admin("u1"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].owner_id, "u1");
    }

    #[tokio::test]
    async fn test_list_all_sessions_is_admin_only() {
        let (service, _) = service();
        let owner = Principal::user("u1");
        let session = service
            .initiate_session(&owner, product_request())
            .await
            .unwrap();
        service
            .initiate_session(&Principal::user("u2"), product_request())
            .await
            .unwrap();
        service.complete_session(&session.id, &owner).await.unwrap();

        let err = service
            .list_all_sessions(&Principal::user("u1"))
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let all = service
            .list_all_sessions(&Principal::admin("boss"))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_active_session_returns_newest_in_progress() {
        let (service, _) = service();
        assert!(service.active_session().await.unwrap().is_none());

        let owner = Principal::user("u1");
        let first = service
            .initiate_session(&owner, product_request())
            .await
            .unwrap();
        let second = service
            .initiate_session(&owner, product_request())
            .await
            .unwrap();

        let active = service.active_session().await.unwrap().unwrap();
        assert_eq!(active.id, second.id);

        service.complete_session(&second.id, &owner).await.unwrap();
        let active = service.active_session().await.unwrap().unwrap();
        assert_eq!(active.id, first.id);

        service.complete_session(&first.id, &owner).await.unwrap();
        assert!(service.active_session().await.unwrap().is_none());
    }
}
