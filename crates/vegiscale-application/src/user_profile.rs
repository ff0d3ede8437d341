//! User profile use cases.
//!
//! Profile reads and self-service updates, plus the admin-only role change.
//! Credential handling (password hashing, token issuance) lives in the
//! identity context, not here.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use vegiscale_core::error::{Result, WeighError};
use vegiscale_core::identity::{Principal, Role};
use vegiscale_core::user::{UserProfile, UserRepository};

/// Fields callers may never change through a profile update; anything in
/// this list is silently dropped from the payload.
const RESTRICTED_FIELDS: &[&str] = &[
    "user_id",
    "email",
    "role",
    "created_at",
    "last_login",
    "updated_at",
    "password",
    "salt",
];

/// Manages user profile reads and updates.
pub struct UserProfileService {
    users: Arc<dyn UserRepository>,
}

impl UserProfileService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Returns a profile by user id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user.
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| WeighError::not_found("user", user_id))
    }

    /// Applies a self-service profile update for the authenticated
    /// principal.
    ///
    /// Restricted fields are dropped rather than rejected, matching the
    /// mobile client's habit of echoing the whole profile object back.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown user
    /// - `InvalidArgument` when nothing updatable remains after filtering
    pub async fn update_profile(
        &self,
        principal: &Principal,
        mut fields: Map<String, Value>,
    ) -> Result<UserProfile> {
        let mut profile = self.get_profile(&principal.user_id).await?;

        for restricted in RESTRICTED_FIELDS {
            if fields.remove(*restricted).is_some() {
                tracing::debug!(
                    "Dropped restricted field '{restricted}' from profile update for {}",
                    principal.user_id
                );
            }
        }

        let mut changed = false;
        if let Some(name) = fields.get("name").and_then(Value::as_str) {
            if name.trim().is_empty() {
                return Err(WeighError::invalid_argument("name must be non-empty"));
            }
            profile.name = name.to_string();
            changed = true;
        }

        if !changed {
            return Err(WeighError::invalid_argument("no valid fields to update"));
        }

        profile.updated_at = Some(Utc::now());
        self.users.save(&profile).await?;
        tracing::info!("Updated profile for user {}", principal.user_id);
        Ok(profile)
    }

    /// Changes a user's role. Admin-only.
    ///
    /// # Errors
    ///
    /// - `Forbidden` for non-admin actors
    /// - `NotFound` for an unknown user
    pub async fn set_role(
        &self,
        actor: &Principal,
        user_id: &str,
        role: Role,
    ) -> Result<UserProfile> {
        actor.ensure_admin()?;

        let mut profile = self.get_profile(user_id).await?;
        profile.role = role;
        profile.updated_at = Some(Utc::now());
        self.users.save(&profile).await?;

        tracing::info!("Updated role for user {user_id}");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vegiscale_infrastructure::MemoryUserRepository;

    async fn service_with_user(user_id: &str) -> UserProfileService {
        let repo = Arc::new(MemoryUserRepository::new());
        repo.save(&UserProfile::new(
            user_id,
            format!("{user_id}@lokatani.id"),
            "Sari",
        ))
        .await
        .unwrap();
        UserProfileService::new(repo)
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_get_profile_unknown_user() {
        let service = service_with_user("u1").await;
        assert!(service.get_profile("u9").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_applies_name_and_stamps_updated_at() {
        let service = service_with_user("u1").await;
        let profile = service
            .update_profile(&Principal::user("u1"), payload(json!({"name": "Dewi"})))
            .await
            .unwrap();
        assert_eq!(profile.name, "Dewi");
        assert!(profile.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_drops_restricted_fields() {
        let service = service_with_user("u1").await;
        let profile = service
            .update_profile(
                &Principal::user("u1"),
                payload(json!({
                    "name": "Dewi",
                    "role": "admin",
                    "email": "spoof@lokatani.id",
                    "user_id": "someone-else"
                })),
            )
            .await
            .unwrap();

        assert_eq!(profile.name, "Dewi");
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.email, "u1@lokatani.id");
        assert_eq!(profile.user_id, "u1");
    }

    #[tokio::test]
    async fn test_update_with_only_restricted_fields_is_rejected() {
        let service = service_with_user("u1").await;
        let err = service
            .update_profile(&Principal::user("u1"), payload(json!({"role": "admin"})))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_set_role_is_admin_only() {
        let service = service_with_user("u1").await;

        let err = service
            .set_role(&Principal::user("u2"), "u1", Role::Admin)
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let profile = service
            .set_role(&Principal::admin("boss"), "u1", Role::Admin)
            .await
            .unwrap();
        assert_eq!(profile.role, Role::Admin);
    }
}
