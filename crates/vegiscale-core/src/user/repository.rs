//! User repository trait.

use super::model::UserProfile;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for user profiles.
///
/// Profiles are not concurrency-sensitive the way sessions are; plain
/// find/save semantics are sufficient here.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a profile by user id.
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Upserts a profile.
    async fn save(&self, profile: &UserProfile) -> Result<()>;
}
