//! In-memory UserRepository implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use vegiscale_core::error::Result;
use vegiscale_core::user::{UserProfile, UserRepository};

/// In-memory user profile repository.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let users = self.users.lock().expect("user repository lock poisoned");
        Ok(users.get(user_id).cloned())
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        let mut users = self.users.lock().expect("user repository lock poisoned");
        users.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}
