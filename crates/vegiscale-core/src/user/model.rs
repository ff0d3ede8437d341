//! UserProfile domain model.

use crate::identity::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile of a registered user.
///
/// Credential material (password hash, tokens) never enters the domain
/// layer; the identity context owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Creates a fresh profile with the default `user` role.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            name: name.into(),
            role: Role::User,
            created_at: Utc::now(),
            last_login: None,
            updated_at: None,
        }
    }
}
