//! Authenticated identities and the ownership policy.
//!
//! Token and credential verification happens outside the engine; by the
//! time a call reaches a service it carries either a resolved `Principal`
//! (a user) or a `DeviceIdentity` (a scale). Devices are authenticated by a
//! distinct device credential and are exempt from ownership checks; they
//! are subject only to the weight-specific state and validity rules.

use crate::error::{Result, WeighError};
use serde::{Deserialize, Serialize};

/// Role of an authenticated user principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// An authenticated user principal, as resolved by the identity context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable user id
    pub user_id: String,
    /// Role carried by the credential
    pub role: Role,
}

impl Principal {
    /// Creates a principal with the default `user` role.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::User,
        }
    }

    /// Creates an admin principal.
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Enforces the uniform ownership rule: the owner or an admin may act
    /// on a session, anyone else is rejected.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the principal is neither the owner nor an
    /// admin.
    pub fn ensure_can_access(&self, owner_id: &str) -> Result<()> {
        if self.user_id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(WeighError::forbidden(
                "session belongs to another user".to_string(),
            ))
        }
    }

    /// Enforces admin-only operations.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin principals.
    pub fn ensure_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(WeighError::forbidden("admin role required".to_string()))
        }
    }
}

/// An authenticated IoT device, as resolved by the device credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_id: String,
}

impl DeviceIdentity {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }
}
