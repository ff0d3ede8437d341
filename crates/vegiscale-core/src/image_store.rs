//! Image store trait.
//!
//! Identification images are staged before classification and either
//! retained (recognized label) or deleted (rejection, timeout, or any
//! failure after staging). The system never keeps unidentifiable images.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque reference to a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An abstract store for identification images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores image bytes under a freshly minted key; `extension` is the
    /// validated file extension (`png` / `jpg` / `jpeg`).
    async fn put(&self, bytes: &[u8], extension: &str) -> Result<ImageRef>;

    /// Returns the externally visible URL for a stored image.
    fn url(&self, image: &ImageRef) -> String;

    /// Deletes a stored image. Deleting a missing image is a no-op, so
    /// compensating cleanup can always be re-issued safely.
    async fn delete(&self, image: &ImageRef) -> Result<()>;
}
