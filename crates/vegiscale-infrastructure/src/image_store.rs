//! Image store implementations.
//!
//! `MemoryImageStore` backs tests; `LocalDirImageStore` persists images
//! under a base directory with UUID filenames, serving as the stand-in for
//! a cloud bucket in single-node deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use uuid::Uuid;
use vegiscale_core::error::Result;
use vegiscale_core::image_store::{ImageRef, ImageStore};

/// In-memory image store.
#[derive(Default)]
pub struct MemoryImageStore {
    images: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of currently retained images. Used by tests to
    /// assert compensating cleanup.
    pub fn len(&self) -> usize {
        self.images.lock().expect("image store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the referenced image is still retained.
    pub fn contains(&self, image: &ImageRef) -> bool {
        self.images
            .lock()
            .expect("image store lock poisoned")
            .contains_key(image.as_str())
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, bytes: &[u8], extension: &str) -> Result<ImageRef> {
        let key = format!("{}.{extension}", Uuid::new_v4());
        self.images
            .lock()
            .expect("image store lock poisoned")
            .insert(key.clone(), bytes.to_vec());
        Ok(ImageRef::new(key))
    }

    fn url(&self, image: &ImageRef) -> String {
        format!("memory://{image}")
    }

    async fn delete(&self, image: &ImageRef) -> Result<()> {
        self.images
            .lock()
            .expect("image store lock poisoned")
            .remove(image.as_str());
        Ok(())
    }
}

/// Directory-backed image store.
///
/// Files are written as `{uuid}.{ext}` under the base directory; the URL is
/// the base URL joined with the key.
pub struct LocalDirImageStore {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalDirImageStore {
    /// Creates the store, ensuring the base directory exists.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - Directory images are written into
    /// * `base_url` - Public URL prefix the images are served under
    pub async fn new(base_dir: impl AsRef<Path>, base_url: impl Into<String>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self {
            base_dir,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn path_for(&self, image: &ImageRef) -> PathBuf {
        self.base_dir.join(image.as_str())
    }
}

#[async_trait]
impl ImageStore for LocalDirImageStore {
    async fn put(&self, bytes: &[u8], extension: &str) -> Result<ImageRef> {
        let key = format!("{}.{extension}", Uuid::new_v4());
        let path = self.base_dir.join(&key);
        fs::write(&path, bytes).await?;
        tracing::debug!("Stored image at {}", path.display());
        Ok(ImageRef::new(key))
    }

    fn url(&self, image: &ImageRef) -> String {
        format!("{}/{}", self.base_url, image)
    }

    async fn delete(&self, image: &ImageRef) -> Result<()> {
        match fs::remove_file(self.path_for(image)).await {
            Ok(()) => Ok(()),
            // Cleanup is re-issued on failure paths; a missing file is fine
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
