//! Classifier gateway trait.
//!
//! The vegetable-identification model is an opaque collaborator: given
//! image bytes it returns a label with a confidence, or reports that it
//! found nothing. Whether a result is trustworthy enough to attach to a
//! session is decided by the identification service, not here.

use crate::error::Result;
use async_trait::async_trait;

/// Outcome of a single classification call.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The model identified a produce label.
    Detected { label: String, confidence: f64 },
    /// The model found no identifiable produce in the image.
    NoDetection,
}

/// An abstract gateway to the vegetable-identification model.
///
/// Implementations call the model service over HTTP in production and
/// return canned results in tests. The gateway is invoked exactly once per
/// identification operation; retry policy, if any, belongs to the caller.
#[async_trait]
pub trait ClassifierGateway: Send + Sync {
    /// Classifies the given image bytes.
    ///
    /// # Errors
    ///
    /// Returns `Upstream` when the model service fails or answers with a
    /// malformed result.
    async fn classify(&self, image: &[u8]) -> Result<Classification>;
}
