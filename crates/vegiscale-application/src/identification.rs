//! Identification gating use case.
//!
//! `IdentificationService` stages an uploaded image, calls the classifier
//! gateway exactly once under a deadline, and decides whether the result is
//! trustworthy enough to attach to a session. Images that do not end up
//! attached to an accepted identification are always deleted: rejection,
//! timeout, and any failure after staging all trigger compensating cleanup
//! so no orphaned image survives a non-accepted call.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use vegiscale_core::classifier::{Classification, ClassifierGateway};
use vegiscale_core::config::IdentificationSettings;
use vegiscale_core::error::{Result, WeighError};
use vegiscale_core::image_store::{ImageRef, ImageStore};
use vegiscale_core::session::{Identification, SessionKind, SessionStore};

/// Why a classification result was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The model found no identifiable produce
    NoDetection,
    /// The label is outside the recognized produce set for this deployment
    UnrecognizedLabel,
    /// The confidence fell below the configured floor
    LowConfidence,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoDetection => "no_detection",
            Self::UnrecognizedLabel => "unrecognized_label",
            Self::LowConfidence => "low_confidence",
        }
    }
}

/// Outcome of an identification call.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentificationOutcome {
    /// A recognized label was accepted; the image is retained. When a
    /// session reference was supplied, the session's identification fields
    /// were overwritten with this result.
    Accepted {
        label: String,
        confidence: f64,
        image_url: String,
    },
    /// The result was not trustworthy; the staged image was deleted and no
    /// session was touched.
    Rejected { reason: RejectReason },
}

/// Gates classification results and manages the image lifecycle around
/// them.
pub struct IdentificationService {
    classifier: Arc<dyn ClassifierGateway>,
    images: Arc<dyn ImageStore>,
    store: Arc<dyn SessionStore>,
    settings: IdentificationSettings,
}

impl IdentificationService {
    pub fn new(
        classifier: Arc<dyn ClassifierGateway>,
        images: Arc<dyn ImageStore>,
        store: Arc<dyn SessionStore>,
        settings: IdentificationSettings,
    ) -> Self {
        Self {
            classifier,
            images,
            store,
            settings,
        }
    }

    /// Classifies an uploaded image and, when trustworthy, attaches the
    /// result to the referenced session.
    ///
    /// The classifier is called once, bounded by the configured deadline;
    /// no retries happen here. A later accepted identification on the same
    /// session silently supersedes an earlier one.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty upload or a non-image filename
    /// - `UpstreamTimeout` when the classifier misses its deadline
    /// - `Upstream` when the classifier fails
    /// - `NotFound` when a supplied reference does not resolve
    /// - `InvalidState` when the referenced session is completed
    pub async fn identify_and_attach(
        &self,
        image: &[u8],
        filename: &str,
        session_ref: Option<&str>,
    ) -> Result<IdentificationOutcome> {
        if image.is_empty() {
            return Err(WeighError::invalid_argument("empty image upload"));
        }
        let extension = validated_extension(filename)?;

        let image_ref = self.images.put(image, &extension).await?;

        let deadline = Duration::from_secs(self.settings.classify_timeout_secs);
        let classification =
            match tokio::time::timeout(deadline, self.classifier.classify(image)).await {
                Ok(Ok(classification)) => classification,
                Ok(Err(err)) => {
                    tracing::warn!("Classifier failed: {err}");
                    self.discard(&image_ref).await;
                    return Err(err);
                }
                Err(_) => {
                    self.discard(&image_ref).await;
                    return Err(WeighError::UpstreamTimeout(format!(
                        "classifier did not answer within {}s",
                        self.settings.classify_timeout_secs
                    )));
                }
            };

        let (label, confidence) = match classification {
            Classification::NoDetection => {
                return self.reject(image_ref, RejectReason::NoDetection).await;
            }
            Classification::Detected { label, confidence } => (label, confidence),
        };

        if !self.settings.recognizes(&label) {
            tracing::info!("Rejecting unrecognized label '{label}'");
            return self
                .reject(image_ref, RejectReason::UnrecognizedLabel)
                .await;
        }
        if let Some(floor) = self.settings.min_confidence {
            if confidence < floor {
                tracing::info!(
                    "Rejecting '{label}' at confidence {confidence:.2} (floor {floor:.2})"
                );
                return self.reject(image_ref, RejectReason::LowConfidence).await;
            }
        }

        let image_url = self.images.url(&image_ref);

        if let Some(session_ref) = session_ref {
            let kind = SessionKind::from_ref(session_ref);
            let attach = self
                .store
                .set_identification(
                    kind,
                    session_ref,
                    Identification {
                        vegetable_type: label.clone(),
                        confidence,
                        image_url: image_url.clone(),
                    },
                )
                .await;
            if let Err(err) = attach {
                // No partial success: a failed attach must not strand the image
                self.discard(&image_ref).await;
                return Err(err);
            }
            tracing::info!("Identified '{label}' ({confidence:.2}) on session {session_ref}");
        } else {
            tracing::info!("Identified '{label}' ({confidence:.2}), no session referenced");
        }

        Ok(IdentificationOutcome::Accepted {
            label,
            confidence,
            image_url,
        })
    }

    async fn reject(
        &self,
        image_ref: ImageRef,
        reason: RejectReason,
    ) -> Result<IdentificationOutcome> {
        self.discard(&image_ref).await;
        Ok(IdentificationOutcome::Rejected { reason })
    }

    async fn discard(&self, image_ref: &ImageRef) {
        if let Err(err) = self.images.delete(image_ref).await {
            // Surfacing a cleanup failure would mask the primary outcome
            tracing::warn!("Failed to delete staged image {image_ref}: {err}");
        }
    }
}

/// Validates that the uploaded filename carries a recognized image
/// extension, returning it lowercased.
fn validated_extension(filename: &str) -> Result<String> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| WeighError::invalid_argument("file has no extension"))?;

    let mime = mime_guess::from_ext(&extension).first_or_octet_stream();
    match mime.essence_str() {
        "image/png" | "image/jpeg" => Ok(extension),
        other => Err(WeighError::invalid_argument(format!(
            "unsupported upload type '{other}'; allowed extensions: png, jpg, jpeg"
        ))),
    }
}
