//! HTTP client for the vegetable-identification model service.

use async_trait::async_trait;
use serde::Deserialize;
use vegiscale_core::classifier::{Classification, ClassifierGateway};
use vegiscale_core::error::{Result, WeighError};

/// Response body of the model service.
///
/// A detection carries `vegetable_type` and `confidence`; a miss is either
/// `status: "no_detection"` or an absent label.
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    vegetable_type: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Classifier gateway backed by the deployed model service.
///
/// The identification service bounds every call with its own deadline, so
/// no request timeout is configured here beyond reqwest defaults.
pub struct HttpClassifierGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifierGateway {
    /// Creates a gateway posting to the given classify endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ClassifierGateway for HttpClassifierGateway {
    async fn classify(&self, image: &[u8]) -> Result<Classification> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| WeighError::upstream(format!("classifier request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(WeighError::upstream(format!(
                "classifier answered {}",
                response.status()
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| WeighError::upstream(format!("malformed classifier response: {e}")))?;

        if body.status.as_deref() == Some("no_detection") {
            return Ok(Classification::NoDetection);
        }

        match (body.vegetable_type, body.confidence) {
            (Some(label), Some(confidence)) => Ok(Classification::Detected { label, confidence }),
            (None, _) => Ok(Classification::NoDetection),
            (Some(label), None) => Err(WeighError::upstream(format!(
                "classifier returned label '{label}' without confidence"
            ))),
        }
    }
}
