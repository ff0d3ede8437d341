//! Configuration types for the weighing backend.
//!
//! Plain serde structs with defaults; loading from a TOML file lives in the
//! infrastructure crate.

use serde::{Deserialize, Serialize};

/// Settings gating acceptance of classification results.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IdentificationSettings {
    /// Produce labels accepted for this deployment; anything else is
    /// rejected as `unrecognized_label`
    #[serde(default = "default_recognized_labels")]
    pub recognized_labels: Vec<String>,
    /// Optional confidence floor. `None` accepts any confidence for a
    /// recognized label; set a value to require a minimum.
    #[serde(default)]
    pub min_confidence: Option<f64>,
    /// Deadline for a single classifier call, in seconds
    #[serde(default = "default_classify_timeout_secs")]
    pub classify_timeout_secs: u64,
}

impl IdentificationSettings {
    /// Returns true if the label is in the recognized produce set.
    pub fn recognizes(&self, label: &str) -> bool {
        self.recognized_labels.iter().any(|l| l == label)
    }
}

impl Default for IdentificationSettings {
    fn default() -> Self {
        Self {
            recognized_labels: default_recognized_labels(),
            min_confidence: None,
            classify_timeout_secs: default_classify_timeout_secs(),
        }
    }
}

fn default_recognized_labels() -> Vec<String> {
    ["bayam merah", "bayam hijau", "kangkung", "pakcoy", "selada"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_classify_timeout_secs() -> u64 {
    10
}

/// Settings for the rompes (single-shot) workflow.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RompesSettings {
    /// Produce varieties a rompes session may declare at initiation
    #[serde(default = "default_recognized_varieties")]
    pub recognized_varieties: Vec<String>,
}

impl RompesSettings {
    /// Returns true if the variety may be declared at initiation.
    pub fn recognizes(&self, variety: &str) -> bool {
        self.recognized_varieties.iter().any(|v| v == variety)
    }
}

impl Default for RompesSettings {
    fn default() -> Self {
        Self {
            recognized_varieties: default_recognized_varieties(),
        }
    }
}

fn default_recognized_varieties() -> Vec<String> {
    ["bayam merah", "bayam hijau", "kangkung", "pakcoy"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Root configuration for the backend.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct VegiscaleConfig {
    #[serde(default)]
    pub identification: IdentificationSettings,
    #[serde(default)]
    pub rompes: RompesSettings,
}
