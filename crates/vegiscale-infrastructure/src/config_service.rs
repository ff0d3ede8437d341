//! Configuration loading.
//!
//! Reads the backend TOML configuration file, falling back to defaults when
//! the file is absent so development setups need no config at all.

use anyhow::{Context, Result};
use std::path::Path;
use vegiscale_core::config::VegiscaleConfig;

/// Loads configuration from the given TOML file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed. A
/// missing file yields the default configuration.
pub fn load_config(path: impl AsRef<Path>) -> Result<VegiscaleConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(
            "Config file {} not found, using defaults",
            path.display()
        );
        return Ok(VegiscaleConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: VegiscaleConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
