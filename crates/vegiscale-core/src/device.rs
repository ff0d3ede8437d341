//! IoT device status model and registry trait.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields a device may report about itself. All fields are optional; the
/// registry merges present fields over the stored record and leaves absent
/// ones untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatusReport {
    #[serde(default)]
    pub battery_level: Option<f64>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// The stored status record of a scale device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_id: String,
    #[serde(default)]
    pub battery_level: Option<f64>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Stamped by the backend on every report
    pub last_seen: DateTime<Utc>,
}

impl DeviceStatus {
    /// Merges a report over this record, stamping `last_seen`.
    pub fn merge(&mut self, report: DeviceStatusReport, last_seen: DateTime<Utc>) {
        if report.battery_level.is_some() {
            self.battery_level = report.battery_level;
        }
        if report.firmware_version.is_some() {
            self.firmware_version = report.firmware_version;
        }
        if report.note.is_some() {
            self.note = report.note;
        }
        self.last_seen = last_seen;
    }
}

/// An abstract registry of scale devices and their last reported status.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Merge-upserts a status report for the device, stamping `last_seen`.
    ///
    /// Returns the resulting record.
    async fn upsert_status(
        &self,
        device_id: &str,
        report: DeviceStatusReport,
        last_seen: DateTime<Utc>,
    ) -> Result<DeviceStatus>;

    /// Returns the stored status of a device, if it ever reported.
    async fn get(&self, device_id: &str) -> Result<Option<DeviceStatus>>;
}
