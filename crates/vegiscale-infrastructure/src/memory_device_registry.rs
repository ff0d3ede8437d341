//! In-memory DeviceRegistry implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use vegiscale_core::device::{DeviceRegistry, DeviceStatus, DeviceStatusReport};
use vegiscale_core::error::Result;

/// In-memory device status registry.
#[derive(Default)]
pub struct MemoryDeviceRegistry {
    devices: Mutex<HashMap<String, DeviceStatus>>,
}

impl MemoryDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRegistry for MemoryDeviceRegistry {
    async fn upsert_status(
        &self,
        device_id: &str,
        report: DeviceStatusReport,
        last_seen: DateTime<Utc>,
    ) -> Result<DeviceStatus> {
        let mut devices = self.devices.lock().expect("device registry lock poisoned");
        let status = devices
            .entry(device_id.to_string())
            .or_insert_with(|| DeviceStatus {
                device_id: device_id.to_string(),
                battery_level: None,
                firmware_version: None,
                note: None,
                last_seen,
            });
        status.merge(report, last_seen);
        Ok(status.clone())
    }

    async fn get(&self, device_id: &str) -> Result<Option<DeviceStatus>> {
        let devices = self.devices.lock().expect("device registry lock poisoned");
        Ok(devices.get(device_id).cloned())
    }
}
