//! Device status use case.

use chrono::Utc;
use std::sync::Arc;
use vegiscale_core::device::{DeviceRegistry, DeviceStatus, DeviceStatusReport};
use vegiscale_core::error::Result;
use vegiscale_core::identity::DeviceIdentity;

/// Tracks the last reported status of scale devices.
pub struct DeviceService {
    registry: Arc<dyn DeviceRegistry>,
}

impl DeviceService {
    pub fn new(registry: Arc<dyn DeviceRegistry>) -> Self {
        Self { registry }
    }

    /// Merge-upserts a status report from an authenticated device, stamping
    /// `last_seen` on the backend clock.
    pub async fn update_device_status(
        &self,
        device: &DeviceIdentity,
        report: DeviceStatusReport,
    ) -> Result<DeviceStatus> {
        let status = self
            .registry
            .upsert_status(&device.device_id, report, Utc::now())
            .await?;
        tracing::info!("Updated status for device {}", device.device_id);
        Ok(status)
    }

    /// Returns the stored status of a device, if it ever reported.
    pub async fn get_status(&self, device_id: &str) -> Result<Option<DeviceStatus>> {
        self.registry.get(device_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vegiscale_infrastructure::MemoryDeviceRegistry;

    #[tokio::test]
    async fn test_update_stamps_last_seen() {
        let service = DeviceService::new(Arc::new(MemoryDeviceRegistry::new()));
        let device = DeviceIdentity::new("scale-1");

        let before = Utc::now();
        let status = service
            .update_device_status(
                &device,
                DeviceStatusReport {
                    battery_level: Some(0.7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(status.last_seen >= before);
        assert_eq!(status.battery_level, Some(0.7));

        let stored = service.get_status("scale-1").await.unwrap().unwrap();
        assert_eq!(stored, status);
        assert!(service.get_status("scale-2").await.unwrap().is_none());
    }
}
