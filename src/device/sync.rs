//! Device configuration reconciliation
//!
//! Compares the camera's reported configuration with the desired one and
//! issues a control call for each field that differs. There is no retry in
//! here; the capture loop decides when to try again.

use std::sync::Arc;

use super::{CameraDevice, FrameSize, VAR_FRAME_SIZE, VAR_LED_INTENSITY};
use crate::error::Result;

/// Camera settings the service keeps enforced for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredConfig {
    /// LED intensity (0..=255)
    pub led_intensity: u8,
    /// Frame size
    pub frame_size: FrameSize,
}

impl Default for DesiredConfig {
    fn default() -> Self {
        Self {
            led_intensity: 255,
            frame_size: FrameSize::default(),
        }
    }
}

/// What a successful sync had to change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub led_corrected: bool,
    pub frame_size_corrected: bool,
}

impl SyncReport {
    /// Camera already matched, no control call was issued
    pub fn was_in_sync(&self) -> bool {
        !self.led_corrected && !self.frame_size_corrected
    }
}

/// Reconciles a camera with a [`DesiredConfig`]
pub struct DeviceSyncController<D> {
    device: Arc<D>,
    desired: DesiredConfig,
}

impl<D: CameraDevice> DeviceSyncController<D> {
    pub fn new(device: Arc<D>, desired: DesiredConfig) -> Self {
        Self { device, desired }
    }

    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    pub fn desired(&self) -> &DesiredConfig {
        &self.desired
    }

    /// Bring the camera in line with the desired configuration
    ///
    /// Succeeds if the camera already matched or every corrective control
    /// call was accepted. Stops at the first failure.
    pub async fn sync(&self) -> Result<SyncReport> {
        let status = self.device.status().await?;
        let mut report = SyncReport::default();

        let led = i64::from(self.desired.led_intensity);
        if status.led_intensity != led {
            tracing::debug!(
                reported = status.led_intensity,
                desired = led,
                "Correcting LED intensity"
            );
            self.device.control(VAR_LED_INTENSITY, led).await?;
            report.led_corrected = true;
        }

        let frame_size = self.desired.frame_size.value();
        if status.framesize != frame_size {
            tracing::debug!(
                reported = status.framesize,
                desired = frame_size,
                frame_size = %self.desired.frame_size,
                "Correcting frame size"
            );
            self.device.control(VAR_FRAME_SIZE, frame_size).await?;
            report.frame_size_corrected = true;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::*;
    use crate::device::DeviceStatus;
    use crate::error::Error;

    /// Camera double recording every control call
    struct FakeCamera {
        status: Option<DeviceStatus>,
        reject: Option<&'static str>,
        controls: Mutex<Vec<(&'static str, i64)>>,
    }

    impl FakeCamera {
        fn reporting(led_intensity: i64, framesize: i64) -> Self {
            Self {
                status: Some(DeviceStatus {
                    led_intensity,
                    framesize,
                }),
                reject: None,
                controls: Mutex::new(Vec::new()),
            }
        }

        fn controls(&self) -> Vec<(&'static str, i64)> {
            self.controls.lock().unwrap().clone()
        }
    }

    impl CameraDevice for FakeCamera {
        async fn status(&self) -> Result<DeviceStatus> {
            self.status.ok_or(Error::UnexpectedStatus {
                endpoint: "status",
                status: 503,
            })
        }

        async fn control(&self, var: &'static str, value: i64) -> Result<()> {
            self.controls.lock().unwrap().push((var, value));
            if self.reject == Some(var) {
                return Err(Error::ControlRejected { var, status: 500 });
            }
            Ok(())
        }

        async fn capture(&self) -> Result<Bytes> {
            Ok(Bytes::new())
        }
    }

    fn desired() -> DesiredConfig {
        DesiredConfig {
            led_intensity: 255,
            frame_size: FrameSize::Qvga,
        }
    }

    #[tokio::test]
    async fn test_led_mismatch_issues_one_control() {
        let camera = Arc::new(FakeCamera::reporting(200, FrameSize::Qvga.value()));
        let controller = DeviceSyncController::new(Arc::clone(&camera), desired());

        let report = controller.sync().await.unwrap();

        assert!(report.led_corrected);
        assert!(!report.frame_size_corrected);
        assert_eq!(camera.controls(), vec![(VAR_LED_INTENSITY, 255)]);
    }

    #[tokio::test]
    async fn test_in_sync_issues_nothing() {
        let camera = Arc::new(FakeCamera::reporting(255, 5));
        let controller = DeviceSyncController::new(Arc::clone(&camera), desired());

        let report = controller.sync().await.unwrap();

        assert!(report.was_in_sync());
        assert!(camera.controls().is_empty());
    }

    #[tokio::test]
    async fn test_both_fields_corrected_in_order() {
        let camera = Arc::new(FakeCamera::reporting(0, 8));
        let controller = DeviceSyncController::new(Arc::clone(&camera), desired());

        controller.sync().await.unwrap();

        assert_eq!(
            camera.controls(),
            vec![(VAR_LED_INTENSITY, 255), (VAR_FRAME_SIZE, 5)]
        );
    }

    #[tokio::test]
    async fn test_rejected_led_stops_sync() {
        let mut camera = FakeCamera::reporting(10, 0);
        camera.reject = Some(VAR_LED_INTENSITY);
        let camera = Arc::new(camera);
        let controller = DeviceSyncController::new(Arc::clone(&camera), desired());

        let result = controller.sync().await;

        assert!(matches!(result, Err(Error::ControlRejected { .. })));
        // Frame size never attempted
        assert_eq!(camera.controls().len(), 1);
        // Desired config untouched
        assert_eq!(*controller.desired(), desired());
    }

    #[tokio::test]
    async fn test_status_failure_is_device_error() {
        let mut camera = FakeCamera::reporting(0, 0);
        camera.status = None;
        let controller = DeviceSyncController::new(Arc::new(camera), desired());

        let err = controller.sync().await.unwrap_err();
        assert!(err.is_device_error());
    }
}
