//! Camera device access
//!
//! This module provides:
//! - The [`CameraDevice`] seam used by the sync controller and capture loop
//! - [`HttpCamera`], the implementation speaking the camera's HTTP API
//! - [`DeviceSyncController`], which reconciles reported and desired settings
//! - [`FrameSize`], the camera's frame size options

pub mod frame_size;
pub mod http;
pub mod sync;

use std::future::Future;

use bytes::Bytes;
use serde::Deserialize;

use crate::error::Result;

pub use frame_size::FrameSize;
pub use http::HttpCamera;
pub use sync::{DesiredConfig, DeviceSyncController, SyncReport};

/// Control variable for the LED intensity
pub const VAR_LED_INTENSITY: &str = "led_intensity";

/// Control variable for the frame size
pub const VAR_FRAME_SIZE: &str = "framesize";

/// Configuration reported by `GET /status`
///
/// Only the fields this service reconciles are read. Missing fields read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DeviceStatus {
    pub led_intensity: i64,
    pub framesize: i64,
}

/// Operations the service needs from a camera
pub trait CameraDevice: Send + Sync + 'static {
    /// Fetch the reported configuration
    fn status(&self) -> impl Future<Output = Result<DeviceStatus>> + Send;

    /// Set one control variable; succeeds only if the camera accepted it
    fn control(&self, var: &'static str, value: i64) -> impl Future<Output = Result<()>> + Send;

    /// Fetch one encoded frame
    fn capture(&self) -> impl Future<Output = Result<Bytes>> + Send;
}
