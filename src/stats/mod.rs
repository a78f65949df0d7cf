//! Statistics and metrics

pub mod metrics;

pub use metrics::{BroadcastStats, CaptureStats, RegistryStats};
