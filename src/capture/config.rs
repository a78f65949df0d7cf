//! Capture loop configuration

use std::time::Duration;

/// Capture loop timing
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Pause between successful captures
    pub capture_interval: Duration,

    /// How long a successful sync stays valid
    pub sync_interval: Duration,

    /// Pause after a failed sync or capture before the next attempt
    pub resync_delay: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capture_interval: Duration::from_millis(800),
            sync_interval: Duration::from_secs(30),
            resync_delay: Duration::from_secs(1),
        }
    }
}

impl CaptureConfig {
    /// Set capture interval
    pub fn capture_interval(mut self, interval: Duration) -> Self {
        self.capture_interval = interval;
        self
    }

    /// Set sync interval
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Set delay after a failed sync or capture
    pub fn resync_delay(mut self, delay: Duration) -> Self {
        self.resync_delay = delay;
        self
    }
}
