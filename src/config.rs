//! Service configuration loaded from a TOML file
//!
//! Keys use camelCase, durations are milliseconds:
//!
//! ```toml
//! cameraUrl = "http://192.168.4.1"
//! ledIntensity = 255
//! captureInterval = 800
//! syncInterval = 30000
//! frameSize = "QVGA"
//! port = 8100
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::CaptureConfig;
use crate::device::{DesiredConfig, FrameSize};
use crate::error::{Error, Result};
use crate::server::ServerConfig;

/// Where the effective configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the given file
    File,
    /// File absent, built-in defaults in effect
    Defaults,
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Camera base URL
    pub camera_url: String,
    /// Desired LED intensity
    pub led_intensity: u8,
    /// Milliseconds between captures
    pub capture_interval: u64,
    /// Milliseconds a successful sync stays valid
    pub sync_interval: u64,
    /// Desired frame size, by name (`QVGA`), dimensions (`320x240`) or control value (`5`)
    pub frame_size: FrameSize,
    /// Consumer port
    pub port: u16,
    /// Interface to listen on
    pub bind_address: IpAddr,
    /// Timeout for every camera HTTP call, in milliseconds
    pub device_timeout: u64,
    /// Milliseconds to wait after a failed sync or capture
    pub resync_delay: u64,
    /// Timeout for one consumer delivery, in milliseconds
    pub write_timeout: u64,
    /// Maximum concurrent consumers (0 = unlimited)
    pub max_clients: usize,
    /// Deliveries allowed in flight at once
    pub max_in_flight_writes: usize,
    /// Default log level when RUST_LOG is not set
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            camera_url: "http://192.168.4.1".into(),
            led_intensity: 255,
            capture_interval: 800,
            sync_interval: 30_000,
            frame_size: FrameSize::default(),
            port: 8100,
            bind_address: IpAddr::from([0, 0, 0, 0]),
            device_timeout: 5_000,
            resync_delay: 1_000,
            write_timeout: 2_000,
            max_clients: 0,
            max_in_flight_writes: 64,
            log_level: "info".into(),
        }
    }
}

impl ServiceConfig {
    /// Load from `path`, falling back to defaults if the file does not exist
    ///
    /// Runs before logging is installed, so the caller reports the source.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }
        let text = std::fs::read_to_string(path)?;
        Ok((Self::from_toml(&text)?, ConfigSource::File))
    }

    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.camera_url)
            .map_err(|e| Error::Config(format!("cameraUrl {:?}: {e}", self.camera_url)))?;

        for (name, value) in [
            ("captureInterval", self.capture_interval),
            ("syncInterval", self.sync_interval),
            ("deviceTimeout", self.device_timeout),
            ("writeTimeout", self.write_timeout),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be greater than zero")));
            }
        }

        if self.max_in_flight_writes == 0 {
            return Err(Error::Config("maxInFlightWrites must be at least 1".into()));
        }
        Ok(())
    }

    /// Settings enforced on the camera
    pub fn desired(&self) -> DesiredConfig {
        DesiredConfig {
            led_intensity: self.led_intensity,
            frame_size: self.frame_size,
        }
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_millis(self.device_timeout)
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig::default()
            .capture_interval(Duration::from_millis(self.capture_interval))
            .sync_interval(Duration::from_millis(self.sync_interval))
            .resync_delay(Duration::from_millis(self.resync_delay))
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::with_addr(SocketAddr::new(self.bind_address, self.port))
            .max_clients(self.max_clients)
            .write_timeout(Duration::from_millis(self.write_timeout))
            .max_in_flight_writes(self.max_in_flight_writes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();

        assert_eq!(config.led_intensity, 255);
        assert_eq!(config.capture_interval, 800);
        assert_eq!(config.sync_interval, 30_000);
        assert_eq!(config.port, 8100);
        assert_eq!(config.frame_size, FrameSize::Qvga);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServiceConfig::from_toml(
            r#"
            cameraUrl = "http://10.0.0.5"
            ledIntensity = 10
            frameSize = "640x480"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera_url, "http://10.0.0.5");
        assert_eq!(config.led_intensity, 10);
        assert_eq!(config.frame_size, FrameSize::Vga);
        assert_eq!(config.capture_interval, 800);
        assert_eq!(config.port, 8100);
    }

    #[test]
    fn test_missing_file_reports_defaults() {
        let path = std::env::temp_dir().join("qrcam-test-does-not-exist.toml");
        let (config, source) = ServiceConfig::load(&path).unwrap();

        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_existing_file_reports_file() {
        let path = std::env::temp_dir().join(format!("qrcam-test-{}.toml", std::process::id()));
        std::fs::write(&path, "port = 9100\n").unwrap();

        let result = ServiceConfig::load(&path);
        std::fs::remove_file(&path).unwrap();

        let (config, source) = result.unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_frame_size_as_control_value() {
        let config = ServiceConfig::from_toml("frameSize = 5").unwrap();
        assert_eq!(config.frame_size, FrameSize::Qvga);

        let config = ServiceConfig::from_toml("frameSize = 8").unwrap();
        assert_eq!(config.frame_size, FrameSize::Vga);

        assert!(matches!(ServiceConfig::from_toml("frameSize = 42"), Err(Error::Toml(_))));
    }

    #[test]
    fn test_unknown_frame_size_rejected() {
        let result = ServiceConfig::from_toml(r#"frameSize = "7x7""#);
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_led_out_of_range_rejected() {
        assert!(ServiceConfig::from_toml("ledIntensity = 300").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = ServiceConfig {
            capture_interval: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ServiceConfig {
            camera_url: "camera.local".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_configs() {
        let config = ServiceConfig {
            port: 9000,
            capture_interval: 100,
            max_clients: 4,
            ..Default::default()
        };

        let server = config.server_config();
        assert_eq!(server.bind_addr.port(), 9000);
        assert_eq!(server.max_clients, 4);

        let capture = config.capture_config();
        assert_eq!(capture.capture_interval, Duration::from_millis(100));
        assert_eq!(capture.sync_interval, Duration::from_secs(30));

        assert_eq!(config.desired().frame_size, FrameSize::Qvga);
    }

    #[test]
    fn test_serialized_defaults_roundtrip() {
        let text = toml::to_string_pretty(&ServiceConfig::default()).unwrap();
        assert!(text.contains("frameSize = \"QVGA\""));
        assert_eq!(ServiceConfig::from_toml(&text).unwrap(), ServiceConfig::default());
    }
}
