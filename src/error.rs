//! Error types
//!
//! Device and consumer errors are absorbed by the component that raised them
//! and turned into state transitions. Only configuration and listener setup
//! failures are expected to reach `main`.

use std::time::Duration;

use thiserror::Error;

use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate error type
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or timeout talking to the camera
    #[error("camera unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The camera answered a control call with something other than 200
    #[error("camera rejected {var}: HTTP {status}")]
    ControlRejected { var: &'static str, status: u16 },

    /// The camera answered a status or capture call with a non-success code
    #[error("unexpected HTTP {status} from {endpoint}")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },

    /// Captured bytes are not a decodable image
    #[error("frame decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// The detector failed on a decoded frame
    #[error("code detection failed: {0}")]
    Detect(String),

    /// Socket level failure (listener bind, accept)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Client registry refused an operation
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration values are inconsistent
    #[error("invalid config: {0}")]
    Config(String),

    /// A bounded operation did not finish in time
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Whether the error came from the camera device (reachability or protocol)
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::ControlRejected { .. } | Error::UnexpectedStatus { .. }
        )
    }
}
