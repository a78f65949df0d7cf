//! # qrcam
//!
//! Keeps a networked camera configured, captures frames on a fixed cadence,
//! decodes QR codes from them and streams one text line per frame to every
//! connected TCP consumer.
//!
//! ```text
//!  Camera (HTTP) ──► CaptureLoop ──► CameraEvent ──► Broadcaster ──► consumers (TCP)
//!                        │                               ▲
//!                 DeviceSyncController            ClientRegistry ◄── ConsumerServer
//! ```
//!
//! Two long-lived activities share state only through the registry's
//! atomically swapped client set: the accept loop ([`ConsumerServer`]) and the
//! capture loop ([`CaptureLoop`]).

pub mod capture;
pub mod config;
pub mod detect;
pub mod device;
pub mod error;
pub mod event;
pub mod registry;
pub mod server;
pub mod stats;

pub use capture::{CaptureConfig, CaptureLoop};
pub use config::{ConfigSource, ServiceConfig};
pub use detect::{CodeDetector, QrDetector};
pub use device::{CameraDevice, DesiredConfig, DeviceSyncController, FrameSize, HttpCamera};
pub use error::{Error, Result};
pub use event::CameraEvent;
pub use registry::{Broadcaster, ClientRegistry};
pub use server::{ConsumerServer, ServerConfig};
