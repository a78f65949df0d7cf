//! Capture pipeline
//!
//! This module provides:
//! - The unsynced/synced state machine ([`SyncState`])
//! - The capture loop driving sync, capture and broadcast ([`CaptureLoop`])

pub mod config;
pub mod driver;
pub mod state;

pub use config::CaptureConfig;
pub use driver::{CaptureLoop, TickOutcome};
pub use state::{SyncPhase, SyncState};
