//! Consumer-facing TCP server
//!
//! Consumers connect to a plain TCP port and receive one event line per
//! captured frame. The server never reads from them.

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::ConsumerServer;
