//! Consumer registry and broadcast
//!
//! The registry owns every connected consumer. The acceptor adds connections,
//! the capture loop prunes dead ones right before each broadcast and hands the
//! pruned set to the [`Broadcaster`].
//!
//! # Architecture
//!
//! ```text
//!     [Acceptor task]                         [Capture loop]
//!     registry.accept()                       registry.prune(snapshot)
//!           │                                          │
//!           ▼                                          ▼
//!     ┌─────────────────────────────────────────────────────┐
//!     │  ArcSwap<ClientSet { version, Vec<Arc<Client>> }>   │
//!     └─────────────────────────────────────────────────────┘
//!                                                      │
//!                                      broadcaster.broadcast(line, set)
//!                                                      │
//!                       ┌──────────────────────────────┼──────────────┐
//!                       ▼                              ▼              ▼
//!                 [delivery task]               [delivery task]  [delivery task]
//!                  write_all ──► TCP             write_all ──► TCP   ...
//! ```
//!
//! # Zero-Copy Fan-out
//!
//! The line is built once as `bytes::Bytes`; every delivery task holds a
//! reference-counted clone of the same allocation.

pub mod broadcast;
pub mod config;
pub mod connection;
pub mod error;
pub mod store;

pub use broadcast::Broadcaster;
pub use config::RegistryConfig;
pub use connection::{ClientConnection, Liveness};
pub use error::RegistryError;
pub use store::{ClientRegistry, ClientSet};
