//! Registry error types
//!
//! Error types for client registry operations.

use thiserror::Error;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Live set already holds the configured maximum of clients
    #[error("Client limit reached: {0} connected")]
    ClientLimitReached(usize),
}
