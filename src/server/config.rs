//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::registry::broadcast::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_WRITE_TIMEOUT};
use crate::registry::{Broadcaster, RegistryConfig};

/// Default consumer port
pub const DEFAULT_PORT: u16 = 8100;

/// Consumer-facing server options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent consumers (0 = unlimited)
    pub max_clients: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Bound on a single line delivery to one consumer
    pub write_timeout: Duration,

    /// Deliveries allowed in flight across all consumers
    pub max_in_flight_writes: usize,

    /// Pause after a failed accept (e.g. out of file descriptors)
    pub accept_backoff: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_clients: 0, // Unlimited
            tcp_nodelay: true,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_in_flight_writes: DEFAULT_MAX_IN_FLIGHT,
            accept_backoff: Duration::from_millis(100),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum clients
    pub fn max_clients(mut self, max: usize) -> Self {
        self.max_clients = max;
        self
    }

    /// Set write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set delivery pool size (at least 1)
    pub fn max_in_flight_writes(mut self, max: usize) -> Self {
        self.max_in_flight_writes = max.max(1);
        self
    }

    /// Registry options derived from this config
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::default()
            .max_clients(self.max_clients)
            .tcp_nodelay(self.tcp_nodelay)
    }

    /// Broadcaster sized from this config
    pub fn broadcaster(&self) -> Broadcaster {
        Broadcaster::new(self.max_in_flight_writes, self.write_timeout)
    }
}
