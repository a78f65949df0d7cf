//! Registry configuration

/// Client registry options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum concurrent consumers (0 = unlimited)
    pub max_clients: usize,

    /// Enable TCP_NODELAY on accepted sockets
    pub tcp_nodelay: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_clients: 0,
            tcp_nodelay: true, // Lines are small and latency matters
        }
    }
}

impl RegistryConfig {
    /// Set maximum clients
    pub fn max_clients(mut self, max: usize) -> Self {
        self.max_clients = max;
        self
    }

    /// Set TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}
