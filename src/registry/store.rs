//! Client registry implementation
//!
//! The live set of consumers is an immutable [`ClientSet`] behind an
//! [`ArcSwap`]. Membership changes build a new set and swap it in with
//! read-copy-update, so readers never see a half-built set and a concurrent
//! add and prune cannot lose each other's update.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::net::{TcpListener, TcpStream};

use super::config::RegistryConfig;
use super::connection::ClientConnection;
use super::error::RegistryError;
use crate::error::Result;
use crate::stats::RegistryStats;

/// Immutable, versioned snapshot of connected consumers
#[derive(Debug, Default)]
pub struct ClientSet {
    version: u64,
    clients: Vec<Arc<ClientConnection>>,
}

impl ClientSet {
    /// Monotonic version, bumped on every membership change
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClientConnection>> {
        self.clients.iter()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.clients.iter().any(|c| c.id() == id)
    }

    /// New set with one more connection
    fn with_client(&self, client: Arc<ClientConnection>) -> Self {
        let mut clients = Vec::with_capacity(self.clients.len() + 1);
        clients.extend(self.clients.iter().cloned());
        clients.push(client);
        Self {
            version: self.version + 1,
            clients,
        }
    }

    /// New set without the given connection IDs
    fn without(&self, dead: &HashSet<u64>) -> Self {
        Self {
            version: self.version + 1,
            clients: self
                .clients
                .iter()
                .filter(|c| !dead.contains(&c.id()))
                .cloned()
                .collect(),
        }
    }
}

/// Registry of connected consumers
pub struct ClientRegistry {
    /// Current live set
    clients: ArcSwap<ClientSet>,

    /// Configuration
    config: RegistryConfig,

    next_client_id: AtomicU64,
    total_accepted: AtomicU64,
    total_pruned: AtomicU64,
}

impl ClientRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            clients: ArcSwap::from_pointee(ClientSet::default()),
            config,
            next_client_id: AtomicU64::new(1),
            total_accepted: AtomicU64::new(0),
            total_pruned: AtomicU64::new(0),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Wait for the next inbound connection and add it to the live set
    ///
    /// Listener errors are returned as-is. A connection refused because of
    /// the client limit is closed and reported as a registry error.
    pub async fn accept(&self, listener: &TcpListener) -> Result<Arc<ClientConnection>> {
        let (socket, peer_addr) = listener.accept().await?;
        Ok(self.register(socket, peer_addr)?)
    }

    /// Add an already accepted socket to the live set
    pub fn register(
        &self,
        socket: TcpStream,
        peer_addr: SocketAddr,
    ) -> std::result::Result<Arc<ClientConnection>, RegistryError> {
        let max = self.config.max_clients;
        if max > 0 && self.clients.load().len() >= max {
            return Err(RegistryError::ClientLimitReached(max));
        }

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::debug!(peer = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let client = Arc::new(ClientConnection::new(id, socket, peer_addr));

        let previous = self
            .clients
            .rcu(|current| current.with_client(Arc::clone(&client)));
        self.total_accepted.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            client_id = id,
            peer = %peer_addr,
            clients = previous.len() + 1,
            "New client"
        );

        Ok(client)
    }

    /// Current live set; lock-free and constant time
    pub fn current_clients(&self) -> Arc<ClientSet> {
        self.clients.load_full()
    }

    /// Drop every connection of `snapshot` that fails a liveness probe
    ///
    /// Returns the set installed afterwards. Connections added after
    /// `snapshot` was taken are kept.
    pub fn prune(&self, snapshot: &ClientSet) -> Arc<ClientSet> {
        let dead: HashSet<u64> = snapshot
            .iter()
            .filter_map(|client| {
                let liveness = client.probe();
                if liveness.is_alive() {
                    None
                } else {
                    tracing::info!(
                        client_id = client.id(),
                        peer = %client.peer_addr(),
                        liveness = ?liveness,
                        connected_secs = client.age().as_secs(),
                        "Closed client"
                    );
                    Some(client.id())
                }
            })
            .collect();

        if dead.is_empty() {
            return self.current_clients();
        }

        self.clients.rcu(|current| current.without(&dead));
        self.total_pruned
            .fetch_add(dead.len() as u64, Ordering::Relaxed);

        self.current_clients()
    }

    /// Snapshot of registry counters
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            connected: self.clients.load().len(),
            total_accepted: self.total_accepted.load(Ordering::Relaxed),
            total_pruned: self.total_pruned.load(Ordering::Relaxed),
        }
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
