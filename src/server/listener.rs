//! Consumer listener
//!
//! Binds the consumer port and runs the accept loop that feeds the client
//! registry. Binding is the only fatal failure in the service.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::registry::{ClientRegistry, RegistryError};
use crate::server::config::ServerConfig;

/// Listening consumer server
pub struct ConsumerServer {
    config: ServerConfig,
    listener: TcpListener,
    registry: Arc<ClientRegistry>,
}

impl ConsumerServer {
    /// Bind the listening socket
    pub async fn bind(config: ServerConfig, registry: Arc<ClientRegistry>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "Consumer server listening");

        Ok(Self {
            config,
            listener,
            registry,
        })
    }

    /// Get a reference to the client registry
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Actual bound address (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept consumers until `shutdown` is cancelled, then close the socket
    pub async fn run_until(self, shutdown: CancellationToken) {
        loop {
            let result = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
                result = self.registry.accept(&self.listener) => result,
            };

            match result {
                Ok(_) => {}
                Err(Error::Registry(RegistryError::ClientLimitReached(max))) => {
                    tracing::warn!(max_clients = max, "Connection rejected: limit reached");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.accept_backoff) => {}
                    }
                }
            }
        }

        tracing::debug!("Consumer listener closed");
    }

    /// Run the accept loop on its own task
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run_until(shutdown))
    }
}
