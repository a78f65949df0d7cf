//! Fire-and-forget line delivery
//!
//! Each connection gets its own delivery task. Tasks draw from a shared
//! semaphore so that stalled consumers cannot grow the task count without
//! bound. `broadcast` itself never awaits a delivery.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;

use super::store::ClientSet;
use crate::error::Error;
use crate::stats::BroadcastStats;

/// Default number of deliveries allowed in flight at once
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Default bound on a single delivery
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Delivers lines to a set of consumers
#[derive(Debug, Clone)]
pub struct Broadcaster {
    permits: Arc<Semaphore>,
    write_timeout: Duration,
}

impl Broadcaster {
    pub fn new(max_in_flight: usize, write_timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            write_timeout,
        }
    }

    /// Deliveries currently allowed to start
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Send `line` plus a newline to every client of `clients`
    ///
    /// Returns as soon as deliveries are dispatched. A client whose previous
    /// delivery is still pending is skipped for this line; once the pool is
    /// exhausted the line is dropped for the remaining clients. A failed or
    /// timed out delivery marks its connection for the next prune.
    pub fn broadcast(&self, line: &str, clients: &ClientSet) -> BroadcastStats {
        let mut stats = BroadcastStats::default();
        if clients.is_empty() {
            return stats;
        }

        let mut payload = Vec::with_capacity(line.len() + 1);
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');
        let payload = Bytes::from(payload);

        for client in clients.iter() {
            if client.is_failed() {
                stats.skipped_failed += 1;
                continue;
            }

            let Some(mut writer) = client.try_writer() else {
                tracing::debug!(peer = %client.peer_addr(), "Consumer busy, line skipped");
                stats.skipped_busy += 1;
                continue;
            };

            let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                tracing::debug!(peer = %client.peer_addr(), "Delivery pool exhausted, line dropped");
                stats.skipped_saturated += 1;
                continue;
            };

            let client = Arc::clone(client);
            let payload = payload.clone();
            let write_timeout = self.write_timeout;

            tokio::spawn(async move {
                let _permit = permit;
                let delivery = async {
                    writer.write_all(&payload).await?;
                    writer.flush().await
                };

                let result = match tokio::time::timeout(write_timeout, delivery).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(Error::Io(e)),
                    Err(_) => Err(Error::Timeout(write_timeout)),
                };

                if let Err(e) = result {
                    tracing::debug!(
                        client_id = client.id(),
                        peer = %client.peer_addr(),
                        error = %e,
                        "Delivery failed"
                    );
                    client.mark_failed();
                }
            });

            stats.dispatched += 1;
        }

        stats
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IN_FLIGHT, DEFAULT_WRITE_TIMEOUT)
    }
}
