//! Consumer connection
//!
//! A consumer only ever receives. The read half is kept for liveness probing
//! (peeking, never consuming) and the write half sits behind an async mutex so
//! that at most one delivery is in flight per connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::io::ReadBuf;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Liveness verdict from a non-blocking probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Socket still open
    Alive,
    /// Peer closed its side
    Closed,
    /// Socket error, or an earlier write failed
    Broken,
}

impl Liveness {
    pub fn is_alive(self) -> bool {
        self == Liveness::Alive
    }
}

/// One connected consumer
#[derive(Debug)]
pub struct ClientConnection {
    id: u64,
    peer_addr: SocketAddr,
    reader: OwnedReadHalf,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    failed: AtomicBool,
    connected_at: Instant,
}

impl ClientConnection {
    /// Wrap an accepted socket
    pub fn new(id: u64, socket: TcpStream, peer_addr: SocketAddr) -> Self {
        let (reader, writer) = socket.into_split();
        Self {
            id,
            peer_addr,
            reader,
            writer: Arc::new(Mutex::new(writer)),
            failed: AtomicBool::new(false),
            connected_at: Instant::now(),
        }
    }

    /// Registry-assigned connection ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Time since the connection was accepted
    pub fn age(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }

    /// Record a failed delivery; the next prune drops the connection
    pub fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
    }

    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Take the writer if no other delivery is using it
    pub fn try_writer(&self) -> Option<OwnedMutexGuard<OwnedWriteHalf>> {
        Arc::clone(&self.writer).try_lock_owned().ok()
    }

    /// Check liveness without blocking and without consuming consumer data
    pub fn probe(&self) -> Liveness {
        if self.is_failed() {
            return Liveness::Broken;
        }

        let waker = futures::task::noop_waker_ref();
        let mut cx = Context::from_waker(waker);
        let mut byte = [0u8; 1];
        let mut buf = ReadBuf::new(&mut byte);

        match self.reader.as_ref().poll_peek(&mut cx, &mut buf) {
            Poll::Pending => Liveness::Alive,
            Poll::Ready(Ok(0)) => Liveness::Closed,
            // Consumer sent something; we never read it, but the socket is open
            Poll::Ready(Ok(_)) => Liveness::Alive,
            Poll::Ready(Err(e)) => {
                tracing::debug!(peer = %self.peer_addr, error = %e, "Probe failed");
                Liveness::Broken
            }
        }
    }
}
