//! Sync state machine
//!
//! Tracks whether the camera is known to be configured and when that
//! knowledge expires.

use std::time::Duration;

use tokio::time::Instant;

/// Camera sync phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Camera configuration unknown or last operation failed
    Unsynced,
    /// Camera configured; captures allowed until the deadline
    Synced,
}

/// Sync state owned by the capture loop
#[derive(Debug, Clone)]
pub struct SyncState {
    /// Current phase
    pub phase: SyncPhase,

    /// When the next resync is due (None until the first success)
    pub next_sync_deadline: Option<Instant>,

    /// Time of the last successful sync
    pub last_synced_at: Option<Instant>,
}

impl SyncState {
    /// Start unsynced
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Unsynced,
            next_sync_deadline: None,
            last_synced_at: None,
        }
    }

    /// Whether a sync must run before the next capture
    pub fn needs_sync(&self, now: Instant) -> bool {
        match (self.phase, self.next_sync_deadline) {
            (SyncPhase::Unsynced, _) => true,
            (SyncPhase::Synced, Some(deadline)) => now >= deadline,
            (SyncPhase::Synced, None) => true,
        }
    }

    /// Record a successful sync at `now`
    pub fn on_synced(&mut self, now: Instant, sync_interval: Duration) {
        self.phase = SyncPhase::Synced;
        self.last_synced_at = Some(now);
        self.next_sync_deadline = Some(now + sync_interval);
    }

    /// Record a failed sync or capture
    pub fn on_failure(&mut self) {
        self.phase = SyncPhase::Unsynced;
    }

    /// Check if captures are allowed
    pub fn is_synced(&self) -> bool {
        self.phase == SyncPhase::Synced
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
