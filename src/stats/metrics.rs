//! Statistics for the capture pipeline and consumer delivery

use std::time::{Duration, Instant};

/// Outcome counters of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Deliveries handed to a task
    pub dispatched: usize,
    /// Clients skipped because their previous delivery is still pending
    pub skipped_busy: usize,
    /// Clients skipped because the delivery pool was exhausted
    pub skipped_saturated: usize,
    /// Clients skipped because an earlier delivery failed
    pub skipped_failed: usize,
}

impl BroadcastStats {
    /// Clients that will not receive this line
    pub fn skipped(&self) -> usize {
        self.skipped_busy + self.skipped_saturated + self.skipped_failed
    }
}

/// Registry counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Clients in the current live set
    pub connected: usize,
    /// Connections accepted since start
    pub total_accepted: u64,
    /// Connections removed by pruning since start
    pub total_pruned: u64,
}

/// Capture loop counters
#[derive(Debug, Clone)]
pub struct CaptureStats {
    /// Loop start time
    pub started_at: Instant,
    /// Sync attempts
    pub sync_attempts: u64,
    /// Failed sync attempts
    pub sync_failures: u64,
    /// Frames captured and decoded
    pub frames: u64,
    /// Frames in which a code was recognized
    pub codes: u64,
    /// Capture or decode failures
    pub capture_failures: u64,
    /// Lines handed to the broadcaster
    pub lines_sent: u64,
    /// Deliveries dispatched across all broadcasts
    pub deliveries: u64,
    /// Deliveries skipped across all broadcasts
    pub deliveries_skipped: u64,
}

impl CaptureStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            sync_attempts: 0,
            sync_failures: 0,
            frames: 0,
            codes: 0,
            capture_failures: 0,
            lines_sent: 0,
            deliveries: 0,
            deliveries_skipped: 0,
        }
    }

    /// Time since the loop started
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Accumulate one broadcast
    pub fn record_broadcast(&mut self, stats: &BroadcastStats) {
        self.lines_sent += 1;
        self.deliveries += stats.dispatched as u64;
        self.deliveries_skipped += stats.skipped() as u64;
    }

    /// Average frames per second since start
    pub fn frame_rate(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for CaptureStats {
    fn default() -> Self {
        Self::new()
    }
}
