//! Capture loop
//!
//! Each tick either resynchronizes the camera or captures one frame, turns it
//! into a [`CameraEvent`] and broadcasts the event line. Device and decode
//! failures only move the state machine back to unsynced; nothing short of
//! cancellation ends the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::config::CaptureConfig;
use super::state::SyncState;
use crate::detect::{decode_frame, CodeDetector};
use crate::device::{CameraDevice, DeviceSyncController};
use crate::error::{Error, Result};
use crate::event::{now_millis, CameraEvent};
use crate::registry::{Broadcaster, ClientRegistry};
use crate::stats::CaptureStats;

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Sync failed; no capture was attempted
    SyncFailed,
    /// Frame captured and line broadcast
    Captured(CameraEvent),
    /// Capture or decode failed; camera marked unsynced
    CaptureFailed,
}

/// Drives sync, capture and broadcast
pub struct CaptureLoop<D, R> {
    config: CaptureConfig,
    sync: DeviceSyncController<D>,
    detector: Arc<R>,
    registry: Arc<ClientRegistry>,
    broadcaster: Broadcaster,
    state: SyncState,
    stats: CaptureStats,
}

impl<D: CameraDevice, R: CodeDetector> CaptureLoop<D, R> {
    pub fn new(
        config: CaptureConfig,
        sync: DeviceSyncController<D>,
        detector: Arc<R>,
        registry: Arc<ClientRegistry>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            config,
            sync,
            detector,
            registry,
            broadcaster,
            state: SyncState::new(),
            stats: CaptureStats::new(),
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Run until `cancel` fires
    pub async fn run(mut self, cancel: CancellationToken) -> CaptureStats {
        tracing::info!(
            capture_interval_ms = self.config.capture_interval.as_millis() as u64,
            sync_interval_ms = self.config.sync_interval.as_millis() as u64,
            "Capture loop started"
        );

        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.tick() => outcome,
            };

            let delay = self.delay_after(&outcome);
            if delay.is_zero() {
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(
            frames = self.stats.frames,
            codes = self.stats.codes,
            sync_failures = self.stats.sync_failures,
            capture_failures = self.stats.capture_failures,
            "Capture loop stopped"
        );
        self.stats
    }

    /// Pause before the next tick
    pub fn delay_after(&self, outcome: &TickOutcome) -> Duration {
        match outcome {
            TickOutcome::Captured(_) => self.config.capture_interval,
            // Next tick resyncs; pause so a camera serving bad frames is not hammered
            TickOutcome::SyncFailed | TickOutcome::CaptureFailed => self.config.resync_delay,
        }
    }

    /// Run one step of the state machine
    pub async fn tick(&mut self) -> TickOutcome {
        let now = Instant::now();
        if self.state.needs_sync(now) {
            tracing::info!("Synchronizing camera");
            self.stats.sync_attempts += 1;

            match self.sync.sync().await {
                Ok(report) => {
                    self.state.on_synced(now, self.config.sync_interval);
                    tracing::info!(
                        led_corrected = report.led_corrected,
                        frame_size_corrected = report.frame_size_corrected,
                        "Camera synchronized"
                    );
                }
                Err(e) => {
                    self.state.on_failure();
                    self.stats.sync_failures += 1;
                    tracing::warn!(error = %e, "Camera sync failed");
                    return TickOutcome::SyncFailed;
                }
            }
        }

        tracing::debug!("Capturing frame");
        let event = match self.capture().await {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Capture failed, camera marked unsynced");
                self.state.on_failure();
                self.stats.capture_failures += 1;
                return TickOutcome::CaptureFailed;
            }
        };

        self.stats.frames += 1;
        if event.has_code() {
            self.stats.codes += 1;
        }

        let line = event.to_line();
        let snapshot = self.registry.current_clients();
        let clients = self.registry.prune(&snapshot);
        let delivery = self.broadcaster.broadcast(&line, &clients);
        self.stats.record_broadcast(&delivery);

        tracing::info!(
            clients = clients.len(),
            skipped = delivery.skipped(),
            "{}",
            line
        );

        TickOutcome::Captured(event)
    }

    /// Fetch, decode and scan one frame
    async fn capture(&self) -> Result<CameraEvent> {
        let bytes = self.sync.device().capture().await?;
        let timestamp = now_millis();
        let detector = Arc::clone(&self.detector);

        tokio::task::spawn_blocking(move || -> Result<CameraEvent> {
            let frame = decode_frame(&bytes)?;
            let detection = detector.detect(&frame)?;
            Ok(CameraEvent::new(
                timestamp,
                frame.width(),
                frame.height(),
                detection,
            ))
        })
        .await
        .map_err(|e| Error::Detect(format!("detector task failed: {e}")))?
    }
}
