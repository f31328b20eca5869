//! Download coordinator
//!
//! Periodic service that scans the playlist for the earliest slot still
//! missing its local file and keeps exactly one transfer in flight for it.
//! When the scheduler changes what the earliest pending slot is, the
//! in-flight transfer is cancelled (without waiting for its teardown) and
//! a new one is started. The active-target registry uses its own lock so
//! network I/O never happens under the playlist lock.

use crate::state::SharedState;
use super::task::DownloadTask;
use super::transport::MediaTransport;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// The transfer currently in flight
struct ActiveDownload {
    /// Identity of the slot the transfer targets
    slot_id: Uuid,
    /// Distinguishes this transfer from any later one for the same slot
    generation: u64,
    cancel: CancellationToken,
}

/// Periodic download coordinator service
pub struct Downloader {
    state: Arc<SharedState>,
    transport: Arc<dyn MediaTransport>,
    media_dir: PathBuf,
    tick: Duration,
    /// Single-owner registry of the active transfer (0 or 1 at all times)
    active: Arc<Mutex<Option<ActiveDownload>>>,
    next_generation: AtomicU64,
}

impl Downloader {
    pub fn new(
        state: Arc<SharedState>,
        transport: Arc<dyn MediaTransport>,
        media_dir: PathBuf,
        tick: Duration,
    ) -> Self {
        Self {
            state,
            transport,
            media_dir,
            tick,
            active: Arc::new(Mutex::new(None)),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Run the coordinator until the token is cancelled
    pub async fn run(self, cancel: CancellationToken) {
        info!("download coordinator started ({:?} tick)", self.tick);

        let mut interval = tokio::time::interval(self.tick);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    if let Some(active) = self.active.lock().await.take() {
                        active.cancel.cancel();
                    }
                    info!("download coordinator stopped");
                    return;
                }
                _ = interval.tick() => {
                    self.scan_once(&cancel).await;
                }
            }
        }
    }

    /// One coordinator pass
    ///
    /// Idles when every slot has its file; no-ops when the earliest
    /// pending slot is already the active target; otherwise cancels the
    /// active transfer (if any) and starts one for the new target.
    pub async fn scan_once(&self, shutdown: &CancellationToken) {
        let target = {
            let playlist = self.state.playlist.read().await;
            playlist
                .first_pending()
                .map(|entry| (entry.slot_id, entry.track.clone()))
        };

        let Some((slot_id, track)) = target else {
            debug!("download scan idle (nothing pending)");
            return;
        };

        let mut active = self.active.lock().await;

        if let Some(current) = active.as_ref() {
            if current.slot_id == slot_id {
                return;
            }

            debug!(slot_id = %current.slot_id, "cancelling superseded download");
            current.cancel.cancel();
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let cancel = shutdown.child_token();
        *active = Some(ActiveDownload {
            slot_id,
            generation,
            cancel: cancel.clone(),
        });
        drop(active);

        info!(track_id = track.id, slot_id = %slot_id, "starting download");

        let task = DownloadTask::new(
            self.state.clone(),
            self.transport.clone(),
            self.media_dir.clone(),
            slot_id,
            track,
        );

        let registry = self.active.clone();
        tokio::spawn(async move {
            task.run(cancel).await;

            // Release the active slot so the next scan can retry or move
            // on. A superseded task finds a newer generation installed and
            // leaves it alone.
            let mut active = registry.lock().await;
            if active.as_ref().map(|a| a.generation) == Some(generation) {
                *active = None;
            }
        });
    }

    /// Identity of the slot currently being fetched, if any
    pub async fn active_slot(&self) -> Option<Uuid> {
        self.active.lock().await.as_ref().map(|a| a.slot_id)
    }
}
