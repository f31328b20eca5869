//! One cancellable media transfer
//!
//! Runs the transport fetch and relays its progress reports into the
//! target slot. Every write is identity-checked: if the scheduler replaced
//! the slot while the transfer was in flight, the update is silently
//! dropped so a late report never corrupts the slot that now occupies the
//! same position.

use crate::state::SharedState;
use super::transport::MediaTransport;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;
use vmp_common::events::PlayerEvent;
use vmp_common::model::Track;
use vmp_common::progress::Progress;
use vmp_common::Error;

/// A single transfer bound to one slot instance
pub(super) struct DownloadTask {
    state: Arc<SharedState>,
    transport: Arc<dyn MediaTransport>,
    media_dir: PathBuf,
    slot_id: Uuid,
    track: Track,
}

impl DownloadTask {
    pub(super) fn new(
        state: Arc<SharedState>,
        transport: Arc<dyn MediaTransport>,
        media_dir: PathBuf,
        slot_id: Uuid,
        track: Track,
    ) -> Self {
        Self {
            state,
            transport,
            media_dir,
            slot_id,
            track,
        }
    }

    /// Execute the transfer to completion, cancellation or failure
    ///
    /// Files are named by track id so a re-download of the same track
    /// lands on the same path.
    pub(super) async fn run(self, cancel: CancellationToken) {
        let dest = self.media_dir.join(self.track.id.to_string());
        let (progress_tx, mut progress_rx) = mpsc::channel::<Progress>(1);

        self.state.events.emit_lossy(PlayerEvent::DownloadStarted {
            slot_id: self.slot_id,
            track_id: self.track.id,
            timestamp: chrono::Utc::now(),
        });

        // Relay loop: consume progress reports while the fetch runs.
        let result = {
            let fetch = self
                .transport
                .fetch(&self.track.media_url, &dest, progress_tx, cancel);
            tokio::pin!(fetch);

            loop {
                tokio::select! {
                    result = &mut fetch => break result,
                    Some(progress) = progress_rx.recv() => {
                        self.apply_progress(progress).await;
                    }
                }
            }
        };

        match result {
            Ok(()) => self.finish(dest).await,
            Err(Error::Cancelled) => {
                debug!(track_id = self.track.id, "download cancelled");
            }
            Err(err) => {
                error!(track_id = self.track.id, %err, "download failed");
                self.state.events.emit_lossy(PlayerEvent::DownloadFailed {
                    slot_id: self.slot_id,
                    track_id: self.track.id,
                    error: err.to_string(),
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    /// Write one progress report into the target slot, if it still exists
    async fn apply_progress(&self, progress: Progress) {
        debug!(track_id = self.track.id, %progress, "download progress");

        let delivered = self
            .state
            .playlist
            .write()
            .await
            .set_progress(self.slot_id, progress);

        if delivered {
            self.state.events.emit_lossy(PlayerEvent::DownloadProgress {
                slot_id: self.slot_id,
                track_id: self.track.id,
                percent: progress.percent(),
                timestamp: chrono::Utc::now(),
            });
        } else {
            debug!(track_id = self.track.id, "slot replaced; progress dropped");
        }
    }

    /// Mark the target slot done, if it still exists
    async fn finish(&self, dest: PathBuf) {
        let delivered = {
            let mut playlist = self.state.playlist.write().await;
            playlist.set_progress(self.slot_id, Progress::DONE)
                && playlist.set_file_path(self.slot_id, &dest)
        };

        if delivered {
            info!(
                track_id = self.track.id,
                file_path = %dest.display(),
                "download complete"
            );
            self.state.events.emit_lossy(PlayerEvent::DownloadCompleted {
                slot_id: self.slot_id,
                track_id: self.track.id,
                file_path: dest,
                timestamp: chrono::Utc::now(),
            });
        } else {
            debug!(track_id = self.track.id, "slot replaced; result dropped");
        }
    }
}
