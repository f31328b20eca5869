//! Shared player state
//!
//! Thread-safe shared state coordinating the scheduler, the download
//! coordinator and the HTTP surface. Music data and the playlist live
//! behind independent locks so a writer of one never blocks a reader of
//! the other; no network or disk I/O ever happens while either lock is
//! held.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vmp_common::events::{EventBus, PlayerEvent};
use vmp_common::model::MusicData;
use vmp_common::playlist::{Playlist, SlotInfo};
use vmp_common::progress::Progress;
use vmp_common::{Error, Result};

/// Event channel capacity; sized for bursty download-progress traffic
const EVENT_BUS_CAPACITY: usize = 256;

/// Shared state accessible by all services
pub struct SharedState {
    /// Latest music configuration snapshot (None until the first load)
    pub music_data: RwLock<Option<Arc<MusicData>>>,

    /// Current playlist of upcoming slots
    pub playlist: RwLock<Playlist>,

    /// Event bus for SSE and inter-service notifications
    pub events: EventBus,

    /// Next music data version to assign
    next_version: AtomicU64,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            music_data: RwLock::new(None),
            playlist: RwLock::new(Playlist::new()),
            events: EventBus::new(EVENT_BUS_CAPACITY),
            next_version: AtomicU64::new(1),
        }
    }

    /// Install a freshly fetched music data snapshot
    ///
    /// Assigns the next monotonic version so the scheduler can detect the
    /// change by value comparison. Returns the assigned version.
    pub async fn install_music_data(&self, mut data: MusicData) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        data.version = version;

        *self.music_data.write().await = Some(Arc::new(data));

        self.events.emit_lossy(PlayerEvent::MusicDataUpdated {
            version,
            timestamp: chrono::Utc::now(),
        });

        version
    }

    /// Current music data snapshot, if any
    pub async fn current_music_data(&self) -> Option<Arc<MusicData>> {
        self.music_data.read().await.clone()
    }

    /// Read-only playlist snapshot for the consumer/UI layer
    pub async fn playlist_snapshot(&self) -> Vec<SlotInfo> {
        self.playlist.read().await.snapshot()
    }

    /// Download progress of the first playlist slot
    pub async fn first_track_progress(&self) -> Progress {
        self.playlist.read().await.first_entry_progress()
    }

    /// Wait until the first playlist slot has its media downloaded
    ///
    /// Bounded poll loop with a cancellation check each iteration; logs the
    /// download percentage while waiting and emits `FirstTrackReady` once
    /// the slot becomes playable.
    pub async fn wait_first_track_ready(
        &self,
        timeout: Duration,
        poll: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut last_percent: Option<u32> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            {
                let playlist = self.playlist.read().await;
                if let Some(first) = playlist.get(0) {
                    if first.is_ready() {
                        info!(track_id = first.track.id, "first track ready");
                        self.events.emit_lossy(PlayerEvent::FirstTrackReady {
                            track_id: first.track.id,
                            timestamp: chrono::Utc::now(),
                        });
                        return Ok(());
                    }

                    let percent = first.progress.percent();
                    if last_percent != Some(percent) {
                        last_percent = Some(percent);
                        info!("waiting for first track: {}", first.progress);
                    }
                } else {
                    debug!("waiting for first track: playlist empty");
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Timeout("first track not ready".to_string()));
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(poll) => {}
            }
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
