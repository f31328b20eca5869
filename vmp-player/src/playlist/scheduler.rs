//! Playlist scheduler
//!
//! Periodic service that keeps the playlist populated with up to N slots
//! matching the interval schedule for the current and near-future
//! wall-clock time, without unnecessary churn: a full rebuild happens only
//! when a new music data version is installed, otherwise only mismatched
//! slots are replaced. Each pass builds a fresh slot sequence and installs
//! it under one exclusive section, so readers never observe a half-rebuilt
//! playlist.

use crate::state::SharedState;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vmp_common::events::PlayerEvent;
use vmp_common::model::{MusicData, Track};
use vmp_common::playlist::{Playlist, PlaylistEntry};
use vmp_common::time::{wrapping_add_seconds, Clock};
use vmp_common::{Error, Result};

/// Bound on random picks before a duplicate track id is accepted anyway
const SELECTION_ATTEMPTS: usize = 30;

/// Periodic playlist scheduler service
pub struct Scheduler {
    state: Arc<SharedState>,
    clock: Arc<dyn Clock>,
    target_len: usize,
    tick: Duration,
    /// Music data version used on the previous pass
    last_version: Option<u64>,
}

impl Scheduler {
    pub fn new(
        state: Arc<SharedState>,
        clock: Arc<dyn Clock>,
        target_len: usize,
        tick: Duration,
    ) -> Self {
        Self {
            state,
            clock,
            target_len,
            tick,
            last_version: None,
        }
    }

    /// Run the scheduler until the token is cancelled
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("playlist scheduler started ({:?} tick)", self.tick);

        let mut interval = tokio::time::interval(self.tick);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("playlist scheduler stopped");
                    return;
                }
                _ = interval.tick() => {
                    self.rebuild_once().await;
                }
            }
        }
    }

    /// One scheduling pass
    ///
    /// No-ops while no music data is installed. A changed music data
    /// version forces a full rebuild.
    pub async fn rebuild_once(&mut self) {
        let Some(data) = self.state.current_music_data().await else {
            debug!("rebuild skipped (no music data)");
            return;
        };

        let force = self.last_version != Some(data.version);
        let now = self.clock.now_seconds_of_day();

        let updated = {
            let mut playlist = self.state.playlist.write().await;
            rebuild(&mut playlist, &data, now, force, self.target_len)
        };

        self.last_version = Some(data.version);
        debug!(updated, force, "playlist pass complete");

        if updated > 0 {
            let slots = self.state.playlist_snapshot().await;
            self.state.events.emit_lossy(PlayerEvent::PlaylistChanged {
                slots,
                timestamp: chrono::Utc::now(),
            });
        }
    }
}

/// Rebuild the slot sequence for one pass; returns how many slots changed
///
/// Walks a virtual clock forward from `start_seconds`, keeping slots whose
/// recorded interval still matches (identity preserved) and replacing or
/// appending the rest. Selection failures leave the existing slot for this
/// tick; the next tick retries.
fn rebuild(
    playlist: &mut Playlist,
    data: &MusicData,
    start_seconds: u32,
    force: bool,
    target_len: usize,
) -> usize {
    let old = playlist.entries().to_vec();
    let mut entries: Vec<PlaylistEntry> = Vec::with_capacity(target_len);
    let mut seconds = start_seconds;
    let mut updated = 0;

    for index in 0..target_len {
        let want_interval = data.interval_index_at(seconds);

        if !force {
            if let Some(existing) = old.get(index) {
                if existing.interval_index == want_interval {
                    seconds = wrapping_add_seconds(seconds, existing.track.duration_secs);
                    entries.push(existing.clone());
                    continue;
                }
            }
        }

        // Best-effort duplicate avoidance against the working set: slots
        // already placed this pass plus the old slots from this position
        // onward (including the one being replaced).
        let used: HashSet<u32> = entries
            .iter()
            .map(|entry| entry.track.id)
            .chain(old.iter().skip(index).map(|entry| entry.track.id))
            .collect();

        match select_track(data, want_interval, &used) {
            Ok(track) => {
                seconds = wrapping_add_seconds(seconds, track.duration_secs);
                entries.push(PlaylistEntry::new(track, want_interval));
                updated += 1;
            }
            Err(err) => {
                warn!(slot = index, interval = want_interval, %err, "track selection failed");
                if let Some(existing) = old.get(index) {
                    entries.push(existing.clone());
                }
            }
        }
    }

    playlist.install(entries);
    updated
}

/// Pick a track for an interval, avoiding ids already in use
///
/// Up to [`SELECTION_ATTEMPTS`] uniform-random picks among the interval's
/// candidates; the first unused id wins. When every attempt collides the
/// last pick is accepted anyway (a duplicate beats an empty slot).
fn select_track(data: &MusicData, interval_index: usize, used: &HashSet<u32>) -> Result<Track> {
    let interval = data.intervals.get(interval_index).ok_or_else(|| {
        Error::Selection(format!("interval {interval_index} does not exist"))
    })?;

    if interval.track_ids.is_empty() {
        return Err(Error::Selection(format!(
            "interval {interval_index} has no candidate tracks"
        )));
    }

    let mut rng = rand::thread_rng();
    let mut chosen = interval.track_ids[0];

    for _ in 0..SELECTION_ATTEMPTS {
        chosen = interval.track_ids[rng.gen_range(0..interval.track_ids.len())];
        if !used.contains(&chosen) {
            break;
        }
    }

    data.track(chosen).cloned().ok_or_else(|| {
        Error::Selection(format!("track {chosen} not present in catalog"))
    })
}
