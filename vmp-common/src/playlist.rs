//! Playlist of upcoming playback slots
//!
//! Slots are addressed by position for scheduling, but by identity
//! (`slot_id`) for progress and result delivery: a slot at a given position
//! can be replaced between the time a transfer starts and the time it
//! finishes, and a late report must never land in the replacement.

use crate::model::Track;
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One playlist slot: a chosen track and its download status
///
/// `file_path` stays empty until a transfer completes successfully for this
/// exact slot instance; a slot's stored state is always Pending (no path) or
/// Done (path set).
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    /// Identity of this slot instance
    pub slot_id: Uuid,
    pub track: Track,
    /// Index of the interval this slot was scheduled from
    pub interval_index: usize,
    pub progress: Progress,
    pub file_path: Option<PathBuf>,
}

impl PlaylistEntry {
    pub fn new(track: Track, interval_index: usize) -> Self {
        Self {
            slot_id: Uuid::new_v4(),
            track,
            interval_index,
            progress: Progress::default(),
            file_path: None,
        }
    }

    /// Whether the slot's media is downloaded and ready to play
    pub fn is_ready(&self) -> bool {
        self.file_path.is_some()
    }
}

/// Read-only view of one slot for the UI/consumer layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub track_id: u32,
    pub title: String,
    pub artist: String,
    pub interval_index: usize,
    pub progress_percent: u32,
    pub file_path: Option<PathBuf>,
    pub is_ready: bool,
}

impl From<&PlaylistEntry> for SlotInfo {
    fn from(entry: &PlaylistEntry) -> Self {
        Self {
            track_id: entry.track.id,
            title: entry.track.title.clone(),
            artist: entry.track.artist.clone(),
            interval_index: entry.interval_index,
            progress_percent: entry.progress.percent(),
            file_path: entry.file_path.clone(),
            is_ready: entry.is_ready(),
        }
    }
}

/// Ordered sequence of playback slots
///
/// Grows incrementally up to the scheduler's target length and never
/// shrinks. The scheduler installs whole rebuilt sequences; the download
/// side mutates individual slot fields through the identity-checked setters.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    /// Replace the whole slot sequence with a freshly built one
    pub fn install(&mut self, entries: Vec<PlaylistEntry>) {
        self.entries = entries;
    }

    /// Earliest slot still missing its local file
    pub fn first_pending(&self) -> Option<&PlaylistEntry> {
        self.entries.iter().find(|entry| !entry.is_ready())
    }

    /// Record transfer progress for the slot with the given identity
    ///
    /// Returns false when no such slot exists anymore (it was replaced by
    /// the scheduler); the caller drops the update silently in that case.
    pub fn set_progress(&mut self, slot_id: Uuid, progress: Progress) -> bool {
        match self.entries.iter_mut().find(|entry| entry.slot_id == slot_id) {
            Some(entry) => {
                entry.progress = progress;
                true
            }
            None => false,
        }
    }

    /// Record the downloaded file path for the slot with the given identity
    ///
    /// Same identity rule as [`set_progress`](Self::set_progress).
    pub fn set_file_path(&mut self, slot_id: Uuid, path: &Path) -> bool {
        match self.entries.iter_mut().find(|entry| entry.slot_id == slot_id) {
            Some(entry) => {
                entry.file_path = Some(path.to_path_buf());
                true
            }
            None => false,
        }
    }

    /// Download progress of the first slot (zero when the playlist is empty)
    pub fn first_entry_progress(&self) -> Progress {
        self.entries
            .first()
            .map(|entry| entry.progress)
            .unwrap_or_default()
    }

    /// Read-only snapshot for the consumer/UI layer
    pub fn snapshot(&self) -> Vec<SlotInfo> {
        self.entries.iter().map(SlotInfo::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: u32) -> Track {
        Track {
            id,
            title: format!("Track {id}"),
            artist: "Artist".into(),
            duration_secs: 120,
            media_url: format!("http://cdn.local/{id}"),
        }
    }

    #[test]
    fn test_first_pending_skips_ready_slots() {
        let mut playlist = Playlist::new();
        let mut done = PlaylistEntry::new(track(1), 0);
        done.progress = Progress::DONE;
        done.file_path = Some(PathBuf::from("/cache/1"));
        let pending = PlaylistEntry::new(track(2), 0);
        let pending_id = pending.slot_id;
        playlist.install(vec![done, pending]);

        assert_eq!(playlist.first_pending().map(|e| e.slot_id), Some(pending_id));
    }

    #[test]
    fn test_first_pending_none_when_all_ready() {
        let mut playlist = Playlist::new();
        let mut entry = PlaylistEntry::new(track(1), 0);
        entry.file_path = Some(PathBuf::from("/cache/1"));
        playlist.install(vec![entry]);

        assert!(playlist.first_pending().is_none());
    }

    #[test]
    fn test_identity_checked_updates() {
        let mut playlist = Playlist::new();
        let entry = PlaylistEntry::new(track(1), 0);
        let slot_id = entry.slot_id;
        playlist.install(vec![entry]);

        assert!(playlist.set_progress(slot_id, Progress::new(0.5)));
        assert_eq!(playlist.get(0).unwrap().progress.percent(), 50);

        // A replaced slot silently drops updates addressed to the old identity
        playlist.install(vec![PlaylistEntry::new(track(2), 0)]);
        assert!(!playlist.set_progress(slot_id, Progress::DONE));
        assert!(!playlist.set_file_path(slot_id, Path::new("/cache/1")));
        assert_eq!(playlist.get(0).unwrap().progress.percent(), 0);
        assert!(playlist.get(0).unwrap().file_path.is_none());
    }

    #[test]
    fn test_first_entry_progress() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.first_entry_progress().percent(), 0);

        let entry = PlaylistEntry::new(track(1), 0);
        let slot_id = entry.slot_id;
        playlist.install(vec![entry]);
        playlist.set_progress(slot_id, Progress::new(0.42));

        assert_eq!(playlist.first_entry_progress().to_string(), "42%");
    }

    #[test]
    fn test_snapshot_reflects_slot_state() {
        let mut playlist = Playlist::new();
        let entry = PlaylistEntry::new(track(3), 1);
        let slot_id = entry.slot_id;
        playlist.install(vec![entry]);
        playlist.set_progress(slot_id, Progress::DONE);
        playlist.set_file_path(slot_id, Path::new("/cache/3"));

        let snapshot = playlist.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].track_id, 3);
        assert_eq!(snapshot[0].interval_index, 1);
        assert_eq!(snapshot[0].progress_percent, 100);
        assert!(snapshot[0].is_ready);
    }
}
