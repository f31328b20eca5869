//! Catalog model: tracks, time-of-day intervals, and MusicData snapshots

use crate::time::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};

/// One track from the venue's catalog
///
/// Immutable once fetched; the duration drives the scheduler's virtual
/// clock when laying out upcoming slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog track id
    pub id: u32,
    pub title: String,
    pub artist: String,
    /// Track duration in seconds
    pub duration_secs: u32,
    /// URL the media file is fetched from
    pub media_url: String,
}

/// A time-of-day window with its eligible track ids
///
/// `start` and `end` are seconds since midnight. `start > end` denotes a
/// window that spans midnight (e.g. 20:00 to 05:00).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
    pub track_ids: Vec<u32>,
}

impl Interval {
    /// Whether `seconds` falls inside this window
    pub fn contains(&self, seconds: u32) -> bool {
        if self.start > self.end {
            // wraps past midnight
            (seconds >= self.start && seconds < SECONDS_PER_DAY) || seconds < self.end
        } else {
            seconds >= self.start && seconds < self.end
        }
    }
}

/// Ad spot carried alongside the music catalog
///
/// The player core transports these for the playback layer but does not
/// schedule them itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: u32,
    pub audio_url: String,
}

/// One versioned snapshot of the venue's music configuration
///
/// `version` is assigned locally and increases monotonically; the scheduler
/// detects a changed snapshot by comparing versions, never by deep equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicData {
    pub version: u64,
    pub intervals: Vec<Interval>,
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub ads: Vec<Ad>,
}

impl MusicData {
    /// Index of the interval covering `seconds`
    ///
    /// Intervals are evaluated in declared order and the first match wins.
    /// Defaults to index 0 when nothing matches (including out-of-range
    /// inputs).
    pub fn interval_index_at(&self, seconds: u32) -> usize {
        for (index, interval) in self.intervals.iter().enumerate() {
            if interval.contains(seconds) {
                return index;
            }
        }

        0
    }

    /// Look up a track by catalog id
    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with_intervals(intervals: Vec<Interval>) -> MusicData {
        MusicData {
            version: 1,
            intervals,
            tracks: vec![],
            ads: vec![],
        }
    }

    #[test]
    fn test_interval_index_matching() {
        let data = data_with_intervals(vec![
            Interval { start: 18_000, end: 39_600, track_ids: vec![] },
            Interval { start: 39_600, end: 72_000, track_ids: vec![] },
            Interval { start: 72_000, end: 18_000, track_ids: vec![] },
        ]);

        let cases = [
            (18_000, 0),
            (39_600, 1),
            (78_000, 2),
            (0, 2),
            (17_000, 2),
            // out of day range falls through every interval
            (999_999, 0),
        ];

        for (seconds, index) in cases {
            assert_eq!(data.interval_index_at(seconds), index, "seconds {seconds}");
        }
    }

    #[test]
    fn test_interval_index_defaults_to_zero_without_match() {
        let data = data_with_intervals(vec![Interval {
            start: 10_000,
            end: 20_000,
            track_ids: vec![],
        }]);

        assert_eq!(data.interval_index_at(5_000), 0);
        assert_eq!(data.interval_index_at(20_000), 0);
    }

    #[test]
    fn test_track_lookup() {
        let data = MusicData {
            version: 1,
            intervals: vec![],
            tracks: vec![Track {
                id: 7,
                title: "Seven".into(),
                artist: "Band".into(),
                duration_secs: 180,
                media_url: "http://cdn.local/7".into(),
            }],
            ads: vec![],
        };

        assert_eq!(data.track(7).map(|t| t.id), Some(7));
        assert!(data.track(8).is_none());
    }
}
