//! Event types for the VMP event system
//!
//! Provides shared event definitions and the EventBus used by the player
//! core services. Events are broadcast via the EventBus and can be
//! serialized for SSE transmission; the download events double as the
//! error-reporting channel for transfer failures.

use crate::playlist::SlotInfo;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;
use uuid::Uuid;

/// VMP player events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// A new music data snapshot was installed
    ///
    /// Triggers:
    /// - Scheduler: full playlist rebuild on its next tick
    /// - SSE: refresh catalog-derived display state
    MusicDataUpdated {
        /// Locally assigned monotonic snapshot version
        version: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The scheduler replaced or appended at least one playlist slot
    ///
    /// Triggers:
    /// - SSE: update playlist display
    /// - Downloader: naturally picks up new pending slots on its next scan
    PlaylistChanged {
        /// Full playlist snapshot after the pass
        slots: Vec<SlotInfo>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A media transfer started for a slot
    DownloadStarted {
        slot_id: Uuid,
        track_id: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transfer progress for the slot currently being fetched
    DownloadProgress {
        slot_id: Uuid,
        track_id: u32,
        /// Completion percentage in [0, 100]
        percent: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A media transfer completed and the slot is ready to play
    DownloadCompleted {
        slot_id: Uuid,
        track_id: u32,
        file_path: PathBuf,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A media transfer failed (transport error)
    ///
    /// Non-fatal: the slot stays pending and is retried on the
    /// coordinator's next scan.
    DownloadFailed {
        slot_id: Uuid,
        track_id: u32,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The first playlist slot finished downloading
    ///
    /// Marks the end of the "waiting for first track" startup phase.
    FirstTrackReady {
        track_id: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PlayerEvent::MusicDataUpdated { .. } => "MusicDataUpdated",
            PlayerEvent::PlaylistChanged { .. } => "PlaylistChanged",
            PlayerEvent::DownloadStarted { .. } => "DownloadStarted",
            PlayerEvent::DownloadProgress { .. } => "DownloadProgress",
            PlayerEvent::DownloadCompleted { .. } => "DownloadCompleted",
            PlayerEvent::DownloadFailed { .. } => "DownloadFailed",
            PlayerEvent::FirstTrackReady { .. } => "FirstTrackReady",
        }
    }
}

/// Central event distribution bus
///
/// Wraps tokio::broadcast: non-blocking publish, multiple concurrent
/// subscribers, automatic cleanup when subscribers drop.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if no subscriber is
    /// listening.
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> PlayerEvent {
        PlayerEvent::MusicDataUpdated {
            version: 3,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_eventbus_delivers_to_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(sample_event()).expect("emit should succeed");

        assert_eq!(rx1.try_recv().unwrap().event_type(), "MusicDataUpdated");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "MusicDataUpdated");
    }

    #[test]
    fn test_emit_lossy_without_subscribers() {
        let bus = EventBus::new(4);
        // No subscribers: plain emit errors, lossy emit does not
        assert!(bus.emit(sample_event()).is_err());
        bus.emit_lossy(sample_event());
    }

    #[test]
    fn test_emit_lossy_on_full_channel() {
        let bus = EventBus::new(2);
        let _rx = bus.subscribe();

        for _ in 0..10 {
            bus.emit_lossy(sample_event());
        }
        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = PlayerEvent::DownloadProgress {
            slot_id: Uuid::new_v4(),
            track_id: 12,
            percent: 42,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"DownloadProgress\""));
        assert!(json.contains("\"percent\":42"));

        let parsed: PlayerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type(), "DownloadProgress");
    }
}
