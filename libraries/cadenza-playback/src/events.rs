//! Transport Events
//!
//! Event-based communication for UI synchronization. The controller queues
//! events as it changes state; the presentation layer drains them.

use crate::types::TransportStatus;
use serde::{Deserialize, Serialize};

/// Events emitted by the transport controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TransportEvent {
    /// Intended play state or readiness changed
    StateChanged {
        /// The new transport status
        status: TransportStatus,
    },

    /// Cursor moved to another track
    TrackChanged {
        /// Playlist index of the new track
        index: usize,
        /// ID of the new track
        track_id: String,
        /// ID of the track that was active before
        previous_track_id: String,
    },

    /// Engine reported the duration of the current track
    DurationChanged {
        /// Duration in seconds (0 = unknown)
        duration: f64,
    },

    /// Position moved, through playback or a user seek
    PositionUpdate {
        /// Current position in seconds
        position: f64,
        /// Duration in seconds
        duration: f64,
    },

    /// Drag on the progress bar began
    ScrubStarted {
        /// Position under the pointer
        position: f64,
    },

    /// Drag on the progress bar ended
    ScrubEnded {
        /// Final position
        position: f64,
        /// Whether playback is being resumed
        resumed: bool,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Stored volume (0.0-1.0), kept while muted
        volume: f64,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Track reached its end naturally
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Recoverable error (e.g. playback start rejected)
    Error {
        /// Error message
        message: String,
    },
}

impl TransportEvent {
    /// Short name, handy for logs
    pub fn name(&self) -> &'static str {
        match self {
            TransportEvent::StateChanged { .. } => "state_changed",
            TransportEvent::TrackChanged { .. } => "track_changed",
            TransportEvent::DurationChanged { .. } => "duration_changed",
            TransportEvent::PositionUpdate { .. } => "position_update",
            TransportEvent::ScrubStarted { .. } => "scrub_started",
            TransportEvent::ScrubEnded { .. } => "scrub_ended",
            TransportEvent::VolumeChanged { .. } => "volume_changed",
            TransportEvent::TrackFinished { .. } => "track_finished",
            TransportEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = TransportEvent::VolumeChanged {
            volume: 0.425,
            is_muted: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "VolumeChanged");
        assert_eq!(json["volume"], 0.425);
        assert_eq!(json["is_muted"], true);
    }

    #[test]
    fn state_event_carries_status() {
        let event = TransportEvent::StateChanged {
            status: TransportStatus::Playing,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: TransportEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.name(), "state_changed");
    }
}
