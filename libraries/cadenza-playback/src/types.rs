//! Core types for transport control

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// A playable item
///
/// Immutable once loaded. `artwork` and `media` are whatever the host
/// engine understands (URLs in a browser, file paths on desktop).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album art location
    #[serde(default)]
    pub artwork: String,

    /// Media source location handed to the engine
    pub media: String,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        artwork: impl Into<String>,
        media: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork: artwork.into(),
            media: media.into(),
        }
    }
}

/// Ordered, non-empty sequence of tracks
///
/// Read-only configuration injected into the controller at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build a playlist, rejecting an empty track list
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }
        Ok(Self { tracks })
    }

    /// Single-track playlist
    pub fn single(track: Track) -> Self {
        Self {
            tracks: vec![track],
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl<'de> Deserialize<'de> for Playlist {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tracks = Vec::<Track>::deserialize(deserializer)?;
        Playlist::new(tracks).map_err(serde::de::Error::custom)
    }
}

/// Snapshot of the transport
///
/// `current_time <= duration` holds once `duration` is known (non-zero).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Intended play state (what the user asked for)
    pub playing: bool,

    /// Position in seconds
    pub current_time: f64,

    /// Duration in seconds, 0 until metadata is loaded
    pub duration: f64,

    /// Stored volume in [0, 1], preserved while muted
    pub volume: f64,

    pub muted: bool,

    /// Drag in progress; engine time updates are suppressed
    pub scrubbing: bool,
}

/// Coarse transport status
///
/// Scrubbing is an overlay reported separately by `PlaybackState::scrubbing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportStatus {
    /// Duration not known yet
    Idle,

    /// Paused (or never started)
    Paused,

    /// Playing
    Playing,
}

/// What happens when the engine reports natural completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndBehavior {
    /// Move to the next playlist entry (wrapping) and keep playing
    Advance,

    /// Stop and stay on the finished track
    Stop,
}

/// Configuration for the transport controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume in [0, 1] (default: 0.5)
    pub initial_volume: f64,

    /// Increment used by the volume buttons (default: 0.01)
    pub volume_step: f64,

    /// Seconds moved by skip forward / rewind (default: 10)
    pub skip_seconds: f64,

    /// Behavior at end of media (default: Advance)
    pub on_ended: EndBehavior,

    /// Request playback as soon as the controller is built (default: false)
    pub autoplay: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.5,
            volume_step: 0.01,
            skip_seconds: 10.0,
            on_ended: EndBehavior::Advance,
            autoplay: false,
        }
    }
}

impl PlayerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "initial_volume must be within [0, 1], got {}",
                self.initial_volume
            )));
        }
        if !(self.volume_step > 0.0 && self.volume_step <= 1.0) {
            return Err(PlaybackError::InvalidConfig(format!(
                "volume_step must be within (0, 1], got {}",
                self.volume_step
            )));
        }
        if !(self.skip_seconds.is_finite() && self.skip_seconds >= 0.0) {
            return Err(PlaybackError::InvalidConfig(format!(
                "skip_seconds must be a non-negative number, got {}",
                self.skip_seconds
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(id, "Title", "Artist", "cover.png", format!("/{id}.mp3"))
    }

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.initial_volume, 0.5);
        assert_eq!(config.volume_step, 0.01);
        assert_eq!(config.skip_seconds, 10.0);
        assert_eq!(config.on_ended, EndBehavior::Advance);
        assert!(!config.autoplay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_config_values_are_rejected() {
        let config = PlayerConfig {
            initial_volume: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlaybackError::InvalidConfig(_))
        ));

        let config = PlayerConfig {
            volume_step: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlayerConfig {
            skip_seconds: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_playlist_is_rejected() {
        assert!(matches!(
            Playlist::new(Vec::new()),
            Err(PlaybackError::EmptyPlaylist)
        ));
    }

    #[test]
    fn playlist_preserves_order() {
        let playlist = Playlist::new(vec![track("a"), track("b"), track("c")]).unwrap();
        assert_eq!(playlist.len(), 3);
        assert!(!playlist.is_empty());
        let ids: Vec<_> = playlist.tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(playlist.get(3).is_none());
    }

    #[test]
    fn playlist_deserializes_and_rejects_empty_lists() {
        let json = r#"[
            {"id": "1", "title": "One", "artist": "A", "media": "/one.mp3"},
            {"id": "2", "title": "Two", "artist": "B", "artwork": "two.png", "media": "/two.mp3"}
        ]"#;
        let playlist: Playlist = serde_json::from_str(json).unwrap();
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.get(0).unwrap().artwork, "");
        assert_eq!(playlist.get(1).unwrap().artwork, "two.png");
        assert!(serde_json::to_value(&playlist).unwrap().is_array());

        let empty: std::result::Result<Playlist, _> = serde_json::from_str("[]");
        assert!(empty.is_err());
    }

    #[test]
    fn config_fills_missing_fields_with_defaults() {
        let config: PlayerConfig = serde_json::from_str(r#"{"on_ended": "stop"}"#).unwrap();
        assert_eq!(config.on_ended, EndBehavior::Stop);
        assert_eq!(config.initial_volume, 0.5);
    }
}
