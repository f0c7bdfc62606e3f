/// Console configuration
use crate::error::{ConsoleError, Result};
use cadenza_playback::{PlayerConfig, Playlist, Track};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "cadenza.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default = "default_tracks")]
    pub tracks: Vec<TrackEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Interval between simulated engine ticks
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Playback speed multiplier of the simulated engine
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Print every transport event as a JSON line
    #[serde(default)]
    pub json_events: bool,
}

/// A playlist entry plus the length the simulated engine reports for it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackEntry {
    pub id: String,
    pub title: String,
    pub artist: String,

    #[serde(default)]
    pub artwork: String,

    pub media: String,

    /// Seconds; omit for a source of unknown length
    #[serde(default)]
    pub duration: Option<f64>,
}

impl TrackEntry {
    pub fn track(&self) -> Track {
        Track::new(
            self.id.clone(),
            self.title.clone(),
            self.artist.clone(),
            self.artwork.clone(),
            self.media.clone(),
        )
    }
}

fn default_session() -> SessionSettings {
    SessionSettings {
        tick_ms: default_tick_ms(),
        speed: default_speed(),
        json_events: false,
    }
}

fn default_tick_ms() -> u64 {
    250
}

fn default_speed() -> f64 {
    1.0
}

fn default_tracks() -> Vec<TrackEntry> {
    let entry = |id: &str, title: &str, artist: &str, duration: f64| TrackEntry {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        artwork: format!("/artwork/{id}.png"),
        media: format!("/media/{id}.mp3"),
        duration: Some(duration),
    };

    vec![
        entry("night-train", "Night Train", "Grafith", 187.0),
        entry("borrowed-love", "Borrowed Love", "The Ten Strings", 214.0),
        entry("destiny", "It Was Destiny", "The Ten Strings", 196.0),
    ]
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            session: default_session(),
            tracks: default_tracks(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `cadenza.toml` in the
    /// working directory is used when present. `CADENZA_`-prefixed variables
    /// override both, with `__` between nested keys
    /// (`CADENZA_PLAYER__INITIAL_VOLUME=0.8`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) if !path.exists() => {
                return Err(ConsoleError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENZA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| ConsoleError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConsoleError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.player.validate()?;

        if self.session.tick_ms == 0 {
            return Err(ConsoleError::Config(
                "session.tick_ms must be greater than 0".to_string(),
            ));
        }
        if !(self.session.speed.is_finite() && self.session.speed > 0.0) {
            return Err(ConsoleError::Config(format!(
                "session.speed must be a positive number, got {}",
                self.session.speed
            )));
        }

        for entry in &self.tracks {
            if let Some(duration) = entry.duration {
                if !(duration.is_finite() && duration > 0.0) {
                    return Err(ConsoleError::Config(format!(
                        "Track {} has invalid duration {}",
                        entry.id, duration
                    )));
                }
            }
        }

        Ok(())
    }

    /// Build the playlist; fails when no tracks are configured
    pub fn playlist(&self) -> Result<Playlist> {
        let tracks = self.tracks.iter().map(TrackEntry::track).collect();
        Ok(Playlist::new(tracks)?)
    }

    /// Known track lengths keyed by track id
    pub fn durations(&self) -> HashMap<String, f64> {
        self.tracks
            .iter()
            .filter_map(|entry| entry.duration.map(|d| (entry.id.clone(), d)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_playback::{EndBehavior, PlaybackError};
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_config_is_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playlist().unwrap().len(), 3);
        assert_eq!(config.durations().len(), 3);
        assert_eq!(config.session.tick_ms, 250);
    }

    #[test]
    fn load_from_file() {
        let file = write_config(
            r#"
            [player]
            initial_volume = 0.8
            on_ended = "stop"

            [session]
            speed = 4.0

            [[tracks]]
            id = "one"
            title = "One"
            artist = "Someone"
            media = "/one.ogg"
            duration = 42.5

            [[tracks]]
            id = "radio"
            title = "Radio"
            artist = "Live"
            media = "https://example.invalid/stream"
            "#,
        );

        let config = ConsoleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.player.initial_volume, 0.8);
        assert_eq!(config.player.on_ended, EndBehavior::Stop);
        assert_eq!(config.player.volume_step, 0.01);
        assert_eq!(config.session.speed, 4.0);
        assert_eq!(config.session.tick_ms, 250);
        assert_eq!(config.tracks.len(), 2);
        assert_eq!(config.tracks[0].artwork, "");

        let durations = config.durations();
        assert_eq!(durations.get("one"), Some(&42.5));
        assert!(!durations.contains_key("radio"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = ConsoleConfig::load(Some(Path::new("/nonexistent/cadenza.toml")));
        assert!(matches!(result, Err(ConsoleError::Config(_))));
    }

    #[test]
    fn empty_track_list_has_no_playlist() {
        let config = ConsoleConfig {
            tracks: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.playlist(),
            Err(ConsoleError::Playback(PlaybackError::EmptyPlaylist))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = ConsoleConfig::default();
        config.session.speed = 0.0;
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.tracks[1].duration = Some(-3.0);
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.player.initial_volume = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConsoleError::Playback(PlaybackError::InvalidConfig(_)))
        ));
    }
}
