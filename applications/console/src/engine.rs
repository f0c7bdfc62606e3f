/// Simulated media engine
///
/// Stands in for a real media element: it keeps a clock that advances on
/// `tick` while running and reports the same observations a browser would
/// (metadata, time updates, end of media).
use cadenza_playback::{EngineEvent, MediaEngine, PlayRequest, PlaybackError, Result, Track};
use std::collections::HashMap;

struct LoadedMedia {
    id: String,

    /// `INFINITY` for sources of unknown length
    duration: f64,
}

pub struct SimulatedEngine {
    durations: HashMap<String, f64>,
    media: Option<LoadedMedia>,
    metadata_pending: bool,
    position: f64,
    running: bool,
    volume: f64,
    muted: bool,
}

impl SimulatedEngine {
    /// Create an engine that knows the length of the given track ids
    pub fn new(durations: HashMap<String, f64>) -> Self {
        Self {
            durations,
            media: None,
            metadata_pending: false,
            position: 0.0,
            running: false,
            volume: 1.0,
            muted: false,
        }
    }

    /// Advance the clock by `elapsed` seconds and collect observations
    pub fn tick(&mut self, elapsed: f64) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(duration) = self.media.as_ref().map(|m| m.duration) else {
            return events;
        };

        if self.metadata_pending {
            self.metadata_pending = false;
            events.push(EngineEvent::MetadataLoaded(duration));
        }

        if !self.running || !(elapsed.is_finite() && elapsed > 0.0) {
            return events;
        }

        self.position += elapsed;
        if self.position >= duration {
            self.position = duration;
            self.running = false;
            events.push(EngineEvent::TimeUpdate(self.position));
            events.push(EngineEvent::Ended);
        } else {
            events.push(EngineEvent::TimeUpdate(self.position));
        }
        events
    }

    /// Jump to the end of the loaded source as if it played out
    pub fn finish(&mut self) -> Vec<EngineEvent> {
        let Some(duration) = self.media.as_ref().map(|m| m.duration) else {
            return Vec::new();
        };
        if duration.is_finite() {
            self.position = duration;
        }
        self.running = false;
        vec![EngineEvent::Ended]
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn loaded_id(&self) -> Option<&str> {
        self.media.as_ref().map(|m| m.id.as_str())
    }

    /// Output level after mute
    pub fn output_gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn load(&mut self, track: &Track) {
        let duration = self
            .durations
            .get(&track.id)
            .copied()
            .unwrap_or(f64::INFINITY);
        tracing::debug!("Simulated engine loading {} ({}s)", track.media, duration);

        self.media = Some(LoadedMedia {
            id: track.id.clone(),
            duration,
        });
        self.metadata_pending = true;
        self.position = 0.0;
        self.running = false;
    }

    fn play(&mut self, _request: PlayRequest) -> Result<()> {
        let Some(media) = &self.media else {
            return Err(PlaybackError::Engine("No media loaded".to_string()));
        };
        // A finished source restarts from the beginning
        if self.position >= media.duration {
            self.position = 0.0;
        }
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn seek(&mut self, position: f64) {
        let duration = self.media.as_ref().map_or(0.0, |m| m.duration);
        self.position = position.clamp(0.0, duration.max(0.0));
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SimulatedEngine {
        let mut durations = HashMap::new();
        durations.insert("short".to_string(), 2.0);
        SimulatedEngine::new(durations)
    }

    fn track(id: &str) -> Track {
        Track::new(id, id, "Artist", "", format!("/{id}.mp3"))
    }

    #[test]
    fn metadata_is_reported_once_after_load() {
        let mut engine = engine();
        assert!(engine.tick(0.5).is_empty());

        engine.load(&track("short"));
        assert_eq!(engine.tick(0.5), vec![EngineEvent::MetadataLoaded(2.0)]);
        assert!(engine.tick(0.5).is_empty());
        assert_eq!(engine.loaded_id(), Some("short"));
    }

    #[test]
    fn unknown_track_reports_unbounded_duration() {
        let mut engine = engine();
        engine.load(&track("radio"));
        engine.play(PlayRequest(1)).unwrap();

        let events = engine.tick(1000.0);
        assert_eq!(
            events,
            vec![
                EngineEvent::MetadataLoaded(f64::INFINITY),
                EngineEvent::TimeUpdate(1000.0)
            ]
        );
    }

    #[test]
    fn clock_runs_to_end_and_stops() {
        let mut engine = engine();
        engine.load(&track("short"));
        engine.play(PlayRequest(1)).unwrap();
        engine.tick(0.0);

        assert_eq!(engine.tick(1.5), vec![EngineEvent::TimeUpdate(1.5)]);
        assert_eq!(
            engine.tick(1.5),
            vec![EngineEvent::TimeUpdate(2.0), EngineEvent::Ended]
        );
        assert!(!engine.is_running());
        assert!(engine.tick(1.0).is_empty());

        // Playing again restarts
        engine.play(PlayRequest(1)).unwrap();
        assert_eq!(engine.position(), 0.0);
    }

    #[test]
    fn finish_stops_at_end() {
        let mut engine = engine();
        assert!(engine.finish().is_empty());

        engine.load(&track("short"));
        engine.play(PlayRequest(1)).unwrap();
        assert_eq!(engine.finish(), vec![EngineEvent::Ended]);
        assert_eq!(engine.position(), 2.0);
        assert!(!engine.is_running());
    }

    #[test]
    fn play_without_media_fails() {
        let mut engine = engine();
        assert!(matches!(engine.play(PlayRequest(1)), Err(PlaybackError::Engine(_))));
    }

    #[test]
    fn seek_is_clamped_and_mute_silences_output() {
        let mut engine = engine();
        engine.load(&track("short"));
        engine.seek(10.0);
        assert_eq!(engine.position(), 2.0);
        engine.seek(-1.0);
        assert_eq!(engine.position(), 0.0);

        engine.set_volume(0.4);
        assert_eq!(engine.output_gain(), 0.4);
        engine.set_muted(true);
        assert_eq!(engine.output_gain(), 0.0);
    }
}
