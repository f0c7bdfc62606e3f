//! Platform-agnostic media engine trait
//!
//! Abstracts the native playback primitive (an HTML media element in the
//! browser, a simulated clock in the console player). The engine owns
//! decoding, buffering and timing; the controller only issues commands and
//! reacts to the events the engine reports back.

use crate::error::Result;
use crate::types::Track;

/// Platform-agnostic playback engine
///
/// Commands are fire-and-forget. The engine reports progress through
/// `EngineEvent`s that the host feeds into
/// `TransportController::handle_engine_event`.
pub trait MediaEngine {
    /// Point the engine at a media source and rewind it to the start
    ///
    /// Duration becomes unknown until the engine reports
    /// `EngineEvent::MetadataLoaded`, unless `loaded_duration` already
    /// knows it (reloading the source that is already attached).
    fn load(&mut self, track: &Track);

    /// Duration of the attached source, if its metadata is already loaded
    ///
    /// Checked right after every `load`. Engines that always report
    /// `MetadataLoaded` after a load can keep the default.
    fn loaded_duration(&self) -> Option<f64> {
        None
    }

    /// Request playback
    ///
    /// `request` identifies this call; a later asynchronous failure must be
    /// reported as `EngineEvent::PlayRejected` carrying the same value.
    ///
    /// # Returns
    /// * `Ok(())` - Request accepted. It may still fail later.
    /// * `Err(_)` - Request refused immediately (e.g. autoplay blocked)
    fn play(&mut self, request: PlayRequest) -> Result<()>;

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Move the playback position (seconds from start)
    fn seek(&mut self, position: f64);

    /// Set output volume (linear, 0.0-1.0)
    fn set_volume(&mut self, volume: f64);

    /// Mute or unmute output without touching the volume
    fn set_muted(&mut self, muted: bool);

    /// Release every listener the engine registered on its resource
    ///
    /// Called once on controller teardown.
    fn detach(&mut self) {}
}

/// Observations reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Playback position advanced (seconds)
    TimeUpdate(f64),

    /// Duration of the loaded source became known (seconds)
    ///
    /// Also reported right away when an adapter attaches to a source whose
    /// metadata is already available.
    MetadataLoaded(f64),

    /// Source played to its end
    Ended,

    /// A previously accepted `play()` failed asynchronously
    ///
    /// Rejections of superseded requests are ignored: a new load or a pause
    /// aborts the pending request in HTML.
    PlayRejected {
        /// The request that failed
        request: PlayRequest,
        /// Engine-provided reason
        reason: String,
    },
}

/// Sequence number of a play request, increasing per controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlayRequest(pub u64);

impl PlayRequest {
    /// The request after this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
