//! Transport controller - core orchestration
//!
//! Keeps the transport state consistent under two sources of truth: the
//! engine's event stream and direct user manipulation. The rule that keeps
//! them from fighting is simple: while a drag on the progress bar is in
//! progress, engine time updates are dropped, not deferred. Otherwise the
//! bar would snap back to the engine's position mid-drag.

use crate::{
    cursor::PlaylistCursor,
    engine::{EngineEvent, MediaEngine, PlayRequest},
    error::{PlaybackError, Result},
    events::TransportEvent,
    seek::{self, BarGeometry},
    subscription::Subscription,
    types::{PlaybackState, PlayerConfig, Playlist, Track, TransportStatus, EndBehavior},
    volume::Volume,
};
use tracing::{debug, trace, warn};

/// Bookkeeping for one drag on the progress bar
struct ScrubSession {
    /// Transport was playing when the drag began
    was_playing: bool,

    /// Window-level pointer listeners, released with the session
    listeners: Option<Subscription>,
}

/// Central transport management
///
/// Owns the playback state, the playlist cursor and the engine. All
/// transitions happen synchronously in reaction to a user command or an
/// `EngineEvent`; nothing here blocks or spawns.
pub struct TransportController<E: MediaEngine> {
    engine: E,
    cursor: PlaylistCursor,
    config: PlayerConfig,

    // State
    playing: bool,
    current_time: f64,
    duration: f64,
    volume: Volume,
    play_request: PlayRequest,
    scrub: Option<ScrubSession>,
    torn_down: bool,

    // Last status reported through events
    reported_status: TransportStatus,

    // Event queue for UI synchronization
    pending_events: Vec<TransportEvent>,
}

impl<E: MediaEngine> TransportController<E> {
    /// Create a controller and load the first playlist entry into the engine
    pub fn new(engine: E, playlist: Playlist, config: PlayerConfig) -> Result<Self> {
        config.validate()?;

        let mut controller = Self {
            engine,
            cursor: PlaylistCursor::new(playlist),
            volume: Volume::new(config.initial_volume),
            config,
            play_request: PlayRequest::default(),
            playing: false,
            current_time: 0.0,
            duration: 0.0,
            scrub: None,
            torn_down: false,
            reported_status: TransportStatus::Idle,
            pending_events: Vec::new(),
        };

        let track = controller.cursor.current().clone();
        debug!("Loading initial track {} ({})", track.id, track.title);
        controller.engine.load(&track);
        controller.push_volume();

        if controller.config.autoplay {
            controller.start_playback();
        }
        controller.adopt_loaded_duration();
        controller.sync_status();

        Ok(controller)
    }

    // ===== Playback Control =====

    /// Flip between playing and paused
    pub fn toggle_play_pause(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Start or resume playback
    ///
    /// A refused start is logged and reported as `TransportEvent::Error`;
    /// the transport stays paused and the user can retry.
    pub fn play(&mut self) {
        if self.torn_down || self.playing {
            return;
        }
        self.start_playback();
        self.sync_status();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.torn_down || !self.playing {
            return;
        }
        self.playing = false;
        self.engine.pause();
        self.sync_status();
    }

    /// Skip to next track (wraps to the first)
    pub fn next_track(&mut self) {
        if self.torn_down {
            return;
        }
        let previous = self.cursor.current().id.clone();
        self.cursor.advance();
        self.enter_current_track(previous);
    }

    /// Go to previous track (wraps to the last)
    pub fn previous_track(&mut self) {
        if self.torn_down {
            return;
        }
        let previous = self.cursor.current().id.clone();
        self.cursor.rewind();
        self.enter_current_track(previous);
    }

    /// Jump to a playlist entry and play it
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        let previous = self.cursor.current().id.clone();
        self.cursor.select(index)?;
        self.enter_current_track(previous);
        Ok(())
    }

    // ===== Seeking =====

    /// Seek to a position in seconds
    ///
    /// Clamped to [0, duration] once the duration is known.
    pub fn seek(&mut self, position: f64) {
        if self.torn_down || !position.is_finite() {
            return;
        }
        let position = self.clamp_position(position);
        self.apply_seek(position);
    }

    /// Jump ahead, stopping at the end of the track
    ///
    /// No-op while the duration is unknown.
    pub fn skip_forward(&mut self, seconds: f64) {
        if self.torn_down || self.duration == 0.0 || !seconds.is_finite() {
            return;
        }
        let target = (self.current_time + seconds.max(0.0)).min(self.duration);
        self.apply_seek(target);
    }

    /// Jump back, stopping at the start of the track
    pub fn rewind(&mut self, seconds: f64) {
        if self.torn_down || !seconds.is_finite() {
            return;
        }
        let target = (self.current_time - seconds.max(0.0)).max(0.0);
        self.apply_seek(target);
    }

    /// Skip forward by the configured amount
    pub fn skip_forward_default(&mut self) {
        self.skip_forward(self.config.skip_seconds);
    }

    /// Rewind by the configured amount
    pub fn rewind_default(&mut self) {
        self.rewind(self.config.skip_seconds);
    }

    // ===== Scrubbing =====

    /// Pointer pressed on the progress bar
    ///
    /// Seeks to the position under the pointer and enters the scrubbing
    /// overlay. Returns `false` (and does nothing) while the duration is
    /// unknown. Pressing again during a drag behaves like a move.
    pub fn scrub_start(&mut self, pointer_x: f64, bar: BarGeometry) -> bool {
        if self.torn_down || self.duration == 0.0 {
            return false;
        }
        if self.scrub.is_some() {
            return self.scrub_move(pointer_x, bar);
        }

        let target = bar.time_at(pointer_x, self.duration);
        self.apply_seek(target);
        self.scrub = Some(ScrubSession {
            was_playing: self.playing,
            listeners: None,
        });
        debug!("Scrub started at {:.3}s (playing: {})", target, self.playing);
        self.pending_events
            .push(TransportEvent::ScrubStarted { position: target });
        true
    }

    /// Pointer pressed, with the drag's pointer listeners
    ///
    /// `attach` runs only when a new drag begins. If it fails, the drag is
    /// abandoned through `scrub_end` and the error returned.
    pub fn scrub_start_with<F>(
        &mut self,
        pointer_x: f64,
        bar: BarGeometry,
        attach: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> Result<Subscription>,
    {
        let already_dragging = self.scrub.is_some();
        if !self.scrub_start(pointer_x, bar) {
            return Ok(false);
        }
        if already_dragging {
            return Ok(true);
        }

        match attach() {
            Ok(listeners) => {
                self.bind_scrub_listeners(listeners);
                Ok(true)
            }
            Err(e) => {
                warn!("Could not attach drag listeners: {}", e);
                self.scrub_end();
                Err(e)
            }
        }
    }

    /// Pointer moved while dragging
    ///
    /// Ignored when no drag is active.
    pub fn scrub_move(&mut self, pointer_x: f64, bar: BarGeometry) -> bool {
        if self.torn_down || self.scrub.is_none() {
            return false;
        }
        let target = bar.time_at(pointer_x, self.duration);
        self.apply_seek(target);
        true
    }

    /// Pointer released
    ///
    /// Leaves the scrubbing overlay and releases the drag listeners. If the
    /// transport was playing when the drag began, and nothing paused it
    /// since, playback is requested again: repeated seeks may have stalled
    /// the engine.
    pub fn scrub_end(&mut self) -> bool {
        let Some(session) = self.scrub.take() else {
            return false;
        };
        drop(session.listeners);

        let resume = session.was_playing && self.playing && !self.torn_down;
        if resume {
            if let Err(e) = self.request_play() {
                self.playback_failed(e);
            }
        }

        debug!(
            "Scrub ended at {:.3}s (resumed: {})",
            self.current_time, resume
        );
        self.pending_events.push(TransportEvent::ScrubEnded {
            position: self.current_time,
            resumed: resume && self.playing,
        });
        self.sync_status();
        true
    }

    /// Tie the drag's pointer listeners to the active drag
    ///
    /// They are released on `scrub_end`, on a track change and on teardown.
    /// Without an active drag the subscription is released right away.
    pub fn bind_scrub_listeners(&mut self, listeners: Subscription) {
        match self.scrub.as_mut() {
            Some(session) => session.listeners = Some(listeners),
            None => listeners.dispose(),
        }
    }

    // ===== Volume Control =====

    /// Set volume from the slider (0.0-1.0, clamped)
    ///
    /// An explicit volume choice also unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        if self.torn_down {
            return;
        }
        if !volume.is_finite() {
            warn!("Ignoring non-finite volume {}", volume);
            return;
        }
        self.volume.set(volume);
        self.volume.unmute();
        self.volume_changed();
    }

    /// Raise volume by one step; mute state is left alone
    pub fn increase_volume(&mut self) {
        if self.torn_down {
            return;
        }
        self.volume.increase(self.config.volume_step);
        self.volume_changed();
    }

    /// Lower volume by one step; mute state is left alone
    pub fn decrease_volume(&mut self) {
        if self.torn_down {
            return;
        }
        self.volume.decrease(self.config.volume_step);
        self.volume_changed();
    }

    /// Toggle mute (stored volume is preserved)
    pub fn toggle_mute(&mut self) {
        if self.torn_down {
            return;
        }
        self.volume.toggle_mute();
        self.volume_changed();
    }

    // ===== Engine Events =====

    /// Feed one engine observation into the state machine
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::TimeUpdate(time) => {
                self.on_time_update(time);
            }
            EngineEvent::MetadataLoaded(duration) => self.on_metadata_loaded(duration),
            EngineEvent::Ended => self.on_ended(),
            EngineEvent::PlayRejected { request, reason } => {
                self.on_play_rejected(request, reason)
            }
        }
    }

    /// Engine reported a new playback position
    ///
    /// Returns whether the update was applied. Updates are dropped while
    /// scrubbing and after teardown.
    pub fn on_time_update(&mut self, time: f64) -> bool {
        if self.torn_down || !time.is_finite() {
            return false;
        }
        if self.scrub.is_some() {
            trace!("Dropping time update {:.3}s during scrub", time);
            return false;
        }
        self.current_time = self.clamp_position(time);
        self.emit_position_update();
        true
    }

    /// Engine reported the duration of the current source
    pub fn on_metadata_loaded(&mut self, duration: f64) {
        if self.torn_down {
            return;
        }
        self.duration = seek::known_duration(duration);
        if self.duration > 0.0 {
            self.current_time = self.current_time.min(self.duration);
        }
        debug!(
            "Metadata loaded for {}: {:.3}s",
            self.cursor.current().id,
            self.duration
        );
        self.pending_events.push(TransportEvent::DurationChanged {
            duration: self.duration,
        });
        self.sync_status();
    }

    /// Engine reported natural completion
    pub fn on_ended(&mut self) {
        if self.torn_down {
            return;
        }
        let track_id = self.cursor.current().id.clone();
        debug!("Track {} finished", track_id);
        self.pending_events
            .push(TransportEvent::TrackFinished { track_id });

        match self.config.on_ended {
            EndBehavior::Advance => self.next_track(),
            EndBehavior::Stop => {
                self.playing = false;
                self.sync_status();
            }
        }
    }

    /// Engine reported that an accepted `play()` failed later on
    ///
    /// Only the latest request counts; an older one was superseded by a
    /// track change or a resume and its failure says nothing about now.
    pub fn on_play_rejected(&mut self, request: PlayRequest, reason: String) {
        if self.torn_down {
            return;
        }
        if request != self.play_request {
            debug!(
                "Ignoring rejection of superseded play request {} (latest {}): {}",
                request.0, self.play_request.0, reason
            );
            return;
        }
        if !self.playing {
            debug!("Ignoring late play rejection while paused: {}", reason);
            return;
        }
        self.playback_failed(PlaybackError::PlayRejected(reason));
        self.sync_status();
    }

    // ===== Teardown =====

    /// Release every listener and stop reacting to engine events
    ///
    /// Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(session) = self.scrub.take() {
            drop(session.listeners);
        }
        self.engine.detach();
        self.torn_down = true;
        debug!("Transport torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ===== State Queries =====

    /// Snapshot of the transport state
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            playing: self.playing,
            current_time: self.current_time,
            duration: self.duration,
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            scrubbing: self.scrub.is_some(),
        }
    }

    /// Idle until the duration is known, then Paused or Playing
    pub fn status(&self) -> TransportStatus {
        if self.duration == 0.0 {
            TransportStatus::Idle
        } else if self.playing {
            TransportStatus::Playing
        } else {
            TransportStatus::Paused
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Stored volume (0.0-1.0), independent of mute
    pub fn volume(&self) -> f64 {
        self.volume.level()
    }

    /// Stored volume as a whole percentage
    pub fn volume_level(&self) -> u8 {
        self.volume.percent()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Volume actually reaching the output (0 while muted)
    pub fn effective_volume(&self) -> f64 {
        self.volume.gain()
    }

    pub fn current_track(&self) -> &Track {
        self.cursor.current()
    }

    pub fn current_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn playlist(&self) -> &Playlist {
        self.cursor.playlist()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Played fraction (0.0-1.0), 0 while the duration is unknown
    pub fn progress_fraction(&self) -> f64 {
        seek::progress_fraction(self.current_time, self.duration)
    }

    /// Played percentage (0-100) for the progress bar width
    pub fn progress_percent(&self) -> f64 {
        self.progress_fraction() * 100.0
    }

    pub fn formatted_current_time(&self) -> String {
        seek::format_time(self.current_time)
    }

    pub fn formatted_duration(&self) -> String {
        seek::format_time(self.duration)
    }

    /// Volume readout: the percentage, or "Muted"
    pub fn volume_label(&self) -> String {
        if self.volume.is_muted() {
            "Muted".to_string()
        } else {
            format!("{}%", self.volume.percent())
        }
    }

    /// Human-readable play state
    pub fn status_text(&self) -> &'static str {
        if self.playing {
            "Playing"
        } else {
            "Paused"
        }
    }

    /// Engine access, mostly for hosts that need to poke the native resource
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    /// Mark as playing and ask the engine to start
    fn start_playback(&mut self) {
        self.playing = true;
        if let Err(e) = self.request_play() {
            self.playback_failed(e);
        }
    }

    /// Issue a new play request, superseding any pending one
    fn request_play(&mut self) -> Result<()> {
        self.play_request = self.play_request.next();
        trace!("Play request {}", self.play_request.0);
        self.engine.play(self.play_request)
    }

    /// Take the duration the engine already knows after a load
    ///
    /// Reloading the attached source raises no new metadata event.
    fn adopt_loaded_duration(&mut self) {
        if let Some(duration) = self.engine.loaded_duration() {
            debug!("Engine already knows the duration: {:.3}s", duration);
            self.on_metadata_loaded(duration);
        }
    }

    /// Revert to paused after a refused start
    fn playback_failed(&mut self, error: PlaybackError) {
        warn!("Playback start failed: {}", error);
        self.playing = false;
        self.pending_events.push(TransportEvent::Error {
            message: error.to_string(),
        });
    }

    /// Load the track under the cursor and start it
    fn enter_current_track(&mut self, previous_track_id: String) {
        if let Some(session) = self.scrub.take() {
            drop(session.listeners);
            self.pending_events.push(TransportEvent::ScrubEnded {
                position: self.current_time,
                resumed: false,
            });
        }

        self.current_time = 0.0;
        self.duration = 0.0;

        let track = self.cursor.current().clone();
        debug!(
            "Switching to track {} ({}) at index {}",
            track.id,
            track.title,
            self.cursor.index()
        );
        self.engine.load(&track);
        self.push_volume();

        self.pending_events.push(TransportEvent::TrackChanged {
            index: self.cursor.index(),
            track_id: track.id,
            previous_track_id,
        });
        self.emit_position_update();

        self.start_playback();
        self.adopt_loaded_duration();
        self.sync_status();
    }

    fn apply_seek(&mut self, position: f64) {
        self.current_time = position;
        self.engine.seek(position);
        self.emit_position_update();
    }

    fn clamp_position(&self, position: f64) -> f64 {
        let position = position.max(0.0);
        if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        }
    }

    fn push_volume(&mut self) {
        self.engine.set_volume(self.volume.level());
        self.engine.set_muted(self.volume.is_muted());
    }

    fn volume_changed(&mut self) {
        self.push_volume();
        self.pending_events.push(TransportEvent::VolumeChanged {
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn emit_position_update(&mut self) {
        self.pending_events.push(TransportEvent::PositionUpdate {
            position: self.current_time,
            duration: self.duration,
        });
    }

    /// Emit a state changed event if the status moved since the last one
    fn sync_status(&mut self) {
        let status = self.status();
        if status != self.reported_status {
            self.reported_status = status;
            self.pending_events
                .push(TransportEvent::StateChanged { status });
        }
    }
}

impl<E: MediaEngine> Drop for TransportController<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}
