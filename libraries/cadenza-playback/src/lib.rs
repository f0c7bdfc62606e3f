//! Cadenza - Transport State Synchronization
//!
//! Platform-agnostic transport control for players built on a native media
//! element (HTML `<audio>`/`<video>`, or anything with the same shape).
//!
//! This crate provides:
//! - Transport state (play/pause, position, duration, volume, mute)
//! - Drag-to-seek (scrubbing) that suppresses engine time updates mid-drag
//! - Playlist cursor with wrap-around next/previous
//! - Volume stepping on a configurable grid and mute that preserves the stored level
//! - `mm:ss` formatting and progress-bar arithmetic
//! - Scoped listener guards for drag and engine listeners
//!
//! # Architecture
//!
//! The engine does all real playback work and is reached through the
//! `MediaEngine` trait. The controller only issues commands and reacts to
//! the `EngineEvent`s the host forwards to it. Browser bindings live behind
//! the `wasm` feature.
//!
//! # Example: Basic Transport
//!
//! ```rust
//! use cadenza_playback::{
//!     BarGeometry, EngineEvent, MediaEngine, PlayRequest, PlayerConfig, Playlist, Result,
//!     Track, TransportController,
//! };
//!
//! struct SilentEngine;
//!
//! impl MediaEngine for SilentEngine {
//!     fn load(&mut self, _track: &Track) {}
//!     fn play(&mut self, _request: PlayRequest) -> Result<()> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: f64) {}
//!     fn set_volume(&mut self, _volume: f64) {}
//!     fn set_muted(&mut self, _muted: bool) {}
//! }
//!
//! let playlist = Playlist::single(Track::new("1", "Song", "Artist", "", "/song.mp3"));
//! let mut transport =
//!     TransportController::new(SilentEngine, playlist, PlayerConfig::default()).unwrap();
//!
//! transport.handle_engine_event(EngineEvent::MetadataLoaded(180.0));
//! transport.toggle_play_pause();
//!
//! // Press in the middle of a 200px bar starting at x = 100
//! let bar = BarGeometry::new(100.0, 200.0);
//! transport.scrub_start(200.0, bar);
//! assert_eq!(transport.current_time(), 90.0);
//!
//! // Engine updates are ignored until the drag ends
//! transport.handle_engine_event(EngineEvent::TimeUpdate(12.0));
//! assert_eq!(transport.current_time(), 90.0);
//!
//! transport.scrub_end();
//! assert_eq!(transport.formatted_current_time(), "01:30");
//! ```

mod controller;
mod cursor;
mod engine;
mod error;
pub mod events;
pub mod seek;
pub mod subscription;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use controller::TransportController;
pub use cursor::PlaylistCursor;
pub use engine::{EngineEvent, MediaEngine, PlayRequest};
pub use error::{PlaybackError, Result};
pub use events::TransportEvent;
pub use seek::{format_time, progress_fraction, BarGeometry};
pub use subscription::{Subscription, SubscriptionSet};
pub use types::{EndBehavior, PlaybackState, PlayerConfig, Playlist, Track, TransportStatus};
pub use volume::Volume;
