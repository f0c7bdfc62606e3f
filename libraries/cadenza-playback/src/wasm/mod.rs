//! WASM bindings for cadenza-playback
//!
//! Drives the transport controller from a browser: `WebMediaEngine` wraps an
//! `HTMLMediaElement`, `WasmPlayer` exposes the controller to JavaScript.

pub mod engine;
pub mod player;
pub mod types;

pub use engine::WebMediaEngine;
pub use player::WasmPlayer;
pub use types::WasmTrack;
