//! Error types for transport control

use thiserror::Error;

/// Transport errors
///
/// None of these are fatal: the controller degrades to a non-playing,
/// still-usable state and reports the failure instead of panicking.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Playlist has no tracks
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Engine refused to start playback (e.g. autoplay policy)
    #[error("Playback start rejected: {0}")]
    PlayRejected(String),

    /// Any other engine failure
    #[error("Engine error: {0}")]
    Engine(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
