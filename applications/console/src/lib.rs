//! Cadenza console player
//!
//! Terminal front-end for the transport controller. A simulated engine
//! stands in for a media element so the whole transport (play state,
//! scrubbing, volume, playlist wrap) can be exercised without audio output.

pub mod config;
pub mod engine;
pub mod error;
pub mod session;

pub use config::ConsoleConfig;
pub use engine::SimulatedEngine;
pub use error::{ConsoleError, Result};
pub use session::{Command, Session};
