//! Seek arithmetic and time display
//!
//! One formula maps a pointer position to a playback position, used for
//! both the initial press on the progress bar and every move of a drag:
//!
//! ```text
//! fraction = clamp((pointer_x - bar.left) / bar.width, 0, 1)
//! target   = fraction * duration
//! ```

use serde::{Deserialize, Serialize};

/// Horizontal extent of the progress bar in pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub left: f64,
    pub width: f64,
}

impl BarGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Fraction of the bar under `pointer_x`, clamped to [0, 1]
    ///
    /// A degenerate bar (zero, negative or non-finite width) yields 0.
    pub fn fraction_at(&self, pointer_x: f64) -> f64 {
        if !(self.width.is_finite() && self.width > 0.0) {
            return 0.0;
        }
        let fraction = (pointer_x - self.left) / self.width;
        if fraction.is_nan() {
            return 0.0;
        }
        fraction.clamp(0.0, 1.0)
    }

    /// Playback position under `pointer_x` for a track of `duration` seconds
    pub fn time_at(&self, pointer_x: f64, duration: f64) -> f64 {
        self.fraction_at(pointer_x) * known_duration(duration)
    }
}

/// Duration with unknown or invalid values mapped to 0
///
/// Engines report NaN before metadata and +inf for unbounded streams.
pub fn known_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

/// Played fraction in [0, 1]; 0 while the duration is unknown
pub fn progress_fraction(current_time: f64, duration: f64) -> f64 {
    let duration = known_duration(duration);
    if duration == 0.0 || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration).clamp(0.0, 1.0)
}

/// Format seconds as `mm:ss`
///
/// Fractional seconds are truncated. Minutes are not wrapped into hours,
/// so 3600 seconds formats as `60:00`.
pub fn format_time(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
