//! Volume control with mute
//!
//! Volume is a linear fraction in [0, 1], passed to engines unchanged.
//! Only the volume buttons snap to the step grid, so that repeated steps
//! land exactly on 0.0 and 1.0 instead of drifting by float error.

/// Values within this distance of a grid point count as on it
const GRID_TOLERANCE: f64 = 1e-6;

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Stored volume (0.0-1.0), preserved while muted
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume (0.0-1.0, clamped; NaN maps to 0)
    pub fn new(level: f64) -> Self {
        Self {
            level: clamp_level(level),
            muted: false,
        }
    }

    /// Set volume (clamped to 0.0-1.0; NaN maps to 0)
    pub fn set(&mut self, level: f64) {
        self.level = clamp_level(level);
    }

    /// Stored volume, ignoring mute
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Stored volume as a whole percentage, for display
    pub fn percent(&self) -> u8 {
        (self.level * 100.0).round() as u8
    }

    /// Move up to the next multiple of `step`, saturating at 1.0
    pub fn increase(&mut self, step: f64) {
        if !(step.is_finite() && step > 0.0) {
            return;
        }
        let index = (self.level / step + GRID_TOLERANCE).floor() + 1.0;
        self.level = snap(index * step).min(1.0);
    }

    /// Move down to the previous multiple of `step`, saturating at 0.0
    pub fn decrease(&mut self, step: f64) {
        if !(step.is_finite() && step > 0.0) {
            return;
        }
        let index = (self.level / step - GRID_TOLERANCE).ceil() - 1.0;
        self.level = snap(index * step).max(0.0);
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Effective output gain
    ///
    /// Returns 0.0 if muted, otherwise the stored level
    pub fn gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.5)
    }
}

fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        return 0.0;
    }
    level.clamp(0.0, 1.0)
}

/// Drop the float noise of `index * step` (51 * 0.01 becomes 0.51)
fn snap(value: f64) -> f64 {
    (value * 1e9).round() / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
        assert_eq!(vol.percent(), 80);
        assert!(!vol.is_muted());
        assert_eq!(Volume::default().level(), 0.5);
    }

    #[test]
    fn set_keeps_precision_and_clamps() {
        let mut vol = Volume::new(0.333);
        assert_eq!(vol.level(), 0.333);

        vol.set(0.555);
        assert_eq!(vol.level(), 0.555);
        assert_eq!(vol.percent(), 56);

        vol.set(1.7);
        assert_eq!(vol.level(), 1.0);

        vol.set(-0.2);
        assert_eq!(vol.level(), 0.0);

        vol.set(f64::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn stepping_saturates_at_bounds() {
        let mut vol = Volume::new(0.99);
        for _ in 0..5 {
            vol.increase(0.01);
        }
        assert_eq!(vol.level(), 1.0);

        let mut vol = Volume::new(0.01);
        for _ in 0..5 {
            vol.decrease(0.01);
        }
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn steps_land_on_the_grid() {
        let mut vol = Volume::new(0.5);
        vol.increase(0.01);
        vol.increase(0.01);
        assert_eq!(vol.level(), 0.52);
        vol.decrease(0.01);
        assert_eq!(vol.level(), 0.51);

        // Off-grid values move to the neighbouring grid point
        let mut vol = Volume::new(0.555);
        vol.increase(0.01);
        assert_eq!(vol.level(), 0.56);
        let mut vol = Volume::new(0.555);
        vol.decrease(0.01);
        assert_eq!(vol.level(), 0.55);
    }

    #[test]
    fn fractional_percent_step_is_honored() {
        let mut vol = Volume::new(0.0);
        vol.increase(0.015);
        assert_eq!(vol.level(), 0.015);
        vol.increase(0.015);
        assert_eq!(vol.level(), 0.03);

        let mut vol = Volume::new(0.995);
        vol.increase(0.015);
        assert_eq!(vol.level(), 1.0);
    }

    #[test]
    fn invalid_step_is_ignored() {
        let mut vol = Volume::new(0.4);
        vol.increase(0.0);
        vol.decrease(f64::NAN);
        assert_eq!(vol.level(), 0.4);
    }

    #[test]
    fn toggle_mute_preserves_level() {
        let mut vol = Volume::new(0.8);
        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.8);
        assert_eq!(vol.gain(), 0.0);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.gain(), 0.8);

        vol.toggle_mute();
        vol.unmute();
        assert!(!vol.is_muted());
    }
}
