//! Pursuit parameters.

use std::time::Duration;

use wn_core::error::ensure_positive;

use crate::PursuitResult;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PursuitConfig {
    /// How far ahead the target's position is extrapolated.
    pub lead_time:        Duration,
    /// Distance under which the pursuer is intercepting.
    pub capture_distance: f32,
    /// Continuous time within `capture_distance` needed to capture.
    pub capture_hold:     Duration,
    /// Delay between capture and disengagement.
    pub disengage_grace:  Duration,
    /// Chase speed handed to the mover.
    pub speed:            f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            lead_time:        Duration::from_millis(500),
            capture_distance: 2.0,
            capture_hold:     Duration::from_millis(250),
            disengage_grace:  Duration::from_secs(1),
            speed:            8.0,
        }
    }
}

impl PursuitConfig {
    pub fn validate(&self) -> PursuitResult<()> {
        ensure_positive("capture_distance", f64::from(self.capture_distance))?;
        ensure_positive("speed", f64::from(self.speed))?;
        Ok(())
    }
}
