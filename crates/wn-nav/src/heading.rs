//! High-rate facing update.

use std::time::Duration;

use wn_core::Vec3;

use crate::mover::Mover;

/// Below this squared speed the agent is treated as stationary and keeps
/// its facing.
const MIN_TURN_SPEED_SQ: f32 = 0.01;

/// An agent's facing direction on the ground plane.
///
/// Written only by [`Heading::update`] on the heading cycle; the navigation
/// cycle reads it as a snapshot when it starts a nearest-waypoint search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Heading(Vec3);

impl Default for Heading {
    fn default() -> Self {
        Heading(Vec3::FORWARD)
    }
}

impl Heading {
    /// Facing along `dir` (flattened); zero input yields +Z.
    pub fn new(dir: Vec3) -> Self {
        let d = dir.flat().normalize_or_zero();
        if d == Vec3::ZERO { Self::default() } else { Heading(d) }
    }

    #[inline]
    pub fn dir(self) -> Vec3 {
        self.0
    }

    /// Turn towards the mover's steering target by `turn_rate × dt` of the
    /// remaining angle.
    pub fn update<M: Mover + ?Sized>(&mut self, mover: &M, dt: Duration, turn_rate: f32) {
        if mover.velocity().length_squared() <= MIN_TURN_SPEED_SQ {
            return;
        }
        let Some(steer) = mover.steering_target() else { return };
        let desired = (steer - mover.position()).flat().normalize_or_zero();
        if desired == Vec3::ZERO {
            return;
        }
        let t = (turn_rate * dt.as_secs_f32()).min(1.0);
        let turned = self.0.lerp(desired, t).normalize_or_zero();
        // Exactly opposite directions lerp through zero; snap instead.
        self.0 = if turned == Vec3::ZERO { desired } else { turned };
    }
}
