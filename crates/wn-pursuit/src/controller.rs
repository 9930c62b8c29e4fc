//! The pursuit state machine.
//!
//! ```text
//! Approach ⇄ Intercept ─(held ≥ capture_hold, claim won)─▶ Captured ─(grace)─▶ Disengaged
//!     │          │
//!     └──────────┴─(target gone, or captured by someone else)─────────────────▶ Disengaged
//! ```
//!
//! `Approach` and `Intercept` share the steering logic; `Intercept` only
//! records that the target is within `capture_distance`.  Capture is
//! terminal: a controller never re-targets.

use std::time::Duration;

use tracing::debug;

use wn_core::{AgentId, Vec3};
use wn_nav::Mover;

use crate::config::PursuitConfig;
use crate::registry::CaptureRegistry;

/// Where to steer: `target_pos + target_vel × lead_time`.
#[inline]
pub fn predict_intercept(target_pos: Vec3, target_vel: Vec3, lead_time: Duration) -> Vec3 {
    target_pos + target_vel * lead_time.as_secs_f32()
}

/// Read-only view of the target, taken before the pursuer updates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TargetSnapshot {
    pub pos: Vec3,
    pub vel: Vec3,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum PursuitState {
    Approach,
    /// Within capture distance for `held` so far.
    Intercept { held: Duration },
    /// Capture emitted; disengages once `grace` runs out.
    Captured { grace: Duration },
    Disengaged,
}

impl PursuitState {
    pub fn name(self) -> &'static str {
        match self {
            PursuitState::Approach          => "approach",
            PursuitState::Intercept { .. }  => "intercept",
            PursuitState::Captured { .. }   => "captured",
            PursuitState::Disengaged        => "disengaged",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PursuitEvent {
    /// This pursuer won the capture of the target.
    Captured(AgentId),
    /// Pursuit is over; the owner should remove the pursuer.
    Disengaged,
}

#[derive(Clone, Debug)]
pub struct PursuitController {
    pursuer: AgentId,
    target:  AgentId,
    state:   PursuitState,
}

impl PursuitController {
    pub fn new(pursuer: AgentId, target: AgentId) -> Self {
        Self { pursuer, target, state: PursuitState::Approach }
    }

    pub fn pursuer(&self) -> AgentId {
        self.pursuer
    }

    pub fn target(&self) -> AgentId {
        self.target
    }

    pub fn state(&self) -> PursuitState {
        self.state
    }

    pub fn is_chasing(&self) -> bool {
        matches!(self.state, PursuitState::Approach | PursuitState::Intercept { .. })
    }

    /// Apply the chase speed to a freshly attached mover.
    pub fn attach<M: Mover + ?Sized>(&self, config: &PursuitConfig, mover: &mut M) {
        mover.set_speed(config.speed);
    }

    /// One pursuit step.  `target` is `None` when the target no longer
    /// exists.
    pub fn tick<M: Mover + ?Sized>(
        &mut self,
        target:   Option<TargetSnapshot>,
        registry: &mut CaptureRegistry,
        config:   &PursuitConfig,
        mover:    &mut M,
        dt:       Duration,
    ) -> Vec<PursuitEvent> {
        let mut events = Vec::new();
        match self.state {
            PursuitState::Disengaged => {}

            PursuitState::Captured { grace } => {
                let grace = grace.saturating_sub(dt);
                if grace.is_zero() {
                    self.disengage(mover, &mut events);
                } else {
                    self.state = PursuitState::Captured { grace };
                }
            }

            PursuitState::Approach | PursuitState::Intercept { .. } => {
                let Some(snap) = target else {
                    debug!(pursuer = %self.pursuer, target = %self.target, "target lost");
                    self.disengage(mover, &mut events);
                    return events;
                };
                if registry.captor_of(self.target).is_some_and(|c| c != self.pursuer) {
                    debug!(pursuer = %self.pursuer, target = %self.target, "target captured by another pursuer");
                    self.disengage(mover, &mut events);
                    return events;
                }

                let aim = predict_intercept(snap.pos, snap.vel, config.lead_time);
                if !mover.set_target(aim) {
                    mover.set_target(snap.pos);
                }

                if mover.position().distance(snap.pos) >= config.capture_distance {
                    self.state = PursuitState::Approach;
                    return events;
                }

                let held = match self.state {
                    PursuitState::Intercept { held } => held + dt,
                    _ => dt,
                };
                if held < config.capture_hold {
                    self.state = PursuitState::Intercept { held };
                    return events;
                }

                if registry.claim(self.target, self.pursuer) {
                    debug!(pursuer = %self.pursuer, target = %self.target, "target captured");
                    mover.stop();
                    events.push(PursuitEvent::Captured(self.target));
                    if config.disengage_grace.is_zero() {
                        self.disengage(mover, &mut events);
                    } else {
                        self.state = PursuitState::Captured { grace: config.disengage_grace };
                    }
                } else {
                    self.disengage(mover, &mut events);
                }
            }
        }
        events
    }

    fn disengage<M: Mover + ?Sized>(&mut self, mover: &mut M, events: &mut Vec<PursuitEvent>) {
        mover.stop();
        self.state = PursuitState::Disengaged;
        events.push(PursuitEvent::Disengaged);
    }
}
