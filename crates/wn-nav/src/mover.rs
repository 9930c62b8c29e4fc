//! The mover contract.
//!
//! Physical motion (forces, colliders, navmesh path following) belongs to the
//! host engine.  The navigation core only hands a mover a target position
//! and reads back how far it still has to go and how fast it is moving.

use std::time::Duration;

use wn_core::{Aabb, Vec3};

/// Black-box movement capability attached to every simulated agent.
///
/// Implementations must be `Send` so the simulation can run the heading
/// cycle for many agents in parallel.
pub trait Mover: Send {
    fn position(&self) -> Vec3;

    fn velocity(&self) -> Vec3;

    /// Start moving towards `target`.  Returns `false` if the target cannot
    /// be reached; the mover then keeps its previous state.
    fn set_target(&mut self, target: Vec3) -> bool;

    /// Drop the current target and come to rest.
    fn stop(&mut self);

    /// Distance left to the current target; `0.0` when there is none.
    fn remaining_distance(&self) -> f32;

    fn is_on_navigable_surface(&self) -> bool;

    /// The point the mover is steering towards right now (the next path
    /// corner), if it has a target.
    fn steering_target(&self) -> Option<Vec3>;

    fn set_speed(&mut self, speed: f32);

    /// Integrate motion over `dt`.
    fn advance(&mut self, dt: Duration);

    /// Cheap feasibility check used by nearest-waypoint scoring.
    fn can_reach(&self, _target: Vec3) -> bool {
        true
    }
}

// ── KinematicMover ────────────────────────────────────────────────────────────

/// Straight-line mover with constant speed.
///
/// Used by tests and headless runs in place of an engine's physics body.
/// An optional navigable box rejects targets outside it, and
/// [`set_obstructed`](Self::set_obstructed) pins the mover in place to
/// reproduce a wedged agent.
#[derive(Clone, Debug)]
pub struct KinematicMover {
    pos:        Vec3,
    velocity:   Vec3,
    target:     Option<Vec3>,
    speed:      f32,
    bounds:     Option<Aabb>,
    obstructed: bool,
}

impl KinematicMover {
    pub fn new(pos: Vec3, speed: f32) -> Self {
        Self {
            pos,
            velocity: Vec3::ZERO,
            target: None,
            speed,
            bounds: None,
            obstructed: false,
        }
    }

    /// Restrict reachable targets to `bounds`.
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Teleport without changing the target.
    pub fn warp(&mut self, pos: Vec3) {
        self.pos = pos;
    }

    pub fn set_obstructed(&mut self, obstructed: bool) {
        self.obstructed = obstructed;
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

impl Mover for KinematicMover {
    fn position(&self) -> Vec3 {
        self.pos
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_target(&mut self, target: Vec3) -> bool {
        if !self.can_reach(target) {
            return false;
        }
        self.target = Some(target);
        true
    }

    fn stop(&mut self) {
        self.target = None;
        self.velocity = Vec3::ZERO;
    }

    fn remaining_distance(&self) -> f32 {
        self.target.map_or(0.0, |t| self.pos.distance(t))
    }

    fn is_on_navigable_surface(&self) -> bool {
        self.bounds.is_none_or(|b| b.contains(self.pos))
    }

    fn steering_target(&self) -> Option<Vec3> {
        self.target
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn advance(&mut self, dt: Duration) {
        let secs = dt.as_secs_f32();
        let Some(target) = self.target else {
            self.velocity = Vec3::ZERO;
            return;
        };
        if self.obstructed || secs <= 0.0 {
            self.velocity = Vec3::ZERO;
            return;
        }
        let next = self.pos.move_towards(target, self.speed * secs);
        self.velocity = (next - self.pos) * (1.0 / secs);
        self.pos = next;
    }

    fn can_reach(&self, target: Vec3) -> bool {
        self.bounds.is_none_or(|b| b.contains(target))
    }
}
