//! Spawn requests and spawn-point planning.

use tracing::info;

use wn_core::{AgentId, AgentKind, NodeId, SimRng, Vec3};
use wn_nav::NavProfile;

// ── SpawnRequest ──────────────────────────────────────────────────────────────

/// Who drives a spawned agent.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Control {
    /// Waypoint navigation with the kind's profile.
    Navigate,
    /// Chase the given agent.
    Pursue(AgentId),
    /// Moved from outside through [`Sim::mover_mut`](crate::Sim::mover_mut).
    Manual,
}

/// Everything needed to create one agent (the mover is passed separately).
#[derive(Clone, Debug)]
pub struct SpawnRequest {
    pub kind:        AgentKind,
    pub control:     Control,
    /// Starting waypoint.  Navigators without one locate the nearest node.
    pub start:       Option<NodeId>,
    /// Initial facing.  Default: +Z.
    pub facing:      Option<Vec3>,
    /// Record red crossings and collisions for this agent.
    pub of_interest: bool,
    /// Override the kind's navigation profile.
    pub profile:     Option<NavProfile>,
}

impl SpawnRequest {
    pub fn new(kind: AgentKind, control: Control) -> Self {
        Self { kind, control, start: None, facing: None, of_interest: false, profile: None }
    }

    pub fn vehicle(start: NodeId) -> Self {
        Self::new(AgentKind::Vehicle, Control::Navigate).at(start)
    }

    pub fn pedestrian(start: NodeId) -> Self {
        Self::new(AgentKind::Pedestrian, Control::Navigate).at(start)
    }

    pub fn pursuer(target: AgentId) -> Self {
        Self::new(AgentKind::Pursuer, Control::Pursue(target))
    }

    /// An externally driven agent, e.g. the player's car.
    pub fn manual(kind: AgentKind) -> Self {
        Self::new(kind, Control::Manual)
    }

    pub fn at(mut self, node: NodeId) -> Self {
        self.start = Some(node);
        self
    }

    pub fn facing(mut self, dir: Vec3) -> Self {
        self.facing = Some(dir);
        self
    }

    pub fn of_interest(mut self) -> Self {
        self.of_interest = true;
        self
    }

    pub fn with_profile(mut self, profile: NavProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

// ── SpawnPlanner ──────────────────────────────────────────────────────────────

/// A spawn position chosen by [`SpawnPlanner::place`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Placement {
    pub node:   NodeId,
    /// Ground-plane offset from the node, within `±jitter` on each axis.
    pub offset: Vec3,
}

/// Chooses how many agents to spawn and where.
///
/// Spawn points are waypoint nodes, each holding at most `per_point`
/// agents per batch.  A free point is found by random probing; after
/// `2 × points` failed probes the batch stops short.
#[derive(Clone, Debug)]
pub struct SpawnPlanner {
    points:        Vec<NodeId>,
    pub per_point: usize,
    pub min:       usize,
    pub max:       usize,
    /// Spawn a random amount in `[min, max]` instead of `target`.
    pub random:    bool,
    target:        usize,
    /// Half-extent of the random offset around a spawn point.
    pub jitter:    f32,
}

impl SpawnPlanner {
    pub fn new(points: Vec<NodeId>) -> Self {
        Self { points, per_point: 2, min: 3, max: 10, random: true, target: 8, jitter: 0.0 }
    }

    pub fn points(&self) -> &[NodeId] {
        &self.points
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Set the maintained population, clamped to `[min, max]`.
    pub fn set_target(&mut self, target: usize) {
        self.target = target.clamp(self.min, self.max.max(self.min));
    }

    /// Size of the first batch.
    pub fn initial_count(&self, rng: &mut SimRng) -> usize {
        if self.random {
            rng.range_inclusive(self.min, self.max)
        } else {
            self.target.clamp(self.min, self.max.max(self.min))
        }
    }

    /// How many agents to add to reach the target from `current`.
    pub fn deficit(&self, current: usize) -> usize {
        self.target.saturating_sub(current)
    }

    /// Pick up to `count` spawn positions.
    pub fn place(&self, rng: &mut SimRng, count: usize) -> Vec<Placement> {
        let mut used = vec![0usize; self.points.len()];
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(i) = self.free_point(rng, &used) else {
                info!(placed = out.len(), requested = count, "all spawn points at capacity");
                break;
            };
            used[i] += 1;
            let offset = Vec3::new(rng.jitter(self.jitter), 0.0, rng.jitter(self.jitter));
            out.push(Placement { node: self.points[i], offset });
        }
        out
    }

    fn free_point(&self, rng: &mut SimRng, used: &[usize]) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        (0..self.points.len() * 2)
            .map(|_| rng.index(self.points.len()))
            .find(|&i| used[i] < self.per_point)
    }
}
