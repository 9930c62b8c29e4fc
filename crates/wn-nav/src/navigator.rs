//! The per-agent navigation state machine.
//!
//! # States
//!
//! ```text
//! Uninitialized ─▶ Locating ─▶ Seeking(target) ─▶ Arriving(at) ─┬─▶ Seeking(next)
//!       ▲                          │  ▲                          └─▶ Terminated ─▶ (retire)
//!       └──── no waypoint ─────────┘  └── stall / resume without a valid target
//! ```
//!
//! `Stalled` is an orthogonal flag rather than a state: an agent that has
//! been standing still for `stall_threshold` while permitted to move gets
//! exactly one path recomputation, and the flag clears only once it is
//! moving again.
//!
//! # Ownership
//!
//! The navigator is written only by its own agent's navigation cycle
//! ([`Navigator::nav_tick`]) and by arbitration decisions delivered through
//! [`Navigator::apply_decision`].  It never touches another agent.

use std::time::Duration;

use tracing::{debug, warn};

use wn_core::{AgentId, AgentRng, NodeId, Vec3};
use wn_graph::{NearestSearch, SearchStatus, WaypointGraph};

use crate::heading::Heading;
use crate::mover::Mover;
use crate::profile::{NavConfig, NavProfile, Routing};
use crate::MotionDecision;

// ── NavState ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub enum NavState {
    /// No waypoint yet; the next navigation tick starts a search.
    Uninitialized,
    /// Batched nearest-reachable-node search in progress.
    Locating(NearestSearch),
    /// Heading for `target`.
    Seeking { target: NodeId },
    /// At `at`, waiting out the remaining pause before moving on.
    Arriving { at: NodeId, wait: Duration },
    /// End of a finite path; removed once `grace` runs out.
    Terminated { grace: Duration },
}

impl NavState {
    pub fn name(&self) -> &'static str {
        match self {
            NavState::Uninitialized    => "uninitialized",
            NavState::Locating(_)      => "locating",
            NavState::Seeking { .. }   => "seeking",
            NavState::Arriving { .. }  => "arriving",
            NavState::Terminated { .. } => "terminated",
        }
    }
}

/// Things that happened during one navigation step.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NavEvent {
    Arrived(NodeId),
    /// A finite path ended; removal follows after the grace delay.
    Terminated,
    /// Stall detected; a path recomputation was forced.
    Stalled,
    /// The grace delay ran out; the owner should remove the agent.
    Retire,
}

#[derive(Clone, Debug, Default)]
struct StallTracker {
    still_for: Duration,
    fired:     bool,
}

impl StallTracker {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Restart the timer but stay in the current episode.
    fn pause(&mut self) {
        self.still_for = Duration::ZERO;
    }
}

/// Per-agent navigation logic, parameterised by a [`NavProfile`].
#[derive(Debug)]
pub struct Navigator {
    agent:     AgentId,
    profile:   NavProfile,
    state:     NavState,
    /// Last waypoint reached (or locked onto).
    current:   Option<NodeId>,
    /// Target position currently handed to the mover.
    issued:    Option<Vec3>,
    permitted: bool,
    running:   bool,
    stall:     StallTracker,
    rng:       AgentRng,
    warned_unbound: bool,
}

impl Navigator {
    pub fn new(agent: AgentId, profile: NavProfile, seed: u64) -> Self {
        Self {
            agent,
            profile,
            state: NavState::Uninitialized,
            current: None,
            issued: None,
            permitted: true,
            running: false,
            stall: StallTracker::default(),
            rng: AgentRng::new(seed, agent),
            warned_unbound: false,
        }
    }

    /// Start from a known waypoint instead of searching for one.
    pub fn starting_at(mut self, node: NodeId) -> Self {
        self.state = NavState::Seeking { target: node };
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn profile(&self) -> &NavProfile {
        &self.profile
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn target(&self) -> Option<NodeId> {
        match self.state {
            NavState::Seeking { target } => Some(target),
            _ => None,
        }
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted
    }

    pub fn is_stalled(&self) -> bool {
        self.stall.fired
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, NavState::Terminated { .. })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Apply the speed profile to a freshly attached mover.
    pub fn attach<M: Mover + ?Sized>(&self, mover: &mut M) {
        mover.set_speed(self.current_speed());
    }

    pub fn set_running<M: Mover + ?Sized>(&mut self, running: bool, mover: &mut M) {
        self.running = running;
        mover.set_speed(self.current_speed());
    }

    fn current_speed(&self) -> f32 {
        if self.running { self.profile.run_speed } else { self.profile.speed }
    }

    /// Back to a clean `Uninitialized` state (used when re-enabling).  A
    /// terminated agent stays terminated with whatever grace it had left.
    pub fn reset<M: Mover + ?Sized>(&mut self, mover: &mut M) {
        mover.stop();
        if self.is_terminated() {
            return;
        }
        self.state = NavState::Uninitialized;
        self.current = None;
        self.issued = None;
        self.permitted = true;
        self.stall.reset();
    }

    // ── Arbitration ───────────────────────────────────────────────────────

    /// Deliver an arbitration decision.
    ///
    /// Withdrawing permission halts the mover.  Granting it resumes towards
    /// the current target if that target is still valid, otherwise forces a
    /// path recomputation first.
    pub fn apply_decision<M: Mover + ?Sized>(
        &mut self,
        decision: MotionDecision,
        graph:    &WaypointGraph,
        config:   &NavConfig,
        heading:  Heading,
        mover:    &mut M,
    ) {
        let permitted = decision.permitted();
        if permitted == self.permitted {
            return;
        }
        self.permitted = permitted;
        self.stall.pause();

        if !permitted {
            debug!(agent = %self.agent, blockers = ?decision.blockers().collect::<Vec<_>>(), "motion vetoed");
            mover.stop();
            self.issued = None;
            return;
        }

        match self.state {
            NavState::Seeking { target } => {
                let valid = graph.pos(target).is_some_and(|p| mover.can_reach(p));
                if valid {
                    self.issue(target, graph, config, mover);
                } else {
                    debug!(agent = %self.agent, %target, "veto cleared without a valid target; recomputing");
                    self.relocate(config, heading, mover);
                }
            }
            NavState::Uninitialized => self.relocate(config, heading, mover),
            _ => {}
        }
    }

    // ── Navigation cycle ──────────────────────────────────────────────────

    /// One navigation step: drive the search, detect arrival and stalls,
    /// count down waits and the termination grace.  `dt` is the time since
    /// the previous navigation step.
    pub fn nav_tick<M: Mover + ?Sized>(
        &mut self,
        graph:   &WaypointGraph,
        config:  &NavConfig,
        heading: Heading,
        mover:   &mut M,
        dt:      Duration,
    ) -> Vec<NavEvent> {
        let mut events = Vec::new();

        // Off the navigable surface the mover cannot path; wait until it
        // is placed back.
        if !self.is_terminated() && !mover.is_on_navigable_surface() {
            return events;
        }

        if matches!(self.state, NavState::Uninitialized) {
            if graph.first_node(Some(self.profile.lane)).is_none() {
                self.warn_unbound();
                return events;
            }
            self.relocate(config, heading, mover);
        }

        match &mut self.state {
            NavState::Uninitialized => {}

            NavState::Locating(search) => {
                let reach = |_: Vec3, to: Vec3| mover.can_reach(to);
                match search.step(graph, config.search_batch, &reach) {
                    SearchStatus::Pending => {}
                    SearchStatus::Empty => {
                        self.warn_unbound();
                        self.state = NavState::Uninitialized;
                    }
                    SearchStatus::Done(hit) => {
                        debug!(agent = %self.agent, node = %hit.node, fallback = hit.fallback, "located waypoint");
                        self.seek(hit.node, graph, config, mover);
                    }
                }
            }

            NavState::Seeking { target } => {
                let target = *target;
                if !self.permitted {
                    return events;
                }
                if self.issued.is_none() {
                    self.issue(target, graph, config, mover);
                    return events;
                }
                if mover.remaining_distance() <= self.profile.arrival_threshold {
                    events.push(NavEvent::Arrived(target));
                    self.current = Some(target);
                    match self.profile.wait_at_waypoint {
                        Some(wait) if !wait.is_zero() => {
                            mover.stop();
                            self.issued = None;
                            self.state = NavState::Arriving { at: target, wait };
                        }
                        _ => self.advance_from(target, graph, config, mover, &mut events),
                    }
                    return events;
                }
                if self.check_stall(mover, config, dt) {
                    events.push(NavEvent::Stalled);
                    self.relocate(config, heading, mover);
                }
            }

            NavState::Arriving { at, wait } => {
                *wait = wait.saturating_sub(dt);
                if wait.is_zero() {
                    let at = *at;
                    self.advance_from(at, graph, config, mover, &mut events);
                }
            }

            NavState::Terminated { grace } => {
                if grace.is_zero() {
                    return events;
                }
                *grace = grace.saturating_sub(dt);
                if grace.is_zero() {
                    events.push(NavEvent::Retire);
                }
            }
        }
        events
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn warn_unbound(&mut self) {
        if !self.warned_unbound {
            self.warned_unbound = true;
            warn!(agent = %self.agent, lane = ?self.profile.lane, "no waypoints available; agent stays idle");
        }
    }

    /// Start a fresh nearest-node search from the mover's position.
    fn relocate<M: Mover + ?Sized>(&mut self, config: &NavConfig, heading: Heading, mover: &mut M) {
        mover.stop();
        self.issued = None;
        let search = NearestSearch::new(mover.position(), heading.dir(), config.search_radius)
            .in_lane(self.profile.lane);
        self.state = NavState::Locating(search);
    }

    fn seek<M: Mover + ?Sized>(
        &mut self,
        target: NodeId,
        graph:  &WaypointGraph,
        config: &NavConfig,
        mover:  &mut M,
    ) {
        self.state = NavState::Seeking { target };
        self.issued = None;
        if self.permitted {
            self.issue(target, graph, config, mover);
        }
    }

    /// Hand `target` to the mover.  If the mover rejects it, walk on to the
    /// following candidates, at most once per graph node, and fall back to
    /// a fresh search when none is reachable.
    fn issue<M: Mover + ?Sized>(
        &mut self,
        target: NodeId,
        graph:  &WaypointGraph,
        config: &NavConfig,
        mover:  &mut M,
    ) {
        let mut candidate = target;
        for _ in 0..graph.node_count().max(1) {
            let Some(pos) = graph.pos(candidate) else { break };
            if mover.set_target(pos) {
                self.issued = Some(pos);
                self.state = NavState::Seeking { target: candidate };
                return;
            }
            debug!(agent = %self.agent, node = %candidate, "waypoint unreachable; skipping");
            match self.choose_after(candidate, graph, config) {
                Some(next) => candidate = next,
                None => break,
            }
        }
        debug!(agent = %self.agent, %target, "no reachable waypoint from here; searching again");
        mover.stop();
        self.issued = None;
        self.state = NavState::Uninitialized;
    }

    fn choose_after(&mut self, node: NodeId, graph: &WaypointGraph, config: &NavConfig) -> Option<NodeId> {
        match self.profile.routing {
            Routing::Sequential => {
                graph.next_target(node, &mut self.rng, config.link_probability, self.profile.cyclic)
            }
            Routing::Random => graph.random_target(node, &mut self.rng),
        }
    }

    fn advance_from<M: Mover + ?Sized>(
        &mut self,
        node:   NodeId,
        graph:  &WaypointGraph,
        config: &NavConfig,
        mover:  &mut M,
        events: &mut Vec<NavEvent>,
    ) {
        match self.choose_after(node, graph, config) {
            Some(next) => self.seek(next, graph, config, mover),
            None => {
                debug!(agent = %self.agent, %node, "reached terminal waypoint");
                mover.stop();
                self.issued = None;
                self.state = NavState::Terminated { grace: config.terminate_grace };
                events.push(NavEvent::Terminated);
                if config.terminate_grace.is_zero() {
                    events.push(NavEvent::Retire);
                }
            }
        }
    }

    /// Returns `true` exactly once per stall episode.
    fn check_stall<M: Mover + ?Sized>(&mut self, mover: &M, config: &NavConfig, dt: Duration) -> bool {
        if mover.velocity().length() >= config.stall_speed {
            self.stall.reset();
            return false;
        }
        self.stall.still_for += dt;
        if self.stall.fired || self.stall.still_for < config.stall_threshold {
            return false;
        }
        self.stall.fired = true;
        debug!(agent = %self.agent, still_for = ?self.stall.still_for, "stall detected; recomputing path");
        true
    }
}
