//! Plain data row types written by output backends.

use wn_core::{NodeId, Tick};
use wn_sim::{AgentSnapshot, SimEvent};

/// One dispatched [`SimEvent`], flattened to fixed columns.
///
/// `subject` is whatever the event is about besides the agent: the signal
/// for phase changes and violations, the node for arrivals, the other agent
/// for collisions, and the target for captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub tick:    u64,
    pub event:   &'static str,
    pub agent:   Option<u32>,
    pub subject: Option<u32>,
    pub detail:  String,
}

impl EventRow {
    pub fn new(tick: Tick, event: &SimEvent) -> Self {
        let (subject, detail) = match *event {
            SimEvent::Spawned { kind, .. }                => (None, kind.as_str().to_owned()),
            SimEvent::PhaseChanged { signal, phase }      => (Some(signal.0), phase.as_str().to_owned()),
            SimEvent::Arrived { node, .. }                => (Some(node.0), String::new()),
            SimEvent::Terminated { .. }
            | SimEvent::Stalled { .. }                    => (None, String::new()),
            SimEvent::Violation { signal, .. }            => (Some(signal.0), String::new()),
            SimEvent::Collision { other, .. }             => (Some(other.0), String::new()),
            SimEvent::OffenseLimitReached { offenses, .. } => (None, offenses.to_string()),
            SimEvent::Captured { target, .. }             => (Some(target.0), String::new()),
            SimEvent::Removed { reason, .. }              => (None, reason.as_str().to_owned()),
        };
        Self {
            tick:  tick.0,
            event: event.name(),
            agent: event.agent().map(|a| a.0),
            subject,
            detail,
        }
    }
}

/// Per-tick counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:       u64,
    /// Simulated milliseconds since tick 0.
    pub elapsed_ms: u64,
    pub events:     u64,
}

/// One agent's state at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:        u64,
    pub agent_id:    u32,
    pub kind:        &'static str,
    pub x:           f32,
    pub y:           f32,
    pub z:           f32,
    pub speed:       f32,
    pub state:       &'static str,
    /// Waypoint being sought; `u32::MAX` when the agent is not seeking one.
    pub target_node: u32,
    pub permitted:   bool,
    pub enabled:     bool,
}

impl AgentSnapshotRow {
    pub fn new(tick: Tick, snap: &AgentSnapshot) -> Self {
        Self {
            tick:        tick.0,
            agent_id:    snap.agent.0,
            kind:        snap.kind.as_str(),
            x:           snap.pos.x,
            y:           snap.pos.y,
            z:           snap.pos.z,
            speed:       snap.vel.length(),
            state:       snap.state,
            target_node: snap.target.unwrap_or(NodeId::INVALID).0,
            permitted:   snap.permitted,
            enabled:     snap.enabled,
        }
    }
}
