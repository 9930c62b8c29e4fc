//! Typed notifications emitted to the surrounding game logic.

use wn_core::{AgentId, AgentKind, NodeId, SignalId, Vec3};
use wn_signal::SignalPhase;

/// Why an agent left the simulation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalReason {
    /// Reached the end of a finite path and its grace ran out.
    Terminated,
    /// A pursuer finished (captured, lost its target, or lost the race).
    Disengaged,
    /// Removed from outside via [`Sim::despawn`](crate::Sim::despawn).
    Despawned,
}

impl RemovalReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RemovalReason::Terminated => "terminated",
            RemovalReason::Disengaged => "disengaged",
            RemovalReason::Despawned  => "despawned",
        }
    }
}

/// Everything the core reports.  Events are buffered during a tick and
/// handed to the observer at the end of it, in emission order.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimEvent {
    Spawned             { agent: AgentId, kind: AgentKind },
    PhaseChanged        { signal: SignalId, phase: SignalPhase },
    Arrived             { agent: AgentId, node: NodeId },
    /// A finite path ended; removal follows after the grace delay.
    Terminated          { agent: AgentId },
    /// Diagnostic: the agent stood still while permitted and was re-routed.
    Stalled             { agent: AgentId },
    /// Left a signal zone while it was red.
    Violation           { agent: AgentId, signal: SignalId },
    Collision           { agent: AgentId, other: AgentId },
    OffenseLimitReached { agent: AgentId, offenses: u32 },
    Captured            { pursuer: AgentId, target: AgentId },
    Removed             { agent: AgentId, reason: RemovalReason },
}

impl SimEvent {
    /// Stable lowercase name, used as the `event` column in output files.
    pub fn name(&self) -> &'static str {
        match self {
            SimEvent::Spawned { .. }             => "spawned",
            SimEvent::PhaseChanged { .. }        => "phase_changed",
            SimEvent::Arrived { .. }             => "arrived",
            SimEvent::Terminated { .. }          => "terminated",
            SimEvent::Stalled { .. }             => "stalled",
            SimEvent::Violation { .. }           => "violation",
            SimEvent::Collision { .. }           => "collision",
            SimEvent::OffenseLimitReached { .. } => "offense_limit",
            SimEvent::Captured { .. }            => "captured",
            SimEvent::Removed { .. }             => "removed",
        }
    }

    /// The agent the event is about (the pursuer for captures).
    pub fn agent(&self) -> Option<AgentId> {
        match *self {
            SimEvent::PhaseChanged { .. } => None,
            SimEvent::Spawned { agent, .. }
            | SimEvent::Arrived { agent, .. }
            | SimEvent::Terminated { agent }
            | SimEvent::Stalled { agent }
            | SimEvent::Violation { agent, .. }
            | SimEvent::Collision { agent, .. }
            | SimEvent::OffenseLimitReached { agent, .. }
            | SimEvent::Removed { agent, .. } => Some(agent),
            SimEvent::Captured { pursuer, .. } => Some(pursuer),
        }
    }
}

/// Read-only per-agent state handed to observers at snapshot ticks.
#[derive(Clone, PartialEq, Debug)]
pub struct AgentSnapshot {
    pub agent:     AgentId,
    pub kind:      AgentKind,
    pub pos:       Vec3,
    pub vel:       Vec3,
    pub heading:   Vec3,
    /// Navigator or pursuit state name; `"manual"` for externally driven agents.
    pub state:     &'static str,
    pub target:    Option<NodeId>,
    pub permitted: bool,
    pub enabled:   bool,
}
