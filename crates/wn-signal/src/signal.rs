//! The traffic signal phase machine.

use std::time::Duration;

use tracing::debug;

use wn_core::error::ensure_positive;
use wn_core::{Aabb, AgentId, SignalId, Vec3};

use crate::membership::{ZoneExit, ZoneMembership};
use crate::SignalResult;

// ── SignalPhase ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalPhase {
    Green,
    Yellow,
    Red,
}

impl SignalPhase {
    /// The phase that follows `self` in the cycle.
    pub fn next(self) -> SignalPhase {
        match self {
            SignalPhase::Green  => SignalPhase::Yellow,
            SignalPhase::Yellow => SignalPhase::Red,
            SignalPhase::Red    => SignalPhase::Green,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalPhase::Green  => "green",
            SignalPhase::Yellow => "yellow",
            SignalPhase::Red    => "red",
        }
    }
}

impl std::fmt::Display for SignalPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── SignalTimings ─────────────────────────────────────────────────────────────

/// Phase durations.  Default: green 5 s, yellow 2 s, red 5 s.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignalTimings {
    pub green:  Duration,
    pub yellow: Duration,
    pub red:    Duration,
}

impl Default for SignalTimings {
    fn default() -> Self {
        Self {
            green:  Duration::from_secs(5),
            yellow: Duration::from_secs(2),
            red:    Duration::from_secs(5),
        }
    }
}

impl SignalTimings {
    pub fn duration_of(&self, phase: SignalPhase) -> Duration {
        match phase {
            SignalPhase::Green  => self.green,
            SignalPhase::Yellow => self.yellow,
            SignalPhase::Red    => self.red,
        }
    }

    pub fn cycle(&self) -> Duration {
        self.green + self.yellow + self.red
    }

    pub fn validate(&self) -> SignalResult<()> {
        ensure_positive("green duration", self.green.as_secs_f64())?;
        ensure_positive("yellow duration", self.yellow.as_secs_f64())?;
        ensure_positive("red duration", self.red.as_secs_f64())?;
        Ok(())
    }
}

// ── ExitOutcome ───────────────────────────────────────────────────────────────

/// What a zone-exit notification amounted to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ExitOutcome {
    /// The agent was not inside; the event is ignored.
    NotPresent,
    /// Another overlapping trigger still holds the agent inside.
    StillInside,
    /// The agent left while the phase was green or yellow.
    Cleared,
    /// The agent left while the phase was red.
    Violation,
}

// ── Signal ────────────────────────────────────────────────────────────────────

/// One intersection's signal: a cyclic phase machine plus its zone.
///
/// The phase is written only by [`Signal::advance`]; agents only read it
/// through [`Signal::can_proceed`] and report presence through
/// [`Signal::on_enter`] / [`Signal::on_exit`].
#[derive(Clone, Debug)]
pub struct Signal {
    id:       SignalId,
    phase:    SignalPhase,
    timings:  SignalTimings,
    in_phase: Duration,
    zone:     Aabb,
    members:  ZoneMembership<AgentId>,
}

impl Signal {
    /// A signal starting at the beginning of its green phase.
    pub fn new(id: SignalId, zone: Aabb, timings: SignalTimings) -> SignalResult<Self> {
        timings.validate()?;
        Ok(Self {
            id,
            phase: SignalPhase::Green,
            timings,
            in_phase: Duration::ZERO,
            zone,
            members: ZoneMembership::new(),
        })
    }

    /// Start the cycle at the beginning of `phase` instead of green.
    pub fn starting_in(mut self, phase: SignalPhase) -> Self {
        self.phase = phase;
        self.in_phase = Duration::ZERO;
        self
    }

    #[inline]
    pub fn id(&self) -> SignalId {
        self.id
    }

    #[inline]
    pub fn phase(&self) -> SignalPhase {
        self.phase
    }

    /// Whether bound agents may move: true iff the phase is green.
    #[inline]
    pub fn can_proceed(&self) -> bool {
        self.phase == SignalPhase::Green
    }

    pub fn timings(&self) -> &SignalTimings {
        &self.timings
    }

    pub fn zone(&self) -> &Aabb {
        &self.zone
    }

    #[inline]
    pub fn zone_contains(&self, pos: Vec3) -> bool {
        self.zone.contains(pos)
    }

    /// Time left before the next phase change.
    pub fn remaining_in_phase(&self) -> Duration {
        self.timings.duration_of(self.phase).saturating_sub(self.in_phase)
    }

    /// Advance the cycle by `dt`.  Returns the new phase if at least one
    /// transition happened (the last one when `dt` spans several).
    pub fn advance(&mut self, dt: Duration) -> Option<SignalPhase> {
        self.in_phase += dt;
        let mut changed = None;
        loop {
            let len = self.timings.duration_of(self.phase);
            if self.in_phase < len {
                break;
            }
            self.in_phase -= len;
            self.phase = self.phase.next();
            changed = Some(self.phase);
            debug!(signal = %self.id, phase = %self.phase, "signal phase changed");
        }
        changed
    }

    // ── Zone occupancy ────────────────────────────────────────────────────

    /// Register an enter event.  Entering never produces a violation.
    /// Returns `true` when the agent just became present.
    pub fn on_enter(&mut self, agent: AgentId) -> bool {
        self.members.enter(agent) == 1
    }

    /// Register an exit event and judge compliance.
    ///
    /// Only the exit that actually takes the agent out of the zone is
    /// judged, and only a red phase at that moment is a violation.
    pub fn on_exit(&mut self, agent: AgentId) -> ExitOutcome {
        match self.members.exit(agent) {
            ZoneExit::Absent         => ExitOutcome::NotPresent,
            ZoneExit::StillInside(_) => ExitOutcome::StillInside,
            ZoneExit::Left if self.phase == SignalPhase::Red => ExitOutcome::Violation,
            ZoneExit::Left           => ExitOutcome::Cleared,
        }
    }

    /// Drop `agent` from the zone without judging it (despawn).
    pub fn forget(&mut self, agent: AgentId) -> bool {
        self.members.remove(agent)
    }

    pub fn members(&self) -> &ZoneMembership<AgentId> {
        &self.members
    }

    #[inline]
    pub fn is_inside(&self, agent: AgentId) -> bool {
        self.members.contains(agent)
    }
}
