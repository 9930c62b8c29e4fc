//! Movement arbitration.
//!
//! An agent may move only when no veto is active:
//!
//! ```text
//! signal veto    = bound signal present AND NOT can_proceed
//! proximity veto = forward-sensor occupancy > 0
//! permitted      = NOT signal veto AND NOT proximity veto
//! ```
//!
//! The signal veto is checked first, so a red or yellow bound signal stops
//! the agent whatever the sensor says.  Both vetoes gate independently:
//! clearing one never releases an agent the other still holds.

use wn_core::{AgentId, SignalId};
use wn_signal::{ZoneExit, ZoneMembership};

/// A named reason an agent is held.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Blocker {
    Signal,
    Proximity,
}

impl Blocker {
    pub fn as_str(self) -> &'static str {
        match self {
            Blocker::Signal    => "signal",
            Blocker::Proximity => "proximity",
        }
    }
}

/// One arbitration outcome.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MotionDecision {
    pub signal:    bool,
    pub proximity: bool,
}

impl MotionDecision {
    pub const GO: MotionDecision = MotionDecision { signal: false, proximity: false };

    #[inline]
    pub fn permitted(self) -> bool {
        !self.signal && !self.proximity
    }

    /// Active blockers, signal first.
    pub fn blockers(self) -> impl Iterator<Item = Blocker> {
        [(self.signal, Blocker::Signal), (self.proximity, Blocker::Proximity)]
            .into_iter()
            .filter_map(|(on, b)| on.then_some(b))
    }
}

/// Veto sources attached to one agent.
#[derive(Clone, Debug, Default)]
pub struct Vetoes {
    signal: Option<SignalId>,
    sensor: ZoneMembership<AgentId>,
}

impl Vetoes {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Signal binding ────────────────────────────────────────────────────

    pub fn bind_signal(&mut self, signal: SignalId) {
        self.signal = Some(signal);
    }

    /// Release the binding if it still points at `signal`.
    pub fn unbind_signal(&mut self, signal: SignalId) {
        if self.signal == Some(signal) {
            self.signal = None;
        }
    }

    #[inline]
    pub fn bound_signal(&self) -> Option<SignalId> {
        self.signal
    }

    // ── Forward sensor ────────────────────────────────────────────────────

    /// Another agent entered the forward sensor.  Returns its new count.
    pub fn sensor_enter(&mut self, other: AgentId) -> u32 {
        self.sensor.enter(other)
    }

    pub fn sensor_exit(&mut self, other: AgentId) -> ZoneExit {
        self.sensor.exit(other)
    }

    /// Drop `other` from the sensor regardless of its count.
    pub fn sensor_forget(&mut self, other: AgentId) -> bool {
        self.sensor.remove(other)
    }

    pub fn sensor_occupants(&self) -> Vec<AgentId> {
        self.sensor.occupants()
    }

    #[inline]
    pub fn proximity_count(&self) -> usize {
        self.sensor.len()
    }

    pub fn clear(&mut self) {
        self.signal = None;
        self.sensor.clear();
    }

    /// Combine all vetoes.  `signal_can_proceed` is the current
    /// `can_proceed` of the bound signal and is ignored when none is bound.
    pub fn decide(&self, signal_can_proceed: bool) -> MotionDecision {
        MotionDecision {
            signal:    self.signal.is_some() && !signal_can_proceed,
            proximity: !self.sensor.is_empty(),
        }
    }
}
