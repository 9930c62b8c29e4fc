//! Registry of all signals in a scene.
//!
//! Signals are created at scene setup and live for the whole run; the
//! registry hands out dense `SignalId`s and is passed explicitly to whoever
//! needs it.

use std::time::Duration;

use wn_core::{Aabb, AgentId, SignalId, Vec3};

use crate::signal::{Signal, SignalPhase, SignalTimings};
use crate::{SignalError, SignalResult};

#[derive(Clone, Debug, Default)]
pub struct SignalNetwork {
    signals: Vec<Signal>,
}

impl SignalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signal starting in green.
    pub fn add(&mut self, zone: Aabb, timings: SignalTimings) -> SignalResult<SignalId> {
        self.add_starting_in(zone, timings, SignalPhase::Green)
    }

    pub fn add_starting_in(
        &mut self,
        zone:    Aabb,
        timings: SignalTimings,
        phase:   SignalPhase,
    ) -> SignalResult<SignalId> {
        let id = SignalId(self.signals.len() as u32);
        self.signals.push(Signal::new(id, zone, timings)?.starting_in(phase));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn get(&self, id: SignalId) -> Option<&Signal> {
        self.signals.get(id.index())
    }

    pub fn get_mut(&mut self, id: SignalId) -> SignalResult<&mut Signal> {
        self.signals.get_mut(id.index()).ok_or(SignalError::UnknownSignal(id))
    }

    /// `can_proceed` of `id`; unknown signals never block.
    pub fn can_proceed(&self, id: SignalId) -> bool {
        self.get(id).is_none_or(Signal::can_proceed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Signal> {
        self.signals.iter_mut()
    }

    /// Advance every signal by `dt`, returning the ones whose phase changed.
    pub fn advance_all(&mut self, dt: Duration) -> Vec<(SignalId, SignalPhase)> {
        self.signals
            .iter_mut()
            .filter_map(|s| s.advance(dt).map(|p| (s.id(), p)))
            .collect()
    }

    /// First signal whose zone contains `pos`.
    pub fn zone_at(&self, pos: Vec3) -> Option<SignalId> {
        self.signals.iter().find(|s| s.zone_contains(pos)).map(Signal::id)
    }

    /// Remove `agent` from every zone without judging it.
    pub fn forget_agent(&mut self, agent: AgentId) {
        for s in &mut self.signals {
            s.forget(agent);
        }
    }
}
