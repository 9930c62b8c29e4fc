//! Capture arbitration between pursuers.

use std::collections::BTreeMap;

use tracing::debug;

use wn_core::AgentId;

/// Who captured whom.  The first claim on a target wins.
#[derive(Clone, Debug, Default)]
pub struct CaptureRegistry {
    captor: BTreeMap<AgentId, AgentId>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `target` for `pursuer`.  Returns `true` only for the first
    /// claim; repeated claims by the winner also return `false`.
    pub fn claim(&mut self, target: AgentId, pursuer: AgentId) -> bool {
        if let Some(&winner) = self.captor.get(&target) {
            debug!(%target, %pursuer, %winner, "capture already claimed");
            return false;
        }
        self.captor.insert(target, pursuer);
        true
    }

    pub fn captor_of(&self, target: AgentId) -> Option<AgentId> {
        self.captor.get(&target).copied()
    }

    pub fn is_captured(&self, target: AgentId) -> bool {
        self.captor.contains_key(&target)
    }

    /// Forget any capture of `target` (it left the simulation).
    pub fn release(&mut self, target: AgentId) {
        self.captor.remove(&target);
    }

    pub fn len(&self) -> usize {
        self.captor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captor.is_empty()
    }
}
