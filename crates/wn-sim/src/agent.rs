//! Per-agent state owned by the simulation.

use std::collections::BTreeSet;

use wn_core::{AgentId, AgentKind, SignalId};
use wn_nav::{Heading, Mover, Navigator, Vetoes};
use wn_pursuit::PursuitController;

use crate::event::{AgentSnapshot, RemovalReason};
use crate::record::ViolationRecord;

/// The logic driving an agent.
#[derive(Debug)]
pub enum Brain {
    Navigator(Navigator),
    Pursuit(PursuitController),
    /// Driven from outside; the simulation only moves its mover.
    Manual,
}

impl Brain {
    pub fn state_name(&self) -> &'static str {
        match self {
            Brain::Navigator(nav) => nav.state().name(),
            Brain::Pursuit(ctl)   => ctl.state().name(),
            Brain::Manual         => "manual",
        }
    }
}

/// One simulated agent.  Only the simulation mutates it; each update cycle
/// writes its own fields (heading cycle → `heading`, navigation cycle →
/// `brain` and the mover target, zone pass → `vetoes` and presence sets).
#[derive(Debug)]
pub struct Agent<M> {
    pub(crate) id:          AgentId,
    pub(crate) kind:        AgentKind,
    pub(crate) mover:       M,
    pub(crate) heading:     Heading,
    pub(crate) brain:       Brain,
    pub(crate) vetoes:      Vetoes,
    pub(crate) enabled:     bool,
    pub(crate) of_interest: bool,
    pub(crate) record:      ViolationRecord,
    /// Signal zone the detector last placed this agent in.
    pub(crate) zone:        Option<SignalId>,
    pub(crate) sensed:      BTreeSet<AgentId>,
    pub(crate) touching:    BTreeSet<AgentId>,
    pub(crate) retire:      Option<RemovalReason>,
}

impl<M: Mover> Agent<M> {
    pub(crate) fn new(id: AgentId, kind: AgentKind, mover: M, heading: Heading, brain: Brain) -> Self {
        Self {
            id,
            kind,
            mover,
            heading,
            brain,
            vetoes:      Vetoes::new(),
            enabled:     true,
            of_interest: false,
            record:      ViolationRecord::default(),
            zone:        None,
            sensed:      BTreeSet::new(),
            touching:    BTreeSet::new(),
            retire:      None,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn mover(&self) -> &M {
        &self.mover
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn navigator(&self) -> Option<&Navigator> {
        match &self.brain {
            Brain::Navigator(nav) => Some(nav),
            _ => None,
        }
    }

    pub fn pursuit(&self) -> Option<&PursuitController> {
        match &self.brain {
            Brain::Pursuit(ctl) => Some(ctl),
            _ => None,
        }
    }

    pub fn vetoes(&self) -> &Vetoes {
        &self.vetoes
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_of_interest(&self) -> bool {
        self.of_interest
    }

    pub fn record(&self) -> &ViolationRecord {
        &self.record
    }

    /// Whether a signal zone binds this agent's motion.
    pub fn obeys_signals(&self) -> bool {
        self.navigator().is_some_and(|n| n.profile().obeys_signals)
    }

    /// Whether a forward sensor gates this agent's motion.  Only navigating
    /// vehicles carry one; pedestrians weave around each other.
    pub(crate) fn has_sensor(&self) -> bool {
        self.kind == AgentKind::Vehicle && matches!(self.brain, Brain::Navigator(_))
    }

    /// Whether touching an agent of interest is a collision.  Traffic and
    /// pedestrians are; a pursuer's contact is a capture instead.
    pub(crate) fn is_collidable(&self) -> bool {
        matches!(self.kind, AgentKind::Vehicle | AgentKind::Pedestrian) && !matches!(self.brain, Brain::Pursuit(_))
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        let (target, permitted) = match &self.brain {
            Brain::Navigator(nav) => (nav.target(), nav.is_permitted()),
            _ => (None, true),
        };
        AgentSnapshot {
            agent:     self.id,
            kind:      self.kind,
            pos:       self.mover.position(),
            vel:       self.mover.velocity(),
            heading:   self.heading.dir(),
            state:     self.brain.state_name(),
            target,
            permitted,
            enabled:   self.enabled,
        }
    }
}
