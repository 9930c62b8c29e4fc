//! Simulation observer trait and the in-memory event log.

use wn_core::{AgentId, NodeId, SignalId, Tick};

use crate::event::{AgentSnapshot, SimEvent};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default implementations.  The default
/// [`on_event`](Self::on_event) fans out to the typed hooks
/// (`on_violation`, `on_captured`, `on_arrived`, `on_terminated`), so an
/// observer either overrides `on_event` to see everything or overrides just
/// the hooks it cares about.
///
/// # Example: violation counter
///
/// ```rust,ignore
/// struct Fines(u32);
///
/// impl SimObserver for Fines {
///     fn on_violation(&mut self, _tick: Tick, _agent: AgentId, _signal: SignalId) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per event, in emission order.
    fn on_event(&mut self, tick: Tick, event: &SimEvent) {
        match *event {
            SimEvent::Violation { agent, signal }  => self.on_violation(tick, agent, signal),
            SimEvent::Captured { target, .. }      => self.on_captured(tick, target),
            SimEvent::Arrived { agent, node }      => self.on_arrived(tick, agent, node),
            SimEvent::Terminated { agent }         => self.on_terminated(tick, agent),
            _ => {}
        }
    }

    /// An agent left a signal zone on red.
    fn on_violation(&mut self, _tick: Tick, _agent: AgentId, _signal: SignalId) {}

    /// A pursuer caught `target`.
    fn on_captured(&mut self, _tick: Tick, _target: AgentId) {}

    fn on_arrived(&mut self, _tick: Tick, _agent: AgentId, _node: NodeId) {}

    fn on_terminated(&mut self, _tick: Tick, _agent: AgentId) {}

    /// Called at the end of each tick with the number of events dispatched.
    fn on_tick_end(&mut self, _tick: Tick, _events: usize) {}

    /// Called every `config.sim.output_interval_ticks` ticks.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &[AgentSnapshot]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Keeps every event with the tick it was dispatched on.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<(Tick, SimEvent)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[(Tick, SimEvent)] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events for which `pred` holds.
    pub fn matching<'a, F>(&'a self, mut pred: F) -> impl Iterator<Item = &'a (Tick, SimEvent)> + 'a
    where
        F: FnMut(&SimEvent) -> bool + 'a,
    {
        self.events.iter().filter(move |(_, e)| pred(e))
    }

    /// Number of events with the given [`SimEvent::name`].
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|(_, e)| e.name() == name).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SimObserver for EventLog {
    fn on_event(&mut self, tick: Tick, event: &SimEvent) {
        self.events.push((tick, event.clone()));
    }
}
