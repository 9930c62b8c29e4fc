//! The `Sim` struct and its tick loop.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use wn_core::{AgentId, Cadence, SignalId, SimClock, Tick};
use wn_graph::WaypointGraph;
use wn_nav::{Heading, Mover, NavConfig, NavEvent, Navigator};
use wn_pursuit::{CaptureRegistry, PursuitController, PursuitEvent, TargetSnapshot};
use wn_signal::{ExitOutcome, SignalError, SignalNetwork, SignalPhase, ZoneExit};

use crate::agent::{Agent, Brain};
use crate::event::{AgentSnapshot, RemovalReason, SimEvent};
use crate::spawn::{Control, SpawnRequest};
use crate::zones::{self, Presence, Probe};
use crate::{SimError, SimObserver, SimResult, TrafficConfig};

/// Sub-rates of the base tick.
#[derive(Copy, Clone, Debug)]
struct Cycles {
    heading:    Cadence,
    nav:        Cadence,
    compliance: Cadence,
}

/// Which offense an agent of interest committed.
#[derive(Copy, Clone, Debug)]
enum Offense {
    RedCrossing,
    Collision,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<M>` owns every agent together with its mover and drives the
/// per-tick phases listed in the [crate docs](crate).  Each agent's cycles
/// run inside one sequential update with sub-timers, so no two cycles ever
/// write the same state.  Removing an agent drops all of its cycles with it.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<M: Mover> {
    /// Run configuration.
    pub config:  TrafficConfig,

    /// Simulation clock.
    pub clock:   SimClock,

    /// Shared, read-only waypoint network.
    pub graph:   WaypointGraph,

    /// Traffic signals.  Each advances on its own phase clock.
    pub signals: SignalNetwork,

    agents:     BTreeMap<AgentId, Agent<M>>,
    captures:   CaptureRegistry,
    cycles:     Cycles,
    next_agent: u32,
    /// Events emitted since the last dispatch.
    pending:    Vec<SimEvent>,
}

impl<M: Mover> Sim<M> {
    pub(crate) fn new(config: TrafficConfig, graph: WaypointGraph, signals: SignalNetwork) -> Self {
        let clock = config.sim.make_clock();
        let cycles = Cycles {
            heading:    clock.cadence(config.sim.heading_hz),
            nav:        clock.cadence(config.sim.nav_hz),
            compliance: clock.cadence(config.sim.compliance_hz),
        };
        Self {
            config,
            clock,
            graph,
            signals,
            agents: BTreeMap::new(),
            captures: CaptureRegistry::new(),
            cycles,
            next_agent: 0,
            pending: Vec::new(),
        }
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run from the current tick to `config.sim.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(
            agents = self.agents.len(),
            signals = self.signals.len(),
            ticks = self.config.sim.total_ticks,
            "simulation started"
        );
        while self.clock.current_tick < self.config.sim.end_tick() {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer);
        }
        Ok(())
    }

    /// Process one tick and hand its events to `observer`.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        self.process_tick(now);

        let events = std::mem::take(&mut self.pending);
        for event in &events {
            observer.on_event(now, event);
        }
        observer.on_tick_end(now, events.len());

        if self.config.sim.is_output_tick(now) {
            observer.on_snapshot(now, &self.snapshots());
        }
        self.clock.advance();
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Create an agent driven by `mover`.
    ///
    /// The `Spawned` event is delivered with the next tick's events.
    pub fn spawn(&mut self, request: SpawnRequest, mut mover: M) -> SimResult<AgentId> {
        if let Some(node) = request.start {
            if !self.graph.contains(node) {
                return Err(SimError::UnknownNode(node));
            }
        }
        // u32::MAX is the invalid sentinel.
        if self.next_agent == u32::MAX {
            return Err(SimError::TooManyAgents);
        }
        let id = AgentId(self.next_agent);

        let brain = match request.control {
            Control::Navigate => {
                let profile = match request.profile {
                    Some(p) => p,
                    None => self
                        .config
                        .profile_for(request.kind)
                        .cloned()
                        .ok_or(SimError::InvalidSpawn("pursuers need a profile to navigate"))?,
                };
                profile.validate()?;
                let mut nav = Navigator::new(id, profile, self.config.sim.seed);
                if let Some(node) = request.start {
                    nav = nav.starting_at(node);
                }
                nav.attach(&mut mover);
                Brain::Navigator(nav)
            }
            Control::Pursue(target) => {
                if !self.agents.contains_key(&target) {
                    return Err(SimError::UnknownAgent(target));
                }
                let ctl = PursuitController::new(id, target);
                ctl.attach(&self.config.pursuit, &mut mover);
                Brain::Pursuit(ctl)
            }
            Control::Manual => Brain::Manual,
        };

        let heading = request.facing.map(Heading::new).unwrap_or_default();
        let mut agent = Agent::new(id, request.kind, mover, heading, brain);
        agent.of_interest = request.of_interest;

        self.next_agent += 1;
        self.agents.insert(id, agent);
        self.pending.push(SimEvent::Spawned { agent: id, kind: request.kind });
        debug!(agent = %id, kind = %request.kind, start = ?request.start, "agent spawned");
        Ok(id)
    }

    /// Remove an agent immediately and hand back its mover.
    pub fn despawn(&mut self, id: AgentId) -> SimResult<M> {
        self.remove_agent(id, RemovalReason::Despawned)
            .map(|agent| agent.mover)
            .ok_or(SimError::UnknownAgent(id))
    }

    /// Suspend or resume all of an agent's cycles.
    ///
    /// Disabling stops the mover and drops the agent from every zone
    /// without judging it.  Re-enabling starts over from a clean state: a
    /// navigator searches for its nearest reachable waypoint again.
    pub fn set_enabled(&mut self, id: AgentId, enabled: bool) -> SimResult<()> {
        let agent = self.agents.get_mut(&id).ok_or(SimError::UnknownAgent(id))?;
        if agent.enabled == enabled {
            return Ok(());
        }
        agent.enabled = enabled;
        if enabled {
            if let Brain::Navigator(nav) = &mut agent.brain {
                nav.reset(&mut agent.mover);
            }
        } else {
            agent.mover.stop();
            agent.vetoes.clear();
            agent.zone = None;
            agent.sensed.clear();
            agent.touching.clear();
            self.signals.forget_agent(id);
        }
        debug!(agent = %id, enabled, "agent toggled");
        Ok(())
    }

    /// Switch a navigating agent between its walking and running speeds.
    pub fn set_running(&mut self, id: AgentId, running: bool) -> SimResult<()> {
        let agent = self.agents.get_mut(&id).ok_or(SimError::UnknownAgent(id))?;
        match &mut agent.brain {
            Brain::Navigator(nav) => {
                nav.set_running(running, &mut agent.mover);
                Ok(())
            }
            _ => Err(SimError::NotNavigating(id)),
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent<M>> {
        self.agents.get(&id)
    }

    /// Agents in ascending id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent<M>> {
        self.agents.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Direct access to an agent's mover, for externally driven agents.
    pub fn mover_mut(&mut self, id: AgentId) -> Option<&mut M> {
        self.agents.get_mut(&id).map(|a| &mut a.mover)
    }

    pub fn captures(&self) -> &CaptureRegistry {
        &self.captures
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.values().map(Agent::snapshot).collect()
    }

    // ── External zone events ──────────────────────────────────────────────

    /// `agent` entered `signal`'s zone (reported by an external physics
    /// layer).  Repeated enters are reference-counted.
    pub fn notify_signal_enter(&mut self, agent: AgentId, signal: SignalId) -> SimResult<()> {
        self.check_signal_event(agent, signal)?;
        self.signal_enter(agent, signal);
        Ok(())
    }

    /// `agent` left `signal`'s zone.  Only the exit that empties the
    /// agent's count is judged; unmatched exits are ignored.
    pub fn notify_signal_exit(&mut self, agent: AgentId, signal: SignalId) -> SimResult<()> {
        self.check_signal_event(agent, signal)?;
        self.signal_exit(agent, signal);
        Ok(())
    }

    /// `other` entered `agent`'s forward sensor.
    pub fn notify_sensor_enter(&mut self, agent: AgentId, other: AgentId) -> SimResult<()> {
        if !self.agents.contains_key(&agent) {
            return Err(SimError::UnknownAgent(agent));
        }
        self.sensor_enter(agent, other);
        Ok(())
    }

    /// `other` left `agent`'s forward sensor.
    pub fn notify_sensor_exit(&mut self, agent: AgentId, other: AgentId) -> SimResult<()> {
        if !self.agents.contains_key(&agent) {
            return Err(SimError::UnknownAgent(agent));
        }
        self.sensor_exit(agent, other);
        Ok(())
    }

    fn check_signal_event(&self, agent: AgentId, signal: SignalId) -> SimResult<()> {
        if !self.agents.contains_key(&agent) {
            return Err(SimError::UnknownAgent(agent));
        }
        if self.signals.get(signal).is_none() {
            return Err(SignalError::UnknownSignal(signal).into());
        }
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) {
        let base = self.clock.tick_duration();
        let tick_ms = self.clock.tick_ms;

        // ── Phase 1: signals ──────────────────────────────────────────────
        self.signal_phase(base);

        // ── Phase 2: movers ───────────────────────────────────────────────
        for agent in self.agents.values_mut().filter(|a| a.enabled) {
            agent.mover.advance(base);
        }

        // ── Phase 3: zone detection ───────────────────────────────────────
        if self.config.zones.detect {
            self.zone_phase();
        }

        // ── Phase 4: heading ──────────────────────────────────────────────
        if self.cycles.heading.fires(now) {
            self.heading_phase(self.cycles.heading.interval(tick_ms));
        }

        // ── Phase 5: compliance ───────────────────────────────────────────
        //
        // Vetoes that appear between polls take effect here; vetoes that
        // clear were already re-arbitrated when they cleared.
        if self.cycles.compliance.fires(now) {
            for agent in self.agents.values_mut() {
                arbitrate(agent, &self.signals, &self.graph, &self.config.nav);
            }
        }

        // ── Phase 6: navigation and pursuit ───────────────────────────────
        if self.cycles.nav.fires(now) {
            self.nav_phase(self.cycles.nav.interval(tick_ms));
        }

        // ── Phase 7: removals ─────────────────────────────────────────────
        let retiring: Vec<(AgentId, RemovalReason)> = self
            .agents
            .iter()
            .filter_map(|(&id, a)| a.retire.map(|r| (id, r)))
            .collect();
        for (id, reason) in retiring {
            self.remove_agent(id, reason);
        }
    }

    fn signal_phase(&mut self, dt: Duration) {
        for (signal, phase) in self.signals.advance_all(dt) {
            self.pending.push(SimEvent::PhaseChanged { signal, phase });
            if phase != SignalPhase::Green {
                continue;
            }
            // Signal veto cleared: release bound agents now, not at the next poll.
            for agent in self.agents.values_mut() {
                if agent.vetoes.bound_signal() == Some(signal) {
                    arbitrate(agent, &self.signals, &self.graph, &self.config.nav);
                }
            }
        }
    }

    fn zone_phase(&mut self) {
        let probes: Vec<Probe> = self
            .agents
            .values()
            .map(|a| Probe {
                id:          a.id,
                pos:         a.mover.position(),
                forward:     a.heading.dir(),
                senses:      a.enabled,
                has_sensor:  a.has_sensor(),
                of_interest: a.of_interest,
                collidable:  a.is_collidable(),
            })
            .collect();

        for probe in probes.iter().filter(|p| p.senses) {
            let signals = &self.signals;
            let presence = zones::detect(probe, &probes, &self.config.zones, |p| signals.zone_at(p));
            self.apply_presence(probe.id, presence);
        }
    }

    /// Turn the difference between an agent's recorded and detected
    /// presence into enter/exit notifications.
    fn apply_presence(&mut self, id: AgentId, presence: Presence) {
        let Some(agent) = self.agents.get(&id) else { return };
        let old_zone = agent.zone;
        let entered: Vec<AgentId> = presence.sensed.difference(&agent.sensed).copied().collect();
        let left: Vec<AgentId> = agent.sensed.difference(&presence.sensed).copied().collect();
        let touched: Vec<AgentId> = presence.touching.difference(&agent.touching).copied().collect();

        if old_zone != presence.signal {
            if let Some(signal) = old_zone {
                self.signal_exit(id, signal);
            }
            if let Some(signal) = presence.signal {
                self.signal_enter(id, signal);
            }
        }
        for other in entered {
            self.sensor_enter(id, other);
        }
        for other in left {
            self.sensor_exit(id, other);
        }
        for other in touched {
            self.pending.push(SimEvent::Collision { agent: id, other });
            self.record_offense(id, Offense::Collision);
        }

        if let Some(agent) = self.agents.get_mut(&id) {
            agent.zone = presence.signal;
            agent.sensed = presence.sensed;
            agent.touching = presence.touching;
        }
    }

    fn heading_phase(&mut self, dt: Duration) {
        let turn_rate = self.config.nav.turn_rate;

        #[cfg(not(feature = "parallel"))]
        for agent in self.agents.values_mut().filter(|a| a.enabled) {
            agent.heading.update(&agent.mover, dt, turn_rate);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.agents
                .par_iter_mut()
                .filter(|(_, a)| a.enabled)
                .for_each(|(_, a)| a.heading.update(&a.mover, dt, turn_rate));
        }
    }

    fn nav_phase(&mut self, dt: Duration) {
        // Pursuers read where their targets were before anyone moves on.
        let targets: BTreeMap<AgentId, TargetSnapshot> = self
            .agents
            .iter()
            .map(|(&id, a)| (id, TargetSnapshot { pos: a.mover.position(), vel: a.mover.velocity() }))
            .collect();

        for (&id, agent) in self.agents.iter_mut() {
            if !agent.enabled || agent.retire.is_some() {
                continue;
            }
            match &mut agent.brain {
                Brain::Navigator(nav) => {
                    let events = nav.nav_tick(&self.graph, &self.config.nav, agent.heading, &mut agent.mover, dt);
                    for event in events {
                        match event {
                            NavEvent::Arrived(node) => self.pending.push(SimEvent::Arrived { agent: id, node }),
                            NavEvent::Terminated    => self.pending.push(SimEvent::Terminated { agent: id }),
                            NavEvent::Stalled       => self.pending.push(SimEvent::Stalled { agent: id }),
                            NavEvent::Retire        => agent.retire = Some(RemovalReason::Terminated),
                        }
                    }
                }
                Brain::Pursuit(ctl) => {
                    let target = targets.get(&ctl.target()).copied();
                    let events = ctl.tick(target, &mut self.captures, &self.config.pursuit, &mut agent.mover, dt);
                    for event in events {
                        match event {
                            PursuitEvent::Captured(target) => {
                                self.pending.push(SimEvent::Captured { pursuer: id, target });
                            }
                            PursuitEvent::Disengaged => agent.retire = Some(RemovalReason::Disengaged),
                        }
                    }
                }
                Brain::Manual => {}
            }
        }
    }

    // ── Zone notifications ────────────────────────────────────────────────

    fn signal_enter(&mut self, id: AgentId, signal: SignalId) {
        let Ok(sig) = self.signals.get_mut(signal) else { return };
        let first = sig.on_enter(id);
        let Some(agent) = self.agents.get_mut(&id) else { return };
        if first && agent.obeys_signals() {
            agent.vetoes.bind_signal(signal);
            debug!(agent = %id, %signal, "bound to signal");
        }
    }

    fn signal_exit(&mut self, id: AgentId, signal: SignalId) {
        let Ok(sig) = self.signals.get_mut(signal) else { return };
        match sig.on_exit(id) {
            ExitOutcome::NotPresent | ExitOutcome::StillInside => return,
            ExitOutcome::Cleared => {}
            ExitOutcome::Violation => {
                debug!(agent = %id, %signal, "red signal crossed");
                self.pending.push(SimEvent::Violation { agent: id, signal });
                self.record_offense(id, Offense::RedCrossing);
            }
        }
        let Some(agent) = self.agents.get_mut(&id) else { return };
        if agent.vetoes.bound_signal() == Some(signal) {
            agent.vetoes.unbind_signal(signal);
            arbitrate(agent, &self.signals, &self.graph, &self.config.nav);
        }
    }

    fn sensor_enter(&mut self, id: AgentId, other: AgentId) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.vetoes.sensor_enter(other);
        }
    }

    fn sensor_exit(&mut self, id: AgentId, other: AgentId) {
        let Some(agent) = self.agents.get_mut(&id) else { return };
        let left = matches!(agent.vetoes.sensor_exit(other), ZoneExit::Left);
        if left && agent.vetoes.proximity_count() == 0 {
            arbitrate(agent, &self.signals, &self.graph, &self.config.nav);
        }
    }

    fn record_offense(&mut self, id: AgentId, offense: Offense) {
        let limit = self.config.zones.offense_limit;
        let Some(agent) = self.agents.get_mut(&id) else { return };
        if !agent.of_interest {
            return;
        }
        match offense {
            Offense::RedCrossing => {
                agent.record.record_red_crossing();
                return;
            }
            Offense::Collision => agent.record.record_collision(),
        }
        if agent.record.check_limit(limit) {
            let offenses = agent.record.offenses();
            info!(agent = %id, offenses, "offense limit reached");
            self.pending.push(SimEvent::OffenseLimitReached { agent: id, offenses });
        }
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Drop an agent and every trace of it in other agents' zones.
    fn remove_agent(&mut self, id: AgentId, reason: RemovalReason) -> Option<Agent<M>> {
        let mut agent = self.agents.remove(&id)?;
        agent.mover.stop();
        self.signals.forget_agent(id);
        self.captures.release(id);

        for other in self.agents.values_mut() {
            other.sensed.remove(&id);
            other.touching.remove(&id);
            if other.vetoes.sensor_forget(id) && other.vetoes.proximity_count() == 0 {
                arbitrate(other, &self.signals, &self.graph, &self.config.nav);
            }
        }

        debug!(agent = %id, reason = reason.as_str(), "agent removed");
        self.pending.push(SimEvent::Removed { agent: id, reason });
        Some(agent)
    }
}

/// Combine an agent's vetoes and deliver the decision to its navigator.
/// Pursuers and manual agents are never gated.
fn arbitrate<M: Mover>(agent: &mut Agent<M>, signals: &SignalNetwork, graph: &WaypointGraph, config: &NavConfig) {
    if !agent.enabled {
        return;
    }
    let Brain::Navigator(nav) = &mut agent.brain else { return };
    let can_proceed = agent.vetoes.bound_signal().is_none_or(|s| signals.can_proceed(s));
    let decision = agent.vetoes.decide(can_proceed);
    nav.apply_decision(decision, graph, config, agent.heading, &mut agent.mover);
}
