//! Fluent builder for constructing a [`Sim`].

use tracing::warn;

use wn_graph::WaypointGraph;
use wn_nav::Mover;
use wn_signal::SignalNetwork;

use crate::{Sim, SimResult, TrafficConfig};

/// Fluent builder for [`Sim<M>`].
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                   |
/// |---------------|---------------------------|
/// | `.graph(g)`   | `WaypointGraph::empty()`  |
/// | `.signals(s)` | no signals                |
///
/// A simulation without waypoints still runs: navigating agents log the
/// missing binding once and stay idle.
pub struct SimBuilder {
    config:  TrafficConfig,
    graph:   Option<WaypointGraph>,
    signals: Option<SignalNetwork>,
}

impl SimBuilder {
    pub fn new(config: TrafficConfig) -> Self {
        Self { config, graph: None, signals: None }
    }

    pub fn graph(mut self, graph: WaypointGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn signals(mut self, signals: SignalNetwork) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Validate the configuration and return a ready-to-run [`Sim`].
    pub fn build<M: Mover>(self) -> SimResult<Sim<M>> {
        self.config.validate()?;

        let graph = self.graph.unwrap_or_else(|| {
            warn!("no waypoint graph supplied; navigating agents will stay idle");
            WaypointGraph::empty()
        });
        let signals = self.signals.unwrap_or_default();
        if signals.is_empty() {
            warn!("no traffic signals supplied; junctions will never hold agents");
        }

        Ok(Sim::new(self.config, graph, signals))
    }
}
