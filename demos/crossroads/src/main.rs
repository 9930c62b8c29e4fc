//! crossroads: a signalled junction with AI traffic, pedestrians, a
//! player car and a pursuer.
//!
//! The player drives a fixed loop straight through the junction regardless
//! of the signal, so it racks up violations while a pursuer closes in.
//! Pass a JSON `TrafficConfig` path as the first argument to override the
//! defaults; set `RUST_LOG=debug` for per-agent tracing.

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wn_core::{AgentId, AgentKind, NodeId, SimConfig, SimRng, Tick, Vec3};
use wn_nav::{KinematicMover, Mover};
use wn_output::{CsvWriter, OutputWriter, SimOutputObserver};
use wn_signal::SignalNetwork;
use wn_sim::{
    AgentSnapshot, EventLog, Sim, SimBuilder, SimEvent, SimObserver, SpawnPlanner, SpawnRequest,
    TrafficConfig,
};

use network::build_layout;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:         u64 = 42;
const SIM_TICKS:    u64 = 2_400;  // 2 minutes at 50 ms
const TOP_UP_TICKS: u64 = 200;    // refill AI traffic every 10 s
const OUTPUT_DIR:   &str = "output/crossroads";

const PLAYER_SPEED: f32 = 6.0;
const PLAYER_ROUTE: [Vec3; 4] = [
    Vec3::new(30.0, 0.0, 20.0),
    Vec3::new(30.0, 0.0, 50.0),
    Vec3::new(-30.0, 0.0, 50.0),
    Vec3::new(-30.0, 0.0, 20.0),
];

// ── Player ────────────────────────────────────────────────────────────────────

/// Steers the manual player car around `PLAYER_ROUTE`.
struct PlayerRoute {
    next: usize,
}

impl PlayerRoute {
    fn steer<M: Mover>(&mut self, mover: &mut M) {
        if mover.position().distance(PLAYER_ROUTE[self.next]) < 1.5 {
            self.next = (self.next + 1) % PLAYER_ROUTE.len();
        }
        mover.set_target(PLAYER_ROUTE[self.next]);
    }
}

// ── Observer fan-out ──────────────────────────────────────────────────────────

/// Records to CSV and keeps the event log for the end-of-run summary.
struct DemoObserver<W: OutputWriter> {
    output: SimOutputObserver<W>,
    log:    EventLog,
}

impl<W: OutputWriter> SimObserver for DemoObserver<W> {
    fn on_event(&mut self, tick: Tick, event: &SimEvent) {
        if let SimEvent::Captured { pursuer, target } = event {
            info!(%pursuer, %target, tick = tick.0, "capture");
        }
        self.output.on_event(tick, event);
        self.log.on_event(tick, event);
    }

    fn on_tick_end(&mut self, tick: Tick, events: usize) {
        self.output.on_tick_end(tick, events);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[AgentSnapshot]) {
        self.output.on_snapshot(tick, agents);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.output.on_sim_end(final_tick);
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config(path: Option<String>) -> Result<TrafficConfig> {
    let config: TrafficConfig = match path {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("opening config {path}"))?;
            serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {path}"))?
        }
        None => TrafficConfig {
            sim: SimConfig { seed: SEED, total_ticks: SIM_TICKS, ..SimConfig::default() },
            ..TrafficConfig::default()
        },
    };
    config.validate()?;
    Ok(config)
}

/// Spawn up to `count` navigating agents at the planner's points.
fn spawn_batch(
    sim:     &mut Sim<KinematicMover>,
    planner: &SpawnPlanner,
    rng:     &mut SimRng,
    count:   usize,
    request: fn(NodeId) -> SpawnRequest,
) -> Result<usize> {
    let placements = planner.place(rng, count);
    for placement in &placements {
        let pos = sim.graph.pos(placement.node).context("spawn point missing from the graph")?;
        sim.spawn(request(placement.node), KinematicMover::new(pos + placement.offset, 0.0))?;
    }
    Ok(placements.len())
}

fn ai_vehicles(sim: &Sim<KinematicMover>) -> usize {
    sim.agents().filter(|a| a.kind() == AgentKind::Vehicle && a.navigator().is_some()).count()
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(std::env::args().nth(1))?;
    println!("=== crossroads ===");
    println!(
        "Ticks: {}  |  Tick: {} ms  |  Seed: {}",
        config.sim.total_ticks, config.sim.tick_ms, config.sim.seed
    );

    // 1. Layout and the junction signal.
    let layout = build_layout()?;
    let mut signals = SignalNetwork::new();
    let junction = signals.add(layout.junction, config.signal)?;
    println!("Waypoints: {}  |  Signal: {junction}", layout.graph.node_count());

    let mut sim = SimBuilder::new(config.clone())
        .graph(layout.graph)
        .signals(signals)
        .build::<KinematicMover>()?;
    let mut rng = SimRng::new(config.sim.seed);

    // 2. AI traffic.  One car per road spawn point, pedestrians may share.
    let mut cars = SpawnPlanner::new(layout.road_spawns);
    cars.per_point = 1;
    cars.min = 2;
    cars.max = 5;
    let car_count = cars.initial_count(&mut rng);
    cars.set_target(car_count);
    let cars_spawned = spawn_batch(&mut sim, &cars, &mut rng, car_count, SpawnRequest::vehicle)?;

    let mut walkers = SpawnPlanner::new(layout.sidewalk_spawns);
    walkers.jitter = 0.5;
    let walker_count = walkers.initial_count(&mut rng);
    let walkers_spawned = spawn_batch(&mut sim, &walkers, &mut rng, walker_count, SpawnRequest::pedestrian)?;
    println!("AI vehicles: {cars_spawned}  |  Pedestrians: {walkers_spawned}");

    // 3. The player and the pursuer on its tail.
    let start = PLAYER_ROUTE[PLAYER_ROUTE.len() - 1];
    let player: AgentId = sim.spawn(
        SpawnRequest::manual(AgentKind::Vehicle).facing(Vec3::new(1.0, 0.0, 0.0)).of_interest(),
        KinematicMover::new(start, PLAYER_SPEED),
    )?;
    let pursuer = sim.spawn(
        SpawnRequest::pursuer(player),
        KinematicMover::new(start - Vec3::new(15.0, 0.0, 0.0), 0.0),
    )?;
    println!("Player: {player}  |  Pursuer: {pursuer}");
    println!();

    // 4. Output.
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = DemoObserver { output: SimOutputObserver::new(writer, &config.sim), log: EventLog::new() };

    // 5. Run, steering the player and topping up traffic between ticks.
    let mut route = PlayerRoute { next: 0 };
    let t0 = Instant::now();
    while sim.now() < config.sim.end_tick() {
        let caught = sim.captures().is_captured(player);
        if let Some(mover) = sim.mover_mut(player) {
            if caught {
                mover.stop();
            } else {
                route.steer(mover);
            }
        }

        let tick = sim.now().0;
        if tick > 0 && tick.is_multiple_of(TOP_UP_TICKS) {
            let missing = cars.deficit(ai_vehicles(&sim));
            if missing > 0 {
                let added = spawn_batch(&mut sim, &cars, &mut rng, missing, SpawnRequest::vehicle)?;
                info!(tick, added, "traffic topped up");
            }
        }

        sim.step(&mut obs);
    }
    obs.on_sim_end(sim.now());
    let elapsed = t0.elapsed();

    if let Some(e) = obs.output.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!("Simulation complete in {:.3} s ({} events)", elapsed.as_secs_f64(), obs.log.len());
    println!("{:<16} {:>8}", "Event", "Count");
    println!("{}", "-".repeat(25));
    for name in [
        "spawned", "phase_changed", "arrived", "terminated", "stalled", "violation", "collision",
        "offense_limit", "captured", "removed",
    ] {
        println!("{:<16} {:>8}", name, obs.log.count(name));
    }
    println!();

    if let Some(agent) = sim.agent(player) {
        let record = agent.record();
        println!(
            "Player: {} red crossings, {} collisions, limit reached: {}",
            record.red_crossings,
            record.collisions,
            record.limit_reached()
        );
    }
    match sim.captures().captor_of(player) {
        Some(captor) => println!("Player captured by {captor}"),
        None => println!("Player escaped"),
    }
    println!("Output written to {OUTPUT_DIR}/");

    Ok(())
}
