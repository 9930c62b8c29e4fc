//! `wn-sim`: the tick loop that ties graph, signals, navigation and pursuit
//! together.
//!
//! # Tick order
//!
//! ```text
//! for tick in 0..config.sim.total_ticks:
//!   ① Signals:    advance every signal's phase clock; a phase turning
//!                  Green re-arbitrates its bound agents immediately.
//!   ② Movers:     integrate every enabled mover over one base tick.
//!   ③ Zones:      geometric detection of signal zones, forward sensors
//!                  and collision radii; emits enter/exit notifications.
//!   ④ Heading:    (heading_hz) turn towards the steering target
//!                  (parallel with the `parallel` feature).
//!   ⑤ Compliance: (compliance_hz) poll arbitration for every navigator.
//!   ⑥ Navigation: (nav_hz) navigator and pursuit steps, in AgentId order.
//!   ⑦ Removals:   retire terminated and disengaged agents.
//!   ⑧ Dispatch:   hand buffered events to the observer, then snapshots.
//! ```
//!
//! Agents live in a `BTreeMap`, so every per-agent phase runs in ascending
//! `AgentId` order and a fixed seed reproduces the same event stream.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                             |
//! |------------|----------------------------------------------------|
//! | `parallel` | Runs the heading cycle on Rayon's thread pool.     |
//! | `fx-hash`  | FxHash for zone occupancy counters.                |
//! | `serde`    | Serde derives on `TrafficConfig` and `SimEvent`.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use wn_nav::KinematicMover;
//! use wn_sim::{EventLog, SimBuilder, SpawnRequest, TrafficConfig};
//!
//! let mut sim = SimBuilder::new(TrafficConfig::default())
//!     .graph(graph)
//!     .signals(signals)
//!     .build::<KinematicMover>()?;
//! sim.spawn(SpawnRequest::vehicle(start), KinematicMover::new(pos, 0.0))?;
//! let mut log = EventLog::default();
//! sim.run(&mut log)?;
//! ```

pub mod agent;
pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod observer;
pub mod record;
pub mod sim;
pub mod spawn;
pub mod zones;


pub use agent::{Agent, Brain};
pub use builder::SimBuilder;
pub use config::{TrafficConfig, ZoneConfig};
pub use error::{SimError, SimResult};
pub use event::{AgentSnapshot, RemovalReason, SimEvent};
pub use observer::{EventLog, NoopObserver, SimObserver};
pub use record::ViolationRecord;
pub use sim::Sim;
pub use spawn::{Control, Placement, SpawnPlanner, SpawnRequest};
