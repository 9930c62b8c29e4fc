//! `wn-signal`: traffic signals and zone occupancy.
//!
//! Each [`Signal`] is an independent `Green → Yellow → Red → Green` cycle
//! advanced by the simulation clock, with a zone volume in which agents
//! register presence.  Compliance is judged on zone exit only: leaving the
//! zone while the phase is `Red` is a violation, nothing else is.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`signal`]     | `Signal`, `SignalPhase`, `SignalTimings`, `ExitOutcome` |
//! | [`membership`] | `ZoneMembership<K>`, `ZoneExit`                       |
//! | [`network`]    | `SignalNetwork` registry                              |
//! | [`error`]      | `SignalError`, `SignalResult<T>`                      |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | Occupancy counters use `FxHashMap` instead of `HashMap`. |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types.       |

pub mod error;
pub mod membership;
pub mod network;
pub mod signal;


pub use error::{SignalError, SignalResult};
pub use membership::{ZoneExit, ZoneMembership};
pub use network::SignalNetwork;
pub use signal::{ExitOutcome, Signal, SignalPhase, SignalTimings};
