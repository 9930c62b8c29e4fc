//! `wn-core`: foundational types for the waynet traffic simulation core.
//!
//! Every other `wn-*` crate depends on this one.  It has no `wn-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `NodeId`, `SignalId`                           |
//! | [`geo`]     | `Vec3`, `Aabb`                                            |
//! | [`time`]    | `Tick`, `SimClock`, `Cadence`, `SimConfig`                |
//! | [`rng`]     | `AgentRng` (per-agent), `SimRng` (global)                 |
//! | [`kind`]    | `AgentKind` enum                                          |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{Aabb, Vec3};
pub use ids::{AgentId, NodeId, SignalId};
pub use kind::AgentKind;
pub use rng::{AgentRng, SimRng};
pub use time::{Cadence, SimClock, SimConfig, Tick};
