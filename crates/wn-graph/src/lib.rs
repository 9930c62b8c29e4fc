//! `wn-graph`: the waypoint network agents travel along.
//!
//! The graph is authored once at scene setup, validated by
//! [`WaypointGraphBuilder::build`], and then shared read-only by every agent.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `WaypointGraph` (CSR successors + R-tree), builder, `Lane`  |
//! | [`select`]  | `next_target`, `random_target` routing heuristics           |
//! | [`nearest`] | `NearestSearch`, `Reachability`, scoring                    |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod graph;
pub mod nearest;
pub mod select;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use graph::{Lane, WaypointGraph, WaypointGraphBuilder, WaypointNode};
pub use nearest::{
    AlwaysReachable, NearestNode, NearestSearch, Reachability, SearchStatus, score_candidate,
};
