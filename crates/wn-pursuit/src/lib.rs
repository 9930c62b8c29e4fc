//! `wn-pursuit`: agents that chase and capture a designated target.
//!
//! A pursuer steers for where its target *will* be, `lead_time` ahead,
//! which yields a pursuit curve that cuts corners instead of trailing the
//! target.  Once within `capture_distance` for `capture_hold` it claims the
//! capture in a shared [`CaptureRegistry`]; the first claim wins and every
//! other pursuer of the same target stands down silently.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`controller`] | `PursuitController`, `PursuitState`, `PursuitEvent`, `predict_intercept` |
//! | [`registry`]   | `CaptureRegistry` (first capture wins)                     |
//! | [`config`]     | `PursuitConfig`                                            |
//! | [`error`]      | `PursuitError`, `PursuitResult<T>`                         |

pub mod config;
pub mod controller;
pub mod error;
pub mod registry;


pub use config::PursuitConfig;
pub use controller::{predict_intercept, PursuitController, PursuitEvent, PursuitState, TargetSnapshot};
pub use error::{PursuitError, PursuitResult};
pub use registry::CaptureRegistry;
