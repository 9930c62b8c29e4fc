//! `wn-nav`: how a single agent gets from waypoint to waypoint.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`mover`]       | `Mover` trait (the physics contract), `KinematicMover`  |
//! | [`profile`]     | `NavProfile`, `Routing`, `NavConfig`                    |
//! | [`arbitration`] | `Vetoes`, `MotionDecision`, `Blocker`                   |
//! | [`heading`]     | `Heading`: the high-rate facing update                 |
//! | [`navigator`]   | `Navigator`, `NavState`, `NavEvent`                     |
//! | [`error`]       | `NavError`, `NavResult<T>`                              |
//!
//! # Update cycles
//!
//! An agent runs three periodic cycles at different rates, all driven by the
//! simulation tick:
//!
//! | Cycle       | Default rate | Writes                                   |
//! |-------------|--------------|------------------------------------------|
//! | heading     | 20 Hz        | `Heading` only                           |
//! | navigation  | 10 Hz        | `Navigator` state, mover target          |
//! | compliance  | 5 Hz         | arbitration decision (via `Navigator::apply_decision`) |
//!
//! Each cycle writes disjoint state, so they can never corrupt each other.
//! Only the navigation cycle selects new waypoints.

pub mod arbitration;
pub mod error;
pub mod heading;
pub mod mover;
pub mod navigator;
pub mod profile;

#[cfg(test)]
mod tests;

pub use arbitration::{Blocker, MotionDecision, Vetoes};
pub use error::{NavError, NavResult};
pub use heading::Heading;
pub use mover::{KinematicMover, Mover};
pub use navigator::{NavEvent, NavState, Navigator};
pub use profile::{NavConfig, NavProfile, Routing};
