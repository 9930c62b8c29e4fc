//! Capability profiles and navigation parameters.
//!
//! Vehicles, pedestrians and any other waypoint follower share one
//! [`Navigator`](crate::Navigator); what differs between them is captured
//! here.

use std::time::Duration;

use wn_core::error::ensure_positive;
use wn_graph::Lane;

use crate::{NavError, NavResult};

/// How the next waypoint is chosen after an arrival.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Routing {
    /// Follow successors (with occasional link branching).
    #[default]
    Sequential,
    /// Wander to random nodes of the same lane.
    Random,
}

// ── NavProfile ────────────────────────────────────────────────────────────────

/// Per-kind capability set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavProfile {
    /// Cruising speed handed to the mover.
    pub speed:             f32,
    /// Speed while [`Navigator::set_running`](crate::Navigator::set_running)
    /// is on.
    pub run_speed:         f32,
    /// Remaining distance below which the target counts as reached.
    pub arrival_threshold: f32,
    /// Pause at each reached waypoint before moving on.
    pub wait_at_waypoint:  Option<Duration>,
    pub routing:           Routing,
    /// Turn back along the predecessor at dead ends instead of terminating.
    pub cyclic:            bool,
    /// Lane used for nearest-node search and random routing.
    pub lane:              Lane,
    /// Stop for bound traffic signals.
    pub obeys_signals:     bool,
}

impl NavProfile {
    /// Road vehicle: fast, sequential, branches at links, obeys signals.
    pub fn vehicle() -> Self {
        Self {
            speed:             10.0,
            run_speed:         10.0,
            arrival_threshold: 2.0,
            wait_at_waypoint:  None,
            routing:           Routing::Sequential,
            cyclic:            true,
            lane:              Lane::Road,
            obeys_signals:     true,
        }
    }

    /// Pedestrian: walks between random sidewalk nodes, pausing at each.
    pub fn pedestrian() -> Self {
        Self {
            speed:             3.5,
            run_speed:         6.0,
            arrival_threshold: 1.0,
            wait_at_waypoint:  Some(Duration::from_secs(2)),
            routing:           Routing::Random,
            cyclic:            true,
            lane:              Lane::Sidewalk,
            obeys_signals:     false,
        }
    }

    pub fn validate(&self) -> NavResult<()> {
        ensure_positive("speed", f64::from(self.speed))?;
        ensure_positive("run_speed", f64::from(self.run_speed))?;
        ensure_positive("arrival_threshold", f64::from(self.arrival_threshold))?;
        Ok(())
    }
}

// ── NavConfig ─────────────────────────────────────────────────────────────────

/// Shared navigation parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Radius of the nearest-waypoint search at spawn and resume.
    pub search_radius:    f32,
    /// Candidates scored per navigation tick.
    pub search_batch:     usize,
    /// How long an agent may stand still while permitted to move.
    pub stall_threshold:  Duration,
    /// Speed below which the agent counts as standing still.
    pub stall_speed:      f32,
    /// Delay between termination and removal.
    pub terminate_grace:  Duration,
    /// Heading interpolation rate, in fractions per second.
    pub turn_rate:        f32,
    /// Chance of taking a node's link instead of its successor.
    pub link_probability: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            search_radius:    50.0,
            search_batch:     5,
            stall_threshold:  Duration::from_secs(2),
            stall_speed:      0.1,
            terminate_grace:  Duration::from_secs(1),
            turn_rate:        5.0,
            link_probability: 0.2,
        }
    }
}

impl NavConfig {
    pub fn validate(&self) -> NavResult<()> {
        ensure_positive("search_radius", f64::from(self.search_radius))?;
        ensure_positive("search_batch", self.search_batch as f64)?;
        ensure_positive("stall_threshold", self.stall_threshold.as_secs_f64())?;
        ensure_positive("stall_speed", f64::from(self.stall_speed))?;
        ensure_positive("turn_rate", f64::from(self.turn_rate))?;
        if !(0.0..=1.0).contains(&self.link_probability) {
            return Err(NavError::LinkProbability(self.link_probability));
        }
        Ok(())
    }
}
