//! Aggregated run configuration.

use wn_core::{AgentKind, SimConfig};
use wn_core::error::ensure_positive;
use wn_nav::{NavConfig, NavProfile};
use wn_pursuit::PursuitConfig;
use wn_signal::SignalTimings;

use crate::{SimError, SimResult};

/// Geometry of the built-in zone detector and the offense limit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoneConfig {
    /// Run geometric zone detection every tick.  Turn off when an external
    /// physics layer feeds `Sim::notify_*` instead.
    pub detect:            bool,
    /// Forward sensor length, measured along the agent's heading.
    pub sensor_range:      f32,
    /// Half of the forward sensor's width.
    pub sensor_half_width: f32,
    /// Another agent this close to an agent of interest is a collision.
    pub collision_radius:  f32,
    /// Collisions that end a run.  Red crossings do not count.
    pub offense_limit:     u32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            detect:            true,
            sensor_range:      6.0,
            sensor_half_width: 1.5,
            collision_radius:  1.2,
            offense_limit:     3,
        }
    }
}

impl ZoneConfig {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive("sensor_range", f64::from(self.sensor_range))?;
        ensure_positive("sensor_half_width", f64::from(self.sensor_half_width))?;
        ensure_positive("collision_radius", f64::from(self.collision_radius))?;
        if self.offense_limit == 0 {
            return Err(SimError::Config("offense_limit must be at least 1".into()));
        }
        Ok(())
    }
}

/// Everything a [`Sim`](crate::Sim) needs besides its graph and signals.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrafficConfig {
    pub sim:        SimConfig,
    pub nav:        NavConfig,
    pub pursuit:    PursuitConfig,
    pub zones:      ZoneConfig,
    /// Timings for signals created from this config.
    pub signal:     SignalTimings,
    pub vehicle:    NavProfile,
    pub pedestrian: NavProfile,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            sim:        SimConfig::default(),
            nav:        NavConfig::default(),
            pursuit:    PursuitConfig::default(),
            zones:      ZoneConfig::default(),
            signal:     SignalTimings::default(),
            vehicle:    NavProfile::vehicle(),
            pedestrian: NavProfile::pedestrian(),
        }
    }
}

impl TrafficConfig {
    /// Reject non-positive rates, durations and radii.
    pub fn validate(&self) -> SimResult<()> {
        self.sim.validate()?;
        self.nav.validate()?;
        self.pursuit.validate()?;
        self.zones.validate()?;
        self.signal.validate()?;
        self.vehicle.validate()?;
        self.pedestrian.validate()?;
        Ok(())
    }

    /// The navigation profile for `kind`, if that kind navigates.
    pub fn profile_for(&self, kind: AgentKind) -> Option<&NavProfile> {
        match kind {
            AgentKind::Vehicle    => Some(&self.vehicle),
            AgentKind::Pedestrian => Some(&self.pedestrian),
            AgentKind::Pursuer    => None,
        }
    }
}
