//! Geometric zone detection.
//!
//! Stands in for an engine's trigger volumes: each tick the simulation
//! recomputes which signal zone every agent is in, which agents sit inside
//! each agent's forward sensor, and which agents touch an agent of
//! interest.  Differences against the previous tick become the same
//! enter/exit notifications an external physics layer would send.

use std::collections::BTreeSet;

use wn_core::{AgentId, SignalId, Vec3};

use crate::config::ZoneConfig;

/// Whether `other` lies in the box `range` ahead of `origin` along
/// `forward`, `half_width` to either side.  Height is ignored.
pub fn in_forward_sensor(origin: Vec3, forward: Vec3, other: Vec3, range: f32, half_width: f32) -> bool {
    let d = (other - origin).flat();
    let along = d.dot(forward);
    if along <= 0.0 || along > range {
        return false;
    }
    (d - forward * along).length() <= half_width
}

/// Whether two agents are within `radius` of each other on the ground plane.
pub fn in_contact(a: Vec3, b: Vec3, radius: f32) -> bool {
    (b - a).flat().length_squared() <= radius * radius
}

/// Per-agent input to one detection pass.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Probe {
    pub id:          AgentId,
    pub pos:         Vec3,
    pub forward:     Vec3,
    /// Disabled agents are still obstacles but sense nothing.
    pub senses:      bool,
    pub has_sensor:  bool,
    pub of_interest: bool,
    /// Counts as a collision when it touches an agent of interest.
    pub collidable:  bool,
}

/// What one agent should currently be in.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Presence {
    pub signal:   Option<SignalId>,
    pub sensed:   BTreeSet<AgentId>,
    pub touching: BTreeSet<AgentId>,
}

/// Presence of `probe` among `all`.  `zone_at` maps a position to the
/// signal zone containing it.
pub(crate) fn detect<F>(probe: &Probe, all: &[Probe], config: &ZoneConfig, zone_at: F) -> Presence
where
    F: Fn(Vec3) -> Option<SignalId>,
{
    let mut presence = Presence { signal: zone_at(probe.pos), ..Presence::default() };
    for other in all.iter().filter(|o| o.id != probe.id) {
        if probe.has_sensor
            && in_forward_sensor(probe.pos, probe.forward, other.pos, config.sensor_range, config.sensor_half_width)
        {
            presence.sensed.insert(other.id);
        }
        if probe.of_interest && other.collidable && in_contact(probe.pos, other.pos, config.collision_radius) {
            presence.touching.insert(other.id);
        }
    }
    presence
}
