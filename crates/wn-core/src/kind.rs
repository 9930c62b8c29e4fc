//! Agent kind enum shared by the navigation, pursuit, and sim crates.

/// What sort of actor an agent is.
///
/// The kind selects default capability profiles; behaviour differences are
/// carried by those profiles rather than by separate agent types.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    /// Road vehicle following the road lane.
    Vehicle,
    /// Pedestrian following the sidewalk lane.
    Pedestrian,
    /// Pursuit agent chasing a designated target.
    Pursuer,
}

impl AgentKind {
    /// Human-readable label, used for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Vehicle    => "vehicle",
            AgentKind::Pedestrian => "pedestrian",
            AgentKind::Pursuer    => "pursuer",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
