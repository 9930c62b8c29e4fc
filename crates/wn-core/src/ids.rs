//! Strongly typed identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they work as map keys and give a
//! deterministic iteration order in `BTreeMap`s.  Node ids are dense indices
//! into the waypoint graph; agent ids are handed out monotonically by the
//! simulation and never reused, so late events cannot be misattributed to a
//! newly spawned agent.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A live or past agent (vehicle, pedestrian, pursuer, or player actor).
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a waypoint node in the graph.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a traffic signal in the signal network.
    pub struct SignalId(u32);
}
