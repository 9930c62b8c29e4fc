//! Reference-counted zone occupancy.
//!
//! Several overlapping trigger volumes can report the same logical occupant
//! (a vehicle with multiple colliders, a physics layer that re-fires enter
//! events).  Each occupant therefore carries a count: it is inside while the
//! count is positive and leaves when it drops back to zero.  Exits for an
//! absent occupant are absorbed, so the count can never go negative.

use std::hash::Hash;

#[cfg(feature = "fx-hash")]
type CountMap<K> = rustc_hash::FxHashMap<K, u32>;
#[cfg(not(feature = "fx-hash"))]
type CountMap<K> = std::collections::HashMap<K, u32>;

/// Result of an exit notification.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ZoneExit {
    /// The occupant was not registered; nothing changed.
    Absent,
    /// Other enter events for this occupant are still outstanding.
    StillInside(u32),
    /// The last outstanding enter was matched; the occupant has left.
    Left,
}

/// Occupancy counters for one detection volume.
#[derive(Clone, Debug)]
pub struct ZoneMembership<K> {
    counts: CountMap<K>,
}

impl<K> Default for ZoneMembership<K> {
    fn default() -> Self {
        Self { counts: CountMap::default() }
    }
}

impl<K: Copy + Eq + Hash + Ord> ZoneMembership<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enter event.  Returns the occupant's new count; `1`
    /// means it just became present.
    pub fn enter(&mut self, key: K) -> u32 {
        let c = self.counts.entry(key).or_insert(0);
        *c = c.saturating_add(1);
        *c
    }

    /// Register an exit event with a saturating decrement.
    pub fn exit(&mut self, key: K) -> ZoneExit {
        match self.counts.get_mut(&key) {
            None => ZoneExit::Absent,
            Some(c) if *c > 1 => {
                *c -= 1;
                ZoneExit::StillInside(*c)
            }
            Some(_) => {
                self.counts.remove(&key);
                ZoneExit::Left
            }
        }
    }

    /// Drop an occupant regardless of its count (despawn).
    pub fn remove(&mut self, key: K) -> bool {
        self.counts.remove(&key).is_some()
    }

    #[inline]
    pub fn count(&self, key: K) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.counts.contains_key(&key)
    }

    /// Number of distinct occupants.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Occupants in ascending order.
    pub fn occupants(&self) -> Vec<K> {
        let mut v: Vec<K> = self.counts.keys().copied().collect();
        v.sort_unstable();
        v
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
