//! Offense bookkeeping for agents of interest.

/// Red-signal crossings and collisions of one agent of interest.
///
/// Counts only ever grow.  Red crossings are tallied for reporting but only
/// collisions are major offenses: [`check_limit`](Self::check_limit) reports
/// the limit once, the first time the collision count reaches it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViolationRecord {
    pub red_crossings: u32,
    pub collisions:    u32,
    limit_reported:    bool,
}

impl ViolationRecord {
    pub fn record_red_crossing(&mut self) {
        self.red_crossings = self.red_crossings.saturating_add(1);
    }

    pub fn record_collision(&mut self) {
        self.collisions = self.collisions.saturating_add(1);
    }

    /// Major offenses counted against the limit.
    pub fn offenses(&self) -> u32 {
        self.collisions
    }

    /// `true` exactly once, when `offenses() >= limit` for the first time.
    pub fn check_limit(&mut self, limit: u32) -> bool {
        if self.limit_reported || self.offenses() < limit {
            return false;
        }
        self.limit_reported = true;
        true
    }

    pub fn limit_reached(&self) -> bool {
        self.limit_reported
    }
}
