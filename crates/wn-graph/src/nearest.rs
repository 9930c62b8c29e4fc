//! Nearest-reachable-waypoint search.
//!
//! # Scoring
//!
//! Every candidate within the search radius is scored as
//!
//! ```text
//! score = distance × direction_penalty × reach_factor
//! direction_penalty = 0.5 if heading · (node − pos) > 0 else 1.5
//! reach_factor      = 0.9 if reachable else 1.0
//! ```
//!
//! The lowest score wins; ties keep the candidate found first (lowest
//! `NodeId`).  When nothing lies within the radius the first node of the
//! graph (or lane) is returned and flagged as a fallback.
//!
//! # Batching
//!
//! Reachability checks can be expensive (they usually ask the mover for a
//! path), so [`NearestSearch`] scores candidates in batches and can be
//! resumed over several navigation ticks.  One agent's search then never
//! monopolises a tick.

use tracing::warn;

use wn_core::{NodeId, Vec3};

use crate::graph::{Lane, WaypointGraph};

const FRONT_PENALTY:  f32 = 0.5;
const BEHIND_PENALTY: f32 = 1.5;
const REACHABLE_BONUS: f32 = 0.9;

// ── Reachability ──────────────────────────────────────────────────────────────

/// Path feasibility check between two positions.
///
/// Usually backed by the mover's own navigation surface.  Any
/// `Fn(Vec3, Vec3) -> bool` closure implements it.
pub trait Reachability {
    fn is_reachable(&self, from: Vec3, to: Vec3) -> bool;
}

impl<F> Reachability for F
where
    F: Fn(Vec3, Vec3) -> bool,
{
    #[inline]
    fn is_reachable(&self, from: Vec3, to: Vec3) -> bool {
        self(from, to)
    }
}

/// Treats every node as reachable.
#[derive(Copy, Clone, Debug, Default)]
pub struct AlwaysReachable;

impl Reachability for AlwaysReachable {
    #[inline]
    fn is_reachable(&self, _from: Vec3, _to: Vec3) -> bool {
        true
    }
}

/// Score one candidate node.  Lower is better.
pub fn score_candidate(pos: Vec3, heading: Vec3, node_pos: Vec3, reachable: bool) -> f32 {
    let to_node = node_pos - pos;
    let penalty = if heading.dot(to_node.normalize_or_zero()) > 0.0 {
        FRONT_PENALTY
    } else {
        BEHIND_PENALTY
    };
    let score = to_node.length() * penalty;
    if reachable { score * REACHABLE_BONUS } else { score }
}

// ── NearestSearch ─────────────────────────────────────────────────────────────

/// Result of a completed search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NearestNode {
    pub node:     NodeId,
    /// `f32::INFINITY` for a fallback result.
    pub score:    f32,
    /// No node lay within the radius; `node` is the first node instead.
    pub fallback: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SearchStatus {
    /// More candidates remain; call `step` again.
    Pending,
    Done(NearestNode),
    /// The graph (or lane) has no nodes at all.
    Empty,
}

/// Incremental nearest-reachable-node search.
#[derive(Clone, Debug)]
pub struct NearestSearch {
    pos:        Vec3,
    heading:    Vec3,
    radius:     f32,
    lane:       Option<Lane>,
    candidates: Option<Vec<NodeId>>,
    cursor:     usize,
    best:       Option<(NodeId, f32)>,
}

impl NearestSearch {
    pub fn new(pos: Vec3, heading: Vec3, radius: f32) -> Self {
        Self {
            pos,
            heading,
            radius,
            lane: None,
            candidates: None,
            cursor: 0,
            best: None,
        }
    }

    /// Only consider nodes of `lane`.
    pub fn in_lane(mut self, lane: Lane) -> Self {
        self.lane = Some(lane);
        self
    }

    /// Candidates scored so far.
    pub fn scored(&self) -> usize {
        self.cursor
    }

    /// Score up to `batch` further candidates (at least one).
    pub fn step<R: Reachability + ?Sized>(
        &mut self,
        graph: &WaypointGraph,
        batch: usize,
        reach: &R,
    ) -> SearchStatus {
        let lane = self.lane;
        let candidates = self.candidates.get_or_insert_with(|| {
            let mut found = graph.nodes_within(self.pos, self.radius);
            if let Some(l) = lane {
                found.retain(|&n| graph.lane(n) == Some(l));
            }
            found
        });

        if candidates.is_empty() {
            return match graph.first_node(lane) {
                Some(node) => {
                    warn!(
                        pos = %self.pos,
                        radius = self.radius,
                        %node,
                        "no waypoint within search radius; falling back to first node"
                    );
                    SearchStatus::Done(NearestNode { node, score: f32::INFINITY, fallback: true })
                }
                None => SearchStatus::Empty,
            };
        }

        let end = self.cursor.saturating_add(batch.max(1)).min(candidates.len());
        for &node in &candidates[self.cursor..end] {
            let Some(node_pos) = graph.pos(node) else { continue };
            let reachable = reach.is_reachable(self.pos, node_pos);
            let score = score_candidate(self.pos, self.heading, node_pos, reachable);
            // Strict comparison keeps the first-found node on ties.
            if self.best.is_none_or(|(_, best)| score < best) {
                self.best = Some((node, score));
            }
        }
        self.cursor = end;

        if self.cursor < candidates.len() {
            return SearchStatus::Pending;
        }
        match self.best {
            Some((node, score)) => SearchStatus::Done(NearestNode { node, score, fallback: false }),
            None => SearchStatus::Empty,
        }
    }
}

impl WaypointGraph {
    /// Run a [`NearestSearch`] to completion in one call.
    pub fn nearest_reachable_node<R: Reachability + ?Sized>(
        &self,
        pos:     Vec3,
        heading: Vec3,
        radius:  f32,
        reach:   &R,
    ) -> Option<NearestNode> {
        let mut search = NearestSearch::new(pos, heading, radius);
        match search.step(self, usize::MAX, reach) {
            SearchStatus::Done(hit) => Some(hit),
            SearchStatus::Empty | SearchStatus::Pending => None,
        }
    }
}
