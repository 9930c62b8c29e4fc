//! Next-waypoint selection.
//!
//! Two routing styles share the graph:
//!
//! - **Sequential** ([`WaypointGraph::next_target`]): follow successors,
//!   occasionally branching onto the node's link, and turn back along the
//!   predecessor at dead ends when the agent is allowed to.
//! - **Random** ([`WaypointGraph::random_target`]): pick any other node of
//!   the same lane, used by wandering pedestrians.
//!
//! Both draw from the caller's [`AgentRng`], so choices are reproducible per
//! agent regardless of how other agents consume randomness.

use wn_core::{AgentRng, NodeId};

use crate::graph::WaypointGraph;

impl WaypointGraph {
    /// The waypoint to head for after `current`, or `None` if `current` is
    /// terminal for this agent.
    ///
    /// - With both a successor and a link, the link wins with probability
    ///   `link_probability`, otherwise a successor is taken.
    /// - Several successors are chosen between uniformly.
    /// - With no successor, the predecessor is used when `allow_reverse`,
    ///   then the link, otherwise the path ends here.
    pub fn next_target(
        &self,
        current:          NodeId,
        rng:              &mut AgentRng,
        link_probability: f64,
        allow_reverse:    bool,
    ) -> Option<NodeId> {
        if !self.contains(current) {
            return None;
        }
        let succ = self.successors(current);
        let link = self.link(current);

        if succ.is_empty() {
            let reverse = if allow_reverse { self.predecessor(current) } else { None };
            return reverse.or(link);
        }

        if link.is_some() && rng.gen_bool(link_probability) {
            return link;
        }

        match succ {
            [only] => Some(*only),
            many   => rng.choose(many).copied(),
        }
    }

    /// A uniformly random node in the lane of `current`, never `current`
    /// itself unless it is the only node of its lane.
    pub fn random_target(&self, current: NodeId, rng: &mut AgentRng) -> Option<NodeId> {
        let lane = self.lane(current)?;
        let nodes = self.lane_nodes(lane);
        match nodes.len() {
            0 => None,
            1 => Some(nodes[0]),
            len => {
                // Draw from the lane minus `current` without allocating.
                let skip = nodes.binary_search(&current).ok();
                let range = if skip.is_some() { len - 1 } else { len };
                let mut i = rng.index(range);
                if skip.is_some_and(|s| i >= s) {
                    i += 1;
                }
                Some(nodes[i])
            }
        }
    }

    /// Whether an agent sitting on `node` has nowhere left to go.
    pub fn is_terminal(&self, node: NodeId, allow_reverse: bool) -> bool {
        self.successors(node).is_empty()
            && self.link(node).is_none()
            && !(allow_reverse && self.predecessor(node).is_some())
    }
}
