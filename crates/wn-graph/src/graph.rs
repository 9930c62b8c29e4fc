//! Waypoint network representation and builder.
//!
//! # Data layout
//!
//! Successor lists use **Compressed Sparse Row (CSR)** format.  Given a
//! `NodeId n`, its ordered successors occupy the slice:
//!
//! ```text
//! succ[ succ_start[n] .. succ_start[n+1] ]
//! ```
//!
//! The optional branch link and predecessor are stored in parallel
//! `Vec<Option<NodeId>>` arrays, one slot per node.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over 3-D node positions answers the radius query
//! behind nearest-waypoint search at spawn and resume time.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::warn;

use wn_core::{NodeId, Vec3};

use crate::{GraphError, GraphResult};

// ── Lane ──────────────────────────────────────────────────────────────────────

/// Which kind of traffic a waypoint serves.
///
/// Random routing and nearest-node search stay inside one lane so a
/// pedestrian never wanders onto the road network and vice versa.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lane {
    #[default]
    Road,
    Sidewalk,
}

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 3],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── WaypointNode ──────────────────────────────────────────────────────────────

/// Authoring description of a node, as handed to the builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaypointNode {
    pub pos:         Vec3,
    pub lane:        Lane,
    /// Ordered successors along the sequential path.
    pub successors:  Vec<NodeId>,
    /// Alternate route taken with a small probability.
    pub link:        Option<NodeId>,
    pub predecessor: Option<NodeId>,
}

impl WaypointNode {
    pub fn new(pos: Vec3, lane: Lane) -> Self {
        Self { pos, lane, successors: Vec::new(), link: None, predecessor: None }
    }
}

// ── WaypointGraph ─────────────────────────────────────────────────────────────

/// Immutable waypoint network shared by all agents.
///
/// Do not construct directly; use [`WaypointGraphBuilder`].
pub struct WaypointGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    pub node_pos:  Vec<Vec3>,
    pub node_lane: Vec<Lane>,

    // ── Topology ──────────────────────────────────────────────────────────
    succ_start:  Vec<u32>,
    succ:        Vec<NodeId>,
    link:        Vec<Option<NodeId>>,
    predecessor: Vec<Option<NodeId>>,

    // ── Per-lane node lists (ascending NodeId) ────────────────────────────
    road_nodes:     Vec<NodeId>,
    sidewalk_nodes: Vec<NodeId>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl WaypointGraph {
    /// A graph with no nodes.  Every query against it returns `None`.
    pub fn empty() -> Self {
        Self {
            node_pos:       Vec::new(),
            node_lane:      Vec::new(),
            succ_start:     vec![0],
            succ:           Vec::new(),
            link:           Vec::new(),
            predecessor:    Vec::new(),
            road_nodes:     Vec::new(),
            sidewalk_nodes: Vec::new(),
            spatial_idx:    RTree::new(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Node accessors ────────────────────────────────────────────────────

    /// Position of `node`.  Returns `None` for ids outside the graph.
    #[inline]
    pub fn pos(&self, node: NodeId) -> Option<Vec3> {
        self.node_pos.get(node.index()).copied()
    }

    #[inline]
    pub fn lane(&self, node: NodeId) -> Option<Lane> {
        self.node_lane.get(node.index()).copied()
    }

    /// Ordered successors of `node`; empty for unknown ids.
    #[inline]
    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        if !self.contains(node) {
            return &[];
        }
        let start = self.succ_start[node.index()] as usize;
        let end   = self.succ_start[node.index() + 1] as usize;
        &self.succ[start..end]
    }

    #[inline]
    pub fn link(&self, node: NodeId) -> Option<NodeId> {
        self.link.get(node.index()).copied().flatten()
    }

    #[inline]
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessor.get(node.index()).copied().flatten()
    }

    /// All nodes of `lane` in ascending id order.
    pub fn lane_nodes(&self, lane: Lane) -> &[NodeId] {
        match lane {
            Lane::Road     => &self.road_nodes,
            Lane::Sidewalk => &self.sidewalk_nodes,
        }
    }

    /// First node of the graph, optionally restricted to one lane.
    pub fn first_node(&self, lane: Option<Lane>) -> Option<NodeId> {
        match lane {
            Some(l) => self.lane_nodes(l).first().copied(),
            None if self.is_empty() => None,
            None => Some(NodeId(0)),
        }
    }

    /// Nodes with no successor, predecessor, or link.  An agent routed
    /// onto one of these cannot continue and must be retired.
    pub fn dead_ends(&self) -> Vec<NodeId> {
        (0..self.node_count())
            .map(|i| NodeId(i as u32))
            .filter(|&n| {
                self.successors(n).is_empty()
                    && self.link(n).is_none()
                    && self.predecessor(n).is_none()
            })
            .collect()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nodes within `radius` of `pos`, in ascending id order.
    pub fn nodes_within(&self, pos: Vec3, radius: f32) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = self
            .spatial_idx
            .locate_within_distance(pos.to_array(), radius * radius)
            .map(|e| e.id)
            .collect();
        found.sort_unstable();
        found
    }

    /// The single closest node to `pos`, ignoring heading and lane.
    pub fn closest_node(&self, pos: Vec3) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }
}

// ── WaypointGraphBuilder ──────────────────────────────────────────────────────

/// Construct a [`WaypointGraph`] incrementally, then call
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use wn_core::Vec3;
/// use wn_graph::{Lane, WaypointGraphBuilder};
///
/// let mut b = WaypointGraphBuilder::new();
/// let a = b.add_node(Vec3::new(0.0, 0.0, 0.0), Lane::Road);
/// let c = b.add_node(Vec3::new(0.0, 0.0, 10.0), Lane::Road);
/// b.chain(&[a, c], true);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.successors(a), &[c]);
/// assert_eq!(graph.predecessor(a), Some(c));
/// ```
#[derive(Default)]
pub struct WaypointGraphBuilder {
    nodes: Vec<WaypointNode>,
}

impl WaypointGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Vec3, lane: Lane) -> NodeId {
        self.push(WaypointNode::new(pos, lane))
    }

    /// Add a fully described node.  References are validated in `build`.
    pub fn push(&mut self, node: WaypointNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append `to` to the successor list of `from`.
    pub fn add_successor(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        if let Some(n) = self.nodes.get_mut(from.index()) {
            n.successors.push(to);
        }
        self
    }

    pub fn set_link(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        if let Some(n) = self.nodes.get_mut(from.index()) {
            n.link = Some(to);
        }
        self
    }

    pub fn set_predecessor(&mut self, node: NodeId, pred: NodeId) -> &mut Self {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.predecessor = Some(pred);
        }
        self
    }

    /// Wire `path` as a sequential route: each node gets the next as
    /// successor and the previous as predecessor.  With `closed`, the last
    /// node also leads back to the first.
    pub fn chain(&mut self, path: &[NodeId], closed: bool) -> &mut Self {
        for pair in path.windows(2) {
            self.add_successor(pair[0], pair[1]);
            self.set_predecessor(pair[1], pair[0]);
        }
        if closed && path.len() > 1 {
            let (first, last) = (path[0], path[path.len() - 1]);
            self.add_successor(last, first);
            self.set_predecessor(first, last);
        }
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Validate references and produce the graph.
    ///
    /// Dangling or self references and non-finite positions are errors.
    /// Dead ends are legal (finite paths end there) but are logged.
    pub fn build(self) -> GraphResult<WaypointGraph> {
        let n = self.nodes.len();
        if u32::try_from(n).is_err() || n == u32::MAX as usize {
            return Err(GraphError::TooManyNodes(n));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            let p = node.pos;
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(GraphError::NonFinitePosition(id));
            }
            let refs = node.successors.iter().copied().chain(node.link).chain(node.predecessor);
            for to in refs {
                if to == id {
                    return Err(GraphError::SelfReference(id));
                }
                if to.index() >= n {
                    return Err(GraphError::DanglingReference { from: id, to });
                }
            }
        }

        let mut succ_start = Vec::with_capacity(n + 1);
        let mut succ = Vec::new();
        succ_start.push(0u32);
        for node in &self.nodes {
            succ.extend_from_slice(&node.successors);
            succ_start.push(succ.len() as u32);
        }

        let mut road_nodes = Vec::new();
        let mut sidewalk_nodes = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            match node.lane {
                Lane::Road     => road_nodes.push(NodeId(i as u32)),
                Lane::Sidewalk => sidewalk_nodes.push(NodeId(i as u32)),
            }
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| NodeEntry { point: node.pos.to_array(), id: NodeId(i as u32) })
            .collect();

        let graph = WaypointGraph {
            node_pos:    self.nodes.iter().map(|nd| nd.pos).collect(),
            node_lane:   self.nodes.iter().map(|nd| nd.lane).collect(),
            succ_start,
            succ,
            link:        self.nodes.iter().map(|nd| nd.link).collect(),
            predecessor: self.nodes.iter().map(|nd| nd.predecessor).collect(),
            road_nodes,
            sidewalk_nodes,
            spatial_idx: RTree::bulk_load(entries),
        };

        let dead = graph.dead_ends();
        if !dead.is_empty() {
            warn!(count = dead.len(), first = %dead[0], "waypoint graph has dead-end nodes");
        }
        Ok(graph)
    }
}
