//! The crossroads layout.
//!
//! Two one-way road loops cross at a signalled junction; a sidewalk loop
//! runs around loop A, 4 m clear of it.
//!
//! Loop A runs counter-clockwise around the block between x = 0 and
//! x = 40; loop B is a 40 m square centred on the origin.  They cross at
//! (0, 20), where node A1 also links across onto loop B.

use wn_core::{Aabb, NodeId, Vec3};
use wn_graph::{GraphResult, Lane, WaypointGraph, WaypointGraphBuilder};

pub struct Layout {
    pub graph:           WaypointGraph,
    pub junction:        Aabb,
    /// Road nodes AI vehicles may spawn on.
    pub road_spawns:     Vec<NodeId>,
    pub sidewalk_spawns: Vec<NodeId>,
}

fn p(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.0, z)
}

pub fn build_layout() -> GraphResult<Layout> {
    let mut b = WaypointGraphBuilder::new();

    // Loop A, counter-clockwise around the east block.
    let loop_a = [p(0.0, 0.0), p(0.0, 20.0), p(0.0, 40.0), p(40.0, 40.0), p(40.0, 0.0)]
        .map(|pos| b.add_node(pos, Lane::Road));
    b.chain(&loop_a, true);

    // Loop B, crossing loop A at the junction.
    let loop_b = [p(-20.0, 20.0), p(20.0, 20.0), p(20.0, -20.0), p(-20.0, -20.0)]
        .map(|pos| b.add_node(pos, Lane::Road));
    b.chain(&loop_b, true);

    // Traffic at the junction may turn onto loop B.
    b.set_link(loop_a[1], loop_b[1]);

    let sidewalk = [p(-4.0, -4.0), p(-4.0, 44.0), p(44.0, 44.0), p(44.0, -4.0)]
        .map(|pos| b.add_node(pos, Lane::Sidewalk));
    b.chain(&sidewalk, true);

    Ok(Layout {
        graph:           b.build()?,
        junction:        Aabb::from_corners(Vec3::new(-3.0, -1.0, 17.0), Vec3::new(3.0, 1.0, 23.0)),
        road_spawns:     vec![loop_a[0], loop_a[2], loop_a[3], loop_b[2], loop_b[3]],
        sidewalk_spawns: sidewalk.to_vec(),
    })
}
