//! Unit tests for wn-graph.
//!
//! All tests use small hand-built networks.

#[cfg(test)]
mod helpers {
    use wn_core::{NodeId, Vec3};

    use crate::{Lane, WaypointGraph, WaypointGraphBuilder};

    /// Open road `0 → 1 → 2 → 3` along +Z with a link from 1 to the
    /// sidewalk node 4, plus a lone sidewalk pair 4 ↔ 5.
    ///
    /// ```text
    ///   z:  0     10     20     30
    ///       0 ──▶ 1 ──▶ 2 ──▶ 3        (road)
    ///             ╰─link─▶ 4 ◀──▶ 5    (sidewalk, x = 5)
    /// ```
    pub fn line_graph() -> (WaypointGraph, [NodeId; 6]) {
        let mut b = WaypointGraphBuilder::new();
        let n0 = b.add_node(Vec3::new(0.0, 0.0, 0.0), Lane::Road);
        let n1 = b.add_node(Vec3::new(0.0, 0.0, 10.0), Lane::Road);
        let n2 = b.add_node(Vec3::new(0.0, 0.0, 20.0), Lane::Road);
        let n3 = b.add_node(Vec3::new(0.0, 0.0, 30.0), Lane::Road);
        let n4 = b.add_node(Vec3::new(5.0, 0.0, 10.0), Lane::Sidewalk);
        let n5 = b.add_node(Vec3::new(5.0, 0.0, 20.0), Lane::Sidewalk);
        b.chain(&[n0, n1, n2, n3], false);
        b.chain(&[n4, n5], true);
        b.set_link(n1, n4);
        (b.build().unwrap(), [n0, n1, n2, n3, n4, n5])
    }
}

// ── Builder & structure ───────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use wn_core::{NodeId, Vec3};

    use crate::{GraphError, Lane, WaypointGraph, WaypointGraphBuilder};

    #[test]
    fn empty_build() {
        let g = WaypointGraphBuilder::new().build().unwrap();
        assert!(g.is_empty());
        assert_eq!(g.first_node(None), None);
        assert!(WaypointGraph::empty().successors(NodeId(0)).is_empty());
    }

    #[test]
    fn chain_sets_successors_and_predecessors() {
        let (g, [n0, n1, n2, n3, n4, n5]) = super::helpers::line_graph();
        assert_eq!(g.node_count(), 6);
        assert_eq!(g.successors(n0), &[n1]);
        assert_eq!(g.successors(n3), &[] as &[NodeId]);
        assert_eq!(g.predecessor(n3), Some(n2));
        assert_eq!(g.predecessor(n0), None);
        assert_eq!(g.link(n1), Some(n4));
        assert_eq!(g.successors(n5), &[n4], "closed chain wraps around");
    }

    #[test]
    fn lanes_are_partitioned() {
        let (g, [n0, n1, n2, n3, n4, n5]) = super::helpers::line_graph();
        assert_eq!(g.lane_nodes(Lane::Road), &[n0, n1, n2, n3]);
        assert_eq!(g.lane_nodes(Lane::Sidewalk), &[n4, n5]);
        assert_eq!(g.first_node(Some(Lane::Sidewalk)), Some(n4));
    }

    #[test]
    fn dangling_reference_rejected() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_node(Vec3::ZERO, Lane::Road);
        b.add_successor(a, NodeId(9));
        assert_eq!(
            b.build().err(),
            Some(GraphError::DanglingReference { from: a, to: NodeId(9) })
        );
    }

    #[test]
    fn self_link_rejected() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_node(Vec3::ZERO, Lane::Road);
        b.set_link(a, a);
        assert_eq!(b.build().err(), Some(GraphError::SelfReference(a)));
    }

    #[test]
    fn non_finite_position_rejected() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_node(Vec3::new(f32::NAN, 0.0, 0.0), Lane::Road);
        assert_eq!(b.build().err(), Some(GraphError::NonFinitePosition(a)));
    }

    #[test]
    fn isolated_node_is_dead_end() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_node(Vec3::ZERO, Lane::Road);
        let c = b.add_node(Vec3::new(1.0, 0.0, 0.0), Lane::Road);
        let lone = b.add_node(Vec3::new(9.0, 0.0, 0.0), Lane::Road);
        b.chain(&[a, c], false);
        let g = b.build().unwrap();
        assert_eq!(g.dead_ends(), vec![lone]);
    }
}

// ── Next-target selection ─────────────────────────────────────────────────────

#[cfg(test)]
mod select {
    use wn_core::{AgentId, AgentRng, NodeId, Vec3};

    use crate::{Lane, WaypointGraphBuilder};

    #[test]
    fn follows_single_successor() {
        let (g, [n0, n1, ..]) = super::helpers::line_graph();
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(g.next_target(n0, &mut rng, 0.2, false), Some(n1));
    }

    #[test]
    fn dead_end_reverses_only_when_allowed() {
        let (g, [_, _, n2, n3, ..]) = super::helpers::line_graph();
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(g.next_target(n3, &mut rng, 0.2, true), Some(n2));
        assert_eq!(g.next_target(n3, &mut rng, 0.2, false), None);
        assert!(g.is_terminal(n3, false));
        assert!(!g.is_terminal(n3, true));
    }

    #[test]
    fn link_probability_extremes() {
        let (g, [_, n1, n2, _, n4, _]) = super::helpers::line_graph();
        let mut rng = AgentRng::new(7, AgentId(1));
        for _ in 0..50 {
            assert_eq!(g.next_target(n1, &mut rng, 0.0, false), Some(n2));
            assert_eq!(g.next_target(n1, &mut rng, 1.0, false), Some(n4));
        }
    }

    #[test]
    fn link_taken_about_one_time_in_five() {
        let (g, [_, n1, _, _, n4, _]) = super::helpers::line_graph();
        let mut rng = AgentRng::new(99, AgentId(3));
        let trials = 5_000;
        let links = (0..trials)
            .filter(|_| g.next_target(n1, &mut rng, 0.2, false) == Some(n4))
            .count();
        let share = links as f64 / trials as f64;
        assert!((0.17..0.23).contains(&share), "link share {share}");
    }

    #[test]
    fn dead_end_with_only_link_takes_link() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_node(Vec3::ZERO, Lane::Road);
        let c = b.add_node(Vec3::new(0.0, 0.0, 5.0), Lane::Road);
        b.set_link(a, c);
        let g = b.build().unwrap();
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(g.next_target(a, &mut rng, 0.0, false), Some(c));
    }

    #[test]
    fn unknown_node_has_no_target() {
        let (g, _) = super::helpers::line_graph();
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(g.next_target(NodeId(77), &mut rng, 0.2, true), None);
    }

    #[test]
    fn random_target_stays_in_lane_and_moves() {
        let (g, [n0, ..]) = super::helpers::line_graph();
        let mut rng = AgentRng::new(3, AgentId(2));
        for _ in 0..200 {
            let t = g.random_target(n0, &mut rng).unwrap();
            assert_ne!(t, n0);
            assert_eq!(g.lane(t), Some(Lane::Road));
        }
    }

    #[test]
    fn random_target_single_node_lane() {
        let mut b = WaypointGraphBuilder::new();
        let only = b.add_node(Vec3::ZERO, Lane::Sidewalk);
        let g = b.build().unwrap();
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(g.random_target(only, &mut rng), Some(only));
    }

    #[test]
    fn same_seed_same_choices() {
        let (g, [_, n1, ..]) = super::helpers::line_graph();
        let run = |seed| {
            let mut rng = AgentRng::new(seed, AgentId(5));
            (0..32).map(|_| g.next_target(n1, &mut rng, 0.5, false)).collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}

// ── Nearest-node search ───────────────────────────────────────────────────────

#[cfg(test)]
mod nearest {
    use wn_core::{NodeId, Vec3};

    use crate::{
        AlwaysReachable, Lane, NearestSearch, SearchStatus, WaypointGraph, WaypointGraphBuilder,
        score_candidate,
    };

    fn front_and_back() -> (WaypointGraph, NodeId, NodeId) {
        let mut b = WaypointGraphBuilder::new();
        let back = b.add_node(Vec3::new(0.0, 0.0, -10.0), Lane::Road);
        let front = b.add_node(Vec3::new(0.0, 0.0, 10.0), Lane::Road);
        b.chain(&[back, front], true);
        (b.build().unwrap(), front, back)
    }

    #[test]
    fn forward_node_beats_rear_node() {
        let (g, front, _) = front_and_back();
        let no_path = |_: Vec3, _: Vec3| false;
        let hit = g.nearest_reachable_node(Vec3::ZERO, Vec3::FORWARD, 50.0, &no_path).unwrap();
        assert_eq!(hit.node, front);
        assert!((hit.score - 5.0).abs() < 1e-5);
        assert!(!hit.fallback);
    }

    #[test]
    fn scores_match_formula() {
        let s_front = score_candidate(Vec3::ZERO, Vec3::FORWARD, Vec3::new(0.0, 0.0, 10.0), false);
        let s_back = score_candidate(Vec3::ZERO, Vec3::FORWARD, Vec3::new(0.0, 0.0, -10.0), false);
        assert!((s_front - 5.0).abs() < 1e-5);
        assert!((s_back - 15.0).abs() < 1e-5);
        let reachable = score_candidate(Vec3::ZERO, Vec3::FORWARD, Vec3::new(0.0, 0.0, 10.0), true);
        assert!((reachable - 4.5).abs() < 1e-5);
    }

    #[test]
    fn reachable_node_can_win_over_closer_unreachable() {
        let mut b = WaypointGraphBuilder::new();
        let near = b.add_node(Vec3::new(0.0, 0.0, 10.0), Lane::Road);
        let far = b.add_node(Vec3::new(0.0, 0.0, 10.5), Lane::Road);
        let g = b.build().unwrap();
        let only_far = move |_: Vec3, to: Vec3| to.z > 10.2;
        let hit = g.nearest_reachable_node(Vec3::ZERO, Vec3::FORWARD, 50.0, &only_far).unwrap();
        // near: 10 × 0.5 = 5.0, far: 10.5 × 0.5 × 0.9 = 4.725
        assert_eq!(hit.node, far);
        assert_ne!(hit.node, near);
    }

    #[test]
    fn ties_keep_lowest_id() {
        let mut b = WaypointGraphBuilder::new();
        let left = b.add_node(Vec3::new(-3.0, 0.0, 4.0), Lane::Road);
        let _right = b.add_node(Vec3::new(3.0, 0.0, 4.0), Lane::Road);
        let g = b.build().unwrap();
        let hit = g.nearest_reachable_node(Vec3::ZERO, Vec3::FORWARD, 50.0, &AlwaysReachable).unwrap();
        assert_eq!(hit.node, left);
    }

    #[test]
    fn nothing_in_radius_falls_back_to_first_node() {
        let (g, _, back) = front_and_back();
        let hit = g.nearest_reachable_node(Vec3::new(500.0, 0.0, 0.0), Vec3::FORWARD, 50.0, &AlwaysReachable).unwrap();
        assert!(hit.fallback);
        assert_eq!(hit.node, back);
    }

    #[test]
    fn empty_graph_yields_none() {
        let g = WaypointGraph::empty();
        assert!(g.nearest_reachable_node(Vec3::ZERO, Vec3::FORWARD, 50.0, &AlwaysReachable).is_none());
    }

    #[test]
    fn batched_search_yields_between_batches() {
        let mut b = WaypointGraphBuilder::new();
        for i in 0..12 {
            b.add_node(Vec3::new(i as f32, 0.0, 1.0), Lane::Road);
        }
        let g = b.build().unwrap();
        let mut search = NearestSearch::new(Vec3::ZERO, Vec3::FORWARD, 50.0);
        assert_eq!(search.step(&g, 5, &AlwaysReachable), SearchStatus::Pending);
        assert_eq!(search.scored(), 5);
        assert_eq!(search.step(&g, 5, &AlwaysReachable), SearchStatus::Pending);
        match search.step(&g, 5, &AlwaysReachable) {
            SearchStatus::Done(hit) => assert_eq!(hit.node, NodeId(0)),
            other => panic!("expected Done, got {other:?}"),
        }
        assert_eq!(search.scored(), 12);
    }

    #[test]
    fn lane_filter_skips_other_lanes() {
        let (g, [_, _, _, _, n4, _]) = super::helpers::line_graph();
        let mut search = NearestSearch::new(Vec3::new(0.0, 0.0, 9.0), Vec3::FORWARD, 50.0)
            .in_lane(Lane::Sidewalk);
        match search.step(&g, usize::MAX, &AlwaysReachable) {
            SearchStatus::Done(hit) => assert_eq!(hit.node, n4),
            other => panic!("expected Done, got {other:?}"),
        }
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;
    use wn_core::{AgentId, AgentRng, NodeId, Vec3};

    use crate::{AlwaysReachable, Lane, WaypointGraphBuilder};

    proptest! {
        #[test]
        fn nearest_search_is_deterministic(
            coords in prop::collection::vec((-40.0f32..40.0, -40.0f32..40.0), 1..24),
            hx in -1.0f32..1.0,
            hz in -1.0f32..1.0,
        ) {
            let mut b = WaypointGraphBuilder::new();
            for (x, z) in &coords {
                b.add_node(Vec3::new(*x, 0.0, *z), Lane::Road);
            }
            let g = b.build().unwrap();
            let heading = Vec3::new(hx, 0.0, hz);
            let a = g.nearest_reachable_node(Vec3::ZERO, heading, 30.0, &AlwaysReachable);
            let c = g.nearest_reachable_node(Vec3::ZERO, heading, 30.0, &AlwaysReachable);
            prop_assert_eq!(a, c);
        }

        #[test]
        fn next_target_is_always_a_neighbour(seed in 0u64..10_000, start in 0u32..6) {
            let (g, _) = super::helpers::line_graph();
            let mut rng = AgentRng::new(seed, AgentId(0));
            let node = NodeId(start);
            if let Some(t) = g.next_target(node, &mut rng, 0.2, true) {
                let neighbour = g.successors(node).contains(&t)
                    || g.link(node) == Some(t)
                    || g.predecessor(node) == Some(t);
                prop_assert!(neighbour);
            }
        }
    }
}
