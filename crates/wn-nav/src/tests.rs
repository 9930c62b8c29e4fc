//! Unit tests for wn-nav.
//!
//! Navigation runs are driven the way the simulation drives them: the mover
//! and heading every 50 ms base tick, the navigation cycle every second tick.

#[cfg(test)]
mod helpers {
    use std::time::Duration;

    use wn_core::{NodeId, Vec3};
    use wn_graph::{Lane, WaypointGraph, WaypointGraphBuilder};

    use crate::{Heading, KinematicMover, Mover, NavConfig, NavEvent, Navigator};

    pub const BASE: Duration = Duration::from_millis(50);
    pub const NAV_DT: Duration = Duration::from_millis(100);

    /// Open road `0 → 1 → 2 → 3` along +Z, 10 m apart.
    pub fn road() -> (WaypointGraph, [NodeId; 4]) {
        let mut b = WaypointGraphBuilder::new();
        let ids = [0.0f32, 10.0, 20.0, 30.0].map(|z| b.add_node(Vec3::new(0.0, 0.0, z), Lane::Road));
        b.chain(&ids, false);
        (b.build().unwrap(), ids)
    }

    /// Run `ticks` base ticks and collect `(tick, event)` pairs.
    pub fn drive(
        nav:     &mut Navigator,
        graph:   &WaypointGraph,
        cfg:     &NavConfig,
        mover:   &mut KinematicMover,
        heading: &mut Heading,
        ticks:   u64,
    ) -> Vec<(u64, NavEvent)> {
        let mut out = Vec::new();
        for t in 0..ticks {
            mover.advance(BASE);
            heading.update(&*mover, BASE, cfg.turn_rate);
            if t % 2 == 0 {
                for e in nav.nav_tick(graph, cfg, *heading, mover, NAV_DT) {
                    out.push((t, e));
                }
            }
        }
        out
    }
}

// ── Mover ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod mover {
    use std::time::Duration;

    use wn_core::{Aabb, Vec3};

    use crate::{KinematicMover, Mover};

    #[test]
    fn moves_at_constant_speed_without_overshoot() {
        let mut m = KinematicMover::new(Vec3::ZERO, 4.0);
        assert!(m.set_target(Vec3::new(0.0, 0.0, 1.0)));
        m.advance(Duration::from_millis(100));
        assert!((m.position().z - 0.4).abs() < 1e-5);
        assert!((m.velocity().length() - 4.0).abs() < 1e-3);
        m.advance(Duration::from_secs(1));
        assert_eq!(m.position(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(m.remaining_distance(), 0.0);
    }

    #[test]
    fn rejects_targets_outside_bounds() {
        let bounds = Aabb::from_corners(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let mut m = KinematicMover::new(Vec3::ZERO, 1.0).with_bounds(bounds);
        assert!(!m.set_target(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(m.target(), None);
        assert!(m.is_on_navigable_surface());
        m.warp(Vec3::new(9.0, 0.0, 0.0));
        assert!(!m.is_on_navigable_surface());
    }

    #[test]
    fn obstructed_mover_reports_zero_velocity() {
        let mut m = KinematicMover::new(Vec3::ZERO, 5.0);
        m.set_target(Vec3::new(0.0, 0.0, 10.0));
        m.set_obstructed(true);
        m.advance(Duration::from_millis(50));
        assert_eq!(m.velocity(), Vec3::ZERO);
        assert_eq!(m.position(), Vec3::ZERO);
    }

    #[test]
    fn stop_clears_target() {
        let mut m = KinematicMover::new(Vec3::ZERO, 5.0);
        m.set_target(Vec3::new(0.0, 0.0, 10.0));
        m.advance(Duration::from_millis(50));
        m.stop();
        assert_eq!(m.remaining_distance(), 0.0);
        assert_eq!(m.velocity(), Vec3::ZERO);
    }
}

// ── Arbitration ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod arbitration {
    use wn_core::{AgentId, SignalId};
    use wn_signal::ZoneExit;

    use crate::{Blocker, MotionDecision, Vetoes};

    #[test]
    fn no_vetoes_permits() {
        let v = Vetoes::new();
        assert!(v.decide(false).permitted(), "unbound signal state is ignored");
        assert_eq!(v.decide(true), MotionDecision::GO);
    }

    #[test]
    fn each_veto_blocks_on_its_own() {
        let mut v = Vetoes::new();
        v.bind_signal(SignalId(0));
        assert!(!v.decide(false).permitted());
        assert!(v.decide(true).permitted());

        let mut p = Vetoes::new();
        p.sensor_enter(AgentId(1));
        assert!(!p.decide(true).permitted());
        assert_eq!(p.decide(true).blockers().collect::<Vec<_>>(), vec![Blocker::Proximity]);
    }

    #[test]
    fn both_vetoes_must_clear() {
        let mut v = Vetoes::new();
        v.bind_signal(SignalId(0));
        v.sensor_enter(AgentId(1));
        let d = v.decide(false);
        assert_eq!(d.blockers().collect::<Vec<_>>(), vec![Blocker::Signal, Blocker::Proximity]);
        // Signal turns green: proximity still holds the agent.
        assert!(!v.decide(true).permitted());
        assert_eq!(v.sensor_exit(AgentId(1)), ZoneExit::Left);
        assert!(v.decide(true).permitted());
    }

    #[test]
    fn duplicate_exits_never_underflow() {
        let mut v = Vetoes::new();
        v.sensor_enter(AgentId(2));
        v.sensor_enter(AgentId(2));
        v.sensor_exit(AgentId(2));
        assert_eq!(v.proximity_count(), 1);
        v.sensor_exit(AgentId(2));
        assert_eq!(v.sensor_exit(AgentId(2)), ZoneExit::Absent);
        assert_eq!(v.proximity_count(), 0);
        assert!(v.decide(true).permitted());
    }

    #[test]
    fn unbind_only_matching_signal() {
        let mut v = Vetoes::new();
        v.bind_signal(SignalId(3));
        v.unbind_signal(SignalId(4));
        assert_eq!(v.bound_signal(), Some(SignalId(3)));
        v.unbind_signal(SignalId(3));
        assert_eq!(v.bound_signal(), None);
    }
}

// ── Heading ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod heading {
    use std::time::Duration;

    use wn_core::Vec3;

    use crate::{Heading, KinematicMover, Mover};

    #[test]
    fn turns_towards_steering_target() {
        let mut m = KinematicMover::new(Vec3::ZERO, 5.0);
        m.set_target(Vec3::new(100.0, 0.0, 0.0));
        let mut h = Heading::default();
        let dt = Duration::from_millis(50);
        m.advance(dt);
        h.update(&m, dt, 5.0);
        let first = h.dir().x;
        assert!(first > 0.0 && first < 1.0);
        for _ in 0..60 {
            m.advance(dt);
            h.update(&m, dt, 5.0);
        }
        assert!(h.dir().x > 0.99, "heading {:?}", h.dir());
    }

    #[test]
    fn fast_turn_rate_lands_on_target_direction() {
        let mut m = KinematicMover::new(Vec3::ZERO, 5.0);
        m.set_target(Vec3::new(100.0, 0.0, 0.0));
        let mut h = Heading::new(Vec3::new(0.0, 0.0, 1.0));
        let dt = Duration::from_millis(50);
        m.advance(dt);
        h.update(&m, dt, 1000.0);
        let d = h.dir();
        assert!((d.x - 1.0).abs() < 1e-5 && d.z.abs() < 1e-5, "heading {d:?}");
        assert!((d.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn stationary_agent_keeps_heading() {
        let m = KinematicMover::new(Vec3::ZERO, 5.0);
        let mut h = Heading::new(Vec3::new(1.0, 0.0, 0.0));
        h.update(&m, Duration::from_millis(50), 5.0);
        assert_eq!(h.dir(), Vec3::new(1.0, 0.0, 0.0));
    }
}

// ── Navigator ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod navigator {
    use std::time::Duration;

    use wn_core::{Aabb, AgentId, NodeId, SignalId, Vec3};
    use wn_graph::{Lane, WaypointGraph, WaypointGraphBuilder};

    use super::helpers::{drive, road};
    use crate::{
        Heading, KinematicMover, MotionDecision, Mover, NavConfig, NavEvent, NavProfile, NavState,
        Navigator, Vetoes,
    };

    fn finite_vehicle() -> NavProfile {
        NavProfile { cyclic: false, ..NavProfile::vehicle() }
    }

    fn arrivals(events: &[(u64, NavEvent)]) -> Vec<NodeId> {
        events
            .iter()
            .filter_map(|(_, e)| match e {
                NavEvent::Arrived(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn follows_the_road_to_the_end() {
        let (g, ids) = road();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), finite_vehicle(), 1);
        let mut mover = KinematicMover::new(Vec3::new(0.0, 0.0, -1.0), 1.0);
        nav.attach(&mut mover);
        assert_eq!(mover.speed(), 10.0);
        let mut heading = Heading::default();

        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 200);
        assert_eq!(arrivals(&events), ids.to_vec());
        assert!(nav.is_terminated());
    }

    #[test]
    fn terminated_agent_retires_within_grace_and_never_seeks_again() {
        let (g, _) = road();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), finite_vehicle(), 1);
        let mut mover = KinematicMover::new(Vec3::new(0.0, 0.0, -1.0), 10.0);
        let mut heading = Heading::default();

        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 400);
        let term = events.iter().find(|(_, e)| *e == NavEvent::Terminated).map(|(t, _)| *t).unwrap();
        let retire = events.iter().find(|(_, e)| *e == NavEvent::Retire).map(|(t, _)| *t).unwrap();
        let grace_ticks = cfg.terminate_grace.as_millis() as u64 / 50;
        assert!(retire > term && retire - term <= grace_ticks);
        assert_eq!(events.iter().filter(|(_, e)| *e == NavEvent::Retire).count(), 1);
        assert!(events.iter().all(|(t, e)| *t <= term || !matches!(e, NavEvent::Arrived(_))));
        assert!(matches!(nav.state(), NavState::Terminated { .. }));
    }

    #[test]
    fn reset_keeps_a_terminated_agent_terminated() {
        let (g, _) = road();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), finite_vehicle(), 1);
        let mut mover = KinematicMover::new(Vec3::new(0.0, 0.0, -1.0), 10.0);
        let mut heading = Heading::default();
        for _ in 0..200 {
            if nav.is_terminated() {
                break;
            }
            drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 2);
        }
        let grace = match nav.state() {
            NavState::Terminated { grace } => *grace,
            other => panic!("expected terminated, got {}", other.name()),
        };

        nav.reset(&mut mover);
        assert!(matches!(nav.state(), NavState::Terminated { grace: left } if *left == grace));
        assert_eq!(mover.velocity(), Vec3::ZERO);

        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 400);
        assert_eq!(events.iter().map(|(_, e)| *e).collect::<Vec<_>>(), vec![NavEvent::Retire]);
        assert!(nav.is_terminated());
    }

    #[test]
    fn cyclic_vehicle_turns_back_at_dead_end() {
        let (g, [_, _, n2, n3]) = road();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 1);
        let mut mover = KinematicMover::new(Vec3::new(0.0, 0.0, -1.0), 10.0);
        let mut heading = Heading::default();

        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 120);
        let seen = arrivals(&events);
        let at_end = seen.iter().position(|&n| n == n3).unwrap();
        assert_eq!(seen.get(at_end + 1), Some(&n2));
        assert!(!nav.is_terminated());
    }

    #[test]
    fn stall_triggers_exactly_one_recompute_per_episode() {
        let (g, _) = road();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 1);
        let mut mover = KinematicMover::new(Vec3::new(0.0, 0.0, -5.0), 10.0);
        mover.set_obstructed(true);
        let mut heading = Heading::default();

        // 20 s wedged: one stall, not one every 2 s.
        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 400);
        let stalls: Vec<u64> = events.iter().filter(|(_, e)| *e == NavEvent::Stalled).map(|(t, _)| *t).collect();
        assert_eq!(stalls.len(), 1);
        assert!(stalls[0] >= 40, "stall must wait out the threshold, got tick {}", stalls[0]);
        assert!(nav.is_stalled());

        // Moving again ends the episode.
        mover.set_obstructed(false);
        let _ = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 10);
        assert!(!nav.is_stalled());

        // A fresh wedge is a fresh episode.
        mover.set_obstructed(true);
        let again = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 400);
        assert_eq!(again.iter().filter(|(_, e)| *e == NavEvent::Stalled).count(), 1);
    }

    #[test]
    fn pedestrian_waits_at_each_waypoint() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_node(Vec3::ZERO, Lane::Sidewalk);
        let c = b.add_node(Vec3::new(0.0, 0.0, 10.0), Lane::Sidewalk);
        b.chain(&[a, c], true);
        let g = b.build().unwrap();

        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(4), NavProfile::pedestrian(), 9);
        let mut mover = KinematicMover::new(Vec3::new(0.0, 0.0, -0.5), 1.0);
        nav.attach(&mut mover);
        let mut heading = Heading::default();

        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 200);
        let arrived: Vec<(u64, NodeId)> = events
            .iter()
            .filter_map(|(t, e)| match e {
                NavEvent::Arrived(n) => Some((*t, *n)),
                _ => None,
            })
            .collect();
        assert_eq!(arrived[0].1, a);
        assert_eq!(arrived[1].1, c);
        // 2 s pause (40 base ticks) plus ~9 m at 3.5 m/s.
        assert!(arrived[1].0 - arrived[0].0 >= 40 + 40);
    }

    #[test]
    fn unreachable_waypoint_is_skipped() {
        let mut b = WaypointGraphBuilder::new();
        let n0 = b.add_node(Vec3::ZERO, Lane::Road);
        let n1 = b.add_node(Vec3::new(20.0, 0.0, 10.0), Lane::Road);
        let n2 = b.add_node(Vec3::new(0.0, 0.0, 20.0), Lane::Road);
        b.chain(&[n0, n1, n2], true);
        let g = b.build().unwrap();

        let bounds = Aabb::from_corners(Vec3::new(-2.0, -2.0, -2.0), Vec3::new(2.0, 2.0, 25.0));
        let mut mover = KinematicMover::new(Vec3::ZERO, 10.0).with_bounds(bounds);
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 3).starting_at(n1);
        let cfg = NavConfig::default();

        nav.nav_tick(&g, &cfg, Heading::default(), &mut mover, Duration::from_millis(100));
        assert_eq!(nav.target(), Some(n2));
        assert_eq!(mover.target(), Some(Vec3::new(0.0, 0.0, 20.0)));
    }

    #[test]
    fn nothing_reachable_goes_back_to_searching() {
        let (g, [_, n1, ..]) = road();
        let bounds = Aabb::from_corners(Vec3::new(50.0, -1.0, 50.0), Vec3::new(60.0, 1.0, 60.0));
        let mut mover = KinematicMover::new(Vec3::new(55.0, 0.0, 55.0), 10.0).with_bounds(bounds);
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 3).starting_at(n1);
        nav.nav_tick(&g, &NavConfig::default(), Heading::default(), &mut mover, Duration::from_millis(100));
        assert!(matches!(nav.state(), NavState::Uninitialized));
        assert_eq!(mover.target(), None);
    }

    #[test]
    fn veto_halts_and_release_resumes() {
        let (g, [_, n1, ..]) = road();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 1).starting_at(n1);
        let mut mover = KinematicMover::new(Vec3::ZERO, 10.0);
        let mut heading = Heading::default();
        drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 2);
        assert!(mover.target().is_some());

        let mut vetoes = Vetoes::new();
        vetoes.bind_signal(SignalId(0));
        nav.apply_decision(vetoes.decide(false), &g, &cfg, heading, &mut mover);
        assert!(!nav.is_permitted());
        assert_eq!(mover.target(), None);

        let held_at = mover.position();
        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 100);
        assert!(events.is_empty());
        assert_eq!(mover.position(), held_at);

        nav.apply_decision(vetoes.decide(true), &g, &cfg, heading, &mut mover);
        assert!(nav.is_permitted());
        assert_eq!(mover.target(), Some(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn release_without_valid_target_recomputes_first() {
        let (g, [.., n3]) = road();
        let cfg = NavConfig::default();
        let bounds = Aabb::from_corners(Vec3::new(-2.0, -2.0, -2.0), Vec3::new(2.0, 2.0, 12.0));
        let mut mover = KinematicMover::new(Vec3::ZERO, 10.0).with_bounds(bounds);
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 1).starting_at(n3);

        let blocked = MotionDecision { signal: false, proximity: true };
        nav.apply_decision(blocked, &g, &cfg, Heading::default(), &mut mover);
        nav.apply_decision(MotionDecision::GO, &g, &cfg, Heading::default(), &mut mover);
        assert!(matches!(nav.state(), NavState::Locating(_)));
    }

    #[test]
    fn empty_graph_leaves_agent_idle() {
        let g = WaypointGraph::empty();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 1);
        let mut mover = KinematicMover::new(Vec3::ZERO, 10.0);
        let mut heading = Heading::default();
        let events = drive(&mut nav, &g, &cfg, &mut mover, &mut heading, 50);
        assert!(events.is_empty());
        assert!(matches!(nav.state(), NavState::Uninitialized));
    }

    #[test]
    fn running_switches_speed() {
        let mut nav = Navigator::new(AgentId(0), NavProfile::pedestrian(), 1);
        let mut mover = KinematicMover::new(Vec3::ZERO, 1.0);
        nav.attach(&mut mover);
        assert_eq!(mover.speed(), 3.5);
        nav.set_running(true, &mut mover);
        assert_eq!(mover.speed(), 6.0);
        nav.set_running(false, &mut mover);
        assert_eq!(mover.speed(), 3.5);
    }

    #[test]
    fn reset_returns_to_clean_state() {
        let (g, [_, n1, ..]) = road();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 1).starting_at(n1);
        let mut mover = KinematicMover::new(Vec3::ZERO, 10.0);
        nav.nav_tick(&g, &cfg, Heading::default(), &mut mover, Duration::from_millis(100));
        assert!(mover.target().is_some());
        nav.reset(&mut mover);
        assert!(matches!(nav.state(), NavState::Uninitialized));
        assert_eq!(mover.target(), None);
        assert_eq!(mover.velocity(), Vec3::ZERO);
    }

    #[test]
    fn batched_locate_spans_several_nav_ticks() {
        let mut b = WaypointGraphBuilder::new();
        let ids: Vec<NodeId> = (0..12).map(|i| b.add_node(Vec3::new(0.0, 0.0, 5.0 + i as f32), Lane::Road)).collect();
        b.chain(&ids, true);
        let g = b.build().unwrap();
        let cfg = NavConfig::default();
        let mut nav = Navigator::new(AgentId(0), NavProfile::vehicle(), 1);
        let mut mover = KinematicMover::new(Vec3::ZERO, 10.0);
        let dt = Duration::from_millis(100);

        nav.nav_tick(&g, &cfg, Heading::default(), &mut mover, dt);
        assert!(matches!(nav.state(), NavState::Locating(_)));
        nav.nav_tick(&g, &cfg, Heading::default(), &mut mover, dt);
        assert!(matches!(nav.state(), NavState::Locating(_)));
        nav.nav_tick(&g, &cfg, Heading::default(), &mut mover, dt);
        assert_eq!(nav.target(), Some(ids[0]));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;
    use wn_core::{AgentId, SignalId};

    use crate::Vetoes;

    #[derive(Clone, Debug)]
    enum Op {
        Bind,
        Unbind,
        Enter(u32),
        Exit(u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Bind),
            Just(Op::Unbind),
            (0u32..3).prop_map(Op::Enter),
            (0u32..3).prop_map(Op::Exit),
        ]
    }

    proptest! {
        #[test]
        fn permitted_iff_no_veto_active(
            ops in prop::collection::vec(op(), 0..100),
            greens in prop::collection::vec(any::<bool>(), 100),
        ) {
            let mut v = Vetoes::new();
            let mut bound = false;
            let mut counts = [0u32; 3];
            for (op, green) in ops.into_iter().zip(greens) {
                match op {
                    Op::Bind => { v.bind_signal(SignalId(0)); bound = true; }
                    Op::Unbind => { v.unbind_signal(SignalId(0)); bound = false; }
                    Op::Enter(k) => { v.sensor_enter(AgentId(k)); counts[k as usize] += 1; }
                    Op::Exit(k) => { v.sensor_exit(AgentId(k)); counts[k as usize] = counts[k as usize].saturating_sub(1); }
                }
                let d = v.decide(green);
                let signal_veto = bound && !green;
                let proximity_veto = counts.iter().any(|&c| c > 0);
                prop_assert_eq!(d.signal, signal_veto);
                prop_assert_eq!(d.proximity, proximity_veto);
                prop_assert_eq!(d.permitted(), !signal_veto && !proximity_veto);
            }
        }
    }
}
