//! Property-based tests for A* routing.
//!
//! Random grids with random obstacles and random blocked sets; every path
//! returned must walk real links from the requested start to the requested
//! goal, and must never be beaten by plain Dijkstra.

use std::collections::HashSet;

use proptest::prelude::*;
use rmfs_core::WaypointId;
use rmfs_spatial::{AStarRouter, Heuristic, Pathfinder, WaypointNetwork, WaypointNetworkBuilder};

// ===========================================================================
// Generators
// ===========================================================================

/// A grid of up to 8 × 8 with some cells isolated as obstacles.
fn arb_network() -> impl Strategy<Value = WaypointNetwork> {
    (2..=8u32, 2..=8u32, any::<bool>()).prop_flat_map(|(w, h, diagonal)| {
        let n = (w * h) as usize;
        proptest::collection::vec(0..10u8, n).prop_map(move |cells| {
            let mut b = WaypointNetworkBuilder::grid(w, h, diagonal);
            for (i, &c) in cells.iter().enumerate() {
                // Roughly one cell in five becomes an obstacle.
                if c < 2 {
                    b.isolate(WaypointId::from_index(i));
                }
            }
            b.build()
        })
    })
}

fn arb_case() -> impl Strategy<Value = (WaypointNetwork, usize, usize, Vec<usize>)> {
    arb_network().prop_flat_map(|net| {
        let n = net.node_count();
        (
            Just(net),
            0..n,
            0..n,
            proptest::collection::vec(0..n, 0..6),
        )
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Consecutive path elements are linked, and the path starts and ends at
    /// the requested waypoints.
    #[test]
    fn path_walks_real_links((net, s, g, blocked) in arb_case()) {
        let start = WaypointId::from_index(s);
        let goal  = WaypointId::from_index(g);
        let blocked: HashSet<WaypointId> = blocked.into_iter().map(WaypointId::from_index).collect();

        if let Ok(path) = AStarRouter::default().find_path(&net, start, goal, &blocked) {
            prop_assert_eq!(path.start(), Some(start));
            prop_assert_eq!(path.goal(), Some(goal));
            for pair in path.waypoints.windows(2) {
                prop_assert!(net.is_adjacent(pair[0], pair[1]), "{} -> {} is not a link", pair[0], pair[1]);
            }
            let summed: f32 = path
                .waypoints
                .windows(2)
                .filter_map(|p| net.link_length_between(p[0], p[1]))
                .sum();
            prop_assert!((summed - path.cost).abs() < 1e-3);
        }
    }

    /// Intermediate waypoints never include blocked ones.
    #[test]
    fn path_avoids_blocked((net, s, g, blocked) in arb_case()) {
        let start = WaypointId::from_index(s);
        let goal  = WaypointId::from_index(g);
        let blocked: HashSet<WaypointId> = blocked.into_iter().map(WaypointId::from_index).collect();

        if let Ok(path) = AStarRouter::default().find_path(&net, start, goal, &blocked) {
            let inner = &path.waypoints[1..path.waypoints.len().saturating_sub(1).max(1)];
            for wp in inner {
                prop_assert!(!blocked.contains(wp), "path crosses blocked {}", wp);
            }
        }
    }

    /// The Euclidean heuristic is admissible: A* finds a path exactly when
    /// Dijkstra does, at the same cost.
    #[test]
    fn astar_matches_dijkstra((net, s, g, blocked) in arb_case()) {
        let start = WaypointId::from_index(s);
        let goal  = WaypointId::from_index(g);
        let blocked: HashSet<WaypointId> = blocked.into_iter().map(WaypointId::from_index).collect();

        let astar    = AStarRouter::new(Heuristic::Euclidean).find_path(&net, start, goal, &blocked);
        let dijkstra = AStarRouter::new(Heuristic::Zero).find_path(&net, start, goal, &blocked);
        match (astar, dijkstra) {
            (Ok(a), Ok(d)) => prop_assert!((a.cost - d.cost).abs() < 1e-3),
            (Err(a), Err(d)) => prop_assert_eq!(a, d),
            (a, d) => prop_assert!(false, "A* {:?} vs Dijkstra {:?}", a, d),
        }
    }
}
