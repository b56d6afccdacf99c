//! Unit tests for rmfs-spatial.
//!
//! Most tests use small hand-built grids so expected paths can be checked by
//! eye.

#[cfg(test)]
mod helpers {
    use rmfs_core::WaypointId;
    use crate::{WaypointNetwork, WaypointNetworkBuilder};

    /// Id of cell `(x, y)` in a grid of the given width.
    pub fn cell(width: u32, x: u32, y: u32) -> WaypointId {
        WaypointId(y * width + x)
    }

    /// A 4-connected `w × h` grid with no roles set.
    pub fn grid(w: u32, h: u32) -> WaypointNetwork {
        WaypointNetworkBuilder::grid(w, h, false).build()
    }

    /// A 3 × 3 grid whose centre cell is an obstacle:
    ///
    /// ```text
    ///   0 1 2
    ///   3 # 5
    ///   6 7 8
    /// ```
    pub fn ring() -> WaypointNetwork {
        let mut b = WaypointNetworkBuilder::grid(3, 3, false);
        b.isolate(WaypointId(4));
        b.build()
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rmfs_core::{Coord, WaypointId};
    use crate::{WaypointNetworkBuilder, WaypointRole};

    #[test]
    fn empty_build() {
        let net = WaypointNetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.link_count(), 0);
        assert!(net.is_empty());
        assert!(net.nearest_waypoint(Coord::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn grid_link_counts() {
        // 3×2 grid: 7 undirected orthogonal edges → 14 links.
        let net = WaypointNetworkBuilder::grid(3, 2, false).build();
        assert_eq!(net.node_count(), 6);
        assert_eq!(net.link_count(), 14);

        // Diagonals add 2 per 2×2 block, 2 blocks → 4 undirected → 8 links.
        let diag = WaypointNetworkBuilder::grid(3, 2, true).build();
        assert_eq!(diag.link_count(), 22);
    }

    #[test]
    fn grid_ids_are_row_major() {
        let net = super::helpers::grid(4, 3);
        assert_eq!(net.coord(WaypointId(0)), Coord::new(0.0, 0.0));
        assert_eq!(net.coord(WaypointId(5)), Coord::new(1.0, 1.0));
        assert_eq!(net.coord(WaypointId(11)), Coord::new(3.0, 2.0));
    }

    #[test]
    fn neighbour_order_is_right_down_left_up() {
        let net = super::helpers::grid(3, 3);
        let centre = WaypointId(4);
        let n: Vec<_> = net.neighbors(centre).collect();
        assert_eq!(n, vec![WaypointId(5), WaypointId(7), WaypointId(3), WaypointId(1)]);
    }

    #[test]
    fn corner_has_two_neighbours() {
        let net = super::helpers::grid(3, 3);
        assert_eq!(net.neighbors(WaypointId(0)).count(), 2);
        assert!(net.is_adjacent(WaypointId(0), WaypointId(1)));
        assert!(!net.is_adjacent(WaypointId(0), WaypointId(4)));
    }

    #[test]
    fn diagonal_link_length() {
        let net = WaypointNetworkBuilder::grid(2, 2, true).build();
        let len = net.link_length_between(WaypointId(0), WaypointId(3)).unwrap();
        assert!((len - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert_eq!(net.link_length_between(WaypointId(0), WaypointId(1)), Some(1.0));
    }

    #[test]
    fn directed_only_link() {
        let mut b = WaypointNetworkBuilder::new();
        let a = b.add_waypoint(Coord::new(0.0, 0.0), WaypointRole::Transit);
        let c = b.add_waypoint(Coord::new(0.0, 2.0), WaypointRole::Transit);
        b.add_directed_link(a, c);
        let net = b.build();
        assert_eq!(net.link_count(), 1);
        assert!(net.is_adjacent(a, c));
        assert!(!net.is_adjacent(c, a));
        assert_eq!(net.link_length_between(a, c), Some(2.0));
    }

    #[test]
    fn isolate_removes_all_links() {
        let net = super::helpers::ring();
        assert_eq!(net.neighbors(WaypointId(4)).count(), 0);
        assert!(!net.is_adjacent(WaypointId(1), WaypointId(4)));
    }

    #[test]
    fn roles_are_kept() {
        let mut b = WaypointNetworkBuilder::grid(3, 1, false);
        b.set_role(WaypointId(0), WaypointRole::OutputStation);
        b.set_role(WaypointId(2), WaypointRole::Storage);
        let net = b.build();
        assert_eq!(net.role(WaypointId(1)), WaypointRole::Transit);
        assert!(net.role(WaypointId(0)).is_station());
        assert_eq!(net.waypoints_with_role(WaypointRole::Storage), vec![WaypointId(2)]);
    }

    #[test]
    fn reachability_respects_direction() {
        let mut b = WaypointNetworkBuilder::new();
        let a = b.add_waypoint(Coord::new(0.0, 0.0), WaypointRole::Transit);
        let c = b.add_waypoint(Coord::new(1.0, 0.0), WaypointRole::Transit);
        b.add_directed_link(a, c);
        let net = b.build();
        assert_eq!(net.reachable_from(a), vec![true, true]);
        assert_eq!(net.reachable_from(c), vec![false, true]);
        assert_eq!(net.reaching(a), vec![true, false]);
        assert_eq!(net.reaching(c), vec![true, true]);
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use rmfs_core::{Coord, WaypointId};

    #[test]
    fn nearest_waypoint_rounds_to_cell() {
        let net = super::helpers::grid(5, 5);
        assert_eq!(net.nearest_waypoint(Coord::new(2.2, 3.9)), Some(WaypointId(22)));
        assert_eq!(net.nearest_waypoint(Coord::new(-10.0, -10.0)), Some(WaypointId(0)));
    }

    #[test]
    fn waypoint_at_requires_exact_cell() {
        let net = super::helpers::grid(5, 5);
        assert_eq!(net.waypoint_at(1.0, 2.0), Some(WaypointId(11)));
        assert_eq!(net.waypoint_at(1.5, 2.0), None);
    }
}

// ── Reservations ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod reservation {
    use rmfs_core::{BotId, WaypointId};
    use crate::SpatialError;

    #[test]
    fn reserve_and_release() {
        let mut net = super::helpers::grid(3, 3);
        let wp = WaypointId(4);
        assert!(net.is_free(wp));
        net.reserve(wp, BotId(0)).unwrap();
        assert!(!net.is_free(wp));
        assert_eq!(net.occupant(wp), Some(BotId(0)));
        assert!(net.release(wp, BotId(0)));
        assert!(net.is_free(wp));
    }

    #[test]
    fn second_bot_is_rejected() {
        let mut net = super::helpers::grid(3, 3);
        let wp = WaypointId(1);
        net.reserve(wp, BotId(0)).unwrap();
        let err = net.reserve(wp, BotId(1)).unwrap_err();
        assert_eq!(err, SpatialError::AlreadyReserved { waypoint: wp, holder: BotId(0) });
        assert_eq!(net.occupant(wp), Some(BotId(0)), "holder must not change");
    }

    #[test]
    fn re_reserving_own_waypoint_is_ok() {
        let mut net = super::helpers::grid(3, 3);
        net.reserve(WaypointId(2), BotId(7)).unwrap();
        assert!(net.reserve(WaypointId(2), BotId(7)).is_ok());
        assert_eq!(net.reserved_count(), 1);
    }

    #[test]
    fn release_by_non_holder_is_ignored() {
        let mut net = super::helpers::grid(3, 3);
        net.reserve(WaypointId(3), BotId(0)).unwrap();
        assert!(!net.release(WaypointId(3), BotId(1)));
        assert_eq!(net.occupant(WaypointId(3)), Some(BotId(0)));
        assert!(!net.release(WaypointId(8), BotId(0)), "nothing held there");
    }

    #[test]
    fn unknown_waypoint() {
        let mut net = super::helpers::grid(2, 2);
        let bad = WaypointId(99);
        assert_eq!(net.reserve(bad, BotId(0)), Err(SpatialError::WaypointNotFound(bad)));
        assert!(!net.is_free(bad));
        assert!(!net.release(bad, BotId(0)));
    }

    #[test]
    fn reservations_listed_in_waypoint_order() {
        let mut net = super::helpers::grid(3, 3);
        net.reserve(WaypointId(6), BotId(0)).unwrap();
        net.reserve(WaypointId(2), BotId(1)).unwrap();
        let all: Vec<_> = net.reservations().collect();
        assert_eq!(all, vec![(WaypointId(2), BotId(1)), (WaypointId(6), BotId(0))]);

        net.clear_reservations();
        assert_eq!(net.reserved_count(), 0);
    }
}

// ── Layout generation ─────────────────────────────────────────────────────────

#[cfg(test)]
mod layout {
    use rmfs_core::{LayoutConfig, StationConfig, WaypointId};
    use crate::{SpatialError, WarehouseLayout, WaypointNetworkBuilder, WaypointRole};

    #[test]
    fn default_layout_shape() {
        let layout = WarehouseLayout::generate(&LayoutConfig::default(), &StationConfig::default());
        assert_eq!(layout.network.node_count(), 600);
        assert_eq!(layout.storage_slots.len(), 85);
        // width 30, 2 stations → columns 10 and 20.
        assert_eq!(layout.input_stations, vec![WaypointId(10), WaypointId(20)]);
        assert_eq!(layout.output_stations, vec![WaypointId(19 * 30 + 10), WaypointId(19 * 30 + 20)]);
        assert_eq!(layout.transit_waypoints().len(), 600 - 85 - 4);
        assert!(layout.check_connected(&[]).is_ok());
    }

    #[test]
    fn storage_slots_skip_aisles() {
        let cfg = LayoutConfig::default();
        let layout = WarehouseLayout::generate(&cfg, &StationConfig::default());
        for &slot in &layout.storage_slots {
            let c = layout.network.coord(slot);
            assert_ne!(c.x as u32 % 3, 0, "slot in aisle column at {c}");
            assert!(cfg.storage_row_range().contains(&(c.y as u32)));
        }
    }

    #[test]
    fn every_slot_reachable_along_aisles() {
        use std::collections::HashSet;
        use crate::{AStarRouter, Pathfinder};

        let cfg = LayoutConfig { storage_rows: 18, ..LayoutConfig::default() };
        let layout = WarehouseLayout::generate(&cfg, &StationConfig::default());
        let router = AStarRouter::default();
        let none = HashSet::new();
        for &station in layout.output_stations.iter().chain(&layout.input_stations) {
            for &slot in &layout.storage_slots {
                let there = router.find_path(&layout.network, station, slot, &none);
                let back = router.find_path(&layout.network, slot, station, &none);
                assert!(there.is_ok() && back.is_ok(), "slot {slot} cut off from {station}");
            }
        }
    }

    #[test]
    fn from_network_reads_roles() {
        let mut b = WaypointNetworkBuilder::grid(4, 4, false);
        b.set_role(WaypointId(0), WaypointRole::OutputStation);
        b.set_role(WaypointId(3), WaypointRole::InputStation);
        b.set_role(WaypointId(10), WaypointRole::Storage);
        b.set_role(WaypointId(5), WaypointRole::Storage);
        let layout = WarehouseLayout::from_network(b.build());
        assert_eq!(layout.output_stations, vec![WaypointId(0)]);
        assert_eq!(layout.input_stations, vec![WaypointId(3)]);
        assert_eq!(layout.storage_slots, vec![WaypointId(5), WaypointId(10)]);
    }

    #[test]
    fn disconnected_slot_is_reported() {
        let mut b = WaypointNetworkBuilder::grid(3, 3, false);
        b.set_role(WaypointId(0), WaypointRole::OutputStation);
        b.set_role(WaypointId(8), WaypointRole::Storage);
        b.isolate(WaypointId(8));
        let layout = WarehouseLayout::from_network(b.build());
        assert_eq!(
            layout.check_connected(&[]),
            Err(SpatialError::Disconnected { waypoint: WaypointId(8), anchor: WaypointId(0) })
        );
    }

    #[test]
    fn extra_waypoints_are_checked() {
        let mut b = WaypointNetworkBuilder::grid(3, 3, false);
        b.set_role(WaypointId(0), WaypointRole::OutputStation);
        let layout = WarehouseLayout::from_network(b.build());
        assert_eq!(
            layout.check_connected(&[WaypointId(42)]),
            Err(SpatialError::WaypointNotFound(WaypointId(42)))
        );
    }
}

// ── A* routing ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use std::collections::HashSet;

    use rmfs_core::WaypointId;
    use crate::{AStarRouter, Heuristic, Pathfinder, SpatialError, WaypointNetworkBuilder, WaypointRole};
    use super::helpers::{cell, grid, ring};

    fn no_blocks() -> HashSet<WaypointId> {
        HashSet::new()
    }

    #[test]
    fn trivial_path() {
        let net = grid(3, 3);
        let p = AStarRouter::default().find_path(&net, WaypointId(4), WaypointId(4), &no_blocks()).unwrap();
        assert_eq!(p.waypoints, vec![WaypointId(4)]);
        assert_eq!(p.cost, 0.0);
        assert!(p.is_trivial());
        assert!(p.steps().is_empty());
    }

    #[test]
    fn straight_line() {
        let net = grid(5, 1);
        let p = AStarRouter::default().find_path(&net, WaypointId(0), WaypointId(4), &no_blocks()).unwrap();
        assert_eq!(p.waypoints, (0..5).map(WaypointId).collect::<Vec<_>>());
        assert_eq!(p.cost, 4.0);
        assert_eq!(p.hops(), 4);
        assert_eq!(p.start(), Some(WaypointId(0)));
        assert_eq!(p.goal(), Some(WaypointId(4)));
    }

    #[test]
    fn cost_is_manhattan_on_open_grid() {
        let net = grid(6, 6);
        let p = AStarRouter::default()
            .find_path(&net, cell(6, 0, 0), cell(6, 5, 5), &no_blocks())
            .unwrap();
        assert_eq!(p.cost, 10.0);
        assert_eq!(p.hops(), 10);
    }

    #[test]
    fn detours_around_obstacle() {
        let net = ring();
        let p = AStarRouter::default().find_path(&net, WaypointId(3), WaypointId(5), &no_blocks()).unwrap();
        assert_eq!(p.cost, 4.0);
        assert!(!p.waypoints.contains(&WaypointId(4)));
    }

    #[test]
    fn blocked_waypoints_are_avoided() {
        let net = ring();
        // Block the top route; the only way round is via the bottom row.
        let blocked: HashSet<_> = [WaypointId(1)].into();
        let p = AStarRouter::default().find_path(&net, WaypointId(0), WaypointId(2), &blocked).unwrap();
        assert_eq!(
            p.waypoints,
            vec![WaypointId(0), WaypointId(3), WaypointId(6), WaypointId(7), WaypointId(8), WaypointId(5), WaypointId(2)]
        );
    }

    #[test]
    fn blocked_start_and_goal_are_ignored() {
        let net = grid(3, 1);
        let blocked: HashSet<_> = [WaypointId(0), WaypointId(2)].into();
        let p = AStarRouter::default().find_path(&net, WaypointId(0), WaypointId(2), &blocked).unwrap();
        assert_eq!(p.waypoints, vec![WaypointId(0), WaypointId(1), WaypointId(2)]);
    }

    #[test]
    fn corridor_blocked_gives_no_path() {
        // Single column corridor (0,0)…(0,5) with a bot parked at (0,3).
        let net = grid(1, 6);
        let blocked: HashSet<_> = [WaypointId(3)].into();
        let err = AStarRouter::default()
            .find_path(&net, WaypointId(0), WaypointId(5), &blocked)
            .unwrap_err();
        assert_eq!(err, SpatialError::NoPathFound { start: WaypointId(0), goal: WaypointId(5) });
    }

    #[test]
    fn storage_and_stations_carry_no_through_traffic() {
        //   0 S 2      S = storage slot
        //   3 O 5      O = output station
        //   6 7 8
        let mut b = WaypointNetworkBuilder::grid(3, 3, false);
        b.set_role(WaypointId(1), WaypointRole::Storage);
        b.set_role(WaypointId(4), WaypointRole::OutputStation);
        let net = b.build();
        let router = AStarRouter::default();

        let p = router.find_path(&net, WaypointId(0), WaypointId(2), &no_blocks()).unwrap();
        assert_eq!(p.hops(), 6);
        assert!(!p.waypoints.contains(&WaypointId(1)));
        assert!(!p.waypoints.contains(&WaypointId(4)));

        // Either one may still be the start or the goal.
        let p = router.find_path(&net, WaypointId(1), WaypointId(4), &no_blocks()).unwrap();
        assert_eq!(p.waypoints, vec![WaypointId(1), WaypointId(4)]);
        let p = router.find_path(&net, WaypointId(0), WaypointId(1), &no_blocks()).unwrap();
        assert_eq!(p.waypoints, vec![WaypointId(0), WaypointId(1)]);
    }

    #[test]
    fn slot_in_a_corridor_is_a_wall() {
        let mut b = WaypointNetworkBuilder::grid(3, 1, false);
        b.set_role(WaypointId(1), WaypointRole::Storage);
        let net = b.build();
        let err = AStarRouter::default()
            .find_path(&net, WaypointId(0), WaypointId(2), &no_blocks())
            .unwrap_err();
        assert_eq!(err, SpatialError::NoPathFound { start: WaypointId(0), goal: WaypointId(2) });
    }

    #[test]
    fn unknown_waypoint_is_an_error() {
        let net = grid(2, 2);
        let err = AStarRouter::default()
            .find_path(&net, WaypointId(0), WaypointId(10), &no_blocks())
            .unwrap_err();
        assert_eq!(err, SpatialError::WaypointNotFound(WaypointId(10)));
    }

    #[test]
    fn one_way_link_is_honoured() {
        let mut b = WaypointNetworkBuilder::grid(2, 1, false);
        b.isolate(WaypointId(1));
        b.add_directed_link(WaypointId(0), WaypointId(1));
        let net = b.build();
        let router = AStarRouter::default();
        assert!(router.find_path(&net, WaypointId(0), WaypointId(1), &no_blocks()).is_ok());
        assert!(router.find_path(&net, WaypointId(1), WaypointId(0), &no_blocks()).is_err());
    }

    #[test]
    fn diagonal_grid_uses_diagonals() {
        let net = WaypointNetworkBuilder::grid(4, 4, true).build();
        let p = AStarRouter::default()
            .find_path(&net, cell(4, 0, 0), cell(4, 3, 3), &no_blocks())
            .unwrap();
        assert_eq!(p.hops(), 3);
        assert!((p.cost - 3.0 * std::f32::consts::SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn heuristics_agree_on_cost() {
        let net = ring();
        for h in [Heuristic::Euclidean, Heuristic::Manhattan, Heuristic::Zero] {
            let p = AStarRouter::new(h).find_path(&net, WaypointId(0), WaypointId(8), &no_blocks()).unwrap();
            assert_eq!(p.cost, 4.0, "heuristic {h:?}");
        }
    }

    #[test]
    fn repeated_queries_return_same_path() {
        let net = grid(7, 7);
        let router = AStarRouter::default();
        let a = router.find_path(&net, cell(7, 0, 0), cell(7, 6, 6), &no_blocks()).unwrap();
        let b = router.find_path(&net, cell(7, 0, 0), cell(7, 6, 6), &no_blocks()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn router_is_object_safe() {
        let net = grid(3, 3);
        let router: Box<dyn Pathfinder> = Box::new(AStarRouter::default());
        let p = router.find_path(&net, WaypointId(0), WaypointId(8), &no_blocks()).unwrap();
        assert_eq!(p.hops(), 4);
    }
}
