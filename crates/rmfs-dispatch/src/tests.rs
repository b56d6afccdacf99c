//! Unit tests for rmfs-dispatch.
//!
//! Each test builds a small grid world by hand; `cell(x, y)` ids are
//! row-major on a 5-wide grid.

#[cfg(test)]
mod helpers {
    use rmfs_core::{BotId, ItemCounts, OrderId, PodId, StationId, Tick, WaypointId};
    use rmfs_entities::{Arena, Bot, Order, Pod, PodStore, Station, StationKind};
    use rmfs_spatial::{AStarRouter, WaypointNetwork, WaypointNetworkBuilder, WaypointRole};

    use crate::DispatchView;

    pub const W: u32 = 5;

    pub fn cell(x: u32, y: u32) -> WaypointId {
        WaypointId(y * W + x)
    }

    pub fn items(pairs: &[(&str, u32)]) -> ItemCounts {
        pairs.iter().map(|&(k, v)| (k.to_owned(), v)).collect()
    }

    pub struct World {
        pub network:  WaypointNetwork,
        pub router:   AStarRouter,
        pub bots:     Arena<BotId, Bot>,
        pub pods:     Arena<PodId, Pod>,
        pub stations: Arena<StationId, Station>,
        pub orders:   Arena<OrderId, Order>,
        pub store:    PodStore,
    }

    impl World {
        /// A 5 × 5 grid with the given storage slots and wall cells.
        pub fn new(slots: &[(u32, u32)], walls: &[(u32, u32)]) -> Self {
            let mut b = WaypointNetworkBuilder::grid(W, 5, false);
            for &(x, y) in slots {
                b.set_role(cell(x, y), WaypointRole::Storage);
            }
            for &(x, y) in walls {
                b.isolate(cell(x, y));
            }
            let network = b.build();
            let store = PodStore::new(&network.waypoints_with_role(WaypointRole::Storage));
            Self {
                network,
                router:   AStarRouter::default(),
                bots:     Arena::new(),
                pods:     Arena::new(),
                stations: Arena::new(),
                orders:   Arena::new(),
                store,
            }
        }

        pub fn bot(&mut self, x: u32, y: u32) -> BotId {
            let id = self.bots.next_id();
            self.network.reserve(cell(x, y), id).unwrap();
            self.bots.push(Bot::new(id, cell(x, y), 1.0, 1))
        }

        pub fn pod(&mut self, x: u32, y: u32, inv: &[(&str, u32)]) -> PodId {
            let id = self.pods.next_id();
            self.store.place(cell(x, y), id).unwrap();
            self.pods.push(Pod::new(id, cell(x, y), 100, items(inv)).unwrap())
        }

        pub fn station(&mut self, kind: StationKind, x: u32, y: u32) -> StationId {
            let id = self.stations.next_id();
            self.stations.push(Station::new(id, kind, cell(x, y), 1))
        }

        pub fn order(&mut self, inv: &[(&str, u32)]) -> OrderId {
            let id = self.orders.next_id();
            self.orders.push(Order::new(id, items(inv), Tick::ZERO))
        }

        pub fn view(&self) -> DispatchView<'_> {
            DispatchView {
                tick:     Tick(1),
                network:  &self.network,
                router:   &self.router,
                bots:     &self.bots,
                pods:     &self.pods,
                stations: &self.stations,
                orders:   &self.orders,
                store:    &self.store,
            }
        }
    }
}

// ── Greedy order matching ─────────────────────────────────────────────────────

#[cfg(test)]
mod greedy {
    use rmfs_entities::{StationKind, TaskKind};

    use super::helpers::{World, cell};
    use crate::Dispatcher;

    #[test]
    fn nearest_bot_by_path_not_straight_line() {
        // Wall down column 2 except the bottom row.
        let mut w = World::new(&[(3, 0)], &[(2, 0), (2, 1), (2, 2), (2, 3)]);
        let near_but_walled = w.bot(1, 0); // 2 away in a line, 10 by path
        let far_but_open = w.bot(4, 4); // ~4.1 away in a line, 5 by path
        w.pod(3, 0, &[("A", 5)]);
        w.station(StationKind::Output, 4, 0);
        let o = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(near_but_walled);
        d.on_bot_idle(far_but_open);
        d.on_order_created(o);

        let out = d.tick(&w.view());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].task.bot, far_but_open);
        assert_eq!(out[0].path.cost, 5.0);
        assert_eq!(out[0].task.target, cell(3, 0));
    }

    #[test]
    fn equal_cost_goes_to_lowest_bot_id() {
        let mut w = World::new(&[(2, 2)], &[]);
        let b0 = w.bot(0, 2);
        let b1 = w.bot(4, 2);
        w.pod(2, 2, &[("A", 1)]);
        w.station(StationKind::Output, 2, 4);
        let o = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b1);
        d.on_bot_idle(b0);
        d.on_order_created(o);

        let out = d.tick(&w.view());
        assert_eq!(out[0].task.bot, b0);
    }

    #[test]
    fn unsatisfiable_order_stays_pending() {
        let mut w = World::new(&[(2, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(2, 2, &[("A", 3)]);
        w.station(StationKind::Output, 0, 4);
        let o = w.order(&[("A", 4)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_order_created(o);

        assert!(d.tick(&w.view()).is_empty());
        assert_eq!(d.pending_orders().collect::<Vec<_>>(), vec![o]);
        assert!(d.is_idle(b), "bot stays in the idle pool");
    }

    #[test]
    fn partial_stock_across_pods_is_not_combined() {
        let mut w = World::new(&[(1, 2), (3, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(1, 2, &[("A", 1)]);
        w.pod(3, 2, &[("B", 1)]);
        w.station(StationKind::Output, 0, 4);
        let o = w.order(&[("A", 1), ("B", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_order_created(o);
        assert!(d.tick(&w.view()).is_empty());
    }

    #[test]
    fn oldest_order_first() {
        let mut w = World::new(&[(1, 2), (3, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(1, 2, &[("A", 1)]);
        w.pod(3, 2, &[("B", 1)]);
        w.station(StationKind::Output, 0, 4);
        let first = w.order(&[("B", 1)]);
        let second = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_order_created(first);
        d.on_order_created(second);

        let out = d.tick(&w.view());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].task.kind.order(), Some(first));
        assert_eq!(d.pending_orders().collect::<Vec<_>>(), vec![second]);
        assert!(!d.is_idle(b));
    }

    #[test]
    fn lowest_pod_id_that_satisfies() {
        let mut w = World::new(&[(1, 1), (3, 3), (2, 0)], &[]);
        let b = w.bot(3, 4);
        w.pod(1, 1, &[("A", 1)]);
        w.pod(3, 3, &[("A", 5)]);
        w.pod(2, 0, &[("A", 5)]);
        w.station(StationKind::Output, 0, 4);
        let o = w.order(&[("A", 2)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_order_created(o);

        let out = d.tick(&w.view());
        assert_eq!(out[0].task.kind.pod(), rmfs_core::PodId(1));
    }

    #[test]
    fn a_pod_serves_one_order_per_tick() {
        let mut w = World::new(&[(2, 2)], &[]);
        let b0 = w.bot(0, 0);
        let b1 = w.bot(4, 4);
        w.pod(2, 2, &[("A", 10)]);
        w.station(StationKind::Output, 0, 4);
        let o0 = w.order(&[("A", 1)]);
        let o1 = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b0);
        d.on_bot_idle(b1);
        d.on_order_created(o0);
        d.on_order_created(o1);

        let out = d.tick(&w.view());
        assert_eq!(out.len(), 1);
        assert_eq!(d.pending_order_count(), 1);
    }

    #[test]
    fn claimed_pod_is_not_offered() {
        let mut w = World::new(&[(2, 2)], &[]);
        let b = w.bot(0, 0);
        let p = w.pod(2, 2, &[("A", 10)]);
        w.pods[p].claimed_by = Some(rmfs_core::BotId(9));
        w.station(StationKind::Output, 0, 4);
        let o = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_order_created(o);
        assert!(d.tick(&w.view()).is_empty());
    }

    #[test]
    fn output_station_nearest_to_pod() {
        let mut w = World::new(&[(4, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(4, 2, &[("A", 1)]);
        let _left = w.station(StationKind::Output, 0, 4);
        let right = w.station(StationKind::Output, 4, 4);
        let o = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_order_created(o);

        let out = d.tick(&w.view());
        match out[0].task.kind {
            TaskKind::FetchPod { station, .. } => assert_eq!(station, right),
            ref other => panic!("unexpected task {other:?}"),
        }
    }

    #[test]
    fn reserved_corridor_means_no_match() {
        // Single-lane corridor: everything but column 0 is wall.
        let walls: Vec<(u32, u32)> = (1..5).flat_map(|x| (0..5).map(move |y| (x, y))).collect();
        let mut w = World::new(&[(0, 4)], &walls);
        let mover = w.bot(0, 0);
        let parked = w.bot(0, 2);
        w.bots[parked].parked = true;
        w.pod(0, 4, &[("A", 1)]);
        w.station(StationKind::Output, 0, 1);
        let o = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(mover);
        d.on_order_created(o);

        assert!(d.tick(&w.view()).is_empty());
        assert_eq!(d.pending_order_count(), 1);
    }

    #[test]
    fn each_route_is_searched_once_per_tick() {
        use std::collections::HashSet;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use rmfs_core::WaypointId;
        use rmfs_spatial::{AStarRouter, Path, Pathfinder, SpatialResult, WaypointNetwork};

        use crate::DispatchView;

        #[derive(Default)]
        struct Counting {
            inner: AStarRouter,
            calls: AtomicUsize,
        }

        impl Pathfinder for Counting {
            fn find_path(
                &self,
                network: &WaypointNetwork,
                start:   WaypointId,
                goal:    WaypointId,
                blocked: &HashSet<WaypointId>,
            ) -> SpatialResult<Path> {
                self.calls.fetch_add(1, Ordering::Relaxed);
                self.inner.find_path(network, start, goal, blocked)
            }
        }

        // The only stocked pod sits on a walled-off slot.
        let mut w = World::new(&[(2, 2)], &[(2, 2)]);
        let b0 = w.bot(0, 0);
        let b1 = w.bot(4, 4);
        w.pod(2, 2, &[("A", 10)]);
        w.station(StationKind::Output, 0, 4);
        let orders: Vec<_> = (0..3).map(|_| w.order(&[("A", 1)])).collect();

        let mut d = Dispatcher::default();
        d.on_bot_idle(b0);
        d.on_bot_idle(b1);
        for &o in &orders {
            d.on_order_created(o);
        }

        let router = Counting::default();
        let view = DispatchView { router: &router, ..w.view() };
        assert!(d.tick(&view).is_empty());
        assert_eq!(router.calls.load(Ordering::Relaxed), 2, "one search per bot, not per order");
        assert_eq!(d.pending_order_count(), 3);
    }

    #[test]
    fn task_ids_are_sequential() {
        let mut w = World::new(&[(1, 2), (3, 2)], &[]);
        let b0 = w.bot(0, 0);
        let b1 = w.bot(4, 0);
        w.pod(1, 2, &[("A", 1)]);
        w.pod(3, 2, &[("A", 1)]);
        w.station(StationKind::Output, 2, 4);
        let o0 = w.order(&[("A", 1)]);
        let o1 = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b0);
        d.on_bot_idle(b1);
        d.on_order_created(o0);
        d.on_order_created(o1);

        let out = d.tick(&w.view());
        let ids: Vec<_> = out.iter().map(|x| x.task.id.0).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}

// ── Bundles ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod bundles {
    use rmfs_core::PodId;
    use rmfs_entities::{Bundle, StationKind, TaskKind};

    use super::helpers::World;
    use crate::Dispatcher;

    #[test]
    fn bundle_goes_to_emptiest_pod() {
        let mut w = World::new(&[(1, 2), (3, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(1, 2, &[("A", 60)]);
        w.pod(3, 2, &[("A", 10)]);
        let input = w.station(StationKind::Input, 2, 0);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_bundle_received(Bundle::new("B", 20));

        let out = d.tick(&w.view());
        assert_eq!(out.len(), 1);
        match &out[0].task.kind {
            TaskKind::Replenish { bundle, pod, station } => {
                assert_eq!(*pod, PodId(1));
                assert_eq!(*station, input);
                assert_eq!(bundle, &Bundle::new("B", 20));
            }
            other => panic!("unexpected task {other:?}"),
        }
        assert_eq!(d.pending_bundle_count(), 0);
    }

    #[test]
    fn bundle_too_big_for_every_pod_waits() {
        let mut w = World::new(&[(1, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(1, 2, &[("A", 95)]);
        w.station(StationKind::Input, 2, 0);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_bundle_received(Bundle::new("B", 6));

        assert!(d.tick(&w.view()).is_empty());
        assert_eq!(d.pending_bundle_count(), 1);
    }

    #[test]
    fn orders_take_bots_before_bundles() {
        let mut w = World::new(&[(1, 2), (3, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(1, 2, &[("A", 1)]);
        w.pod(3, 2, &[]);
        w.station(StationKind::Output, 0, 4);
        w.station(StationKind::Input, 2, 0);
        let o = w.order(&[("A", 1)]);

        let mut d = Dispatcher::default();
        d.on_bot_idle(b);
        d.on_bundle_received(Bundle::new("B", 1));
        d.on_order_created(o);

        let out = d.tick(&w.view());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].task.kind.order(), Some(o));
        assert_eq!(d.pending_bundle_count(), 1);
    }

    #[test]
    fn requeued_bundle_is_served_first() {
        let mut d = Dispatcher::default();
        d.on_bundle_received(Bundle::new("late", 1));
        d.requeue_bundle(Bundle::new("early", 1));
        let items: Vec<_> = d.pending_bundles().map(|b| b.item.as_str()).collect();
        assert_eq!(items, vec!["early", "late"]);
    }
}

// ── Returns ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod returns {
    use rmfs_core::PodId;
    use rmfs_entities::TaskKind;

    use super::helpers::{World, cell};
    use crate::Dispatcher;

    #[test]
    fn nearest_free_unclaimed_slot() {
        let mut w = World::new(&[(1, 1), (2, 1), (4, 4)], &[]);
        let b = w.bot(1, 0);
        w.bots[b].carried_pod = Some(PodId(7));
        w.store.claim(cell(1, 1)).unwrap();

        let mut d = Dispatcher::default();
        let task = d.issue_return(&w.bots[b], &w.view()).unwrap();
        assert_eq!(task.kind, TaskKind::ReturnPod { pod: PodId(7), slot: cell(2, 1) });
        assert_eq!(task.target, cell(2, 1));
    }

    #[test]
    fn unreachable_slot_is_skipped() {
        let mut w = World::new(&[(0, 1), (4, 4)], &[(0, 1)]);
        let b = w.bot(0, 0);
        w.bots[b].carried_pod = Some(PodId(0));

        let mut d = Dispatcher::default();
        let task = d.issue_return(&w.bots[b], &w.view()).unwrap();
        assert_eq!(task.target, cell(4, 4));
    }

    #[test]
    fn nothing_carried_means_no_return() {
        let mut w = World::new(&[(1, 1)], &[]);
        let b = w.bot(0, 0);
        let mut d = Dispatcher::default();
        assert!(d.issue_return(&w.bots[b], &w.view()).is_none());
    }

    #[test]
    fn no_free_slot_means_no_return() {
        let mut w = World::new(&[(1, 1)], &[]);
        w.pod(1, 1, &[]);
        let b = w.bot(0, 0);
        w.bots[b].carried_pod = Some(PodId(3));
        let mut d = Dispatcher::default();
        assert!(d.issue_return(&w.bots[b], &w.view()).is_none());
    }
}

// ── Custom policies ───────────────────────────────────────────────────────────

#[cfg(test)]
mod policy {
    use rmfs_core::{PodId, StationId};
    use rmfs_entities::StationKind;

    use super::helpers::World;
    use crate::{Assignment, DispatchPolicy, DispatchView, Dispatcher, PendingWork, Work};

    /// Hands every pending order to the first idle bot, twice.
    struct Greedy2x;

    impl DispatchPolicy for Greedy2x {
        fn assign(&self, work: &PendingWork<'_>, view: &DispatchView<'_>) -> Vec<Assignment> {
            let Some(&bot) = work.idle_bots.iter().next() else { return vec![] };
            let from = view.bots[bot].position;
            let path = view.route(from, from, &Default::default()).unwrap();
            work.orders
                .iter()
                .flat_map(|&o| {
                    let a = Assignment {
                        bot,
                        work: Work::Order(o),
                        pod: PodId(0),
                        station: StationId(0),
                        path: path.clone(),
                    };
                    [a.clone(), a]
                })
                .collect()
        }
    }

    #[test]
    fn conflicting_assignments_are_dropped() {
        let mut w = World::new(&[(2, 2)], &[]);
        let b = w.bot(0, 0);
        w.pod(2, 2, &[("A", 1)]);
        w.station(StationKind::Output, 0, 4);
        let o0 = w.order(&[("A", 1)]);
        let o1 = w.order(&[("A", 1)]);

        let mut d = Dispatcher::new(Greedy2x);
        d.on_bot_idle(b);
        d.on_order_created(o0);
        d.on_order_created(o1);

        let out = d.tick(&w.view());
        assert_eq!(out.len(), 1, "one bot, one pod: only the first match survives");
        assert_eq!(d.pending_order_count(), 1);
    }
}
