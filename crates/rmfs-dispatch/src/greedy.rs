//! Greedy nearest-available assignment.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};

use rmfs_core::{BotId, PodId, WaypointId};
use rmfs_entities::{OrderStatus, Pod, StationKind};
use rmfs_spatial::Path;

use crate::{Assignment, DispatchPolicy, DispatchView, PendingWork, Work};

/// Oldest work first; each piece goes to the nearest idle bot by path cost.
///
/// # Orders
///
/// An order is matched only to a pod that can satisfy every requested
/// quantity on its own.  Candidate pods are tried in ascending id order and
/// the first one some idle bot can reach wins.  The pod then goes to the
/// output station nearest to it.  Orders with no such pod stay pending.
///
/// # Bundles
///
/// Handled after orders, with whatever bots are left.  Candidate pods are
/// those with room for the whole bundle, most free capacity first (ties to
/// the lowest id); the pod goes to the nearest input station.
///
/// # Distances
///
/// Bot-to-pod distance is the A* cost around currently reserved waypoints,
/// so walls and parked bots count.  Equal costs go to the lowest bot id.
/// Each bot-to-slot route is searched at most once per call, so orders that
/// share candidate pods, or whose pods nobody can reach, cost one search.
#[derive(Copy, Clone, Debug, Default)]
pub struct GreedyPolicy;

impl DispatchPolicy for GreedyPolicy {
    fn assign(&self, work: &PendingWork<'_>, view: &DispatchView<'_>) -> Vec<Assignment> {
        let mut free: Vec<BotId> = work
            .idle_bots
            .iter()
            .copied()
            .filter(|&b| view.bots.get(b).is_some_and(|bot| bot.is_available()))
            .collect();
        if free.is_empty() {
            return Vec::new();
        }

        let mut routes = RouteCache::new(view);
        let mut used_pods: BTreeSet<PodId> = BTreeSet::new();
        let mut out = Vec::new();

        // ── Orders ────────────────────────────────────────────────────────
        for &order_id in work.orders {
            if free.is_empty() {
                break;
            }
            let Some(order) = view.orders.get(order_id) else { continue };
            if order.status != OrderStatus::Pending {
                continue;
            }
            let candidates: Vec<&Pod> = view
                .pods
                .values()
                .filter(|p| offerable(p, &used_pods, view) && p.can_satisfy(&order.items))
                .collect();
            for pod in candidates {
                let Some(slot) = pod.stored_at() else { continue };
                let Some(station) = view.nearest_station(StationKind::Output, view.network.coord(slot))
                else {
                    break;
                };
                if let Some((bot, path)) = nearest_bot(&free, slot, &mut routes) {
                    free.retain(|&b| b != bot);
                    used_pods.insert(pod.id);
                    out.push(Assignment { bot, work: Work::Order(order_id), pod: pod.id, station, path });
                    break;
                }
            }
        }

        // ── Bundles ───────────────────────────────────────────────────────
        for (index, bundle) in work.bundles.iter().enumerate() {
            if free.is_empty() {
                break;
            }
            let mut candidates: Vec<&Pod> = view
                .pods
                .values()
                .filter(|p| offerable(p, &used_pods, view) && p.free_capacity() >= bundle.qty)
                .collect();
            candidates.sort_by_key(|p| (Reverse(p.free_capacity()), p.id));

            for pod in candidates {
                let Some(slot) = pod.stored_at() else { continue };
                let Some(station) = view.nearest_station(StationKind::Input, view.network.coord(slot))
                else {
                    break;
                };
                if let Some((bot, path)) = nearest_bot(&free, slot, &mut routes) {
                    free.retain(|&b| b != bot);
                    used_pods.insert(pod.id);
                    out.push(Assignment { bot, work: Work::Bundle(index), pod: pod.id, station, path });
                    break;
                }
            }
        }

        out
    }
}

/// Stored, unclaimed, unused this call, and not under a parked bot.
fn offerable(pod: &Pod, used: &BTreeSet<PodId>, view: &DispatchView<'_>) -> bool {
    pod.is_available()
        && !used.contains(&pod.id)
        && pod.stored_at().is_some_and(|slot| !view.held_by_parked_bot(slot))
}

/// Routes from bots to slots, searched on first use.  The world does not
/// change while a policy runs, so a result holds for the whole call.
struct RouteCache<'v, 'a> {
    view:    &'v DispatchView<'a>,
    blocked: HashSet<WaypointId>,
    routes:  HashMap<(BotId, WaypointId), Option<Path>>,
}

impl<'v, 'a> RouteCache<'v, 'a> {
    fn new(view: &'v DispatchView<'a>) -> Self {
        Self { view, blocked: view.reserved(), routes: HashMap::new() }
    }

    fn get(&mut self, bot: BotId, goal: WaypointId) -> Option<&Path> {
        let view = self.view;
        let blocked = &self.blocked;
        self.routes
            .entry((bot, goal))
            .or_insert_with(|| view.route(view.bots.get(bot)?.position, goal, blocked))
            .as_ref()
    }
}

/// The bot in `free` with the cheapest route to `goal`.  `free` is ascending,
/// and only a strictly cheaper route replaces the current best.
fn nearest_bot(free: &[BotId], goal: WaypointId, routes: &mut RouteCache<'_, '_>) -> Option<(BotId, Path)> {
    let mut best: Option<(BotId, f32)> = None;
    for &bot in free {
        let Some(cost) = routes.get(bot, goal).map(|p| p.cost) else { continue };
        if best.is_none_or(|(_, c)| cost < c) {
            best = Some((bot, cost));
        }
    }
    let (bot, _) = best?;
    routes.get(bot, goal).cloned().map(|path| (bot, path))
}
