//! Read-only world state passed to dispatch policies.

use std::collections::HashSet;

use rmfs_core::{BotId, Coord, OrderId, PodId, StationId, Tick, WaypointId};
use rmfs_entities::{Arena, Bot, Order, Pod, PodStore, Station, StationKind};
use rmfs_spatial::{Path, Pathfinder, WaypointNetwork};

/// A borrowed view of everything a policy may look at.
///
/// Built by the engine once per dispatcher call.  The engine never mutates
/// the world while a view is live.
pub struct DispatchView<'a> {
    pub tick:     Tick,
    pub network:  &'a WaypointNetwork,
    pub router:   &'a dyn Pathfinder,
    pub bots:     &'a Arena<BotId, Bot>,
    pub pods:     &'a Arena<PodId, Pod>,
    pub stations: &'a Arena<StationId, Station>,
    pub orders:   &'a Arena<OrderId, Order>,
    pub store:    &'a PodStore,
}

impl<'a> DispatchView<'a> {
    /// Every waypoint currently reserved by some bot.
    pub fn reserved(&self) -> HashSet<WaypointId> {
        self.network.reservations().map(|(wp, _)| wp).collect()
    }

    /// Route from `from` to `to` around `blocked`, or `None` if unreachable.
    pub fn route(&self, from: WaypointId, to: WaypointId, blocked: &HashSet<WaypointId>) -> Option<Path> {
        self.router.find_path(self.network, from, to, blocked).ok()
    }

    /// The station of `kind` nearest to `pos` in a straight line, ties to the
    /// lowest id.
    pub fn nearest_station(&self, kind: StationKind, pos: Coord) -> Option<StationId> {
        self.stations
            .iter()
            .filter(|(_, s)| s.kind == kind)
            .map(|(id, s)| (id, self.network.coord(s.waypoint).distance(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    /// `true` if a parked bot stands on `wp`.  Such a waypoint cannot be
    /// entered until the bot is unparked.
    pub fn held_by_parked_bot(&self, wp: WaypointId) -> bool {
        self.network
            .occupant(wp)
            .and_then(|b| self.bots.get(b))
            .is_some_and(|b| b.parked)
    }
}
