//! The mutable world: floor network plus every entity arena.

use rmfs_core::{BotId, OrderId, PodId, StationId, Tick};
use rmfs_dispatch::DispatchView;
use rmfs_entities::{Arena, Bot, Order, Pod, PodStore, Station, StationKind};
use rmfs_spatial::{Pathfinder, WaypointNetwork};

/// Everything the engine mutates during a tick.
///
/// The network owns waypoint occupancy; entities refer to each other only by
/// id.
#[derive(Clone, Debug)]
pub struct World {
    pub network:  WaypointNetwork,
    pub bots:     Arena<BotId, Bot>,
    pub pods:     Arena<PodId, Pod>,
    pub stations: Arena<StationId, Station>,
    pub orders:   Arena<OrderId, Order>,
    pub store:    PodStore,
}

impl World {
    /// Borrow the world as a dispatcher input.
    pub fn view<'a>(&'a self, tick: Tick, router: &'a dyn Pathfinder) -> DispatchView<'a> {
        DispatchView {
            tick,
            network:  &self.network,
            router,
            bots:     &self.bots,
            pods:     &self.pods,
            stations: &self.stations,
            orders:   &self.orders,
            store:    &self.store,
        }
    }

    pub fn has_station(&self, kind: StationKind) -> bool {
        self.stations.values().any(|s| s.kind == kind)
    }

    /// Orders not yet completed.
    pub fn open_orders(&self) -> usize {
        self.orders.values().filter(|o| !o.is_completed()).count()
    }
}
