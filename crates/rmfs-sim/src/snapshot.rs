//! Read-only world snapshots for front-ends and output writers.

use rmfs_core::{BotId, Coord, ItemCounts, OrderId, PodId, StationId, Tick, WaypointId};
use rmfs_entities::{BotState, OrderStatus, PodLocation, StationKind};

use crate::World;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BotSnapshot {
    pub id:          BotId,
    pub waypoint:    WaypointId,
    pub position:    Coord,
    pub state:       BotState,
    pub carried_pod: Option<PodId>,
    pub parked:      bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PodSnapshot {
    pub id:         PodId,
    /// Storage slot, or the carrying bot's waypoint.
    pub waypoint:   WaypointId,
    pub position:   Coord,
    pub carried_by: Option<BotId>,
    pub inventory:  ItemCounts,
    pub capacity:   u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationSnapshot {
    pub id:                   StationId,
    pub kind:                 StationKind,
    pub waypoint:             WaypointId,
    /// Waiting bots in arrival order, head first.
    pub queue:                Vec<BotId>,
    /// The head, once it stands on the station waypoint.
    pub docked:               Option<BotId>,
    pub processing_remaining: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderSnapshot {
    pub id:        OrderId,
    pub status:    OrderStatus,
    pub items:     ItemCounts,
    pub created:   Tick,
    pub completed: Option<Tick>,
}

/// The whole world at one tick, every list in ascending id order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSnapshot {
    pub tick:     Tick,
    pub bots:     Vec<BotSnapshot>,
    pub pods:     Vec<PodSnapshot>,
    pub stations: Vec<StationSnapshot>,
    pub orders:   Vec<OrderSnapshot>,
}

impl WorldSnapshot {
    pub fn capture(tick: Tick, world: &World) -> Self {
        let net = &world.network;

        let bots = world
            .bots
            .values()
            .map(|b| BotSnapshot {
                id:          b.id,
                waypoint:    b.position,
                position:    net.coord(b.position),
                state:       b.state,
                carried_pod: b.carried_pod,
                parked:      b.parked,
            })
            .collect();

        let pods = world
            .pods
            .values()
            .map(|p| {
                let waypoint = match p.location {
                    PodLocation::Stored(slot) => slot,
                    PodLocation::Carried(bot) => world.bots[bot].position,
                };
                PodSnapshot {
                    id:         p.id,
                    waypoint,
                    position:   net.coord(waypoint),
                    carried_by: p.carried_by(),
                    inventory:  p.inventory.clone(),
                    capacity:   p.capacity,
                }
            })
            .collect();

        let stations = world
            .stations
            .values()
            .map(|s| StationSnapshot {
                id:                   s.id,
                kind:                 s.kind,
                waypoint:             s.waypoint,
                queue:                s.queue.iter().copied().collect(),
                docked:               s.head().filter(|_| s.head_docked),
                processing_remaining: s.processing_remaining,
            })
            .collect();

        let orders = world
            .orders
            .values()
            .map(|o| OrderSnapshot {
                id:        o.id,
                status:    o.status,
                items:     o.items.clone(),
                created:   o.created,
                completed: o.completed,
            })
            .collect();

        Self { tick, bots, pods, stations, orders }
    }

    pub fn bot(&self, id: BotId) -> Option<&BotSnapshot> {
        self.bots.get(id.index())
    }

    pub fn pod(&self, id: PodId) -> Option<&PodSnapshot> {
        self.pods.get(id.index())
    }

    pub fn order(&self, id: OrderId) -> Option<&OrderSnapshot> {
        self.orders.get(id.index())
    }
}
