//! Things that happened during a tick.
//!
//! The engine appends events as it goes; [`Statistics`][crate::Statistics]
//! folds them into counters at the end of the tick, and
//! [`Sim::last_events`][crate::Sim::last_events] exposes the raw list to
//! front-ends.  Events produced by commands between ticks (`create_order`,
//! `receive_bundle`) are counted with the next tick.

use rmfs_core::{BotId, OrderId, PodId, StationId, TaskId, WaypointId};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimEvent {
    OrderCreated { order: OrderId },
    BundleReceived { item: String, qty: u32 },
    TaskAssigned { bot: BotId, task: TaskId, pod: PodId },
    PodPickedUp { bot: BotId, pod: PodId },
    Moved { bot: BotId, from: WaypointId, to: WaypointId, distance: f32 },
    /// The next hop was reserved by `holder`; the bot waited.
    Blocked { bot: BotId, at: WaypointId, holder: BotId },
    Rerouted { bot: BotId },
    /// No route to `goal` around the current reservations.
    NoPath { bot: BotId, goal: WaypointId },
    /// The bot reached the station's approach and joined its queue.
    Queued { bot: BotId, station: StationId },
    Docked { bot: BotId, station: StationId },
    OrderCompleted { order: OrderId, pod: PodId, station: StationId, items: u32, latency: u64 },
    BundleStored { pod: PodId, station: StationId, qty: u32 },
    /// A bundle did not fit into its pod and went back to the queue.
    CapacityRejected { pod: PodId, station: StationId, qty: u32 },
    PodReturned { bot: BotId, pod: PodId, slot: WaypointId },
}
