//! Dispatcher-generated units of work.

use rmfs_core::{BotId, OrderId, PodId, StationId, TaskId, Tick, WaypointId};

/// A delivery of `qty` units of one item type waiting at the input side.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bundle {
    pub item: String,
    pub qty:  u32,
}

impl Bundle {
    pub fn new(item: impl Into<String>, qty: u32) -> Self {
        Self { item: item.into(), qty }
    }
}

/// What a task asks its bot to do.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskKind {
    /// Lift `pod` from storage and bring it to output `station` for `order`.
    FetchPod { order: OrderId, pod: PodId, station: StationId },
    /// Put the carried `pod` down on storage `slot`.
    ReturnPod { pod: PodId, slot: WaypointId },
    /// Lift `pod` and bring it to input `station`, where `bundle` is loaded.
    Replenish { bundle: Bundle, pod: PodId, station: StationId },
}

impl TaskKind {
    /// The pod the task moves.
    pub fn pod(&self) -> PodId {
        match *self {
            TaskKind::FetchPod { pod, .. }
            | TaskKind::ReturnPod { pod, .. }
            | TaskKind::Replenish { pod, .. } => pod,
        }
    }

    /// The station the pod visits, if any.
    pub fn station(&self) -> Option<StationId> {
        match *self {
            TaskKind::FetchPod { station, .. } | TaskKind::Replenish { station, .. } => {
                Some(station)
            }
            TaskKind::ReturnPod { .. } => None,
        }
    }

    pub fn order(&self) -> Option<OrderId> {
        match *self {
            TaskKind::FetchPod { order, .. } => Some(order),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::FetchPod { .. }  => "fetch_pod",
            TaskKind::ReturnPod { .. } => "return_pod",
            TaskKind::Replenish { .. } => "replenish",
        }
    }
}

/// A task owned by exactly one bot.
///
/// `target` is the waypoint of the current leg: the pod's slot, then the
/// station, then (for `ReturnPod`) the storage slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub id:          TaskId,
    pub kind:        TaskKind,
    pub bot:         BotId,
    pub target:      WaypointId,
    pub assigned_at: Tick,
}
