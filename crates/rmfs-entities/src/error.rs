//! Entity error type.

use thiserror::Error;

use rmfs_core::{BotId, OrderId, PodId, StationId, WaypointId};

use crate::OrderStatus;

/// Rejected entity mutations.  The entity is left unchanged in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("{pod} cannot take {requested} more units ({free} free)")]
    CapacityExceeded { pod: PodId, requested: u32, free: u32 },

    #[error("{pod} holds {available} of {item:?}, {requested} requested")]
    InsufficientStock { pod: PodId, item: String, requested: u32, available: u32 },

    #[error("{order} cannot move from {from} to {to}")]
    InvalidTransition { order: OrderId, from: OrderStatus, to: OrderStatus },

    #[error("{0} already holds a task")]
    BotBusy(BotId),

    #[error("{0} is already carrying a pod")]
    BotLoaded(BotId),

    #[error("storage slot {0} is not free")]
    SlotOccupied(WaypointId),

    #[error("{0} is not a storage slot")]
    NotASlot(WaypointId),

    #[error("{bot} is not next in line at {station}")]
    NotAtHead { station: StationId, bot: BotId },
}

pub type EntityResult<T> = Result<T, EntityError>;
