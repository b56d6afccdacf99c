//! Spatial-subsystem error type.

use thiserror::Error;

use rmfs_core::{BotId, WaypointId};

/// Errors produced by `rmfs-spatial`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpatialError {
    #[error("no path from {start} to {goal}")]
    NoPathFound { start: WaypointId, goal: WaypointId },

    /// Expected contention outcome, not a failure: the caller waits.
    #[error("{waypoint} is already reserved by {holder}")]
    AlreadyReserved { waypoint: WaypointId, holder: BotId },

    #[error("waypoint {0} not found in network")]
    WaypointNotFound(WaypointId),

    #[error("{waypoint} is not mutually reachable with {anchor}")]
    Disconnected { waypoint: WaypointId, anchor: WaypointId },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
