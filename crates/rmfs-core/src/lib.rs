//! `rmfs-core`: foundational types for the `rmfs` warehouse simulator.
//!
//! This crate is a dependency of every other `rmfs-*` crate.  It has no
//! `rmfs-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `WaypointId`, `BotId`, `PodId`, `StationId`, `OrderId`, `TaskId` |
//! | [`geo`]         | `Coord`, Euclidean / Manhattan distance                   |
//! | [`time`]        | `Tick`, `SimClock`                                        |
//! | [`config`]      | `WarehouseConfig` and its sections                        |
//! | [`items`]       | `ItemCounts`: ordered item-type → quantity map           |
//! | [`rng`]         | `SimRng` (seeded, splittable)                             |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod items;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    LayoutConfig, PodConfig, RobotConfig, SimulationConfig, StationConfig, WarehouseConfig,
};
pub use error::{CoreError, CoreResult};
pub use geo::Coord;
pub use ids::{BotId, OrderId, PodId, StationId, TaskId, WaypointId};
pub use items::{ItemCounts, total_quantity};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
