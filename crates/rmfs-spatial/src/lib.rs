//! `rmfs-spatial`: the warehouse floor graph and routing over it.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`network`] | `WaypointNetwork` (CSR + R-tree + reservations), builder, roles  |
//! | [`layout`]  | `WarehouseLayout`: generated or role-derived station/slot lists |
//! | [`router`]  | `Pathfinder` trait, `Path`, `AStarRouter`                        |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod layout;
pub mod network;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use layout::WarehouseLayout;
pub use network::{WaypointNetwork, WaypointNetworkBuilder, WaypointRole};
pub use router::{AStarRouter, Heuristic, Path, Pathfinder};
