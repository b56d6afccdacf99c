//! `rmfs-entities`: the mutable world objects of the `rmfs` simulator.
//!
//! Every entity family lives in a flat [`Arena`] indexed by its typed id.
//! Cross-entity relations (a bot's carried pod, a station's queue, an order's
//! pod) are plain ids resolved through the owning arena at use time; no entity
//! ever embeds another entity's state.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`arena`]   | `Arena<I, T>`, `ArenaId`                                    |
//! | [`bot`]     | `Bot`, `BotState`                                           |
//! | [`pod`]     | `Pod`, `PodLocation`, `PodStore` (slot occupancy + claims)  |
//! | [`station`] | `Station`, `StationKind`                                    |
//! | [`order`]   | `Order`, `OrderStatus`                                      |
//! | [`task`]    | `Task`, `TaskKind`, `Bundle`                                |
//! | [`error`]   | `EntityError`, `EntityResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types. |

pub mod arena;
pub mod bot;
pub mod error;
pub mod order;
pub mod pod;
pub mod station;
pub mod task;


pub use arena::{Arena, ArenaId};
pub use bot::{Bot, BotState};
pub use error::{EntityError, EntityResult};
pub use order::{Order, OrderStatus};
pub use pod::{Pod, PodLocation, PodStore};
pub use station::{Station, StationKind};
pub use task::{Bundle, Task, TaskKind};
