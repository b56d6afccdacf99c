//! `rmfs-sim`: the tick loop of the `rmfs` warehouse simulator.
//!
//! # Tick order
//!
//! ```text
//! tick():
//!   ① Clock    : advance by one dt.
//!   ② Arrivals : the random streams may create an order and a bundle.
//!   ③ Dispatch : Dispatcher::tick matches idle bots to orders and bundles;
//!                 each match is committed as a task on its bot.
//!   ④ Bots     : ascending BotId: move one hop (if the next waypoint can be
//!                 reserved), pick up, dock, undock, or put a pod back.
//!   ⑤ Stations : ascending StationId: count down; the finished bot has its
//!                 order picked or bundle stored and is sent back to storage.
//!   ⑥ Stats    : Statistics::observe folds the tick's events in.
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`sim`]       | `Sim`: commands, run drivers, tick                        |
//! | [`builder`]   | `SimBuilder`, `PodSpec`, world assembly                    |
//! | [`world`]     | `World`: network plus entity arenas                       |
//! | [`generator`] | `OrderGenerator`: random order and bundle streams         |
//! | [`stats`]     | `Statistics`, `TickMetrics`, `StationTally`                |
//! | [`snapshot`]  | `WorldSnapshot` and per-entity snapshot rows               |
//! | [`events`]    | `SimEvent`                                                 |
//! | [`observer`]  | `SimObserver`, `NoopObserver`                              |
//! | [`error`]     | `SimError`, `SimResult<T>`                                 |
//!
//! # Cargo features
//!
//! | Feature | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Serde derives on snapshots, metrics, statistics, and events. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rmfs_core::WarehouseConfig;
//! use rmfs_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(WarehouseConfig::default()).build()?;
//! sim.run(&mut NoopObserver)?;
//! println!("utilization {:.2}", sim.stats.utilization());
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod generator;
pub mod observer;
pub mod sim;
pub mod snapshot;
pub mod stats;
pub mod world;


pub use builder::{PodSpec, SimBuilder};
pub use error::{SimError, SimResult};
pub use events::SimEvent;
pub use generator::OrderGenerator;
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use snapshot::{BotSnapshot, OrderSnapshot, PodSnapshot, StationSnapshot, WorldSnapshot};
pub use stats::{StationTally, Statistics, TickMetrics};
pub use world::World;
