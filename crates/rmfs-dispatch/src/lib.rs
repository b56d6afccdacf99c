//! `rmfs-dispatch`: matching idle bots to pending work.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`view`]       | `DispatchView`: read-only world state for one tick        |
//! | [`policy`]     | `DispatchPolicy` trait, `PendingWork`, `Assignment`, `Work` |
//! | [`greedy`]     | `GreedyPolicy`: oldest work first, nearest bot by path cost |
//! | [`dispatcher`] | `Dispatcher`: pending queues, idle set, task issue        |
//!
//! # Ownership
//!
//! The dispatcher owns the queues of unmatched orders and bundles and the set
//! of idle bots.  A [`Task`][rmfs_entities::Task] it issues is handed to the
//! engine, which gives it to the bot; the task comes back only in the sense
//! that finishing a station visit makes the engine ask for a `ReturnPod`.

pub mod dispatcher;
pub mod greedy;
pub mod policy;
pub mod view;

#[cfg(test)]
mod tests;

pub use dispatcher::{Dispatch, Dispatcher};
pub use greedy::GreedyPolicy;
pub use policy::{Assignment, DispatchPolicy, PendingWork, Work};
pub use view::DispatchView;
