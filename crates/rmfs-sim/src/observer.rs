//! Simulation observer trait for progress reporting and data collection.

use rmfs_core::Tick;

use crate::{Statistics, TickMetrics, WorldSnapshot};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] and friends at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress { every: u64 }
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, tick: Tick, m: &TickMetrics) {
///         if tick.0 % self.every == 0 {
///             println!("{tick}: {} busy, {} done", m.busy_bots, m.orders_completed);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before tick `tick` is processed.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after tick `tick` with the metrics row it produced.
    fn on_tick_end(&mut self, _tick: Tick, _metrics: &TickMetrics) {}

    /// Called every `output_interval_ticks` ticks with a full snapshot.
    fn on_snapshot(&mut self, _tick: Tick, _snapshot: &WorldSnapshot) {}

    /// Called once when [`Sim::run`][crate::Sim::run] reaches the end tick.
    fn on_sim_end(&mut self, _final_tick: Tick, _stats: &Statistics) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
