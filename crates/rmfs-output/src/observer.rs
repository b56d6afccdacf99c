//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use tracing::warn;

use rmfs_core::{Tick, WarehouseConfig};
use rmfs_sim::{SimObserver, Statistics, TickMetrics, WorldSnapshot};

use crate::row::{BotSnapshotRow, PodSnapshotRow, RunSummaryRow, TickMetricsRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes bot and pod snapshots, the per-tick series,
/// and the run summary to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    dt_secs:    f64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for the
    /// tick-to-seconds conversion.
    pub fn new(writer: W, config: &WarehouseConfig) -> Self {
        Self { writer, dt_secs: config.simulation.dt_secs, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed; further errors suppressed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, metrics: &TickMetrics) {
        let row = TickMetricsRow::from_metrics(metrics, self.dt_secs);
        let result = self.writer.write_tick_metrics(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, snapshot: &WorldSnapshot) {
        let bots: Vec<BotSnapshotRow> =
            snapshot.bots.iter().map(|b| BotSnapshotRow::from_snapshot(tick, b)).collect();
        if !bots.is_empty() {
            let result = self.writer.write_bot_snapshots(&bots);
            self.store_err(result);
        }

        let pods: Vec<PodSnapshotRow> =
            snapshot.pods.iter().map(|p| PodSnapshotRow::from_snapshot(tick, p)).collect();
        if !pods.is_empty() {
            let result = self.writer.write_pod_snapshots(&pods);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick, stats: &Statistics) {
        let result = self.writer.write_summary(&RunSummaryRow::from_stats(final_tick, stats));
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
