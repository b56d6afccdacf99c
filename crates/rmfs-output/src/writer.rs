//! The `OutputWriter` trait implemented by all backend writers.

use crate::{BotSnapshotRow, OutputResult, PodSnapshotRow, RunSummaryRow, TickMetricsRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors are returned to the caller; [`SimOutputObserver`][crate::SimOutputObserver]
/// stores the first one and hands it out through `take_error`.
pub trait OutputWriter {
    /// Write a batch of bot rows from one snapshot.
    fn write_bot_snapshots(&mut self, rows: &[BotSnapshotRow]) -> OutputResult<()>;

    /// Write a batch of pod rows from one snapshot.
    fn write_pod_snapshots(&mut self, rows: &[PodSnapshotRow]) -> OutputResult<()>;

    /// Write one per-tick metrics row.
    fn write_tick_metrics(&mut self, row: &TickMetricsRow) -> OutputResult<()>;

    /// Write the end-of-run totals.
    fn write_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
