//! CSV output backend.
//!
//! Creates four files in the configured output directory:
//! - `bot_snapshots.csv`
//! - `pod_snapshots.csv`
//! - `tick_metrics.csv`
//! - `run_summary.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{BotSnapshotRow, OutputResult, PodSnapshotRow, RunSummaryRow, TickMetricsRow};

pub const BOT_HEADER: [&str; 8] =
    ["bot_id", "tick", "waypoint", "x", "y", "state", "carried_pod", "parked"];
pub const POD_HEADER: [&str; 7] =
    ["pod_id", "tick", "waypoint", "carried_by", "items", "kinds", "capacity"];
pub const METRICS_HEADER: [&str; 10] = [
    "tick",
    "sim_time_secs",
    "busy_bots",
    "idle_bots",
    "pending_orders",
    "open_orders",
    "orders_completed",
    "items_picked",
    "blocked_waits",
    "reserved_waypoints",
];
pub const SUMMARY_HEADER: [&str; 16] = [
    "since",
    "final_tick",
    "ticks_observed",
    "orders_created",
    "orders_completed",
    "items_picked",
    "bundles_received",
    "bundles_stored",
    "capacity_rejections",
    "blocked_waits",
    "reroutes",
    "no_path_events",
    "distance_travelled",
    "utilization",
    "throughput",
    "mean_latency",
];

/// Writes simulation output to four CSV files.
pub struct CsvWriter {
    bots:     Writer<File>,
    pods:     Writer<File>,
    metrics:  Writer<File>,
    summary:  Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut bots = Writer::from_path(dir.join("bot_snapshots.csv"))?;
        bots.write_record(BOT_HEADER)?;

        let mut pods = Writer::from_path(dir.join("pod_snapshots.csv"))?;
        pods.write_record(POD_HEADER)?;

        let mut metrics = Writer::from_path(dir.join("tick_metrics.csv"))?;
        metrics.write_record(METRICS_HEADER)?;

        let mut summary = Writer::from_path(dir.join("run_summary.csv"))?;
        summary.write_record(SUMMARY_HEADER)?;

        Ok(Self { bots, pods, metrics, summary, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_bot_snapshots(&mut self, rows: &[BotSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.bots.write_record(&[
                row.bot_id.to_string(),
                row.tick.to_string(),
                row.waypoint.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.state.to_owned(),
                row.carried_pod.to_string(),
                (row.parked as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_pod_snapshots(&mut self, rows: &[PodSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.pods.write_record(&[
                row.pod_id.to_string(),
                row.tick.to_string(),
                row.waypoint.to_string(),
                row.carried_by.to_string(),
                row.items.to_string(),
                row.kinds.to_string(),
                row.capacity.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_metrics(&mut self, row: &TickMetricsRow) -> OutputResult<()> {
        self.metrics.write_record(&[
            row.tick.to_string(),
            row.sim_time_secs.to_string(),
            row.busy_bots.to_string(),
            row.idle_bots.to_string(),
            row.pending_orders.to_string(),
            row.open_orders.to_string(),
            row.orders_completed.to_string(),
            row.items_picked.to_string(),
            row.blocked_waits.to_string(),
            row.reserved_waypoints.to_string(),
        ])?;
        Ok(())
    }

    fn write_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.summary.write_record(&[
            row.since.to_string(),
            row.final_tick.to_string(),
            row.ticks_observed.to_string(),
            row.orders_created.to_string(),
            row.orders_completed.to_string(),
            row.items_picked.to_string(),
            row.bundles_received.to_string(),
            row.bundles_stored.to_string(),
            row.capacity_rejections.to_string(),
            row.blocked_waits.to_string(),
            row.reroutes.to_string(),
            row.no_path_events.to_string(),
            row.distance_travelled.to_string(),
            row.utilization.to_string(),
            row.throughput.to_string(),
            row.mean_latency.map(|l| l.to_string()).unwrap_or_default(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.bots.flush()?;
        self.pods.flush()?;
        self.metrics.flush()?;
        self.summary.flush()?;
        Ok(())
    }
}
