//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! four tables: `bot_snapshots`, `pod_snapshots`, `tick_metrics`, and
//! `run_summary`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{BotSnapshotRow, OutputResult, PodSnapshotRow, RunSummaryRow, TickMetricsRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS bot_snapshots (
                 bot_id      INTEGER NOT NULL,
                 tick        INTEGER NOT NULL,
                 waypoint    INTEGER NOT NULL,
                 x           REAL    NOT NULL,
                 y           REAL    NOT NULL,
                 state       TEXT    NOT NULL,
                 carried_pod INTEGER NOT NULL,
                 parked      INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS pod_snapshots (
                 pod_id     INTEGER NOT NULL,
                 tick       INTEGER NOT NULL,
                 waypoint   INTEGER NOT NULL,
                 carried_by INTEGER NOT NULL,
                 items      INTEGER NOT NULL,
                 kinds      INTEGER NOT NULL,
                 capacity   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_metrics (
                 tick               INTEGER PRIMARY KEY,
                 sim_time_secs      REAL    NOT NULL,
                 busy_bots          INTEGER NOT NULL,
                 idle_bots          INTEGER NOT NULL,
                 pending_orders     INTEGER NOT NULL,
                 open_orders        INTEGER NOT NULL,
                 orders_completed   INTEGER NOT NULL,
                 items_picked       INTEGER NOT NULL,
                 blocked_waits      INTEGER NOT NULL,
                 reserved_waypoints INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS run_summary (
                 since               INTEGER NOT NULL,
                 final_tick          INTEGER NOT NULL,
                 ticks_observed      INTEGER NOT NULL,
                 orders_created      INTEGER NOT NULL,
                 orders_completed    INTEGER NOT NULL,
                 items_picked        INTEGER NOT NULL,
                 bundles_received    INTEGER NOT NULL,
                 bundles_stored      INTEGER NOT NULL,
                 capacity_rejections INTEGER NOT NULL,
                 blocked_waits       INTEGER NOT NULL,
                 reroutes            INTEGER NOT NULL,
                 no_path_events      INTEGER NOT NULL,
                 distance_travelled  REAL    NOT NULL,
                 utilization         REAL    NOT NULL,
                 throughput          REAL    NOT NULL,
                 mean_latency        REAL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_bot_snapshots(&mut self, rows: &[BotSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO bot_snapshots \
                 (bot_id, tick, waypoint, x, y, state, carried_pod, parked) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.bot_id,
                    row.tick as i64,
                    row.waypoint,
                    f64::from(row.x),
                    f64::from(row.y),
                    row.state,
                    row.carried_pod,
                    row.parked as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_pod_snapshots(&mut self, rows: &[PodSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO pod_snapshots \
                 (pod_id, tick, waypoint, carried_by, items, kinds, capacity) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.pod_id,
                    row.tick as i64,
                    row.waypoint,
                    row.carried_by,
                    row.items,
                    row.kinds,
                    row.capacity,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_metrics(&mut self, row: &TickMetricsRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_metrics \
             (tick, sim_time_secs, busy_bots, idle_bots, pending_orders, open_orders, \
              orders_completed, items_picked, blocked_waits, reserved_waypoints) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                row.tick as i64,
                row.sim_time_secs,
                row.busy_bots,
                row.idle_bots,
                row.pending_orders,
                row.open_orders,
                row.orders_completed as i64,
                row.items_picked as i64,
                row.blocked_waits,
                row.reserved_waypoints,
            ],
        )?;
        Ok(())
    }

    fn write_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO run_summary \
             (since, final_tick, ticks_observed, orders_created, orders_completed, items_picked, \
              bundles_received, bundles_stored, capacity_rejections, blocked_waits, reroutes, \
              no_path_events, distance_travelled, utilization, throughput, mean_latency) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            rusqlite::params![
                row.since as i64,
                row.final_tick as i64,
                row.ticks_observed as i64,
                row.orders_created as i64,
                row.orders_completed as i64,
                row.items_picked as i64,
                row.bundles_received as i64,
                row.bundles_stored as i64,
                row.capacity_rejections as i64,
                row.blocked_waits as i64,
                row.reroutes as i64,
                row.no_path_events as i64,
                row.distance_travelled,
                row.utilization,
                row.throughput,
                row.mean_latency,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
