//! `rmfs-output`: simulation output writers for the rmfs warehouse simulator.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                              |
//! |-----------|---------|----------------------------------------------------------------------------|
//! | *(none)*  | CSV     | `bot_snapshots.csv`, `pod_snapshots.csv`, `tick_metrics.csv`, `run_summary.csv` |
//! | `sqlite`  | SQLite  | `output.db`                                                                |
//!
//! Both backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `rmfs_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rmfs_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{BotSnapshotRow, PodSnapshotRow, RunSummaryRow, TickMetricsRow, NONE_ID};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
