//! Warehouse configuration.
//!
//! The whole run is described by one immutable [`WarehouseConfig`], handed to
//! the simulation builder at construction time.  Loading it from TOML/JSON is
//! the application's job; with the `serde` feature every section derives
//! `Deserialize`.
//!
//! Defaults reproduce the classic RMFS demo warehouse: a 30 × 20 grid, 8
//! robots, 40 pods, 2 input and 2 output stations.

use std::ops::Range;

use crate::{CoreError, CoreResult};

/// Top-level configuration object.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WarehouseConfig {
    pub layout:     LayoutConfig,
    pub robots:     RobotConfig,
    pub pods:       PodConfig,
    pub stations:   StationConfig,
    pub simulation: SimulationConfig,
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Floor dimensions and storage area shape.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.  Row 0 holds the input stations, the last row the outputs.
    pub height: u32,
    /// Number of storage rows centred vertically in the grid.
    pub storage_rows: u32,
    /// Add diagonal links between grid cells.
    pub diagonal: bool,
}

/// Robot fleet.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    pub count: u32,
    /// Hops per tick.  Values above 1 are capped at one hop per tick; values
    /// below 1 make the bot wait extra ticks between hops.
    pub speed: f32,
    /// Pods carried at once.
    pub capacity: u32,
}

/// Storage pods.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PodConfig {
    pub count: u32,
    /// Maximum total units per pod.
    pub capacity: u32,
    /// Initial fill drawn uniformly from `initial_items_min..=initial_items_max`
    /// single units.
    pub initial_items_min: u32,
    pub initial_items_max: u32,
    /// Size of the item catalogue (`item_1` … `item_N`).
    pub item_kinds: u32,
}

/// Input and output stations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationConfig {
    pub input_count: u32,
    pub output_count: u32,
    /// Ticks a station spends on the bot at the head of its queue.
    pub processing_ticks: u32,
}

/// Run length, pacing, and engine knobs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Ticks simulated after warm-up.
    pub duration_ticks: u64,
    /// Ticks simulated before statistics are reset.
    pub warmup_ticks: u64,
    /// Simulated seconds per tick.
    pub dt_secs: f64,
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
    /// Ticks a bot spends lifting a pod.
    pub pickup_ticks: u32,
    /// Per-tick probability of the built-in order stream creating an order.
    /// `0.0` disables it; orders then only come from `create_order`.
    pub order_probability: f64,
    /// Per-tick probability of the built-in replenishment stream delivering a
    /// bundle to the input side.  `0.0` disables it.
    pub bundle_probability: f64,
    /// Snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
    /// A moving bot blocked this many consecutive ticks recomputes its route.
    /// 0 disables re-routing.
    pub replan_after_ticks: u32,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { width: 30, height: 20, storage_rows: 5, diagonal: false }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self { count: 8, speed: 1.0, capacity: 1 }
    }
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            count:             40,
            capacity:          100,
            initial_items_min: 5,
            initial_items_max: 20,
            item_kinds:        50,
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self { input_count: 2, output_count: 2, processing_ticks: 3 }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_ticks:        3_000,
            warmup_ticks:          100,
            dt_secs:               0.1,
            seed:                  42,
            pickup_ticks:          2,
            order_probability:     0.05,
            bundle_probability:    0.02,
            output_interval_ticks: 10,
            replan_after_ticks:    5,
        }
    }
}

// ── Layout geometry helpers ───────────────────────────────────────────────────

impl LayoutConfig {
    /// Rows (y values) that hold storage slots.
    pub fn storage_row_range(&self) -> Range<u32> {
        let start = (self.height / 2).saturating_sub(self.storage_rows / 2);
        start..start + self.storage_rows
    }

    /// `true` if grid cell `(x, y)` is a pod storage slot.
    ///
    /// Two aisle columns are kept free on each side and every third column is
    /// an aisle.
    pub fn is_storage_slot(&self, x: u32, y: u32) -> bool {
        self.storage_row_range().contains(&y)
            && x >= 2
            && x + 2 < self.width
            && x % 3 != 0
    }

    /// Number of storage slots the generated layout will have.
    pub fn storage_slot_count(&self) -> u32 {
        let row = self.storage_row_range().start;
        let per_row = (0..self.width).filter(|&x| self.is_storage_slot(x, row)).count();
        per_row as u32 * self.storage_rows
    }

    /// Column of station `i` out of `count` spread evenly along a row.
    #[inline]
    pub fn station_column(&self, i: u32, count: u32) -> u32 {
        (self.width / (count + 1)) * (i + 1)
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

impl WarehouseConfig {
    /// The tick at which a full run ends (inclusive).
    #[inline]
    pub fn end_tick(&self) -> crate::Tick {
        crate::Tick(self.simulation.warmup_ticks + self.simulation.duration_ticks)
    }

    /// Reject configurations the engine cannot start from, including the
    /// checks for the generated grid layout.
    ///
    /// Connectivity is verified by the simulation builder once the network
    /// exists.
    pub fn validate(&self) -> CoreResult<()> {
        self.validate_without_layout()?;
        self.validate_layout()
    }

    /// The checks that hold for any floor plan.  Used on its own when the
    /// caller supplies a custom network instead of the generated grid.
    pub fn validate_without_layout(&self) -> CoreResult<()> {
        let err = |msg: String| Err(CoreError::Config(msg));

        if self.robots.count == 0 {
            return err("robot count must be at least 1".into());
        }
        if !(self.robots.speed > 0.0) {
            return err(format!("robot speed must be positive, got {}", self.robots.speed));
        }
        if self.robots.capacity == 0 {
            return err("robot capacity must be at least 1".into());
        }
        if self.pods.capacity == 0 {
            return err("pod capacity must be at least 1".into());
        }
        if self.pods.initial_items_min > self.pods.initial_items_max {
            return err(format!(
                "initial_items_min {} exceeds initial_items_max {}",
                self.pods.initial_items_min, self.pods.initial_items_max
            ));
        }
        if self.pods.initial_items_max > 0 && self.pods.item_kinds == 0 {
            return err("pods start with items but item_kinds is 0".into());
        }
        if !(self.simulation.dt_secs > 0.0) {
            return err(format!("dt_secs must be positive, got {}", self.simulation.dt_secs));
        }
        for (name, p) in [
            ("order_probability", self.simulation.order_probability),
            ("bundle_probability", self.simulation.bundle_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        if self.simulation.bundle_probability > 0.0 && self.pods.item_kinds == 0 {
            return err("bundle stream enabled but item_kinds is 0".into());
        }
        Ok(())
    }

    /// The checks specific to the generated grid.
    pub fn validate_layout(&self) -> CoreResult<()> {
        let l = &self.layout;
        let err = |msg: String| Err(CoreError::Config(msg));

        if self.stations.output_count == 0 {
            return err("at least one output station is required".into());
        }
        if l.width < 3 || l.height < 3 {
            return err(format!("layout {}x{} is smaller than 3x3", l.width, l.height));
        }
        let widest = self.stations.input_count.max(self.stations.output_count);
        if l.width < widest + 1 {
            return err(format!("layout width {} cannot fit {widest} stations in a row", l.width));
        }
        if l.storage_rows > l.height - 2 {
            return err(format!(
                "{} storage rows do not fit between the station rows of a {}-row layout",
                l.storage_rows, l.height
            ));
        }
        let slots = l.storage_slot_count();
        if self.pods.count > slots {
            return err(format!("{} pods exceed {slots} storage slots", self.pods.count));
        }
        let stations = self.stations.input_count + self.stations.output_count;
        let transit = l.width * l.height - slots - stations;
        if self.robots.count > transit {
            return err(format!("{} robots exceed {transit} free waypoints", self.robots.count));
        }
        Ok(())
    }
}
