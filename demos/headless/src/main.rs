//! headless: run one warehouse simulation without a front-end.
//!
//! ```text
//! headless [CONFIG.json] [OUTPUT_DIR]
//! ```
//!
//! Without a config file the default warehouse is used (30 × 20 grid,
//! 8 robots, 40 pods, 2 + 2 stations).  Output lands in `output/headless`
//! unless a directory is given.  Set `RUST_LOG=debug` to follow dispatch and
//! pickups, `RUST_LOG=trace` for every blocked move.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};

use rmfs_core::{Tick, WarehouseConfig};
use rmfs_entities::BotState;
use rmfs_output::{CsvWriter, OutputWriter, SimOutputObserver};
use rmfs_sim::{SimBuilder, SimObserver, Statistics, TickMetrics, WorldSnapshot};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_OUTPUT_DIR: &str = "output/headless";
/// Progress line every this many ticks.
const REPORT_EVERY:       u64  = 500;

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    metric_rows:   usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, metric_rows: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, metrics: &TickMetrics) {
        self.metric_rows += 1;
        if tick.0.is_multiple_of(REPORT_EVERY) {
            info!(
                %tick,
                busy = metrics.busy_bots,
                pending = metrics.pending_orders,
                done = metrics.orders_completed,
                "progress"
            );
        }
        self.inner.on_tick_end(tick, metrics);
    }

    fn on_snapshot(&mut self, tick: Tick, snapshot: &WorldSnapshot) {
        self.snapshot_rows += snapshot.bots.len() + snapshot.pods.len();
        self.inner.on_snapshot(tick, snapshot);
    }

    fn on_sim_end(&mut self, final_tick: Tick, stats: &Statistics) {
        self.inner.on_sim_end(final_tick, stats);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => WarehouseConfig::default(),
    };
    let out_dir: PathBuf = args.next().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into()).into();

    println!("=== headless: rmfs warehouse simulation ===");
    println!(
        "Grid: {} × {}  |  Robots: {}  |  Pods: {}  |  Stations: {} in / {} out  |  Seed: {}",
        config.layout.width,
        config.layout.height,
        config.robots.count,
        config.pods.count,
        config.stations.input_count,
        config.stations.output_count,
        config.simulation.seed,
    );
    println!(
        "Ticks: {} warm-up + {} measured, output every {} ticks",
        config.simulation.warmup_ticks,
        config.simulation.duration_ticks,
        config.simulation.output_interval_ticks,
    );
    println!();

    // 1. Build sim.
    let mut sim = SimBuilder::new(config.clone()).build()?;
    println!(
        "Floor: {} waypoints, {} storage slots",
        sim.world.network.node_count(),
        sim.world.store.slot_count()
    );

    // 2. Set up output.
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let writer = CsvWriter::new(&out_dir)?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer, &config));

    // 3. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 4. Final world state as JSON next to the CSVs.
    let snapshot_path = out_dir.join("final_snapshot.json");
    let json = serde_json::to_string_pretty(&sim.snapshot())?;
    std::fs::write(&snapshot_path, json)
        .with_context(|| format!("writing {}", snapshot_path.display()))?;

    // 5. Summary.
    let s = &sim.stats;
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  snapshot rows    : {}", obs.snapshot_rows);
    println!("  tick_metrics.csv : {} rows", obs.metric_rows);
    println!();
    println!("Measured from {} to {}:", s.since, sim.current_tick());
    println!("  orders           : {} created, {} completed", s.orders_created, s.orders_completed);
    println!("  items picked     : {}", s.items_picked);
    println!("  bundles          : {} received, {} stored", s.bundles_received, s.bundles_stored);
    match s.mean_latency() {
        Some(l) => println!("  mean latency     : {l:.1} ticks"),
        None => println!("  mean latency     : n/a"),
    }
    println!("  throughput       : {:.4} orders/tick", s.throughput());
    println!("  utilization      : {:.1} %", s.utilization() * 100.0);
    println!("  distance         : {:.1}", s.distance_travelled);
    println!("  blocked waits    : {}  (reroutes {})", s.blocked_waits, s.reroutes);
    println!();

    // 6. Final bot table.
    println!("{:<8} {:<20} {:<10} {:<8}", "Bot", "State", "Waypoint", "Pod");
    println!("{}", "-".repeat(48));
    for bot in sim.world.bots.values() {
        let pod = bot.carried_pod.map_or_else(|| "-".to_owned(), |p| p.0.to_string());
        let state = if bot.state == BotState::Idle && bot.parked { "parked" } else { bot.state.as_str() };
        println!("{:<8} {:<20} {:<10} {:<8}", bot.id.0, state, bot.position.0, pod);
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<WarehouseConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: WarehouseConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
