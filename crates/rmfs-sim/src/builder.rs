//! Fluent builder for constructing a [`Sim`], and the world assembly shared
//! with [`Sim::reset`].

use tracing::debug;

use rmfs_core::{
    BotId, ItemCounts, PodId, SimClock, SimRng, StationId, WarehouseConfig, WaypointId,
};
use rmfs_dispatch::{DispatchPolicy, Dispatcher, GreedyPolicy};
use rmfs_entities::{Arena, Bot, Pod, PodStore, Station, StationKind};
use rmfs_spatial::{AStarRouter, Pathfinder, WarehouseLayout};

use crate::generator::{item_name, streams};
use crate::{OrderGenerator, Sim, SimError, SimResult, Statistics, World};

/// Initial contents of one pod.
#[derive(Clone, Debug, PartialEq)]
pub struct PodSpec {
    pub slot:      WaypointId,
    pub inventory: ItemCounts,
}

impl PodSpec {
    pub fn new(slot: WaypointId, inventory: ItemCounts) -> Self {
        Self { slot, inventory }
    }
}

/// Caller-supplied overrides, kept by the sim so `reset` rebuilds the same
/// floor.
#[derive(Clone, Default)]
pub(crate) struct Setup {
    pub layout:        Option<WarehouseLayout>,
    pub bot_positions: Option<Vec<WaypointId>>,
    pub pods:          Option<Vec<PodSpec>>,
}

/// Fluent builder for [`Sim<R, P>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                                        |
/// |-----------------------|------------------------------------------------|
/// | `.layout(l)`          | `WarehouseLayout::generate` from the config    |
/// | `.bot_positions(v)`   | `robots.count` shuffled transit waypoints      |
/// | `.pods(v)`            | `pods.count` shuffled slots, random contents   |
/// | `.router(r)`          | `AStarRouter::default()`                       |
/// | `.policy(p)`          | `GreedyPolicy`                                 |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(WarehouseConfig::default()).build()?;
/// sim.run(&mut NoopObserver)?;
/// println!("{} orders done", sim.stats.orders_completed);
/// ```
pub struct SimBuilder<R: Pathfinder = AStarRouter, P: DispatchPolicy = GreedyPolicy> {
    config: WarehouseConfig,
    setup:  Setup,
    router: R,
    policy: P,
}

impl SimBuilder {
    pub fn new(config: WarehouseConfig) -> Self {
        Self {
            config,
            setup:  Setup::default(),
            router: AStarRouter::default(),
            policy: GreedyPolicy,
        }
    }
}

impl<R: Pathfinder, P: DispatchPolicy> SimBuilder<R, P> {
    /// Use a hand-built floor instead of the generated grid.  Layout-shape
    /// settings in the config are then ignored.
    pub fn layout(mut self, layout: WarehouseLayout) -> Self {
        self.setup.layout = Some(layout);
        self
    }

    /// Start positions, one per configured robot.
    pub fn bot_positions(mut self, positions: Vec<WaypointId>) -> Self {
        self.setup.bot_positions = Some(positions);
        self
    }

    /// Initial pods, one per configured pod.
    pub fn pods(mut self, pods: Vec<PodSpec>) -> Self {
        self.setup.pods = Some(pods);
        self
    }

    pub fn router<R2: Pathfinder>(self, router: R2) -> SimBuilder<R2, P> {
        SimBuilder { config: self.config, setup: self.setup, router, policy: self.policy }
    }

    pub fn policy<P2: DispatchPolicy>(self, policy: P2) -> SimBuilder<R, P2> {
        SimBuilder { config: self.config, setup: self.setup, router: self.router, policy }
    }

    /// Validate inputs, assemble the world, and return a ready-to-run
    /// [`Sim`] at tick 0 with every bot idle.
    pub fn build(self) -> SimResult<Sim<R, P>> {
        let world = assemble(&self.config, &self.setup)?;
        let mut dispatcher = Dispatcher::new(self.policy);
        for id in world.bots.ids() {
            dispatcher.on_bot_idle(id);
        }

        Ok(Sim {
            clock:       SimClock::new(self.config.simulation.dt_secs),
            stats:       Statistics::new(world.bots.len(), world.pods.len(), world.stations.len()),
            generator:   OrderGenerator::new(&self.config),
            config:      self.config,
            world,
            router:      self.router,
            dispatcher,
            setup:       self.setup,
            events:      Vec::new(),
            last_events: Vec::new(),
        })
    }
}

// ── World assembly ────────────────────────────────────────────────────────────

/// Build a fresh world from `config` and the overrides in `setup`.
///
/// Fails before anything runs if the configuration is invalid, the layout has
/// no output station, a count disagrees with the config, a placement is
/// illegal, or some station, slot, or bot is cut off from the rest of the
/// floor.
pub(crate) fn assemble(config: &WarehouseConfig, setup: &Setup) -> SimResult<World> {
    let layout = match &setup.layout {
        Some(l) => {
            config.validate_without_layout()?;
            l.clone()
        }
        None => {
            config.validate()?;
            WarehouseLayout::generate(&config.layout, &config.stations)
        }
    };
    if layout.output_stations.is_empty() {
        return Err(SimError::Config("layout has no output station".into()));
    }

    let seed = config.simulation.seed;
    let pod_specs = match &setup.pods {
        Some(p) => {
            check_count(config.pods.count, p.len(), "pod specs")?;
            p.clone()
        }
        None => random_pods(config, &layout.storage_slots)?,
    };
    let positions = match &setup.bot_positions {
        Some(p) => {
            check_count(config.robots.count, p.len(), "bot positions")?;
            p.clone()
        }
        None => {
            let mut transit = layout.transit_waypoints();
            if transit.len() < config.robots.count as usize {
                return Err(SimError::Config(format!(
                    "{} robots exceed {} transit waypoints",
                    config.robots.count,
                    transit.len()
                )));
            }
            SimRng::child(seed, streams::BOT_SPAWN).shuffle(&mut transit);
            transit.truncate(config.robots.count as usize);
            transit
        }
    };
    layout.check_connected(&positions)?;

    let WarehouseLayout { mut network, input_stations, output_stations, storage_slots } = layout;

    let mut store = PodStore::new(&storage_slots);
    let mut pods = Arena::new();
    for (i, spec) in pod_specs.into_iter().enumerate() {
        let id = PodId::from_index(i);
        store.place(spec.slot, id)?;
        pods.push(Pod::new(id, spec.slot, config.pods.capacity, spec.inventory)?);
    }

    let mut bots = Arena::new();
    for (i, &wp) in positions.iter().enumerate() {
        let id = BotId::from_index(i);
        network.reserve(wp, id)?;
        bots.push(Bot::new(id, wp, config.robots.speed, config.robots.capacity));
    }

    let processing = config.stations.processing_ticks;
    let stations: Arena<StationId, Station> = input_stations
        .iter()
        .map(|&wp| (StationKind::Input, wp))
        .chain(output_stations.iter().map(|&wp| (StationKind::Output, wp)))
        .enumerate()
        .map(|(i, (kind, wp))| Station::new(StationId::from_index(i), kind, wp, processing))
        .collect();

    debug!(
        waypoints = network.node_count(),
        bots = bots.len(),
        pods = pods.len(),
        stations = stations.len(),
        "world assembled"
    );
    Ok(World { network, bots, pods, stations, orders: Arena::new(), store })
}

fn check_count(expected: u32, got: usize, what: &'static str) -> SimResult<()> {
    if got != expected as usize {
        return Err(SimError::CountMismatch { expected: expected as usize, got, what });
    }
    Ok(())
}

/// `pods.count` pods on shuffled slots, each holding a random number of
/// single units drawn from the item catalogue.
fn random_pods(config: &WarehouseConfig, slots: &[WaypointId]) -> SimResult<Vec<PodSpec>> {
    let pc = &config.pods;
    if slots.len() < pc.count as usize {
        return Err(SimError::Config(format!(
            "{} pods exceed {} storage slots",
            pc.count,
            slots.len()
        )));
    }
    let seed = config.simulation.seed;
    let mut slots = slots.to_vec();
    SimRng::child(seed, streams::POD_SLOTS).shuffle(&mut slots);

    let mut rng = SimRng::child(seed, streams::POD_CONTENTS);
    let specs = slots
        .into_iter()
        .take(pc.count as usize)
        .map(|slot| {
            let mut inventory = ItemCounts::new();
            let units = rng.gen_range(pc.initial_items_min..=pc.initial_items_max);
            for _ in 0..units {
                let kind = rng.gen_range(1..=pc.item_kinds);
                *inventory.entry(item_name(kind)).or_insert(0) += 1;
            }
            PodSpec { slot, inventory }
        })
        .collect();
    Ok(specs)
}
