//! The `Sim` struct and its tick loop.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use rmfs_core::{BotId, ItemCounts, OrderId, SimClock, StationId, Tick, WarehouseConfig, WaypointId};
use rmfs_dispatch::{Dispatch, DispatchPolicy, Dispatcher, GreedyPolicy};
use rmfs_entities::{BotState, Bundle, EntityError, Order, PodLocation, StationKind, Task, TaskKind};
use rmfs_spatial::{AStarRouter, Path, Pathfinder, SpatialError};

use crate::builder::{Setup, assemble};
use crate::{
    NoopObserver, OrderGenerator, SimError, SimEvent, SimObserver, SimResult, Statistics,
    TickMetrics, World, WorldSnapshot,
};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The warehouse simulation.
///
/// `Sim<R, P>` owns the world and drives the fixed-order tick:
///
/// 1. **Clock**: advance one tick of `dt_secs`.
/// 2. **Arrivals**: the built-in streams may create an order and a bundle.
/// 3. **Dispatch**: the dispatcher matches idle bots to pending work; each
///    match becomes a task on its bot.
/// 4. **Bots**: every bot updates once, in ascending id order.  A moving bot
///    tries to reserve its next waypoint and waits if it cannot.
/// 5. **Stations**: every station advances its processing countdown, in
///    ascending id order, and releases the bot it finishes.
/// 6. **Statistics**: the tick's events and the resulting world are folded
///    into [`Statistics`].
///
/// Nothing runs in parallel; this order is what keeps reservations
/// consistent, and it makes runs reproducible bit-for-bit.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Pathfinder = AStarRouter, P: DispatchPolicy = GreedyPolicy> {
    /// The configuration the current world was built from.
    pub config: WarehouseConfig,

    pub clock: SimClock,

    /// Network, reservations, and every entity arena.
    pub world: World,

    pub router: R,

    /// Pending orders and bundles, idle-bot pool, task ids.
    pub dispatcher: Dispatcher<P>,

    pub stats: Statistics,

    pub(crate) generator:   OrderGenerator,
    pub(crate) setup:       Setup,
    /// Events of the tick in progress, plus commands issued since the last
    /// tick.
    pub(crate) events:      Vec<SimEvent>,
    pub(crate) last_events: Vec<SimEvent>,
}

impl<R: Pathfinder, P: DispatchPolicy> Sim<R, P> {
    // ── Run drivers ───────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()` (warm-up plus
    /// duration).
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step_observed(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick, &self.stats);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step_observed(observer)?;
        }
        Ok(())
    }

    /// Advance `n` ticks without callbacks.
    pub fn advance(&mut self, n: u64) -> SimResult<()> {
        self.run_ticks(n, &mut NoopObserver)
    }

    /// Like [`run`](Self::run), but sleeps so that one tick takes
    /// `dt_secs / speed` of wall-clock time.  Meant for live front-ends;
    /// results are identical to an unpaced run.
    pub fn run_paced<O: SimObserver>(&mut self, observer: &mut O, speed: f64) -> SimResult<()> {
        if !(speed > 0.0) {
            return Err(SimError::Config(format!("pacing speed must be positive, got {speed}")));
        }
        let period = Duration::from_secs_f64(self.clock.dt_secs / speed);
        while self.clock.current_tick < self.config.end_tick() {
            let started = Instant::now();
            self.step_observed(observer)?;
            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        observer.on_sim_end(self.clock.current_tick, &self.stats);
        Ok(())
    }

    fn step_observed<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickMetrics> {
        let next = self.clock.current_tick + 1;
        observer.on_tick_start(next);
        let metrics = self.tick()?;
        observer.on_tick_end(next, &metrics);
        let every = self.config.simulation.output_interval_ticks;
        if every > 0 && next.0.is_multiple_of(every) {
            observer.on_snapshot(next, &self.snapshot());
        }
        Ok(metrics)
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Queue a new order, stamped with the current tick.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidOrder`] for an empty request or a zero quantity.
    pub fn create_order(&mut self, items: ItemCounts) -> SimResult<OrderId> {
        if items.is_empty() {
            return Err(SimError::InvalidOrder("order requests no items".into()));
        }
        if let Some((item, _)) = items.iter().find(|(_, q)| **q == 0) {
            return Err(SimError::InvalidOrder(format!("zero quantity for {item}")));
        }
        let now = self.clock.current_tick;
        let id = self.world.orders.next_id();
        self.world.orders.push(Order::new(id, items, now));
        self.dispatcher.on_order_created(id);
        self.events.push(SimEvent::OrderCreated { order: id });
        debug!(order = %id, tick = %now, "order created");
        Ok(id)
    }

    /// Deliver `qty` units of `item` to the input side for storage.
    pub fn receive_bundle(&mut self, item: impl Into<String>, qty: u32) -> SimResult<()> {
        if qty == 0 {
            return Err(SimError::InvalidOrder("bundle of zero units".into()));
        }
        if !self.world.has_station(StationKind::Input) {
            return Err(SimError::NoInputStation);
        }
        let bundle = Bundle::new(item, qty);
        self.events.push(SimEvent::BundleReceived { item: bundle.item.clone(), qty });
        self.dispatcher.on_bundle_received(bundle);
        Ok(())
    }

    /// Take an idle bot out of the dispatchable pool.  It stays where it is
    /// and keeps its waypoint reserved.
    pub fn park_bot(&mut self, id: BotId) -> SimResult<()> {
        let bot = self.world.bots.get_mut(id).ok_or(SimError::UnknownBot(id))?;
        if bot.parked {
            return Ok(());
        }
        if !bot.is_available() {
            return Err(SimError::BotBusy(id));
        }
        bot.parked = true;
        self.dispatcher.withdraw_bot(id);
        debug!(bot = %id, "parked");
        Ok(())
    }

    /// Return a parked bot to the pool.
    pub fn unpark_bot(&mut self, id: BotId) -> SimResult<()> {
        let bot = self.world.bots.get_mut(id).ok_or(SimError::UnknownBot(id))?;
        if !bot.parked {
            return Ok(());
        }
        bot.parked = false;
        if bot.is_available() {
            self.dispatcher.on_bot_idle(id);
        }
        debug!(bot = %id, "unparked");
        Ok(())
    }

    /// Rebuild the whole world from `config` and start again at tick 0.
    ///
    /// Layout, bot-position, and pod overrides given to the builder are
    /// reused, so their lengths must still match the new counts.  On error
    /// the current world is left untouched.
    pub fn reset(&mut self, config: WarehouseConfig) -> SimResult<()> {
        let world = assemble(&config, &self.setup)?;
        self.dispatcher.clear();
        for id in world.bots.ids() {
            self.dispatcher.on_bot_idle(id);
        }
        self.clock       = SimClock::new(config.simulation.dt_secs);
        self.stats       = Statistics::new(world.bots.len(), world.pods.len(), world.stations.len());
        self.generator   = OrderGenerator::new(&config);
        self.world       = world;
        self.config      = config;
        self.events.clear();
        self.last_events.clear();
        debug!(seed = self.config.simulation.seed, "simulation reset");
        Ok(())
    }

    /// [`reset`](Self::reset) with the current config and a new seed.
    pub fn reset_with_seed(&mut self, seed: u64) -> SimResult<()> {
        let mut config = self.config.clone();
        config.simulation.seed = seed;
        self.reset(config)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// A copy of the whole world state.  Does not change anything.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self.clock.current_tick, &self.world)
    }

    /// Events produced by the most recent tick.
    pub fn last_events(&self) -> &[SimEvent] {
        &self.last_events
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the clock by one tick and update the whole world once.
    ///
    /// Blocked moves, missing routes, and rejected bundles are normal
    /// outcomes recorded as events.  An error means the world has become
    /// inconsistent and the run should stop.
    pub fn tick(&mut self) -> SimResult<TickMetrics> {
        let now = self.clock.advance();

        // ── Arrivals ──────────────────────────────────────────────────────
        if let Some(items) = self.generator.next_order(&self.world.pods) {
            self.create_order(items)?;
        }
        if let Some(bundle) = self.generator.next_bundle()
            && self.world.has_station(StationKind::Input)
        {
            self.receive_bundle(bundle.item, bundle.qty)?;
        }

        // ── Dispatch ──────────────────────────────────────────────────────
        let dispatches = self.dispatcher.tick(&self.world.view(now, &self.router));
        for d in dispatches {
            self.commit(d)?;
        }

        // ── Bots, ascending id ────────────────────────────────────────────
        for i in 0..self.world.bots.len() {
            self.update_bot(BotId::from_index(i), now)?;
        }

        // ── Stations, ascending id ────────────────────────────────────────
        for i in 0..self.world.stations.len() {
            let sid = StationId::from_index(i);
            if let Some(bot) = self.world.stations[sid].tick() {
                self.finish_processing(sid, bot, now)?;
            }
        }

        // ── Statistics ────────────────────────────────────────────────────
        let metrics = self.stats.observe(
            now,
            &self.world,
            self.dispatcher.pending_order_count(),
            &self.events,
        );
        let warmup = self.config.simulation.warmup_ticks;
        if warmup > 0 && now.0 == warmup {
            debug!(tick = %now, "warm-up over; statistics reset");
            self.stats.reset(now);
        }
        self.last_events = std::mem::take(&mut self.events);
        Ok(metrics)
    }

    /// Hand a dispatched task to its bot and mark the pod and order.
    fn commit(&mut self, Dispatch { task, path }: Dispatch) -> SimResult<()> {
        let bot = task.bot;
        let pod = task.kind.pod();
        if let TaskKind::FetchPod { order, pod, station } = task.kind {
            self.world.orders[order].assign(pod, station)?;
        }
        self.world.pods[pod].claimed_by = Some(bot);
        self.events.push(SimEvent::TaskAssigned { bot, task: task.id, pod });
        self.world.bots[bot].assign(task, path.steps().iter().copied())?;
        Ok(())
    }

    // ── Bot update ────────────────────────────────────────────────────────

    fn update_bot(&mut self, id: BotId, now: Tick) -> SimResult<()> {
        match self.world.bots[id].state {
            BotState::Idle | BotState::Docking => Ok(()),
            BotState::MovingToPickup | BotState::MovingToStation | BotState::MovingToStorage => {
                self.step_moving(id, now)
            }
            BotState::PickingUp => {
                let bot = &mut self.world.bots[id];
                bot.timer = bot.timer.saturating_sub(1);
                if bot.timer == 0 {
                    self.finish_pickup(id)?;
                }
                Ok(())
            }
            BotState::Undocking => {
                self.step_undocking(id, now);
                Ok(())
            }
        }
    }

    /// One tick of route following: plan if needed, then try to enter the
    /// next waypoint.
    fn step_moving(&mut self, id: BotId, now: Tick) -> SimResult<()> {
        let bot = &self.world.bots[id];
        let Some(target) = bot.target() else {
            warn!(bot = %id, state = %bot.state, "moving without a task; going idle");
            self.world.bots[id].finish_task();
            self.dispatcher.on_bot_idle(id);
            return Ok(());
        };
        if bot.position == target && bot.route.is_empty() {
            return self.arrive(id, now);
        }
        if bot.route.is_empty() && !self.plan_route(id, target) {
            return Ok(());
        }

        let bot = &mut self.world.bots[id];
        if !bot.accrue_hop_credit() {
            return Ok(());
        }
        let Some(next) = bot.next_hop() else { return Ok(()) };
        let from = bot.position;
        let station = match bot.state {
            BotState::MovingToStation => bot.task.as_ref().and_then(|t| t.kind.station()),
            _ => None,
        };
        if let Some(sid) = station
            && !self.station_admits(id, sid, from, next)
        {
            return Ok(());
        }

        match self.world.network.reserve(next, id) {
            Ok(()) => {
                self.world.network.release(from, id);
                let bot = &mut self.world.bots[id];
                bot.complete_hop();
                let distance = self.world.network.link_length_between(from, next).unwrap_or(0.0);
                self.events.push(SimEvent::Moved { bot: id, from, to: next, distance });
                if bot.position == target && bot.route.is_empty() {
                    return self.arrive(id, now);
                }
            }
            Err(SpatialError::AlreadyReserved { holder, .. }) => {
                let bot = &mut self.world.bots[id];
                bot.blocked_ticks += 1;
                let waited = bot.blocked_ticks;
                trace!(bot = %id, at = %next, %holder, waited, "waiting on reservation");
                self.events.push(SimEvent::Blocked { bot: id, at: next, holder });

                let replan_after = self.config.simulation.replan_after_ticks;
                if replan_after > 0 && waited >= replan_after {
                    self.replan(id, target);
                }
            }
            Err(e) => {
                warn!(bot = %id, error = %e, "route step invalid; replanning");
                self.world.bots[id].route.clear();
            }
        }
        Ok(())
    }

    /// Queue discipline on the way into station `sid`.
    ///
    /// A bot joins the queue once its next hop is the station itself, and
    /// enters only as the undocked head.  While the queue is not empty, no
    /// bot bound for the station may take the last free cell next to it, so
    /// the docked bot always has a way out.
    fn station_admits(&mut self, id: BotId, sid: StationId, from: WaypointId, next: WaypointId) -> bool {
        let station_wp = self.world.stations[sid].waypoint;
        if next == station_wp {
            let station = &mut self.world.stations[sid];
            if station.enqueue(id) {
                trace!(bot = %id, station = %sid, place = station.queue.len(), "queued");
                self.events.push(SimEvent::Queued { bot: id, station: sid });
            }
            return station.may_enter(id);
        }
        if self.world.stations[sid].is_idle() {
            return true;
        }
        let net = &self.world.network;
        let touches_station = net.neighbors(station_wp).any(|n| n == next);
        if !touches_station {
            return true;
        }
        let exit_left = net
            .neighbors(station_wp)
            .any(|n| n != next && (n == from || net.is_free(n)));
        if !exit_left {
            trace!(bot = %id, station = %sid, "holding back to keep the station exit free");
        }
        exit_left
    }

    /// Route the bot from where it stands to `goal` around every other bot.
    /// Returns `false` (and records the miss) if there is no such route.
    fn plan_route(&mut self, id: BotId, goal: WaypointId) -> bool {
        match self.find_route(id, goal) {
            Some(path) => {
                self.world.bots[id].set_route(path.steps().iter().copied());
                true
            }
            None => {
                self.no_path(id, goal);
                false
            }
        }
    }

    /// Recompute a blocked bot's route.  Keeps the old one if nothing better
    /// exists.
    fn replan(&mut self, id: BotId, goal: WaypointId) {
        match self.find_route(id, goal) {
            Some(path) => {
                let bot = &mut self.world.bots[id];
                if !bot.route.iter().eq(path.steps()) {
                    debug!(bot = %id, %goal, hops = path.hops(), "rerouted");
                    self.events.push(SimEvent::Rerouted { bot: id });
                }
                bot.set_route(path.steps().iter().copied());
            }
            None => {
                self.world.bots[id].blocked_ticks = 0;
                self.no_path(id, goal);
            }
        }
    }

    fn find_route(&self, id: BotId, goal: WaypointId) -> Option<Path> {
        let blocked: HashSet<WaypointId> = self
            .world
            .network
            .reservations()
            .filter(|&(_, holder)| holder != id)
            .map(|(wp, _)| wp)
            .collect();
        let from = self.world.bots[id].position;
        self.router.find_path(&self.world.network, from, goal, &blocked).ok()
    }

    fn no_path(&mut self, id: BotId, goal: WaypointId) {
        trace!(bot = %id, %goal, "no route around current reservations");
        self.events.push(SimEvent::NoPath { bot: id, goal });
    }

    /// The bot reached the target of its current leg.
    fn arrive(&mut self, id: BotId, now: Tick) -> SimResult<()> {
        let pickup_ticks = self.config.simulation.pickup_ticks;
        let bot = &mut self.world.bots[id];
        match bot.state {
            BotState::MovingToPickup => {
                bot.state = BotState::PickingUp;
                bot.timer = pickup_ticks;
                if pickup_ticks == 0 {
                    self.finish_pickup(id)?;
                }
            }
            BotState::MovingToStation => {
                let Some(station) = bot.task.as_ref().and_then(|t| t.kind.station()) else {
                    return Ok(());
                };
                bot.state = BotState::Docking;
                let s = &mut self.world.stations[station];
                s.enqueue(id);
                s.dock(id)?;
                self.events.push(SimEvent::Docked { bot: id, station });
                trace!(bot = %id, %station, tick = %now, "docked");
            }
            BotState::MovingToStorage => {
                let slot = bot.position;
                let Some(pod) = bot.unload() else {
                    bot.finish_task();
                    self.dispatcher.on_bot_idle(id);
                    return Ok(());
                };
                bot.finish_task();
                self.world.store.place(slot, pod)?;
                self.world.pods[pod].location = PodLocation::Stored(slot);
                self.events.push(SimEvent::PodReturned { bot: id, pod, slot });
                debug!(bot = %id, %pod, %slot, "pod returned");
                self.dispatcher.on_bot_idle(id);
            }
            _ => {}
        }
        Ok(())
    }

    /// Lift the task's pod off its slot and head for the station.
    fn finish_pickup(&mut self, id: BotId) -> SimResult<()> {
        let bot = &self.world.bots[id];
        let slot = bot.position;
        let Some((pod, station, order)) = bot
            .task
            .as_ref()
            .and_then(|t| Some((t.kind.pod(), t.kind.station()?, t.kind.order())))
        else {
            return Ok(());
        };

        if self.world.store.take(slot) != Some(pod) {
            return Err(SimError::PodMissing { pod, slot });
        }
        let p = &mut self.world.pods[pod];
        p.location = PodLocation::Carried(id);
        p.claimed_by = None;
        if let Some(order) = order {
            self.world.orders[order].start_fulfillment()?;
        }

        let target = self.world.stations[station].waypoint;
        let bot = &mut self.world.bots[id];
        bot.load(pod)?;
        bot.state = BotState::MovingToStation;
        bot.route.clear();
        if let Some(task) = bot.task.as_mut() {
            task.target = target;
        }
        self.events.push(SimEvent::PodPickedUp { bot: id, pod });
        debug!(bot = %id, %pod, %station, "pod picked up");
        Ok(())
    }

    /// Ask for a return slot if the bot has none yet, then leave the station
    /// once a route exists.
    fn step_undocking(&mut self, id: BotId, now: Tick) {
        if self.world.bots[id].task.is_none() {
            self.request_return(id, now);
        }
        let Some(target) = self.world.bots[id].target() else { return };
        if self.plan_route(id, target) {
            self.world.bots[id].state = BotState::MovingToStorage;
        }
    }

    /// Issue a `ReturnPod` task for the bot's pod and claim its slot.
    fn request_return(&mut self, id: BotId, now: Tick) {
        let task: Option<Task> = self
            .dispatcher
            .issue_return(&self.world.bots[id], &self.world.view(now, &self.router));
        let Some(task) = task else {
            trace!(bot = %id, "no free storage slot reachable; will retry");
            return;
        };
        if let Err(e) = self.world.store.claim(task.target) {
            warn!(bot = %id, error = %e, "return slot could not be claimed");
            return;
        }
        self.world.bots[id].task = Some(task);
    }

    // ── Station processing ────────────────────────────────────────────────

    /// The station finished with `bot`: pick the order or store the bundle,
    /// then send the bot back toward storage.
    fn finish_processing(&mut self, sid: StationId, bot: BotId, now: Tick) -> SimResult<()> {
        let task = self.world.bots[bot].task.take();
        match task.map(|t| t.kind) {
            Some(TaskKind::FetchPod { order, pod, .. }) => {
                let items = self.world.orders[order].items.clone();
                match self.world.pods[pod].remove_items(&items) {
                    Ok(units) => {
                        let o = &mut self.world.orders[order];
                        o.complete(now)?;
                        let latency = o.latency().unwrap_or(0);
                        self.events.push(SimEvent::OrderCompleted { order, pod, station: sid, items: units, latency });
                        debug!(%order, %pod, station = %sid, latency, "order completed");
                    }
                    Err(e) => warn!(%order, %pod, error = %e, "order could not be picked"),
                }
            }
            Some(TaskKind::Replenish { bundle, pod, .. }) => {
                match self.world.pods[pod].add_items(&bundle.item, bundle.qty) {
                    Ok(()) => {
                        self.events.push(SimEvent::BundleStored { pod, station: sid, qty: bundle.qty });
                        debug!(%pod, station = %sid, item = %bundle.item, qty = bundle.qty, "bundle stored");
                    }
                    Err(e @ EntityError::CapacityExceeded { .. }) => {
                        warn!(%pod, station = %sid, error = %e, "bundle rejected; requeued");
                        self.events.push(SimEvent::CapacityRejected { pod, station: sid, qty: bundle.qty });
                        self.dispatcher.requeue_bundle(bundle);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Some(TaskKind::ReturnPod { .. }) | None => {}
        }

        self.world.bots[bot].state = BotState::Undocking;
        self.request_return(bot, now);
        Ok(())
    }
}

impl<R: Pathfinder, P: DispatchPolicy> std::fmt::Debug for Sim<R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sim")
            .field("tick", &self.clock.current_tick)
            .field("bots", &self.world.bots.len())
            .field("pods", &self.world.pods.len())
            .field("orders", &self.world.orders.len())
            .finish_non_exhaustive()
    }
}

