//! Run statistics: cumulative counters plus a per-tick time series.

use rmfs_core::{PodId, Tick};
use rmfs_entities::BotState;

use crate::{SimEvent, World};

/// One row of the per-tick time series.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickMetrics {
    pub tick:               Tick,
    pub busy_bots:          u32,
    pub idle_bots:          u32,
    /// Orders still waiting for a pod and bot.
    pub pending_orders:     u32,
    /// Orders created but not completed, matched or not.
    pub open_orders:        u32,
    /// Cumulative since the last reset.
    pub orders_completed:   u64,
    pub items_picked:       u64,
    /// Bots that waited on a reserved waypoint this tick.
    pub blocked_waits:      u32,
    pub reserved_waypoints: u32,
}

/// Per-station tallies, indexed like the station arena.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationTally {
    pub items_picked:     u64,
    pub orders_completed: u64,
    pub bundles_stored:   u64,
    pub items_stored:     u64,
}

/// Counters accumulated by [`Statistics::observe`] once per tick.
///
/// Warm-up is handled by [`reset`](Self::reset): every counter, per-bot and
/// per-station vector, and the series start over from that tick.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Tick of the last reset.
    pub since:               Tick,
    pub ticks_observed:      u64,
    pub orders_created:      u64,
    pub orders_completed:    u64,
    pub items_picked:        u64,
    pub bundles_received:    u64,
    pub bundles_stored:      u64,
    pub items_stored:        u64,
    pub capacity_rejections: u64,
    pub no_path_events:      u64,
    pub blocked_waits:       u64,
    pub reroutes:            u64,
    /// Summed link length of every completed hop.
    pub distance_travelled:  f64,
    pub bot_busy_ticks:      Vec<u64>,
    pub bot_idle_ticks:      Vec<u64>,
    /// Completion minus creation tick, in completion order.
    pub order_latencies:     Vec<u64>,
    pub stations:            Vec<StationTally>,
    /// Units picked from plus units stored into each pod, indexed by pod id.
    pub pod_items_handled:   Vec<u64>,
    pub series:              Vec<TickMetrics>,
}

impl Statistics {
    pub fn new(bot_count: usize, pod_count: usize, station_count: usize) -> Self {
        Self {
            bot_busy_ticks: vec![0; bot_count],
            bot_idle_ticks: vec![0; bot_count],
            stations: vec![StationTally::default(); station_count],
            pod_items_handled: vec![0; pod_count],
            ..Self::default()
        }
    }

    /// Start over at `now`, keeping the bot, pod and station dimensions.
    pub fn reset(&mut self, now: Tick) {
        let dims = Self::new(self.bot_busy_ticks.len(), self.pod_items_handled.len(), self.stations.len());
        *self = Self { since: now, ..dims };
    }

    /// Fold one tick's events and the resulting world state into the
    /// counters, and append a row to the series.
    pub fn observe(
        &mut self,
        now:            Tick,
        world:          &World,
        pending_orders: usize,
        events:         &[SimEvent],
    ) -> TickMetrics {
        let mut blocked_now = 0u32;
        for e in events {
            match *e {
                SimEvent::OrderCreated { .. } => self.orders_created += 1,
                SimEvent::BundleReceived { .. } => self.bundles_received += 1,
                SimEvent::Moved { distance, .. } => self.distance_travelled += f64::from(distance),
                SimEvent::Blocked { .. } => {
                    self.blocked_waits += 1;
                    blocked_now += 1;
                }
                SimEvent::Rerouted { .. } => self.reroutes += 1,
                SimEvent::NoPath { .. } => self.no_path_events += 1,
                SimEvent::OrderCompleted { pod, station, items, latency, .. } => {
                    self.orders_completed += 1;
                    self.add_pod_items(pod, items);
                    self.items_picked += u64::from(items);
                    self.order_latencies.push(latency);
                    if let Some(t) = self.stations.get_mut(station.index()) {
                        t.orders_completed += 1;
                        t.items_picked += u64::from(items);
                    }
                }
                SimEvent::BundleStored { pod, station, qty } => {
                    self.bundles_stored += 1;
                    self.add_pod_items(pod, qty);
                    self.items_stored += u64::from(qty);
                    if let Some(t) = self.stations.get_mut(station.index()) {
                        t.bundles_stored += 1;
                        t.items_stored += u64::from(qty);
                    }
                }
                SimEvent::CapacityRejected { .. } => self.capacity_rejections += 1,
                SimEvent::TaskAssigned { .. }
                | SimEvent::PodPickedUp { .. }
                | SimEvent::Queued { .. }
                | SimEvent::Docked { .. }
                | SimEvent::PodReturned { .. } => {}
            }
        }

        let mut busy = 0u32;
        for (i, bot) in world.bots.values().enumerate() {
            let is_busy = bot.state != BotState::Idle;
            let slot = if is_busy { &mut self.bot_busy_ticks } else { &mut self.bot_idle_ticks };
            if let Some(n) = slot.get_mut(i) {
                *n += 1;
            }
            busy += u32::from(is_busy);
        }

        self.ticks_observed += 1;
        let metrics = TickMetrics {
            tick:               now,
            busy_bots:          busy,
            idle_bots:          world.bots.len() as u32 - busy,
            pending_orders:     pending_orders as u32,
            open_orders:        world.open_orders() as u32,
            orders_completed:   self.orders_completed,
            items_picked:       self.items_picked,
            blocked_waits:      blocked_now,
            reserved_waypoints: world.network.reserved_count() as u32,
        };
        self.series.push(metrics);
        metrics
    }

    fn add_pod_items(&mut self, pod: PodId, units: u32) {
        if let Some(n) = self.pod_items_handled.get_mut(pod.index()) {
            *n += u64::from(units);
        }
    }

    /// Fraction of observed bot-ticks spent busy, in `[0, 1]`.
    pub fn utilization(&self) -> f64 {
        let busy: u64 = self.bot_busy_ticks.iter().sum();
        let idle: u64 = self.bot_idle_ticks.iter().sum();
        if busy + idle == 0 {
            return 0.0;
        }
        busy as f64 / (busy + idle) as f64
    }

    /// Per-bot busy fraction, indexed by bot id.
    pub fn bot_utilization(&self) -> Vec<f64> {
        self.bot_busy_ticks
            .iter()
            .zip(&self.bot_idle_ticks)
            .map(|(&b, &i)| if b + i == 0 { 0.0 } else { b as f64 / (b + i) as f64 })
            .collect()
    }

    pub fn mean_latency(&self) -> Option<f64> {
        if self.order_latencies.is_empty() {
            return None;
        }
        let sum: u64 = self.order_latencies.iter().sum();
        Some(sum as f64 / self.order_latencies.len() as f64)
    }

    /// Orders completed per simulated tick since the last reset.
    pub fn throughput(&self) -> f64 {
        if self.ticks_observed == 0 {
            return 0.0;
        }
        self.orders_completed as f64 / self.ticks_observed as f64
    }
}
