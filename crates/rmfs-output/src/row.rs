//! Plain data row types written by output backends.
//!
//! Ids are flattened to their raw `u32`; an absent id is [`NONE_ID`].

use rmfs_core::Tick;
use rmfs_sim::{BotSnapshot, PodSnapshot, Statistics, TickMetrics};

/// Raw value written for "no bot" / "no pod".
pub const NONE_ID: u32 = u32::MAX;

/// One bot at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotSnapshotRow {
    pub bot_id:      u32,
    pub tick:        u64,
    pub waypoint:    u32,
    pub x:           f32,
    pub y:           f32,
    pub state:       &'static str,
    /// [`NONE_ID`] when empty-handed.
    pub carried_pod: u32,
    pub parked:      bool,
}

impl BotSnapshotRow {
    pub fn from_snapshot(tick: Tick, b: &BotSnapshot) -> Self {
        Self {
            bot_id:      b.id.0,
            tick:        tick.0,
            waypoint:    b.waypoint.0,
            x:           b.position.x,
            y:           b.position.y,
            state:       b.state.as_str(),
            carried_pod: b.carried_pod.map_or(NONE_ID, |p| p.0),
            parked:      b.parked,
        }
    }
}

/// One pod at a snapshot tick.  Contents are summarised as a unit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PodSnapshotRow {
    pub pod_id:     u32,
    pub tick:       u64,
    pub waypoint:   u32,
    /// [`NONE_ID`] when resting on a slot.
    pub carried_by: u32,
    pub items:      u32,
    pub kinds:      u32,
    pub capacity:   u32,
}

impl PodSnapshotRow {
    pub fn from_snapshot(tick: Tick, p: &PodSnapshot) -> Self {
        Self {
            pod_id:     p.id.0,
            tick:       tick.0,
            waypoint:   p.waypoint.0,
            carried_by: p.carried_by.map_or(NONE_ID, |b| b.0),
            items:      p.inventory.values().sum(),
            kinds:      p.inventory.len() as u32,
            capacity:   p.capacity,
        }
    }
}

/// One row of the per-tick series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMetricsRow {
    pub tick:               u64,
    pub sim_time_secs:      f64,
    pub busy_bots:          u32,
    pub idle_bots:          u32,
    pub pending_orders:     u32,
    pub open_orders:        u32,
    pub orders_completed:   u64,
    pub items_picked:       u64,
    pub blocked_waits:      u32,
    pub reserved_waypoints: u32,
}

impl TickMetricsRow {
    pub fn from_metrics(m: &TickMetrics, dt_secs: f64) -> Self {
        Self {
            tick:               m.tick.0,
            sim_time_secs:      m.tick.0 as f64 * dt_secs,
            busy_bots:          m.busy_bots,
            idle_bots:          m.idle_bots,
            pending_orders:     m.pending_orders,
            open_orders:        m.open_orders,
            orders_completed:   m.orders_completed,
            items_picked:       m.items_picked,
            blocked_waits:      m.blocked_waits,
            reserved_waypoints: m.reserved_waypoints,
        }
    }
}

/// Whole-run totals, written once at the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummaryRow {
    /// First tick counted (end of warm-up).
    pub since:               u64,
    pub final_tick:          u64,
    pub ticks_observed:      u64,
    pub orders_created:      u64,
    pub orders_completed:    u64,
    pub items_picked:        u64,
    pub bundles_received:    u64,
    pub bundles_stored:      u64,
    pub capacity_rejections: u64,
    pub blocked_waits:       u64,
    pub reroutes:            u64,
    pub no_path_events:      u64,
    pub distance_travelled:  f64,
    pub utilization:         f64,
    pub throughput:          f64,
    /// `None` when no order completed.
    pub mean_latency:        Option<f64>,
}

impl RunSummaryRow {
    pub fn from_stats(final_tick: Tick, s: &Statistics) -> Self {
        Self {
            since:               s.since.0,
            final_tick:          final_tick.0,
            ticks_observed:      s.ticks_observed,
            orders_created:      s.orders_created,
            orders_completed:    s.orders_completed,
            items_picked:        s.items_picked,
            bundles_received:    s.bundles_received,
            bundles_stored:      s.bundles_stored,
            capacity_rejections: s.capacity_rejections,
            blocked_waits:       s.blocked_waits,
            reroutes:            s.reroutes,
            no_path_events:      s.no_path_events,
            distance_travelled:  s.distance_travelled,
            utilization:         s.utilization(),
            throughput:          s.throughput(),
            mean_latency:        s.mean_latency(),
        }
    }
}
