//! Mobile robots.

use std::collections::VecDeque;

use rmfs_core::{BotId, PodId, WaypointId};

use crate::{EntityError, EntityResult, Task};

/// Hop credit at or above this counts as a full hop.  Absorbs the rounding
/// of repeated fractional speeds such as `0.1`.
const HOP_EPSILON: f32 = 1e-4;

/// Bot lifecycle.  There is no terminal state; a bot cycles through these for
/// the whole run.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BotState {
    #[default]
    Idle,
    MovingToPickup,
    PickingUp,
    MovingToStation,
    Docking,
    Undocking,
    MovingToStorage,
}

impl BotState {
    /// States in which the bot follows a route.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(
            self,
            BotState::MovingToPickup | BotState::MovingToStation | BotState::MovingToStorage
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BotState::Idle            => "idle",
            BotState::MovingToPickup  => "moving_to_pickup",
            BotState::PickingUp       => "picking_up",
            BotState::MovingToStation => "moving_to_station",
            BotState::Docking         => "docking",
            BotState::Undocking       => "undocking",
            BotState::MovingToStorage => "moving_to_storage",
        }
    }
}

impl std::fmt::Display for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A robot and everything it is currently doing.
///
/// The bot's own waypoint reservation lives in the network, not here; the
/// engine keeps `position` and the reservation in step.
#[derive(Clone, Debug, PartialEq)]
pub struct Bot {
    pub id:       BotId,
    pub position: WaypointId,
    pub state:    BotState,
    /// Hops per tick, capped at one.
    pub speed:    f32,
    /// Pods the bot can lift at once.
    pub capacity: u32,
    pub carried_pod: Option<PodId>,
    /// Waypoints still to enter, front first.  Never contains `position`.
    pub route: VecDeque<WaypointId>,
    pub task:  Option<Task>,
    /// Fraction of the next hop already earned.
    pub hop_credit: f32,
    /// Countdown for timed states (pick-up).
    pub timer: u32,
    /// Consecutive ticks the next hop was refused.
    pub blocked_ticks: u32,
    /// Taken out of the dispatchable pool.
    pub parked: bool,
}

impl Bot {
    pub fn new(id: BotId, position: WaypointId, speed: f32, capacity: u32) -> Self {
        Self {
            id,
            position,
            state: BotState::Idle,
            speed,
            capacity,
            carried_pod: None,
            route: VecDeque::new(),
            task: None,
            hop_credit: 0.0,
            timer: 0,
            blocked_ticks: 0,
            parked: false,
        }
    }

    /// Idle, without a task, and not parked.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.state == BotState::Idle && self.task.is_none() && !self.parked
    }

    /// Waypoint of the current leg, if the bot has a task.
    pub fn target(&self) -> Option<WaypointId> {
        self.task.as_ref().map(|t| t.target)
    }

    /// Take on `task` and start driving along `route`.
    ///
    /// # Errors
    ///
    /// [`EntityError::BotBusy`] if the bot already holds a task; a bot never
    /// holds two.
    pub fn assign(&mut self, task: Task, route: impl IntoIterator<Item = WaypointId>) -> EntityResult<()> {
        if self.task.is_some() {
            return Err(EntityError::BotBusy(self.id));
        }
        self.task = Some(task);
        self.state = BotState::MovingToPickup;
        self.set_route(route);
        Ok(())
    }

    /// Replace the remaining route.
    pub fn set_route(&mut self, route: impl IntoIterator<Item = WaypointId>) {
        self.route.clear();
        self.route.extend(route);
        self.blocked_ticks = 0;
    }

    /// The waypoint the bot wants to enter next.
    #[inline]
    pub fn next_hop(&self) -> Option<WaypointId> {
        self.route.front().copied()
    }

    /// Earn this tick's share of a hop and report whether a full hop is
    /// available.  Credit never grows past one hop, so a bot that waits does
    /// not bank extra moves.
    pub fn accrue_hop_credit(&mut self) -> bool {
        if self.hop_credit < 1.0 - HOP_EPSILON {
            self.hop_credit += self.speed.min(1.0);
        }
        self.hop_credit >= 1.0 - HOP_EPSILON
    }

    /// Record a completed move onto the front of the route.
    pub fn complete_hop(&mut self) -> Option<WaypointId> {
        let to = self.route.pop_front()?;
        self.position = to;
        self.hop_credit = (self.hop_credit - 1.0).max(0.0);
        self.blocked_ticks = 0;
        Some(to)
    }

    /// Lift `pod`.
    pub fn load(&mut self, pod: PodId) -> EntityResult<()> {
        if self.carried_pod.is_some() || self.capacity == 0 {
            return Err(EntityError::BotLoaded(self.id));
        }
        self.carried_pod = Some(pod);
        Ok(())
    }

    pub fn unload(&mut self) -> Option<PodId> {
        self.carried_pod.take()
    }

    /// Drop the finished task and go idle.
    pub fn finish_task(&mut self) -> Option<Task> {
        self.state = BotState::Idle;
        self.route.clear();
        self.timer = 0;
        self.blocked_ticks = 0;
        self.task.take()
    }
}
