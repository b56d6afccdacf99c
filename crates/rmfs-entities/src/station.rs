//! Input and output stations.

use std::collections::VecDeque;

use rmfs_core::{BotId, StationId, WaypointId};

use crate::{EntityError, EntityResult};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StationKind {
    /// Bundles are loaded into pods here.
    Input,
    /// Order items are picked from pods here.
    Output,
}

impl StationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StationKind::Input  => "input",
            StationKind::Output => "output",
        }
    }
}

/// A fixed processing point with a FIFO of bots.
///
/// Bots join the queue when they reach the station's approach, in arrival
/// order.  Only the head may enter the station waypoint.  Processing starts
/// once the head has docked and takes `processing_ticks` station ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    pub id:                   StationId,
    pub kind:                 StationKind,
    pub waypoint:             WaypointId,
    /// Waiting bots, head first.  The head may already be docked.
    pub queue:                VecDeque<BotId>,
    /// `true` while the head stands on the station waypoint.
    pub head_docked:          bool,
    /// Ticks left on the docked head.
    pub processing_remaining: u32,
    pub processing_ticks:     u32,
}

impl Station {
    pub fn new(id: StationId, kind: StationKind, waypoint: WaypointId, processing_ticks: u32) -> Self {
        Self {
            id,
            kind,
            waypoint,
            queue: VecDeque::new(),
            head_docked: false,
            processing_remaining: 0,
            processing_ticks,
        }
    }

    /// Put `bot` at the back of the queue.  Returns `false` if it is
    /// already queued.
    pub fn enqueue(&mut self, bot: BotId) -> bool {
        if self.queue.contains(&bot) {
            return false;
        }
        self.queue.push_back(bot);
        true
    }

    pub fn head(&self) -> Option<BotId> {
        self.queue.front().copied()
    }

    pub fn is_queued(&self, bot: BotId) -> bool {
        self.queue.contains(&bot)
    }

    /// `true` if `bot` is at the head and nobody is docked yet.
    pub fn may_enter(&self, bot: BotId) -> bool {
        !self.head_docked && self.head() == Some(bot)
    }

    /// The head has reached the station waypoint; start processing it.
    ///
    /// # Errors
    ///
    /// [`EntityError::NotAtHead`] if `bot` is not the undocked head.
    pub fn dock(&mut self, bot: BotId) -> EntityResult<()> {
        if !self.may_enter(bot) {
            return Err(EntityError::NotAtHead { station: self.id, bot });
        }
        self.head_docked = true;
        self.processing_remaining = self.processing_ticks;
        Ok(())
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Advance processing by one tick.  Returns the docked bot whose
    /// processing finished; it leaves the queue and the next bot becomes
    /// head.
    pub fn tick(&mut self) -> Option<BotId> {
        if !self.head_docked {
            return None;
        }
        self.processing_remaining = self.processing_remaining.saturating_sub(1);
        if self.processing_remaining > 0 {
            return None;
        }
        self.head_docked = false;
        self.queue.pop_front()
    }
}
