//! Customer orders and their one-way status machine.

use std::fmt;

use rmfs_core::{ItemCounts, OrderId, PodId, StationId, Tick, total_quantity};

use crate::{EntityError, EntityResult};

/// Order lifecycle.  Every order walks these states in declaration order,
/// one step at a time, and never goes back.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderStatus {
    /// Waiting for a pod that can satisfy it and a bot to fetch that pod.
    #[default]
    Pending,
    /// A bot is on its way to the chosen pod.
    Assigned,
    /// The pod has been lifted and is travelling to the output station.
    InFulfillment,
    /// Items removed from the pod at the output station.
    Completed,
}

impl OrderStatus {
    /// The only status this one may move to.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending       => Some(OrderStatus::Assigned),
            OrderStatus::Assigned      => Some(OrderStatus::InFulfillment),
            OrderStatus::InFulfillment => Some(OrderStatus::Completed),
            OrderStatus::Completed     => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending       => "pending",
            OrderStatus::Assigned      => "assigned",
            OrderStatus::InFulfillment => "in_fulfillment",
            OrderStatus::Completed     => "completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for item quantities, fulfilled by a single pod.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id:        OrderId,
    pub items:     ItemCounts,
    pub status:    OrderStatus,
    pub created:   Tick,
    pub completed: Option<Tick>,
    /// Set on assignment.
    pub pod:       Option<PodId>,
    pub station:   Option<StationId>,
}

impl Order {
    pub fn new(id: OrderId, items: ItemCounts, created: Tick) -> Self {
        Self {
            id,
            items,
            status: OrderStatus::Pending,
            created,
            completed: None,
            pod: None,
            station: None,
        }
    }

    /// Total units requested.
    pub fn units(&self) -> u32 {
        total_quantity(&self.items)
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Ticks from creation to completion.
    pub fn latency(&self) -> Option<u64> {
        self.completed.map(|done| done.since(self.created))
    }

    /// Pending → Assigned.
    pub fn assign(&mut self, pod: PodId, station: StationId) -> EntityResult<()> {
        self.advance(OrderStatus::Assigned)?;
        self.pod = Some(pod);
        self.station = Some(station);
        Ok(())
    }

    /// Assigned → InFulfillment.
    pub fn start_fulfillment(&mut self) -> EntityResult<()> {
        self.advance(OrderStatus::InFulfillment)
    }

    /// InFulfillment → Completed.
    pub fn complete(&mut self, now: Tick) -> EntityResult<()> {
        self.advance(OrderStatus::Completed)?;
        self.completed = Some(now);
        Ok(())
    }

    fn advance(&mut self, to: OrderStatus) -> EntityResult<()> {
        if self.status.next() != Some(to) {
            return Err(EntityError::InvalidTransition { order: self.id, from: self.status, to });
        }
        self.status = to;
        Ok(())
    }
}
