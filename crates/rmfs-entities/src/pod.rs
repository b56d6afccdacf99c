//! Storage pods and the storage-slot table.
//!
//! # Capacity invariant
//!
//! The sum of a pod's inventory never exceeds its capacity.  Every mutation
//! goes through [`Pod::add_items`] or [`Pod::remove_items`], which check
//! first and mutate only on success.

use std::collections::{BTreeMap, BTreeSet};

use rmfs_core::{BotId, ItemCounts, PodId, WaypointId, total_quantity};

use crate::{EntityError, EntityResult};

// ── Pod ───────────────────────────────────────────────────────────────────────

/// Where a pod is.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PodLocation {
    /// Resting on a storage slot.
    Stored(WaypointId),
    /// Lifted by a bot; its position is the bot's.
    Carried(BotId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pod {
    pub id:        PodId,
    pub location:  PodLocation,
    pub inventory: ItemCounts,
    /// Maximum total units.
    pub capacity:  u32,
    /// Bot holding a task on this pod that has not lifted it yet.  A claimed
    /// pod is never offered to the dispatcher again.
    pub claimed_by: Option<BotId>,
    /// Units removed at output stations over the pod's lifetime.
    pub items_handled: u64,
    /// Bundles loaded at input stations over the pod's lifetime.
    pub bundles_handled: u64,
}

impl Pod {
    /// A pod resting on `slot` with the given contents.
    ///
    /// # Errors
    ///
    /// [`EntityError::CapacityExceeded`] if `inventory` is larger than
    /// `capacity`.
    pub fn new(id: PodId, slot: WaypointId, capacity: u32, inventory: ItemCounts) -> EntityResult<Self> {
        let total = total_quantity(&inventory);
        if total > capacity {
            return Err(EntityError::CapacityExceeded { pod: id, requested: total, free: capacity });
        }
        let mut inventory = inventory;
        inventory.retain(|_, q| *q > 0);
        Ok(Self {
            id,
            location: PodLocation::Stored(slot),
            inventory,
            capacity,
            claimed_by: None,
            items_handled: 0,
            bundles_handled: 0,
        })
    }

    #[inline]
    pub fn total(&self) -> u32 {
        total_quantity(&self.inventory)
    }

    #[inline]
    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.total())
    }

    pub fn quantity(&self, item: &str) -> u32 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    /// `true` if every requested quantity is in stock.
    pub fn can_satisfy(&self, request: &ItemCounts) -> bool {
        request.iter().all(|(item, &q)| self.quantity(item) >= q)
    }

    /// The slot the pod rests on, if it is not being carried.
    pub fn stored_at(&self) -> Option<WaypointId> {
        match self.location {
            PodLocation::Stored(slot) => Some(slot),
            PodLocation::Carried(_)   => None,
        }
    }

    pub fn carried_by(&self) -> Option<BotId> {
        match self.location {
            PodLocation::Carried(bot) => Some(bot),
            PodLocation::Stored(_)    => None,
        }
    }

    /// Stored and unclaimed.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.stored_at().is_some() && self.claimed_by.is_none()
    }

    /// Load `qty` units of `item`.
    pub fn add_items(&mut self, item: &str, qty: u32) -> EntityResult<()> {
        let free = self.free_capacity();
        if qty > free {
            return Err(EntityError::CapacityExceeded { pod: self.id, requested: qty, free });
        }
        if qty > 0 {
            *self.inventory.entry(item.to_owned()).or_insert(0) += qty;
            self.bundles_handled += 1;
        }
        Ok(())
    }

    /// Remove every quantity in `request` at once and return the number of
    /// units removed.  Nothing is removed unless all of it is in stock.
    pub fn remove_items(&mut self, request: &ItemCounts) -> EntityResult<u32> {
        for (item, &requested) in request {
            let available = self.quantity(item);
            if available < requested {
                return Err(EntityError::InsufficientStock {
                    pod: self.id,
                    item: item.clone(),
                    requested,
                    available,
                });
            }
        }
        for (item, &q) in request {
            if let Some(held) = self.inventory.get_mut(item) {
                *held -= q;
                if *held == 0 {
                    self.inventory.remove(item);
                }
            }
        }
        let removed = total_quantity(request);
        self.items_handled += u64::from(removed);
        Ok(removed)
    }
}

// ── PodStore ──────────────────────────────────────────────────────────────────

/// Occupancy of every storage slot, plus the slots claimed by bots on their
/// way to put a pod down.
///
/// A slot is *free* when no pod rests on it and no returning bot has claimed
/// it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PodStore {
    slots:   BTreeMap<WaypointId, Option<PodId>>,
    claimed: BTreeSet<WaypointId>,
}

impl PodStore {
    /// An empty store over `slots`.
    pub fn new(slots: &[WaypointId]) -> Self {
        Self {
            slots:   slots.iter().map(|&s| (s, None)).collect(),
            claimed: BTreeSet::new(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_slot(&self, slot: WaypointId) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn pod_at(&self, slot: WaypointId) -> Option<PodId> {
        self.slots.get(&slot).copied().flatten()
    }

    pub fn is_claimed(&self, slot: WaypointId) -> bool {
        self.claimed.contains(&slot)
    }

    pub fn is_free(&self, slot: WaypointId) -> bool {
        matches!(self.slots.get(&slot), Some(None)) && !self.claimed.contains(&slot)
    }

    /// Free slots in ascending id order.
    pub fn free_slots(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.slots
            .iter()
            .filter(|&(s, p)| p.is_none() && !self.claimed.contains(s))
            .map(|(&s, _)| s)
    }

    pub fn stored_count(&self) -> usize {
        self.slots.values().filter(|p| p.is_some()).count()
    }

    /// Reserve a free slot for a returning pod.
    pub fn claim(&mut self, slot: WaypointId) -> EntityResult<()> {
        if !self.is_slot(slot) {
            return Err(EntityError::NotASlot(slot));
        }
        if !self.is_free(slot) {
            return Err(EntityError::SlotOccupied(slot));
        }
        self.claimed.insert(slot);
        Ok(())
    }

    /// Put `pod` down on `slot`, consuming any claim on it.
    pub fn place(&mut self, slot: WaypointId, pod: PodId) -> EntityResult<()> {
        match self.slots.get_mut(&slot) {
            None => Err(EntityError::NotASlot(slot)),
            Some(Some(_)) => Err(EntityError::SlotOccupied(slot)),
            Some(entry) => {
                *entry = Some(pod);
                self.claimed.remove(&slot);
                Ok(())
            }
        }
    }

    /// Lift whatever pod rests on `slot`.
    pub fn take(&mut self, slot: WaypointId) -> Option<PodId> {
        self.slots.get_mut(&slot).and_then(Option::take)
    }
}
