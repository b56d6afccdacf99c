//! Item quantities.
//!
//! Pod inventories and order requests are both "item type → quantity" maps.
//! A `BTreeMap` keeps iteration order stable, which keeps snapshots and
//! statistics bit-for-bit reproducible.

use std::collections::BTreeMap;

/// Item type name → quantity.  Zero entries are never stored.
pub type ItemCounts = BTreeMap<String, u32>;

/// Sum of all quantities in `items`.
pub fn total_quantity(items: &ItemCounts) -> u32 {
    items.values().sum()
}
