//! Built-in random order and replenishment streams.

use rmfs_core::{ItemCounts, PodId, SimRng, WarehouseConfig};
use rmfs_entities::{Arena, Bundle, Pod};

/// Child-stream offsets under the master seed.
pub(crate) mod streams {
    pub const POD_SLOTS:    u64 = 1;
    pub const POD_CONTENTS: u64 = 2;
    pub const BOT_SPAWN:    u64 = 3;
    pub const ORDERS:       u64 = 4;
    pub const BUNDLES:      u64 = 5;
}

/// Most distinct item kinds in one generated order.
const MAX_ORDER_LINES: usize = 3;
/// Largest generated bundle.
const MAX_BUNDLE_QTY: u32 = 5;

/// Draws at most one order and one bundle per tick.
///
/// Orders are stock-aware: the generator picks a random pod that holds
/// anything and requests one unit each of 1..=3 of its item kinds, so every
/// generated order can be met by at least one pod at creation time.  Bundles
/// carry 1..=5 units of a random catalogue item.
pub struct OrderGenerator {
    orders:             SimRng,
    bundles:            SimRng,
    order_probability:  f64,
    bundle_probability: f64,
    item_kinds:         u32,
}

impl OrderGenerator {
    pub fn new(config: &WarehouseConfig) -> Self {
        let seed = config.simulation.seed;
        Self {
            orders:             SimRng::child(seed, streams::ORDERS),
            bundles:            SimRng::child(seed, streams::BUNDLES),
            order_probability:  config.simulation.order_probability,
            bundle_probability: config.simulation.bundle_probability,
            item_kinds:         config.pods.item_kinds,
        }
    }

    /// Maybe draw an order against the current pod contents.
    pub fn next_order(&mut self, pods: &Arena<PodId, Pod>) -> Option<ItemCounts> {
        if self.order_probability <= 0.0 || !self.orders.gen_bool(self.order_probability) {
            return None;
        }
        let stocked: Vec<&Pod> = pods.values().filter(|p| p.total() > 0).collect();
        if stocked.is_empty() {
            return None;
        }
        let pod = stocked[self.orders.gen_range(0..stocked.len())];
        let kinds: Vec<&String> = pod.inventory.keys().collect();
        let lines = self.orders.gen_range(1..=MAX_ORDER_LINES).min(kinds.len());
        Some(
            self.orders
                .choose_multiple(&kinds, lines)
                .into_iter()
                .map(|&item| (item.clone(), 1))
                .collect(),
        )
    }

    /// Maybe draw a bundle for the input side.
    pub fn next_bundle(&mut self) -> Option<Bundle> {
        if self.bundle_probability <= 0.0
            || self.item_kinds == 0
            || !self.bundles.gen_bool(self.bundle_probability)
        {
            return None;
        }
        let kind = self.bundles.gen_range(1..=self.item_kinds);
        let qty = self.bundles.gen_range(1..=MAX_BUNDLE_QTY);
        Some(Bundle::new(item_name(kind), qty))
    }
}

/// Catalogue name of item kind `k` (1-based).
pub fn item_name(k: u32) -> String {
    format!("item_{k}")
}
