//! Warehouse floor layouts.
//!
//! A [`WarehouseLayout`] is a [`WaypointNetwork`] plus the role-derived lists
//! the simulation needs at start-up: station waypoints and storage slots, all
//! in ascending id order.  Layouts come either from [`WarehouseLayout::generate`]
//! (the parametric grid described by `LayoutConfig`) or from any hand-built
//! network via [`WarehouseLayout::from_network`].

use rmfs_core::{LayoutConfig, StationConfig, WaypointId};

use crate::{SpatialError, SpatialResult, WaypointNetwork, WaypointNetworkBuilder, WaypointRole};

/// A network together with its station and storage waypoints.
#[derive(Clone)]
pub struct WarehouseLayout {
    pub network: WaypointNetwork,
    /// Input station waypoints; the i-th entry hosts input station i.
    pub input_stations: Vec<WaypointId>,
    /// Output station waypoints, in the same order convention.
    pub output_stations: Vec<WaypointId>,
    /// Every storage slot, ascending.
    pub storage_slots: Vec<WaypointId>,
}

impl WarehouseLayout {
    /// Generate the parametric grid.
    ///
    /// - Input stations are spread along row 0, output stations along the last
    ///   row, at columns `width / (count + 1) * (i + 1)`.
    /// - Storage slots fill `storage_rows` rows around the middle, keeping two
    ///   aisle columns at each side and every third column free.
    pub fn generate(layout: &LayoutConfig, stations: &StationConfig) -> Self {
        let w = layout.width;
        let h = layout.height;
        let mut b = WaypointNetworkBuilder::grid(w, h, layout.diagonal);
        let at = |x: u32, y: u32| WaypointId(y * w + x);

        for i in 0..stations.input_count {
            b.set_role(at(layout.station_column(i, stations.input_count), 0), WaypointRole::InputStation);
        }
        for i in 0..stations.output_count {
            b.set_role(
                at(layout.station_column(i, stations.output_count), h - 1),
                WaypointRole::OutputStation,
            );
        }
        for y in layout.storage_row_range() {
            for x in 0..w {
                if layout.is_storage_slot(x, y) {
                    b.set_role(at(x, y), WaypointRole::Storage);
                }
            }
        }
        Self::from_network(b.build())
    }

    /// Derive station and storage lists from the roles already set on
    /// `network`.
    pub fn from_network(network: WaypointNetwork) -> Self {
        Self {
            input_stations:  network.waypoints_with_role(WaypointRole::InputStation),
            output_stations: network.waypoints_with_role(WaypointRole::OutputStation),
            storage_slots:   network.waypoints_with_role(WaypointRole::Storage),
            network,
        }
    }

    /// Transit waypoints (neither storage nor station), ascending.
    pub fn transit_waypoints(&self) -> Vec<WaypointId> {
        self.network.waypoints_with_role(WaypointRole::Transit)
    }

    /// Check that every station, every storage slot, and every waypoint in
    /// `extra` can reach and be reached from the first output station.
    pub fn check_connected(&self, extra: &[WaypointId]) -> SpatialResult<()> {
        let Some(&anchor) = self.output_stations.first() else {
            return Ok(());
        };
        let forward  = self.network.reachable_from(anchor);
        let backward = self.network.reaching(anchor);

        let required = self
            .input_stations
            .iter()
            .chain(&self.output_stations)
            .chain(&self.storage_slots)
            .chain(extra);
        for &wp in required {
            if !self.network.contains(wp) {
                return Err(SpatialError::WaypointNotFound(wp));
            }
            if !forward[wp.index()] || !backward[wp.index()] {
                return Err(SpatialError::Disconnected { waypoint: wp, anchor });
            }
        }
        Ok(())
    }
}
