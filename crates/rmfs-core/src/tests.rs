//! Unit tests for rmfs-core primitives.

#[cfg(test)]
mod ids {
    use crate::{BotId, PodId, WaypointId};

    #[test]
    fn index_roundtrip() {
        let id = BotId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(BotId::try_from(42usize).unwrap(), id);
        assert_eq!(BotId::from_index(42), id);
    }

    #[test]
    fn ordering() {
        assert!(BotId(0) < BotId(1));
        assert!(WaypointId(100) > WaypointId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(PodId::INVALID.0, u32::MAX);
        assert_eq!(PodId::default(), PodId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(BotId(7).to_string(), "BotId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Coord;

    #[test]
    fn euclidean_distance() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn manhattan_never_below_euclidean() {
        let a = Coord::new(1.0, 1.0);
        let b = Coord::new(4.0, 5.0);
        assert_eq!(a.manhattan(b), 7.0);
        assert!(a.manhattan(b) >= a.distance(b));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(10)), 0);
    }

    #[test]
    fn clock_advances_and_reports_seconds() {
        let mut clock = SimClock::new(0.5);
        assert_eq!(clock.advance(), Tick(1));
        assert_eq!(clock.advance(), Tick(2));
        assert_eq!(clock.elapsed_secs(), 1.0);
        assert_eq!(clock.ticks_for_secs(1.2), 3);
    }

    #[test]
    fn display() {
        assert_eq!(Tick(9).to_string(), "T9");
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, WarehouseConfig};

    #[test]
    fn default_is_valid() {
        WarehouseConfig::default().validate().unwrap();
    }

    #[test]
    fn default_layout_slot_count() {
        let cfg = WarehouseConfig::default();
        // Columns 2..28 minus multiples of 3 → 17 per row, 5 rows.
        assert_eq!(cfg.layout.storage_slot_count(), 85);
        assert_eq!(cfg.layout.storage_row_range(), 8..13);
    }

    #[test]
    fn aisles_are_not_storage() {
        let cfg = WarehouseConfig::default();
        assert!(!cfg.layout.is_storage_slot(3, 9));
        assert!(cfg.layout.is_storage_slot(4, 9));
        assert!(!cfg.layout.is_storage_slot(4, 0));
        assert!(!cfg.layout.is_storage_slot(1, 9));
    }

    #[test]
    fn zero_robots_rejected() {
        let mut cfg = WarehouseConfig::default();
        cfg.robots.count = 0;
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn too_many_pods_rejected() {
        let mut cfg = WarehouseConfig::default();
        cfg.pods.count = 1_000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_output_station_rejected() {
        let mut cfg = WarehouseConfig::default();
        cfg.stations.output_count = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn storage_rows_must_fit() {
        let mut cfg = WarehouseConfig::default();
        cfg.layout.storage_rows = 19;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn layout_rules_skipped_for_custom_floor() {
        let mut cfg = WarehouseConfig::default();
        cfg.pods.count = 1_000;
        cfg.stations.output_count = 0;
        assert!(cfg.validate().is_err());
        cfg.validate_without_layout().unwrap();
    }

    #[test]
    fn probabilities_must_be_in_unit_range() {
        let mut cfg = WarehouseConfig::default();
        cfg.simulation.bundle_probability = 1.5;
        assert!(cfg.validate_without_layout().is_err());
        cfg.simulation.bundle_probability = 0.0;
        cfg.simulation.order_probability = f64::NAN;
        assert!(cfg.validate_without_layout().is_err());
    }

    #[test]
    fn end_tick_covers_warmup_and_duration() {
        let cfg = WarehouseConfig::default();
        assert_eq!(cfg.end_tick().0, 3_100);
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1_000u32), b.gen_range(0..1_000u32));
        }
    }

    #[test]
    fn children_are_independent_of_parent_draws() {
        let mut a = SimRng::child(7, 1);
        let mut b = SimRng::child(7, 1);
        let mut c = SimRng::child(7, 2);
        let xa: Vec<u32> = (0..8).map(|_| a.gen_range(0..1_000_000)).collect();
        let xb: Vec<u32> = (0..8).map(|_| b.gen_range(0..1_000_000)).collect();
        let xc: Vec<u32> = (0..8).map(|_| c.gen_range(0..1_000_000)).collect();
        assert_eq!(xa, xb);
        assert_ne!(xa, xc);
    }
}
