//! Planar warehouse coordinates.
//!
//! Warehouse floors are small and flat, so positions are plain Cartesian
//! `(x, y)` pairs in grid units.  `f32` keeps the waypoint arrays compact and
//! matches the precision of the rstar spatial index.

/// A position on the warehouse floor, in grid units.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f32,
    pub y: f32,
}

impl Coord {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance.  Used as edge length and as the default A*
    /// heuristic.
    #[inline]
    pub fn distance(self, other: Coord) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// L1 distance.  Only a lower bound on path length when the grid has no
    /// diagonal links.
    #[inline]
    pub fn manhattan(self, other: Coord) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
