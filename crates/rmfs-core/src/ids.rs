//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Every entity family is stored in a
//! flat arena indexed by its id, so the inner integer doubles as the arena
//! slot; prefer the `.index()` helper over `id.0 as usize`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID": equivalent to `<inner>::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Inverse of [`index`](Self::index).  Arena slots never exceed the
            /// inner integer range, so the cast is lossless in practice.
            #[inline(always)]
            pub fn from_index(i: usize) -> Self {
                $name(i as $inner)
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a navigable node in the waypoint network.
    pub struct WaypointId(u32);
}

typed_id! {
    /// Index of a mobile robot.
    pub struct BotId(u32);
}

typed_id! {
    /// Index of a storage pod.
    pub struct PodId(u32);
}

typed_id! {
    /// Index of an input or output station.
    pub struct StationId(u32);
}

typed_id! {
    /// Sequential order number, assigned at creation.
    pub struct OrderId(u32);
}

typed_id! {
    /// Sequential dispatcher task number.
    pub struct TaskId(u32);
}
