//! Flat id-indexed entity storage.
//!
//! Entities are created once at world construction (orders are appended as
//! they arrive) and never removed, so an id is simply the slot index.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use rmfs_core::{BotId, OrderId, PodId, StationId};

/// Typed ids that double as arena slots.
pub trait ArenaId: Copy {
    fn slot(self) -> usize;
    fn from_slot(slot: usize) -> Self;
}

macro_rules! arena_id {
    ($($name:ty),* $(,)?) => {
        $(
            impl ArenaId for $name {
                #[inline(always)]
                fn slot(self) -> usize {
                    self.index()
                }

                #[inline(always)]
                fn from_slot(slot: usize) -> Self {
                    <$name>::from_index(slot)
                }
            }
        )*
    };
}

arena_id!(BotId, PodId, StationId, OrderId);

/// Append-only `Vec<T>` addressed by `I`.
///
/// Iteration is always in ascending id order, which is the order every
/// per-tick update uses.
#[derive(Clone, Debug, PartialEq)]
pub struct Arena<I, T> {
    items: Vec<T>,
    _id:   PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        Self { items: Vec::new(), _id: PhantomData }
    }

    /// The id the next [`push`](Self::push) will return.
    #[inline]
    pub fn next_id(&self) -> I {
        I::from_slot(self.items.len())
    }

    pub fn push(&mut self, item: T) -> I {
        let id = self.next_id();
        self.items.push(item);
        id
    }

    #[inline]
    pub fn get(&self, id: I) -> Option<&T> {
        self.items.get(id.slot())
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.items.get_mut(id.slot())
    }

    #[inline]
    pub fn contains(&self, id: I) -> bool {
        id.slot() < self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `(id, entity)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.items.iter().enumerate().map(|(i, t)| (I::from_slot(i), t))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> + '_ {
        self.items.iter_mut().enumerate().map(|(i, t)| (I::from_slot(i), t))
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.items.len()).map(I::from_slot)
    }

    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> FromIterator<T> for Arena<I, T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self { items: iter.into_iter().collect(), _id: PhantomData }
    }
}

/// # Panics
/// Panics if `id` was not issued by this arena.
impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, id: I) -> &T {
        &self.items[id.slot()]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    #[inline]
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.slot()]
    }
}
