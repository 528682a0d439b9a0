//! Ordered collections addressable by runtime identity.
//!
//! Items keep their display order in a `Vec`; an identity table maps each
//! runtime id to its current position. Positional changes update the table
//! once, so handles never go stale.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::Identified;

/// A position captured at submission time plus the identity it referred to.
///
/// Resolution probes `index_hint` first and falls back to the identity table
/// when the collection has been reordered since.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AsyncId<I> {
    pub index_hint: usize,
    pub id: I,
}

impl<I> AsyncId<I> {
    pub fn new(index_hint: usize, id: I) -> Self {
        AsyncId { index_hint, id }
    }
}

#[derive(Clone, Debug)]
pub struct Ordered<T: Identified> {
    items: Vec<T>,
    positions: HashMap<T::Id, usize>,
}

impl<T: Identified> Default for Ordered<T> {
    fn default() -> Self {
        Ordered {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T: Identified> Ordered<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = T::Id> + '_ {
        self.items.iter().map(Identified::runtime_id)
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, item) in self.items.iter().enumerate().skip(start) {
            self.positions.insert(item.runtime_id(), i);
        }
    }

    /// Append `item`; returns its position.
    pub fn push(&mut self, item: T) -> usize {
        let index = self.items.len();
        self.positions.insert(item.runtime_id(), index);
        self.items.push(item);
        index
    }

    /// Insert `item` at `index` (clamped to the end), shifting later items.
    pub fn insert(&mut self, index: usize, item: T) -> usize {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.reindex_from(index);
        index
    }

    /// Remove the item with identity `id`, returning its last position.
    pub fn remove(&mut self, id: T::Id) -> Option<(usize, T)> {
        let index = self.positions.remove(&id)?;
        let item = self.items.remove(index);
        self.reindex_from(index);
        Some((index, item))
    }

    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.items.retain(|item| f(item));
        self.positions.clear();
        self.reindex_from(0);
    }

    /// Move the item with identity `id` to position `to` (clamped).
    pub fn move_to(&mut self, id: T::Id, to: usize) -> Option<usize> {
        let from = self.position_of(id)?;
        let item = self.items.remove(from);
        let to = to.min(self.items.len());
        self.items.insert(to, item);
        self.reindex_from(from.min(to));
        Some(to)
    }

    #[inline]
    pub fn position_of(&self, id: T::Id) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: T::Id) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.get(self.position_of(id)?)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        let index = self.position_of(id)?;
        self.items.get_mut(index)
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Current [`AsyncId`] of `id`.
    pub fn async_id(&self, id: T::Id) -> Option<AsyncId<T::Id>> {
        Some(AsyncId::new(self.position_of(id)?, id))
    }

    fn resolve(&self, key: AsyncId<T::Id>) -> Option<usize> {
        match self.items.get(key.index_hint) {
            Some(item) if item.runtime_id() == key.id => Some(key.index_hint),
            _ => {
                let found = self.position_of(key.id);
                log::debug!(
                    "stale index {} for {:?}, resolved to {:?}",
                    key.index_hint,
                    key.id,
                    found
                );
                found
            }
        }
    }

    /// Resolve a captured `(index, id)` pair. `None` when the item is gone.
    pub fn get_async(&self, key: AsyncId<T::Id>) -> Option<&T> {
        self.items.get(self.resolve(key)?)
    }

    pub fn get_async_mut(&mut self, key: AsyncId<T::Id>) -> Option<&mut T> {
        let index = self.resolve(key)?;
        self.items.get_mut(index)
    }
}

impl<T: Identified + PartialEq> PartialEq for Ordered<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Identified> FromIterator<T> for Ordered<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Ordered::new();
        for item in iter {
            out.push(item);
        }
        out
    }
}

impl<'a, T: Identified> IntoIterator for &'a Ordered<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
