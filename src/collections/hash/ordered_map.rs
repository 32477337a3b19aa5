//! `OrderedMap`: an insertion-ordered hash map over an arena-backed chain.
//!
//! A std `HashMap` indexes each key to the [`SlotHandle`] of its node; the
//! nodes themselves live in an [`Arena`] and are strung together by a
//! [`Chain`] in insertion order.
//!
//! Features:
//! - **Order Preservation**: Iteration order matches first-insertion order.
//!   Re-inserting an existing key updates the value in place.
//! - **Stable Nodes**: A node keeps its slot for as long as the key lives.
//!   Removed nodes are retired, never recycled.
//! - **O(1)** lookup, insertion and removal.

use crate::alloc::{Arena, ArenaConfig, SlotHandle};
use crate::collections::other::chain::{self, Chain, Link};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// A hash map that iterates in insertion order.
///
/// Keys are held twice (index and node), hence `K: Clone` on the write path.
pub struct OrderedMap<K, V, S = RandomState> {
    /// `None` only for [`OrderedMap::zeroed`].
    index: Option<HashMap<K, SlotHandle, S>>,
    chain: Chain<Entry<K, V>>,
    arena: Arena<Link<Entry<K, V>>>,
}

impl<K, V> OrderedMap<K, V, RandomState> {
    /// Creates an empty map. Nothing is allocated until the first insert.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Sizes both the hash index and the first arena batch for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Creates an empty map over an arena built from `config`.
    pub fn with_config(config: ArenaConfig) -> Self {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V, S> OrderedMap<K, V, S> {
    /// Creates an empty map that hashes keys with `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Combination of [`with_capacity`](OrderedMap::with_capacity) and [`with_hasher`](Self::with_hasher).
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_config_and_hasher(ArenaConfig::new(capacity), hash_builder)
    }

    /// Builds the map with an explicit arena config; `config.capacity` also
    /// sizes the hash index.
    pub fn with_config_and_hasher(config: ArenaConfig, hash_builder: S) -> Self {
        Self {
            index: Some(HashMap::with_capacity_and_hasher(
                config.capacity,
                hash_builder,
            )),
            chain: Chain::new(),
            arena: Arena::with_config(config),
        }
    }

    /// A map with no hash index, the analogue of a zero-initialised value.
    ///
    /// Reads behave as on an empty map. [`insert`](Self::insert) panics.
    pub fn zeroed() -> Self {
        Self {
            index: None,
            chain: Chain::new(),
            arena: Arena::new(),
        }
    }

    /// `false` for maps built with [`zeroed`](Self::zeroed).
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Node slots the backing arena has allocated, issued or not.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.chain.iter(&self.arena),
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Values in insertion order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Copies every value out in insertion order.
    ///
    /// Complexity: O(n) time, O(n) memory.
    pub fn to_values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.values().cloned());
        out
    }

    /// The oldest entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.entry_at(self.chain.head())
    }

    /// The newest entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.entry_at(self.chain.tail())
    }

    fn entry_at(&self, handle: Option<SlotHandle>) -> Option<(&K, &V)> {
        let entry = self.arena.get(handle?)?.value();
        Some((&entry.key, &entry.value))
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns the value stored under `key`.
    ///
    /// Complexity: O(1).
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.as_ref()?.get(key)?;
        self.arena.get(handle).map(|link| &link.value().value)
    }

    /// Mutable access to the value under `key`; the entry keeps its position.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.as_ref()?.get(key)?;
        self.arena
            .get_mut(handle)
            .map(|link| &mut link.value_mut().value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .as_ref()
            .is_some_and(|index| index.contains_key(key))
    }

    /// Removes `key`, returning its value. Survivors keep their relative order.
    ///
    /// The node's slot is retired, not handed back to the arena.
    ///
    /// Complexity: O(1).
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.as_mut()?.remove(key)?;

        match self.chain.retire(&mut self.arena, handle) {
            Ok(entry) => Some(entry.value),
            Err(err) => unreachable!("indexed node {handle} could not be retired: {err}"),
        }
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Stores `value` under `key`.
    ///
    /// An existing key keeps its position and the previous value is returned.
    /// A new key is appended at the end of the order.
    ///
    /// Complexity: O(1) amortised.
    ///
    /// # Panics
    /// If the map was built with [`zeroed`](Self::zeroed).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(index) = self.index.as_mut() else {
            #[cfg(feature = "tracing")]
            tracing::error!("insert into an OrderedMap without a hash index");
            panic!("OrderedMap::insert on a map with no hash index; construct it with OrderedMap::new");
        };

        if let Some(&handle) = index.get(&key) {
            let Some(link) = self.arena.get_mut(handle) else {
                unreachable!("indexed node {handle} is not live");
            };
            return Some(mem::replace(&mut link.value_mut().value, value));
        }

        let handle = self.arena.alloc(Link::new(Entry {
            key: key.clone(),
            value,
        }));
        let linked = self.chain.append(&mut self.arena, handle);
        debug_assert!(linked.is_ok(), "fresh node rejected by chain: {linked:?}");

        index.insert(key, handle);
        None
    }
}

/// Removes `key` from `map`.
///
/// A no-op when `map` is `None`, empty, or has no hash index.
pub fn delete<K, V, S, Q>(map: Option<&mut OrderedMap<K, V, S>>, key: &Q)
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    let Some(map) = map else {
        return;
    };
    if map.is_empty() {
        return;
    }
    map.remove(key);
}

impl<K, V> Default for OrderedMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`OrderedMap::iter`].
pub struct Iter<'a, K, V> {
    inner: chain::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(_, entry)| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator returned by [`OrderedMap::keys`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator returned by [`OrderedMap::values`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}
