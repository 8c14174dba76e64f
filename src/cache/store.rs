//! Cache Store Module
//!
//! Insertion-ordered key-value storage backed by `IndexMap`.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::cache::{OrderedMap, SharedStore};
use crate::error::{CacheError, Result};

// == Cache ==
/// Ordered key-value container.
///
/// Iteration follows insertion order. Re-setting a key replaces its value in
/// place without moving it.
#[derive(Clone)]
pub struct Cache<K, V> {
    /// Key-value storage in insertion order
    entries: IndexMap<K, V>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq,
{
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Creates an empty cache with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    // == Get ==
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key)
    }

    /// Like [`Cache::get`], but a missing key is an error.
    pub fn require<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.entries
            .get(key)
            .ok_or_else(|| CacheError::not_found(&key))
    }

    /// Returns the entry at `index` in insertion order.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get_index(index)
    }

    // == Set ==
    /// Stores a value. An existing key keeps its position.
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        self.entries.insert(key, value);
        self
    }

    // == Has ==
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    // == Delete ==
    /// Removes an entry, preserving the order of the rest.
    ///
    /// Returns whether the key was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.shift_remove(key).is_some()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Iteration ==
    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, K, V> {
        self.entries.values_mut()
    }

    // == Sharing ==
    /// Moves the cache behind a shared handle that views can be built over.
    pub fn into_shared(self) -> SharedStore<K, V> {
        Rc::new(RefCell::new(self))
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Equality is order-sensitive: the same pairs in a different order differ.
impl<K, V> PartialEq for Cache<K, V>
where
    K: Hash + Eq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K, V> Eq for Cache<K, V>
where
    K: Hash + Eq,
    V: Eq,
{
}

impl<K, V> FromIterator<(K, V)> for Cache<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Cache<K, V>
where
    K: Hash + Eq,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> From<Vec<(K, V)>> for Cache<K, V>
where
    K: Hash + Eq,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> Extend<(K, V)> for Cache<K, V>
where
    K: Hash + Eq,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<K, V> IntoIterator for Cache<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Cache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// == Ordered Map Implementation ==
impl<K, V> OrderedMap for Cache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Key = K;
    type Value = V;

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn fold_entries<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &K, &V) -> ControlFlow<A, A>,
    {
        match self
            .entries
            .iter()
            .try_fold(init, |acc, (key, value)| f(acc, key, value))
        {
            ControlFlow::Continue(acc) | ControlFlow::Break(acc) => acc,
        }
    }

    fn put(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    fn evict(&mut self, key: &K) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    fn purge(&mut self) {
        self.entries.clear();
    }

    fn spawn_empty(&self) -> Self {
        Self::new()
    }

    fn nth(&self, index: usize) -> Option<(K, V)> {
        self.entries
            .get_index(index)
            .map(|(key, value)| (key.clone(), value.clone()))
    }

    fn last(&self) -> Option<(K, V)> {
        self.entries
            .last()
            .map(|(key, value)| (key.clone(), value.clone()))
    }

    fn sweep<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&V, &K, &Self) -> bool,
    {
        let this = &*self;
        let doomed: HashSet<K> = this
            .entries
            .iter()
            .filter(|(key, value)| predicate(*value, *key, this))
            .map(|(key, _)| key.clone())
            .collect();

        let before = self.entries.len();
        self.entries.retain(|key, _| !doomed.contains(key));
        let removed = before - self.entries.len();

        debug!("Sweep: removed {} entries", removed);
        removed
    }

    fn sort_by<F>(&mut self, mut compare: F) -> &mut Self
    where
        F: FnMut((&K, &V), (&K, &V)) -> Ordering,
    {
        self.entries.sort_by(|k1, v1, k2, v2| compare((k1, v1), (k2, v2)));
        debug!("Sort: reordered {} entries", self.entries.len());
        self
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Cache<&'static str, &'static str> {
        Cache::from([("first", "foo"), ("second", "bar"), ("third", "baz")])
    }

    #[test]
    fn test_cache_new() {
        let cache: Cache<String, String> = Cache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_set_and_get() {
        let mut cache = Cache::new();
        cache.set("key1".to_string(), "value1".to_string());

        assert_eq!(cache.get("key1").map(String::as_str), Some("value1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_overwrite_keeps_position() {
        let mut cache = sample();
        cache.set("first", "changed");

        let keys: Vec<_> = cache.keys().copied().collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
        assert_eq!(cache.get("first"), Some(&"changed"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_cache_from_vec_collapses_repeated_keys() {
        let cache = Cache::from(vec![("first", "foo"), ("second", "bar"), ("first", "baz")]);

        let keys: Vec<_> = cache.keys().copied().collect();
        assert_eq!(keys, vec!["first", "second"]);
        assert_eq!(cache.get("first"), Some(&"baz"));
    }

    #[test]
    fn test_cache_with_capacity() {
        let mut cache = Cache::with_capacity(8);
        assert!(cache.is_empty());

        cache.set(1, "one").set(2, "two");
        assert_eq!(cache.to_vec(), vec![(1, "one"), (2, "two")]);
    }

    #[test]
    fn test_cache_mutate_values_in_place() {
        let mut cache = Cache::from([("a", 1), ("b", 2)]);

        if let Some(value) = cache.get_mut("a") {
            *value += 10;
        }
        assert_eq!(cache.get("a"), Some(&11));
        assert!(cache.get_mut("missing").is_none());

        for value in cache.values_mut() {
            *value *= 2;
        }
        assert_eq!(cache.to_vec(), vec![("a", 22), ("b", 4)]);
    }

    #[test]
    fn test_cache_delete_preserves_order() {
        let mut cache = sample();

        assert!(cache.delete("second"));
        assert!(!cache.delete("second"));

        let keys: Vec<_> = cache.keys().copied().collect();
        assert_eq!(keys, vec!["first", "third"]);
    }

    #[test]
    fn test_cache_require() {
        let cache = sample();

        assert_eq!(cache.require("second"), Ok(&"bar"));
        assert!(matches!(cache.require("fourth"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_cache_equality_is_order_sensitive() {
        let reversed = Cache::from([("third", "baz"), ("second", "bar"), ("first", "foo")]);

        assert_eq!(sample(), sample());
        assert_ne!(sample(), reversed);
        assert!(!sample().equals(&reversed));
    }

    #[test]
    fn test_cache_last_fast_path() {
        let cache = sample();
        assert_eq!(cache.last(), Some(("third", "baz")));
        assert_eq!(cache.nth(1), Some(("second", "bar")));
        assert_eq!(cache.nth(3), None);
    }

    #[test]
    fn test_cache_sweep_fast_path() {
        let mut cache = sample();
        let removed = cache.sweep(|value, _, _| value.starts_with('b'));

        assert_eq!(removed, 2);
        assert_eq!(cache.to_vec(), vec![("first", "foo")]);
    }

    #[test]
    fn test_cache_sort_by_value() {
        let mut cache = sample();
        cache.sort_by(|(_, a), (_, b)| a.cmp(b));

        assert_eq!(
            cache.to_vec(),
            vec![("second", "bar"), ("third", "baz"), ("first", "foo")]
        );
    }

    #[test]
    fn test_cache_debug_formats_as_map() {
        let cache = Cache::from([(1, "one")]);
        assert_eq!(format!("{:?}", cache), "{1: \"one\"}");
    }

    #[test]
    fn test_cache_into_shared() {
        let shared = sample().into_shared();
        shared.borrow_mut().set("fourth", "biz");
        assert_eq!(RefCell::borrow(&shared).len(), 4);
    }
}
