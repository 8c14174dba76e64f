//! Proxy Cache Module
//!
//! A filtered view over a shared [`Cache`]. The view owns only a membership
//! set; values always live in the backing store.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::cache::{Cache, OrderedMap, ViewStats};
use crate::error::{CacheError, Result};

/// Shared handle to a backing store. Views hold clones of this handle and
/// never own the store themselves.
pub type SharedStore<K, V> = Rc<RefCell<Cache<K, V>>>;

// == Proxy Cache ==
/// A view exposing the members of a shared store.
///
/// A key is visible when it is a member of the view AND the store currently
/// holds it. Iteration follows the store's order; the order in which keys
/// joined the view does not matter.
///
/// The view keeps a shared borrow of the store while it is being read or
/// traversed. Mutating the store through [`ProxyCache::store`] inside a
/// callback passed to the same view panics.
pub struct ProxyCache<K, V> {
    /// Backing store shared with other views
    store: SharedStore<K, V>,
    /// Keys opted into this view
    members: HashSet<K>,
}

impl<K, V> ProxyCache<K, V>
where
    K: Hash + Eq,
{
    // == Constructors ==
    /// Creates a view over `store` with `keys` as its starting members.
    ///
    /// Keys the store does not hold are kept as members; they stay hidden
    /// until the store gains them.
    pub fn new<I>(store: SharedStore<K, V>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self {
            store,
            members: keys.into_iter().collect(),
        }
    }

    /// Creates a view over `store` with no members.
    pub fn with_store(store: SharedStore<K, V>) -> Self {
        Self {
            store,
            members: HashSet::new(),
        }
    }

    /// Creates a view over the same store as `view`, with a copy of its
    /// membership.
    pub fn from_view(view: &Self) -> Self
    where
        K: Clone,
    {
        Self {
            store: Rc::clone(&view.store),
            members: view.members.clone(),
        }
    }

    // == Accessors ==
    /// The shared backing store.
    pub fn store(&self) -> &SharedStore<K, V> {
        &self.store
    }

    /// Whether this view and `other` read from the same store.
    pub fn shares_store_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    /// Number of member keys, including members the store no longer holds.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    // == Length ==
    /// Number of visible entries: members the store currently holds.
    pub fn len(&self) -> usize {
        let store = self.store.borrow();
        self.members.iter().filter(|key| store.has(*key)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Get ==
    /// Returns the store's value for `key` if it is visible through this view.
    pub fn get(&self, key: &K) -> Option<Ref<'_, V>> {
        if !self.members.contains(key) {
            return None;
        }
        Ref::filter_map(self.store.borrow(), |store| store.get(key)).ok()
    }

    // == Has ==
    pub fn has(&self, key: &K) -> bool {
        self.members.contains(key) && self.store.borrow().has(key)
    }

    // == Set ==
    /// Opts `key` into the view if the store holds it. Keys the store does
    /// not hold are ignored; a view never creates values.
    pub fn set(&mut self, key: K) -> &mut Self {
        if self.store.borrow().has(&key) && self.members.insert(key) {
            trace!("View: admitted key, {} members", self.members.len());
        }
        self
    }

    /// Like [`ProxyCache::set`], but a key missing from the store is an error.
    pub fn try_set(&mut self, key: K) -> Result<&mut Self>
    where
        K: fmt::Debug,
    {
        if !self.store.borrow().has(&key) {
            return Err(CacheError::not_in_store(&key));
        }
        self.members.insert(key);
        Ok(self)
    }

    // == Delete ==
    /// Drops `key` from the view. The store is untouched.
    ///
    /// Returns whether the key was a member.
    pub fn delete(&mut self, key: &K) -> bool {
        self.members.remove(key)
    }

    // == Clear ==
    /// Drops every member. The store is untouched.
    pub fn clear(&mut self) -> &mut Self {
        let dropped = self.members.len();
        self.members.clear();
        debug!("View: cleared {} members", dropped);
        self
    }

    // == Iteration ==
    /// Visible entries in store order.
    pub fn entries(&self) -> Entries<'_, K, V> {
        Entries {
            store: self.store.borrow(),
            members: &self.members,
            position: 0,
        }
    }

    pub fn iter(&self) -> Entries<'_, K, V> {
        self.entries()
    }

    /// Visible keys in store order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_
    where
        K: Clone,
        V: Clone,
    {
        self.entries().map(|(key, _)| key)
    }

    /// Visible values in store order.
    pub fn values(&self) -> impl Iterator<Item = V> + '_
    where
        K: Clone,
        V: Clone,
    {
        self.entries().map(|(_, value)| value)
    }

    // == Stats ==
    /// Membership and visibility counts for this view.
    pub fn stats(&self) -> ViewStats {
        ViewStats::new(self.member_count(), self.len())
    }
}

impl<K, V> Clone for ProxyCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn clone(&self) -> Self {
        Self::from_view(self)
    }
}

impl<K, V> From<&ProxyCache<K, V>> for ProxyCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn from(view: &ProxyCache<K, V>) -> Self {
        Self::from_view(view)
    }
}

impl<K, V> fmt::Debug for ProxyCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

// == Entries Iterator ==
/// Lazy walk over the visible entries of a [`ProxyCache`], in store order.
///
/// Holds a shared borrow of the store until dropped.
pub struct Entries<'a, K, V> {
    store: Ref<'a, Cache<K, V>>,
    members: &'a HashSet<K>,
    position: usize,
}

impl<K, V> Iterator for Entries<'_, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((key, value)) = self.store.get_index(self.position) {
            self.position += 1;
            if self.members.contains(key) {
                return Some((key.clone(), value.clone()));
            }
        }
        None
    }
}

impl<'a, K, V> IntoIterator for &'a ProxyCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (K, V);
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

// == Ordered Map Implementation ==
impl<K, V> OrderedMap for ProxyCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Key = K;
    type Value = V;

    fn len(&self) -> usize {
        ProxyCache::len(self)
    }

    fn fold_entries<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &K, &V) -> ControlFlow<A, A>,
    {
        let store = self.store.borrow();
        let mut acc = init;
        for (key, value) in store.iter() {
            if !self.members.contains(key) {
                continue;
            }
            match f(acc, key, value) {
                ControlFlow::Continue(next) => acc = next,
                ControlFlow::Break(done) => return done,
            }
        }
        acc
    }

    /// Admits `key`; the value is ignored because the store owns values.
    fn put(&mut self, key: K, _value: V) {
        self.set(key);
    }

    fn evict(&mut self, key: &K) -> bool {
        self.delete(key)
    }

    fn purge(&mut self) {
        self.clear();
    }

    fn spawn_empty(&self) -> Self {
        Self::with_store(Rc::clone(&self.store))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SharedStore<&'static str, &'static str> {
        Cache::from([("first", "foo"), ("second", "bar"), ("third", "baz")]).into_shared()
    }

    #[test]
    fn test_proxy_new_keeps_unknown_members_hidden() {
        let view = ProxyCache::new(store(), ["first", "fourth"]);

        assert_eq!(view.member_count(), 2);
        assert_eq!(view.len(), 1);
        assert!(!view.has(&"fourth"));
        assert!(view.get(&"fourth").is_none());
    }

    #[test]
    fn test_proxy_get_borrows_from_store() {
        let view = ProxyCache::new(store(), ["second"]);

        assert_eq!(view.get(&"second").as_deref(), Some(&"bar"));
        assert!(view.get(&"first").is_none());
    }

    #[test]
    fn test_proxy_set_only_admits_store_keys() {
        let mut view = ProxyCache::with_store(store());

        view.set("third").set("fourth");
        assert_eq!(view.member_count(), 1);
        assert!(view.has(&"third"));
    }

    #[test]
    fn test_proxy_try_set() {
        let mut view = ProxyCache::with_store(store());

        assert!(view.try_set("first").is_ok());
        assert_eq!(
            view.try_set("fourth").map(|v| v.member_count()),
            Err(CacheError::NotInStore("\"fourth\"".to_string()))
        );
        assert_eq!(view.member_count(), 1);
    }

    #[test]
    fn test_proxy_store_removal_hides_member() {
        let shared = store();
        let view = ProxyCache::new(Rc::clone(&shared), ["first", "second"]);

        shared.borrow_mut().delete("first");

        assert!(view.is_member(&"first"));
        assert!(!view.has(&"first"));
        assert_eq!(view.len(), 1);
        assert_eq!(view.stats(), ViewStats::new(2, 1));
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["second"]);
    }

    #[test]
    fn test_proxy_entries_are_lazy_and_ordered_by_store() {
        let view = ProxyCache::new(store(), ["third", "first"]);
        let mut entries = view.entries();

        assert_eq!(entries.next(), Some(("first", "foo")));
        assert_eq!(entries.next(), Some(("third", "baz")));
        assert_eq!(entries.next(), None);
    }

    #[test]
    fn test_proxy_spawn_empty_shares_store() {
        let view = ProxyCache::new(store(), ["first"]);
        let empty = view.spawn_empty();

        assert!(empty.shares_store_with(&view));
        assert_eq!(empty.member_count(), 0);
    }

    #[test]
    fn test_proxy_debug_formats_visible_entries() {
        let view = ProxyCache::new(store(), ["second"]);
        assert_eq!(format!("{:?}", view), "{\"second\": \"bar\"}");
    }
}
