//! Ordered Map Trait
//!
//! The query surface shared by [`Cache`](crate::cache::Cache) and
//! [`ProxyCache`](crate::cache::ProxyCache). Implementors supply a few
//! primitives; every query and transform operation is written once here.

use std::cmp::Ordering;
use std::hash::Hash;
use std::ops::ControlFlow;

use tracing::debug;

// == Ordered Map ==
/// An insertion-ordered, key-unique mapping with a query surface.
///
/// Callbacks always receive `(value, key, container)`. State a callback needs
/// beyond that is captured by the closure.
///
/// Operations that return a new container (`filter`, `concat`, `sorted`)
/// build it with [`OrderedMap::spawn_empty`], so a view yields a view over
/// the same store and a cache yields a fresh cache.
pub trait OrderedMap: Clone {
    type Key: Hash + Eq + Clone;
    type Value: Clone;

    // == Required Primitives ==
    /// Number of entries observable through this container.
    fn len(&self) -> usize;

    /// Folds over entries in iteration order, stopping early when `f`
    /// breaks. Both arms carry the accumulator.
    fn fold_entries<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, &Self::Key, &Self::Value) -> ControlFlow<A, A>;

    /// Inserts or admits an entry.
    fn put(&mut self, key: Self::Key, value: Self::Value);

    /// Removes a key, returning whether it was present.
    fn evict(&mut self, key: &Self::Key) -> bool;

    /// Removes every entry.
    fn purge(&mut self);

    /// An empty container of the same kind.
    fn spawn_empty(&self) -> Self;

    /// Walks entries in iteration order until `f` breaks.
    fn visit<F>(&self, mut f: F)
    where
        F: FnMut(&Self::Key, &Self::Value) -> ControlFlow<()>,
    {
        self.fold_entries((), |(), key, value| f(key, value));
    }

    // == Size ==
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Positional ==
    /// Returns the entry at `index` in iteration order.
    fn nth(&self, index: usize) -> Option<(Self::Key, Self::Value)> {
        let mut position = 0;
        let mut found = None;
        self.visit(|key, value| {
            if position == index {
                found = Some((key.clone(), value.clone()));
                return ControlFlow::Break(());
            }
            position += 1;
            ControlFlow::Continue(())
        });
        found
    }

    /// Returns the first entry, or `None` when empty.
    fn first(&self) -> Option<(Self::Key, Self::Value)> {
        self.nth(0)
    }

    fn first_key(&self) -> Option<Self::Key> {
        self.first().map(|(key, _)| key)
    }

    fn first_value(&self) -> Option<Self::Value> {
        self.first().map(|(_, value)| value)
    }

    /// Returns the last entry, or `None` when empty.
    fn last(&self) -> Option<(Self::Key, Self::Value)> {
        match self.len() {
            0 => None,
            len => self.nth(len - 1),
        }
    }

    fn last_key(&self) -> Option<Self::Key> {
        self.last().map(|(key, _)| key)
    }

    fn last_value(&self) -> Option<Self::Value> {
        self.last().map(|(_, value)| value)
    }

    // == Search ==
    /// Returns the first entry for which `predicate` holds.
    fn find<P>(&self, mut predicate: P) -> Option<(Self::Key, Self::Value)>
    where
        P: FnMut(&Self::Value, &Self::Key, &Self) -> bool,
    {
        let mut found = None;
        self.visit(|key, value| {
            if predicate(value, key, self) {
                found = Some((key.clone(), value.clone()));
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        found
    }

    fn find_key<P>(&self, predicate: P) -> Option<Self::Key>
    where
        P: FnMut(&Self::Value, &Self::Key, &Self) -> bool,
    {
        self.find(predicate).map(|(key, _)| key)
    }

    fn find_value<P>(&self, predicate: P) -> Option<Self::Value>
    where
        P: FnMut(&Self::Value, &Self::Key, &Self) -> bool,
    {
        self.find(predicate).map(|(_, value)| value)
    }

    // == Comparison ==
    /// Order-sensitive structural equality against any ordered map with the
    /// same key and value types.
    fn equals<O>(&self, other: &O) -> bool
    where
        O: OrderedMap<Key = Self::Key, Value = Self::Value>,
        Self::Value: PartialEq,
    {
        self.len() == other.len() && self.to_vec() == other.to_vec()
    }

    // == Snapshot ==
    /// Clones the observable entries into a vector, in iteration order.
    fn to_vec(&self) -> Vec<(Self::Key, Self::Value)> {
        let mut entries = Vec::new();
        self.visit(|key, value| {
            entries.push((key.clone(), value.clone()));
            ControlFlow::Continue(())
        });
        entries
    }

    /// Puts every entry of `source` into this container, in `source` order.
    fn extend_from<O>(&mut self, source: &O)
    where
        O: OrderedMap<Key = Self::Key, Value = Self::Value>,
    {
        source.visit(|key, value| {
            self.put(key.clone(), value.clone());
            ControlFlow::Continue(())
        });
    }

    // == Pruning ==
    /// Removes every entry matching `predicate` and returns how many were
    /// removed. Matches are collected before anything is removed.
    fn sweep<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&Self::Value, &Self::Key, &Self) -> bool,
    {
        let mut doomed = Vec::new();
        {
            let this = &*self;
            this.visit(|key, value| {
                if predicate(value, key, this) {
                    doomed.push(key.clone());
                }
                ControlFlow::Continue(())
            });
        }

        let removed = doomed.iter().filter(|key| self.evict(key)).count();
        debug!("Sweep: removed {} entries", removed);
        removed
    }

    /// Returns a new container holding the entries matching `predicate`.
    fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&Self::Value, &Self::Key, &Self) -> bool,
    {
        let mut out = self.spawn_empty();
        self.visit(|key, value| {
            if predicate(value, key, self) {
                out.put(key.clone(), value.clone());
            }
            ControlFlow::Continue(())
        });
        out
    }

    // == Transforms ==
    fn map<T, F>(&self, mut transform: F) -> Vec<T>
    where
        F: FnMut(&Self::Value, &Self::Key, &Self) -> T,
    {
        let mut out = Vec::new();
        self.visit(|key, value| {
            out.push(transform(value, key, self));
            ControlFlow::Continue(())
        });
        out
    }

    fn some<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Value, &Self::Key, &Self) -> bool,
    {
        let mut hit = false;
        self.visit(|key, value| {
            if predicate(value, key, self) {
                hit = true;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        hit
    }

    fn every<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Self::Value, &Self::Key, &Self) -> bool,
    {
        !self.some(|value, key, this| !predicate(value, key, this))
    }

    /// Left fold over `(accumulator, value, key, container)`.
    fn reduce<A, F>(&self, mut reducer: F, initial: A) -> A
    where
        F: FnMut(A, &Self::Value, &Self::Key, &Self) -> A,
    {
        self.fold_entries(initial, |acc, key, value| {
            ControlFlow::Continue(reducer(acc, value, key, self))
        })
    }

    fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(&Self::Value, &Self::Key, &Self),
    {
        self.visit(|key, value| {
            callback(value, key, self);
            ControlFlow::Continue(())
        });
    }

    /// Returns a new container with this container's entries followed by the
    /// entries of each of `others`. A repeated key keeps its first position
    /// and takes the last value put for it.
    fn concat<'a, I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        let mut out = self.spawn_empty();
        out.extend_from(self);
        let mut sources = 1;
        for other in others {
            out.extend_from(other);
            sources += 1;
        }
        debug!("Concat: merged {} sources into {} entries", sources, out.len());
        out
    }

    // == Ordering ==
    /// Reorders entries in place by `compare` and returns the receiver.
    fn sort_by<F>(&mut self, mut compare: F) -> &mut Self
    where
        F: FnMut((&Self::Key, &Self::Value), (&Self::Key, &Self::Value)) -> Ordering,
    {
        let mut entries = self.to_vec();
        entries.sort_by(|a, b| compare((&a.0, &a.1), (&b.0, &b.1)));
        self.purge();
        for (key, value) in entries {
            self.put(key, value);
        }
        debug!("Sort: reordered {} entries", self.len());
        self
    }

    /// Sorts in place by key.
    fn sort(&mut self) -> &mut Self
    where
        Self::Key: Ord,
    {
        self.sort_by(|(a, _), (b, _)| a.cmp(b))
    }

    /// Returns a sorted copy, leaving the receiver's order untouched.
    fn sorted_by<F>(&self, compare: F) -> Self
    where
        F: FnMut((&Self::Key, &Self::Value), (&Self::Key, &Self::Value)) -> Ordering,
    {
        let mut out = self.clone();
        out.sort_by(compare);
        out
    }

    fn sorted(&self) -> Self
    where
        Self::Key: Ord,
    {
        self.sorted_by(|(a, _), (b, _)| a.cmp(b))
    }
}
