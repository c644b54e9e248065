//! Ordered sets of dependency pairs.
//!
//! A [`DependencySet`] is the read-only face handed out by the analyser; only a
//! [`DependencySetBuilder`] can grow or shrink one. Both iterate in ascending
//! `(from, to)` order regardless of insertion order, so serialized output and
//! reports are deterministic even though containers are visited in filesystem
//! order.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;

/// A directed edge `from -> to`.
///
/// `to == None` is the bookkeeping marker "class observed, no dependency".
/// Ordering is lexicographic on `from` then `to`, with `None` first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyPair<K> {
    from: K,
    to: Option<K>,
}

impl<K> DependencyPair<K> {
    pub fn new(from: K, to: K) -> Self {
        Self { from, to: Some(to) }
    }

    /// The "observed, no dependency" marker for `from`.
    pub fn observed(from: K) -> Self {
        Self { from, to: None }
    }

    pub fn from(&self) -> &K {
        &self.from
    }

    pub fn to(&self) -> Option<&K> {
        self.to.as_ref()
    }
}

impl<K: fmt::Display> fmt::Display for DependencyPair<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.to {
            Some(to) => write!(f, "{} -> {}", self.from, to),
            None => write!(f, "{}", self.from),
        }
    }
}

/// Read-only ordered set of [`DependencyPair`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySet<K: Ord> {
    pairs: BTreeSet<DependencyPair<K>>,
}

pub type ClassDependencySet = DependencySet<String>;
pub type FileDependencySet = DependencySet<PathBuf>;

impl<K: Ord> Default for DependencySet<K> {
    fn default() -> Self {
        Self {
            pairs: BTreeSet::new(),
        }
    }
}

impl<K: Ord> DependencySet<K> {
    pub fn contains(&self, pair: &DependencyPair<K>) -> bool {
        self.pairs.contains(pair)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, DependencyPair<K>> {
        self.pairs.iter()
    }

    /// Real edges only, skipping the "observed" markers.
    pub fn edges(&self) -> impl Iterator<Item = (&K, &K)> + '_ {
        self.pairs
            .iter()
            .filter_map(|p| p.to.as_ref().map(|to| (&p.from, to)))
    }

    /// Every `to` recorded for `from`, in order.
    pub fn dependencies_of<'a>(&'a self, from: &'a K) -> impl Iterator<Item = &'a K> + 'a {
        self.pairs
            .iter()
            .filter(move |p| &p.from == from)
            .filter_map(|p| p.to.as_ref())
    }
}

impl<'a, K: Ord> IntoIterator for &'a DependencySet<K> {
    type Item = &'a DependencyPair<K>;
    type IntoIter = btree_set::Iter<'a, DependencyPair<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl<K: Ord> IntoIterator for DependencySet<K> {
    type Item = DependencyPair<K>;
    type IntoIter = btree_set::IntoIter<DependencyPair<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Mutable accumulator behind a [`DependencySet`].
///
/// Derefs to the read-only set, so the owner can lend out `&DependencySet`
/// views without exposing mutation.
#[derive(Debug, Clone)]
pub struct DependencySetBuilder<K: Ord> {
    set: DependencySet<K>,
}

impl<K: Ord> Default for DependencySetBuilder<K> {
    fn default() -> Self {
        Self {
            set: DependencySet::default(),
        }
    }
}

impl<K: Ord> DependencySetBuilder<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` iff the set changed.
    pub fn add(&mut self, pair: DependencyPair<K>) -> bool {
        self.set.pairs.insert(pair)
    }

    pub fn remove(&mut self, pair: &DependencyPair<K>) -> bool {
        self.set.pairs.remove(pair)
    }

    pub fn clear(&mut self) {
        self.set.pairs.clear();
    }

    pub fn build(self) -> DependencySet<K> {
        self.set
    }
}

impl<K: Ord> Deref for DependencySetBuilder<K> {
    type Target = DependencySet<K>;

    fn deref(&self) -> &Self::Target {
        &self.set
    }
}

impl<K: Ord> FromIterator<DependencyPair<K>> for DependencySet<K> {
    fn from_iter<I: IntoIterator<Item = DependencyPair<K>>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(from: &str, to: &str) -> DependencyPair<String> {
        DependencyPair::new(from.to_string(), to.to_string())
    }

    #[test]
    fn iteration_is_sorted_regardless_of_insertion_order() {
        let mut a = DependencySetBuilder::new();
        a.add(pair("b/B", "a/A"));
        a.add(pair("a/A", "c/C"));
        a.add(pair("a/A", "b/B"));
        a.add(DependencyPair::observed("a/A".to_string()));

        let mut b = DependencySetBuilder::new();
        b.add(DependencyPair::observed("a/A".to_string()));
        b.add(pair("a/A", "b/B"));
        b.add(pair("b/B", "a/A"));
        b.add(pair("a/A", "c/C"));

        let a = a.build();
        let b = b.build();
        assert_eq!(a, b);

        let order: Vec<String> = a.iter().map(|p| p.to_string()).collect();
        assert_eq!(order, vec!["a/A", "a/A -> b/B", "a/A -> c/C", "b/B -> a/A"]);
    }

    #[test]
    fn add_reports_change_only_once() {
        let mut set = DependencySetBuilder::new();
        assert!(set.add(pair("a/A", "b/B")));
        assert!(!set.add(pair("a/A", "b/B")));
        assert!(set.contains(&pair("a/A", "b/B")));
        assert_eq!(set.len(), 1);

        assert!(set.remove(&pair("a/A", "b/B")));
        assert!(!set.remove(&pair("a/A", "b/B")));
        assert!(set.is_empty());
    }

    #[test]
    fn edges_skip_observed_markers() {
        let mut set = DependencySetBuilder::new();
        set.add(DependencyPair::observed("a/A".to_string()));
        set.add(pair("a/A", "b/B"));

        let edges: Vec<_> = set.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].0, "a/A");
        assert_eq!(edges[0].1, "b/B");
        assert_eq!(set.dependencies_of(&"a/A".to_string()).count(), 1);
    }
}
