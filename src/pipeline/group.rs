//! Grouping engine
//!
//! Partitions a fully drained upstream into groups keyed by a selector.
//! Groups come out in first-occurrence order of their keys; members keep
//! upstream order within a group.

use std::hash::Hash;

use indexmap::map::Entry;
use indexmap::IndexMap;

/// A key and its ordered members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group<K, V> {
    key: K,
    values: Vec<V>,
}

impl<K, V> Group<K, V> {
    pub fn new(key: K, values: Vec<V>) -> Self {
        Group { key, values }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Members in upstream order. Feed to `Query::from_slice` to run a
    /// nested pipeline over one group.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_parts(self) -> (K, Vec<V>) {
        (self.key, self.values)
    }
}

/// Insertion-ordered key to members mapping.
#[derive(Clone, Debug)]
pub struct Grouping<K, V> {
    groups: IndexMap<K, Vec<V>>,
    /// Total members across all groups
    members: usize,
}

impl<K: Hash + Eq, V> Grouping<K, V> {
    pub fn new() -> Self {
        Grouping {
            groups: IndexMap::new(),
            members: 0,
        }
    }

    /// Append `value` to the group for `key`, opening the group on first sight.
    pub fn push(&mut self, key: K, value: V) {
        match self.groups.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
            Entry::Vacant(entry) => {
                entry.insert(vec![value]);
            }
        }
        self.members += 1;
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of grouped values
    pub fn members(&self) -> usize {
        self.members
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.keys()
    }

    pub fn into_groups(self) -> Vec<Group<K, V>> {
        self.groups
            .into_iter()
            .map(|(key, values)| Group::new(key, values))
            .collect()
    }
}

impl<K: Hash + Eq, V> Default for Grouping<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for Grouping<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut grouping = Grouping::new();
        for (key, value) in iter {
            grouping.push(key, value);
        }
        grouping
    }
}
