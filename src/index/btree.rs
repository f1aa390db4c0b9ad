//! BTreeMap-based index structures
//!
//! Indexes use BTreeMap<Key, Vec<PrimaryKey>> for deterministic ordering.
//! Primary keys under one index key are always sorted ascending.

use std::collections::btree_map;
use std::collections::BTreeMap;

use super::key::Key;
use super::range::{Direction, KeyRange};

/// Primary key type
pub type PrimaryKey = u64;

/// A single field index using BTreeMap for deterministic ordering.
#[derive(Debug, Default)]
pub struct IndexTree {
    tree: BTreeMap<Key, Vec<PrimaryKey>>,
    unique: bool,
}

impl IndexTree {
    /// Creates a new empty index tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index that admits at most one primary key per key
    pub fn unique() -> Self {
        Self {
            tree: BTreeMap::new(),
            unique: true,
        }
    }

    /// Returns true if the index rejects duplicate keys
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns true if inserting `key` for `pk` would violate uniqueness
    pub fn conflicts(&self, key: &Key, pk: PrimaryKey) -> bool {
        self.unique
            && self
                .tree
                .get(key)
                .is_some_and(|pks| pks.iter().any(|existing| *existing != pk))
    }

    /// Insert a primary key for a key.
    ///
    /// Maintains sorted ascending order. Returns false on a unique conflict.
    pub fn insert(&mut self, key: Key, pk: PrimaryKey) -> bool {
        if self.conflicts(&key, pk) {
            return false;
        }
        let pks = self.tree.entry(key).or_default();
        if let Err(pos) = pks.binary_search(&pk) {
            pks.insert(pos, pk);
        }
        true
    }

    /// Remove a primary key for a key.
    ///
    /// If the key has no more entries, removes the key entirely.
    pub fn remove(&mut self, key: &Key, pk: PrimaryKey) {
        if let Some(pks) = self.tree.get_mut(key) {
            if let Ok(pos) = pks.binary_search(&pk) {
                pks.remove(pos);
            }
            if pks.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// Lookup all primary keys for an exact key match, ascending.
    pub fn lookup_eq(&self, key: &Key) -> &[PrimaryKey] {
        self.tree.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates `(key, primary key)` entries inside `range` in `direction`.
    ///
    /// Descending order reverses both the key order and the primary key
    /// order under each key.
    pub fn entries<'t>(&'t self, range: &KeyRange, direction: Direction) -> IndexEntries<'t> {
        IndexEntries {
            range: self.tree.range::<Key, _>(range.bounds()),
            current: None,
            direction,
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the total number of entries
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(|v| v.len()).sum()
    }
}

/// Ordered iterator over the entries of one key range
pub struct IndexEntries<'t> {
    range: btree_map::Range<'t, Key, Vec<PrimaryKey>>,
    current: Option<(&'t Key, std::slice::Iter<'t, PrimaryKey>)>,
    direction: Direction,
}

impl<'t> Iterator for IndexEntries<'t> {
    type Item = (&'t Key, PrimaryKey);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, pks)) = self.current.as_mut() {
                let next = match self.direction {
                    Direction::Ascending => pks.next(),
                    Direction::Descending => pks.next_back(),
                };
                if let Some(pk) = next {
                    return Some((*key, *pk));
                }
            }

            let (key, pks) = match self.direction {
                Direction::Ascending => self.range.next()?,
                Direction::Descending => self.range.next_back()?,
            };
            self.current = Some((key, pks.iter()));
        }
    }
}
