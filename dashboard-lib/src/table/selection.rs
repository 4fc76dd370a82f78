//! Row selection keyed by record identifier.

use std::collections::HashSet;
use std::hash::Hash;

/// Tracks selected rows by their keys.
///
/// Keys stay selected when the rows they name leave the current page or the
/// filtered view; only an explicit deselect or [`Selection::clear`] drops them.
#[derive(Debug, Clone)]
pub struct Selection<K: Clone + Eq + Hash> {
    selected: HashSet<K>,
}

impl<K: Clone + Eq + Hash> Default for Selection<K> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> Selection<K> {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle selection for a key. Returns true if the key is now selected.
    pub fn toggle(&mut self, key: K) -> bool {
        if self.selected.remove(&key) {
            false
        } else {
            self.selected.insert(key);
            true
        }
    }

    /// Select or deselect a single key.
    pub fn set(&mut self, key: K, selected: bool) {
        if selected {
            self.selected.insert(key);
        } else {
            self.selected.remove(&key);
        }
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    /// Add every key to the selection.
    pub fn select_many<I: IntoIterator<Item = K>>(&mut self, keys: I) {
        self.selected.extend(keys);
    }

    /// Remove every key from the selection.
    pub fn deselect_many<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        for key in keys {
            self.selected.remove(key);
        }
    }

    /// Clear all selections.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get all selected keys, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }
}

impl<K: Clone + Eq + Hash + Ord> Selection<K> {
    /// Selected keys in ascending order.
    pub fn sorted(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.selected.iter().cloned().collect();
        keys.sort();
        keys
    }
}
