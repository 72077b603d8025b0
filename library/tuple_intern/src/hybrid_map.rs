//! Map keyed by [`Item`] that holds reference-type keys weakly.
//!
//! Value-type keys (`Null`, `Bool`, `Int`, `Float`, `Str`) live in a strong
//! map and are compared by exact value. Reference-type keys (`Object`,
//! `Tuple`) live in a weak map keyed by identity: the map keeps only a
//! `Weak` handle to the key, so an entry dies as soon as nothing else keeps
//! its key alive. Dead entries are invisible to [`HybridMap::get`] and are
//! dropped by [`HybridMap::sweep`].
//!
//! Both stores are allocated on first insert of their kind.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::item::{EdgeKey, Item, ValueKey, WeakRef};

/// A weakly-keyed entry: the key's liveness handle and the stored value.
struct WeakEntry<V> {
    key: WeakRef,
    value: V,
}

/// Map from [`Item`] keys to `V`, weak on reference-type keys.
pub struct HybridMap<V> {
    /// Reference-type keys by identity address.
    weak: Option<FxHashMap<usize, WeakEntry<V>>>,
    /// Value-type keys by value.
    strong: Option<FxHashMap<ValueKey, V>>,
}

impl<V> HybridMap<V> {
    /// Create an empty map. Allocates nothing.
    pub const fn new() -> Self {
        HybridMap {
            weak: None,
            strong: None,
        }
    }

    /// Look up `key`. Absent (or dead) keys yield `None`.
    pub fn get(&self, key: &Item) -> Option<&V> {
        if let Some(addr) = key.ref_addr() {
            let entry = self.weak.as_ref()?.get(&addr)?;
            return entry.key.is_alive().then_some(&entry.value);
        }
        let value_key = key.value_key()?;
        self.strong.as_ref()?.get(&value_key)
    }

    /// Insert or replace the value stored under `key`.
    ///
    /// Returns a reference to the stored value rather than the map, which is
    /// what get-or-create callers want.
    pub fn set(&mut self, key: &Item, value: V) -> &V {
        match key.edge_key() {
            EdgeKey::Weak { addr, handle } => {
                let entry = WeakEntry { key: handle, value };
                let map = self.weak.get_or_insert_with(FxHashMap::default);
                match map.entry(addr) {
                    Entry::Occupied(mut occupied) => {
                        occupied.insert(entry);
                        &occupied.into_mut().value
                    }
                    Entry::Vacant(vacant) => &vacant.insert(entry).value,
                }
            }
            EdgeKey::Strong(value_key) => {
                let map = self.strong.get_or_insert_with(FxHashMap::default);
                match map.entry(value_key) {
                    Entry::Occupied(mut occupied) => {
                        occupied.insert(value);
                        occupied.into_mut()
                    }
                    Entry::Vacant(vacant) => vacant.insert(value),
                }
            }
        }
    }

    /// Drop every entry whose weakly-held key has died.
    ///
    /// Returns the number of entries removed. Value-type entries are never
    /// removed.
    pub fn sweep(&mut self) -> usize {
        let Some(weak) = self.weak.as_mut() else {
            return 0;
        };
        let before = weak.len();
        weak.retain(|_, entry| entry.key.is_alive());
        before - weak.len()
    }

    /// Number of entries, dead weak entries included until swept.
    pub fn len(&self) -> usize {
        self.weak_len() + self.strong_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of reference-type entries, dead ones included until swept.
    pub fn weak_len(&self) -> usize {
        self.weak.as_ref().map_or(0, FxHashMap::len)
    }

    /// Number of value-type entries.
    pub fn strong_len(&self) -> usize {
        self.strong.as_ref().map_or(0, FxHashMap::len)
    }

    /// Iterate values whose key is a live reference or a value.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        let weak = self
            .weak
            .iter()
            .flat_map(|map| map.values())
            .filter(|entry| entry.key.is_alive())
            .map(|entry| &entry.value);
        let strong = self.strong.iter().flat_map(|map| map.values());
        weak.chain(strong)
    }

    /// Iterate every value, dead weak entries included.
    pub(crate) fn all_values(&self) -> impl Iterator<Item = &V> {
        let weak = self
            .weak
            .iter()
            .flat_map(|map| map.values())
            .map(|entry| &entry.value);
        weak.chain(self.strong.iter().flat_map(|map| map.values()))
    }

    /// Remove and return every value, live or dead.
    pub(crate) fn take_values(&mut self) -> Vec<V> {
        let weak = self.weak.take().into_iter().flatten().map(|(_, e)| e.value);
        let strong = self.strong.take().into_iter().flatten().map(|(_, v)| v);
        weak.chain(strong).collect()
    }
}

impl<V> Default for HybridMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
