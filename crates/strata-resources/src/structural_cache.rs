// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A cache keyed by the exact byte content of a plain-old-data descriptor.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use bytemuck::Pod;
use strata_core::hash::{pod_eq, pod_hash};

#[derive(Clone, Copy)]
struct PodKey<K: Pod>(K);

impl<K: Pod> Hash for PodKey<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(pod_hash(&self.0));
    }
}

impl<K: Pod> PartialEq for PodKey<K> {
    fn eq(&self, other: &Self) -> bool {
        pod_eq(&self.0, &other.0)
    }
}

impl<K: Pod> Eq for PodKey<K> {}

struct CacheEntry<V> {
    handle: V,
    order: u64,
}

/// Maps descriptors to backend handles by structural identity.
///
/// Two keys with identical bytes always map to the same entry, wherever they
/// were built. Adding a key that is already present keeps the new handle and
/// moves the old one to a displaced list, so [`drain`](Self::drain) still
/// returns every handle ever added exactly once.
pub struct StructuralCache<K: Pod, V: Copy + PartialEq> {
    kind: &'static str,
    entries: HashMap<PodKey<K>, CacheEntry<V>>,
    displaced: Vec<V>,
    next_order: u64,
    warn_on_duplicate: bool,
}

impl<K: Pod, V: Copy + PartialEq> std::fmt::Debug for StructuralCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralCache")
            .field("kind", &self.kind)
            .field("len", &self.entries.len())
            .field("displaced", &self.displaced.len())
            .finish()
    }
}

impl<K: Pod, V: Copy + PartialEq> StructuralCache<K, V> {
    /// Creates an empty cache. `kind` names the cached objects in log output.
    pub fn new(kind: &'static str, capacity: usize, warn_on_duplicate: bool) -> Self {
        Self {
            kind,
            entries: HashMap::with_capacity(capacity),
            displaced: Vec::new(),
            next_order: 0,
            warn_on_duplicate,
        }
    }

    /// Returns the handle cached for `key`.
    pub fn try_find(&self, key: &K) -> Option<V> {
        self.entries.get(&PodKey(*key)).map(|entry| entry.handle)
    }

    /// Caches `handle` for `key`, returning the handle it displaced.
    pub fn add(&mut self, key: K, handle: V) -> Option<V> {
        let order = self.next_order;
        self.next_order += 1;
        let previous = self
            .entries
            .insert(PodKey(key), CacheEntry { handle, order })
            .map(|entry| entry.handle);
        if let Some(old) = previous {
            if self.warn_on_duplicate {
                log::warn!(
                    "StructuralCache: Duplicate {} insertion; the new handle replaces the cached one",
                    self.kind
                );
            }
            if old != handle {
                self.displaced.push(old);
            }
        }
        previous
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> {
        let mut entries: Vec<(u64, K, V)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.order, key.0, entry.handle))
            .collect();
        entries.sort_by_key(|(order, _, _)| *order);
        entries.into_iter().map(|(_, key, handle)| (key, handle))
    }

    /// Empties the cache, returning every cached handle in insertion order
    /// followed by the displaced ones.
    pub fn drain(&mut self) -> Vec<V> {
        let mut handles: Vec<V> = self.iter().map(|(_, handle)| handle).collect();
        handles.append(&mut self.displaced);
        self.entries.clear();
        handles
    }
}
