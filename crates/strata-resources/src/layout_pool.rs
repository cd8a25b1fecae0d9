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

//! A content-addressed, reference-counted pool of pipeline layouts.
//!
//! Layouts are looked up by their [`Characteristic`]. Equal characteristics are
//! then confirmed by a full structural comparison, so a hash collision never
//! aliases two different layouts. Every registered layout is destroyed on the
//! backend exactly once, when its last reference is released or when the pool
//! is destroyed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use strata_core::renderer::api::*;
use strata_core::renderer::{GraphicsBackend, ResourceError};

use crate::pipeline_layout::PipelineLayout;

struct PoolEntry {
    layout: Arc<PipelineLayout>,
    refcount: AtomicUsize,
}

#[derive(Default)]
struct PoolState {
    by_characteristic: HashMap<Characteristic, Vec<PipelineLayoutId>>,
    entries: HashMap<PipelineLayoutId, PoolEntry>,
}

impl PoolState {
    fn find<F>(&self, characteristic: Characteristic, mut predicate: F) -> Option<&PoolEntry>
    where
        F: FnMut(&PipelineLayout) -> bool,
    {
        self.by_characteristic
            .get(&characteristic)?
            .iter()
            .filter_map(|id| self.entries.get(id))
            .find(|entry| predicate(&entry.layout))
    }

    fn unlink(&mut self, id: PipelineLayoutId, characteristic: Characteristic) -> Option<PoolEntry> {
        if let Some(bucket) = self.by_characteristic.get_mut(&characteristic) {
            bucket.retain(|candidate| *candidate != id);
            if bucket.is_empty() {
                self.by_characteristic.remove(&characteristic);
            }
        }
        self.entries.remove(&id)
    }
}

/// Counters describing pool activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Lookups that found a pooled layout.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Layouts currently registered.
    pub live_layouts: usize,
    /// Sum of the reference counts of every registered layout.
    pub total_references: usize,
}

/// A thread-safe pool deduplicating structurally identical pipeline layouts.
///
/// Lookups take a shared lock; registration and release take an exclusive one.
pub struct LayoutPool {
    backend: Arc<dyn GraphicsBackend>,
    state: RwLock<PoolState>,
    hits: AtomicU64,
    misses: AtomicU64,
    log_activity: bool,
}

impl std::fmt::Debug for LayoutPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutPool")
            .field("stats", &self.stats())
            .finish()
    }
}

impl LayoutPool {
    /// Creates an empty pool.
    pub fn new(backend: Arc<dyn GraphicsBackend>, settings: &ResourceSettings) -> Self {
        let state = PoolState {
            by_characteristic: HashMap::with_capacity(settings.layout_pool_capacity),
            entries: HashMap::with_capacity(settings.layout_pool_capacity),
        };
        Self {
            backend,
            state: RwLock::new(state),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            log_activity: settings.log_pool_activity,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, PoolState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, PoolState>, ResourceError> {
        self.state.write().map_err(|e| {
            ResourceError::BackendError(format!("Failed to lock the layout pool: {e}"))
        })
    }

    /// Looks up a pooled layout equal to the candidate described by `tables`
    /// and `descriptor`.
    ///
    /// On a hit the layout's reference count is incremented and the shared
    /// layout returned; the caller must release it with [`deallocate`](Self::deallocate).
    /// A miss returns `None` and has no side effect besides the statistics.
    pub fn try_allocate(
        &self,
        tables: &[ParameterTable],
        descriptor: &PipelineLayoutDescriptor,
    ) -> Option<Arc<PipelineLayout>> {
        let static_samplers = StaticSamplerBinding::resolve(descriptor.static_samplers, tables);
        let characteristic = Characteristic::compute(
            tables,
            descriptor.push_constants,
            &static_samplers,
            descriptor.pipeline_type,
        );

        let state = self.read_state();
        let found = state.find(characteristic, |layout| {
            layout.matches(
                tables,
                descriptor.push_constants,
                &static_samplers,
                descriptor.pipeline_type,
            )
        });
        match found {
            Some(entry) => {
                let refs = entry.refcount.fetch_add(1, Ordering::AcqRel) + 1;
                self.hits.fetch_add(1, Ordering::Relaxed);
                if self.log_activity {
                    log::debug!(
                        "LayoutPool: Hit for {:?} ({:?}), {} references",
                        entry.layout.id(),
                        characteristic,
                        refs
                    );
                }
                Some(entry.layout.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                if self.log_activity {
                    log::debug!("LayoutPool: Miss for {characteristic:?}");
                }
                None
            }
        }
    }

    /// Registers a freshly created layout.
    ///
    /// If an equal layout was registered in the meantime, the new backend object
    /// is destroyed and the pooled layout is returned with its reference count
    /// incremented. Otherwise the layout is registered with a count of one.
    pub fn insert(&self, layout: PipelineLayout) -> Result<Arc<PipelineLayout>, ResourceError> {
        let mut state = self.write_state()?;
        if let Some(entry) = state.find(layout.characteristic(), |pooled| pooled.matches_layout(&layout)) {
            self.backend.free_pipeline_layout(layout.id())?;
            entry.refcount.fetch_add(1, Ordering::AcqRel);
            log::debug!(
                "LayoutPool: Discarded duplicate {:?} in favor of pooled {:?}",
                layout.id(),
                entry.layout.id()
            );
            return Ok(entry.layout.clone());
        }

        let id = layout.id();
        let characteristic = layout.characteristic();
        let layout = Arc::new(layout);
        state
            .by_characteristic
            .entry(characteristic)
            .or_default()
            .push(id);
        state.entries.insert(
            id,
            PoolEntry {
                layout: layout.clone(),
                refcount: AtomicUsize::new(1),
            },
        );
        if self.log_activity {
            log::debug!("LayoutPool: Registered {id:?} ({characteristic:?})");
        }
        Ok(layout)
    }

    /// Builds or reuses the layout described by `descriptor`.
    pub fn acquire(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<Arc<PipelineLayout>, ResourceError> {
        let tables = ParameterTable::group(descriptor.resources);
        if let Some(layout) = self.try_allocate(&tables, descriptor) {
            return Ok(layout);
        }
        let id = self.backend.create_pipeline_layout(descriptor)?;
        self.insert(PipelineLayout::from_parts(id, descriptor, tables))
    }

    /// Releases one reference to a layout.
    ///
    /// `layout` may be the pooled instance or any structurally equal layout; it is
    /// resolved to the pooled one first. Returns `true` when this call released
    /// the last reference and the backend object was destroyed. Releasing a
    /// layout the pool does not know is logged and ignored.
    pub fn deallocate(&self, layout: &PipelineLayout) -> Result<bool, ResourceError> {
        let mut state = self.write_state()?;
        let canonical = if state.entries.contains_key(&layout.id()) {
            Some(layout.id())
        } else {
            state
                .find(layout.characteristic(), |pooled| pooled.matches_layout(layout))
                .map(|entry| entry.layout.id())
        };
        let Some(id) = canonical else {
            log::warn!(
                "LayoutPool: Deallocating {:?}, which is not pooled. Ignoring.",
                layout.id()
            );
            return Ok(false);
        };

        let remaining = match state.entries.get(&id) {
            Some(entry) => entry.refcount.fetch_sub(1, Ordering::AcqRel) - 1,
            None => return Ok(false),
        };
        if remaining > 0 {
            return Ok(false);
        }

        state.unlink(id, layout.characteristic());
        drop(state);
        self.backend.free_pipeline_layout(id)?;
        if self.log_activity {
            log::debug!("LayoutPool: Destroyed {id:?}");
        }
        Ok(true)
    }

    /// Returns every registered layout, ordered by handle.
    pub fn get_all_layouts(&self) -> Vec<Arc<PipelineLayout>> {
        let state = self.read_state();
        let mut layouts: Vec<_> = state
            .entries
            .values()
            .map(|entry| entry.layout.clone())
            .collect();
        layouts.sort_by_key(|layout| layout.id());
        layouts
    }

    /// Returns the current reference count of a registered layout.
    pub fn reference_count(&self, id: PipelineLayoutId) -> Option<usize> {
        self.read_state()
            .entries
            .get(&id)
            .map(|entry| entry.refcount.load(Ordering::Acquire))
    }

    /// Returns a snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.read_state();
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            live_layouts: state.entries.len(),
            total_references: state
                .entries
                .values()
                .map(|entry| entry.refcount.load(Ordering::Acquire))
                .sum(),
        }
    }

    /// Destroys every registered layout regardless of its reference count.
    ///
    /// Layouts still referenced are reported. Every layout is attempted; the
    /// first backend error is returned.
    pub fn destroy(&self) -> Result<(), ResourceError> {
        let drained: Vec<PoolEntry> = {
            let mut state = self.write_state()?;
            state.by_characteristic.clear();
            state.entries.drain().map(|(_, entry)| entry).collect()
        };
        if !drained.is_empty() {
            log::info!("LayoutPool: Destroying {} pipeline layouts", drained.len());
        }

        let mut result = Ok(());
        for entry in drained {
            let refs = entry.refcount.load(Ordering::Acquire);
            if refs > 0 {
                log::warn!(
                    "LayoutPool: {:?} still has {} references at teardown",
                    entry.layout.id(),
                    refs
                );
            }
            if let Err(e) = self.backend.free_pipeline_layout(entry.layout.id()) {
                log::error!(
                    "LayoutPool: Failed to destroy {:?}: {}",
                    entry.layout.id(),
                    e
                );
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

impl Drop for LayoutPool {
    fn drop(&mut self) {
        let live = self.read_state().entries.len();
        if live > 0 {
            if let Err(e) = self.destroy() {
                log::error!("LayoutPool: Teardown on drop failed: {e}");
            }
        }
    }
}
