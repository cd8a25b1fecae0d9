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

//! Name-indexed binding of resources into a pipeline layout's descriptor sets.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use strata_core::renderer::api::*;
use strata_core::renderer::{DescriptorSetBinder, GraphicsBackend, ResourceError};

use crate::pipeline_layout::PipelineLayout;

/// Where a named resource lives, and the value staged for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindTableLocation {
    /// Index into the layout's tables.
    pub table_index: usize,
    /// Binding number inside the table.
    pub binding: u32,
    value: Option<DescriptorData>,
    flushed: bool,
}

impl BindTableLocation {
    /// The staged value, if one was ever written.
    pub fn value(&self) -> Option<&DescriptorData> {
        self.value.as_ref()
    }

    /// Whether the staged value has reached the backend.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }
}

/// Binds resources by shader name into the descriptor sets of one layout.
///
/// A descriptor set is allocated only for the table indices that at least one
/// requested name resolves to. Values are staged per location and written to
/// the backend lazily: each [`update`](Self::update) issues at most one batched
/// write per touched table index, and restaging an unchanged value writes nothing.
///
/// The table owns the sets it allocated and frees them on [`free`](Self::free)
/// or drop.
pub struct BindTable {
    backend: Arc<dyn GraphicsBackend>,
    layout: Arc<PipelineLayout>,
    names: HashMap<String, usize>,
    locations: Vec<BindTableLocation>,
    sets: Vec<Option<DescriptorSetId>>,
}

impl std::fmt::Debug for BindTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindTable")
            .field("layout", &self.layout.id())
            .field("locations", &self.locations.len())
            .field("sets", &self.sets)
            .finish()
    }
}

impl BindTable {
    /// Resolves `names` against `layout` and allocates the sets they touch.
    ///
    /// Names the layout does not declare are skipped; a shader compiler may have
    /// optimized the binding out. A failed allocation releases the sets created
    /// so far and is returned.
    pub fn create(
        backend: Arc<dyn GraphicsBackend>,
        layout: Arc<PipelineLayout>,
        names: &[&str],
    ) -> Result<Self, ResourceError> {
        let mut table = Self {
            sets: vec![None; layout.table_count()],
            backend,
            layout,
            names: HashMap::with_capacity(names.len()),
            locations: Vec::with_capacity(names.len()),
        };

        for name in names {
            if table.names.contains_key(*name) {
                continue;
            }
            let Some((table_index, binding)) = table
                .layout
                .find_resource(name)
                .map(|(index, resource)| (index, resource.binding))
            else {
                log::debug!(
                    "BindTable: '{}' is not declared by {:?}, skipping",
                    name,
                    table.layout.id()
                );
                continue;
            };

            if table.sets[table_index].is_none() {
                let descriptor = DescriptorSetDescriptor {
                    layout: table.layout.id(),
                    set_index: table.layout.tables()[table_index].set,
                };
                // On error the partially built table drops and frees its sets.
                let set = table.backend.create_descriptor_set(&descriptor)?;
                table.sets[table_index] = Some(set);
            }

            table.names.insert(name.to_string(), table.locations.len());
            table.locations.push(BindTableLocation {
                table_index,
                binding,
                value: None,
                flushed: true,
            });
        }
        Ok(table)
    }

    /// Stages `data` and flushes every changed location.
    ///
    /// Values are matched to locations by name; unnamed values are rejected with
    /// a warning and unknown names are ignored. Returns the number of backend
    /// update calls issued, which is at most one per table index.
    pub fn update(&mut self, data: &[DescriptorData]) -> Result<usize, ResourceError> {
        for value in data {
            let Some(name) = value.name.as_deref() else {
                log::warn!("BindTable: Ignoring descriptor data without a name");
                continue;
            };
            let Some(&index) = self.names.get(name) else {
                continue;
            };
            let location = &mut self.locations[index];
            let staged = value.at_binding(location.binding);
            if location.value.as_ref() != Some(&staged) {
                location.value = Some(staged);
                location.flushed = false;
            }
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<usize, ResourceError> {
        let mut dirty: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (index, location) in self.locations.iter().enumerate() {
            if !location.flushed {
                dirty.entry(location.table_index).or_default().push(index);
            }
        }

        let mut calls = 0;
        for (table_index, indices) in dirty {
            let Some(set) = self.sets[table_index] else {
                continue;
            };
            let batch: Vec<DescriptorData> = indices
                .iter()
                .filter_map(|&i| self.locations[i].value.clone())
                .collect();
            self.backend.update_descriptor_set(set, &batch)?;
            calls += 1;
            for i in indices {
                self.locations[i].flushed = true;
            }
        }
        Ok(calls)
    }

    /// Binds every allocated set in ascending table order.
    pub fn bind<E: DescriptorSetBinder + ?Sized>(&self, encoder: &mut E) {
        for (table_index, set) in self.sets.iter().enumerate() {
            if let Some(set) = set {
                encoder.bind_descriptor_set(self.layout.tables()[table_index].set, *set);
            }
        }
    }

    /// Frees the owned descriptor sets and drops every staged value.
    pub fn free(mut self) -> Result<(), ResourceError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ResourceError> {
        let mut result = Ok(());
        for set in self.sets.iter_mut().filter_map(Option::take) {
            if let Err(e) = self.backend.free_descriptor_set(set) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        self.locations.clear();
        self.names.clear();
        result
    }

    /// The layout this table binds into.
    pub fn layout(&self) -> &Arc<PipelineLayout> {
        &self.layout
    }

    /// The location a name resolved to.
    pub fn location(&self, name: &str) -> Option<&BindTableLocation> {
        self.names.get(name).map(|&index| &self.locations[index])
    }

    /// Whether the value staged for `name` has been flushed.
    pub fn is_flushed(&self, name: &str) -> Option<bool> {
        self.location(name).map(BindTableLocation::is_flushed)
    }

    /// The set allocated for a table index, if any.
    pub fn descriptor_set(&self, table_index: usize) -> Option<DescriptorSetId> {
        self.sets.get(table_index).copied().flatten()
    }

    /// One entry per table index; `None` where no name resolved.
    pub fn descriptor_sets(&self) -> &[Option<DescriptorSetId>] {
        &self.sets
    }

    /// Number of allocated sets.
    pub fn allocated_set_count(&self) -> usize {
        self.sets.iter().flatten().count()
    }

    /// Staged values of one table index.
    pub(crate) fn staged_values(&self, table_index: usize) -> impl Iterator<Item = &DescriptorData> {
        self.locations
            .iter()
            .filter(move |location| location.table_index == table_index)
            .filter_map(|location| location.value.as_ref())
    }
}

impl Drop for BindTable {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("BindTable: Failed to free descriptor sets on drop: {e}");
        }
    }
}
