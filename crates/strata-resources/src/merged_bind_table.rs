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

//! Combining several bind tables of one layout into a single bindable set list.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_core::renderer::api::*;
use strata_core::renderer::{DescriptorSetBinder, GraphicsBackend, ResourceError};

use crate::bind_table::BindTable;
use crate::pipeline_layout::PipelineLayout;

/// The set chosen for one table index after a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedSet {
    /// No input table touches this index; nothing is bound.
    #[default]
    Empty,
    /// Exactly one input touches this index; its set is reused as is.
    Borrowed(DescriptorSetId),
    /// Several inputs overlap; the merged table's own set at this index is used.
    Owned(usize),
}

/// A bind table formed from several bind tables that share a layout.
///
/// For each table index, [`merge`](Self::merge) counts the inputs that
/// allocated a set there. With none the index stays empty, with one that set is
/// borrowed, and with two or more the staged values of every contributor are
/// written into a set owned by the merged table, created on first need and
/// reused by later merges.
///
/// Borrowed sets still belong to their bind table, which must outlive every
/// bind of the merged table. A merge rewrites owned sets in place, so it must
/// happen before recording any command that consumes the previous result.
pub struct MergedBindTable {
    backend: Arc<dyn GraphicsBackend>,
    layout: Arc<PipelineLayout>,
    copied: Vec<Option<DescriptorSetId>>,
    merged: Vec<Option<DescriptorSetId>>,
    result: Vec<ResolvedSet>,
}

impl std::fmt::Debug for MergedBindTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergedBindTable")
            .field("layout", &self.layout.id())
            .field("result", &self.result)
            .finish()
    }
}

impl MergedBindTable {
    /// Creates an empty merged table. No set is allocated until a merge needs one.
    pub fn create(backend: Arc<dyn GraphicsBackend>, layout: Arc<PipelineLayout>) -> Self {
        let count = layout.table_count();
        Self {
            backend,
            layout,
            copied: vec![None; count],
            merged: vec![None; count],
            result: vec![ResolvedSet::Empty; count],
        }
    }

    /// Resolves every table index from `tables`.
    ///
    /// Inputs built against a different layout are skipped with a warning.
    /// Returns the number of backend update calls issued.
    pub fn merge(&mut self, tables: &[&BindTable]) -> Result<usize, ResourceError> {
        let layout_id = self.layout.id();
        let inputs: Vec<&BindTable> = tables
            .iter()
            .copied()
            .filter(|table| {
                let compatible = table.layout().id() == layout_id;
                if !compatible {
                    log::warn!(
                        "MergedBindTable: Skipping bind table of {:?}, expected {:?}",
                        table.layout().id(),
                        layout_id
                    );
                }
                compatible
            })
            .collect();

        let mut calls = 0;
        for table_index in 0..self.result.len() {
            let contributors: Vec<(&BindTable, DescriptorSetId)> = inputs
                .iter()
                .filter_map(|table| table.descriptor_set(table_index).map(|set| (*table, set)))
                .collect();

            match contributors.as_slice() {
                [] => {
                    self.copied[table_index] = None;
                    self.result[table_index] = ResolvedSet::Empty;
                }
                [(_, set)] => {
                    self.copied[table_index] = Some(*set);
                    self.result[table_index] = ResolvedSet::Borrowed(*set);
                }
                overlapping => {
                    let set = match self.merged[table_index] {
                        Some(set) => set,
                        None => {
                            let descriptor = DescriptorSetDescriptor {
                                layout: layout_id,
                                set_index: self.layout.tables()[table_index].set,
                            };
                            let set = self.backend.create_descriptor_set(&descriptor)?;
                            log::debug!(
                                "MergedBindTable: Created {set:?} for overlapping table {table_index}"
                            );
                            self.merged[table_index] = Some(set);
                            set
                        }
                    };

                    // Later inputs win when two tables stage the same binding.
                    let mut values: BTreeMap<u32, DescriptorData> = BTreeMap::new();
                    for (table, _) in overlapping {
                        for value in table.staged_values(table_index) {
                            values.insert(value.binding, value.clone());
                        }
                    }
                    let batch: Vec<DescriptorData> = values.into_values().collect();
                    if !batch.is_empty() {
                        self.backend.update_descriptor_set(set, &batch)?;
                        calls += 1;
                    }

                    self.copied[table_index] = None;
                    self.result[table_index] = ResolvedSet::Owned(table_index);
                }
            }
        }
        Ok(calls)
    }

    /// Binds every resolved set in ascending table order.
    pub fn bind<E: DescriptorSetBinder + ?Sized>(&self, encoder: &mut E) {
        for (table_index, resolved) in self.result.iter().enumerate() {
            if let Some(set) = self.resolve(*resolved) {
                encoder.bind_descriptor_set(self.layout.tables()[table_index].set, set);
            }
        }
    }

    fn resolve(&self, resolved: ResolvedSet) -> Option<DescriptorSetId> {
        match resolved {
            ResolvedSet::Empty => None,
            ResolvedSet::Borrowed(set) => Some(set),
            ResolvedSet::Owned(slot) => self.merged.get(slot).copied().flatten(),
        }
    }

    /// Frees the owned sets. Borrowed sets are left to their bind tables.
    pub fn free(mut self) -> Result<(), ResourceError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ResourceError> {
        let mut result = Ok(());
        for set in self.merged.iter_mut().filter_map(Option::take) {
            if let Err(e) = self.backend.free_descriptor_set(set) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        self.copied.iter_mut().for_each(|slot| *slot = None);
        self.result.iter_mut().for_each(|slot| *slot = ResolvedSet::Empty);
        result
    }

    /// The layout this table binds into.
    pub fn layout(&self) -> &Arc<PipelineLayout> {
        &self.layout
    }

    /// How a table index was resolved by the last merge.
    pub fn resolved(&self, table_index: usize) -> ResolvedSet {
        self.result
            .get(table_index)
            .copied()
            .unwrap_or_default()
    }

    /// The set that will be bound at a table index.
    pub fn result_set(&self, table_index: usize) -> Option<DescriptorSetId> {
        self.resolve(self.resolved(table_index))
    }

    /// The set borrowed from an input at a table index.
    pub fn copied_set(&self, table_index: usize) -> Option<DescriptorSetId> {
        self.copied.get(table_index).copied().flatten()
    }

    /// Number of sets this table owns.
    pub fn owned_set_count(&self) -> usize {
        self.merged.iter().flatten().count()
    }
}

impl Drop for MergedBindTable {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("MergedBindTable: Failed to free merged sets on drop: {e}");
        }
    }
}
