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

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strata_core::renderer::api::*;
use strata_core::renderer::{DescriptorError, GraphicsBackend, PipelineError, ResourceError};

static NEXT_DEVICE_ID: AtomicU64 = AtomicU64::new(1);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct LayoutEntry {
    label: Option<String>,
    set_indices: Vec<u32>,
}

struct DescriptorSetEntry {
    layout: PipelineLayoutId,
    set_index: u32,
    slots: BTreeMap<u32, DescriptorData>,
}

/// One batched write recorded by [`HeadlessBackend::update_descriptor_set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorUpdate {
    /// The set that was written.
    pub set: DescriptorSetId,
    /// The binding numbers written by the batch, in submission order.
    pub bindings: Vec<u32>,
}

/// A snapshot of how often each backend entry point was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Calls to `get_queue`.
    pub get_queue: usize,
    /// Successful pipeline-layout creations.
    pub create_pipeline_layout: usize,
    /// Successful pipeline-layout frees.
    pub free_pipeline_layout: usize,
    /// Successful descriptor-set allocations.
    pub create_descriptor_set: usize,
    /// Successful descriptor-set frees.
    pub free_descriptor_set: usize,
    /// Successful batched descriptor-set updates.
    pub update_descriptor_set: usize,
    /// Successful render-pass creations.
    pub create_render_pass: usize,
    /// Successful render-pass destructions.
    pub destroy_render_pass: usize,
    /// Successful framebuffer creations.
    pub create_framebuffer: usize,
    /// Successful framebuffer destructions.
    pub destroy_framebuffer: usize,
}

#[derive(Default)]
struct Counters {
    get_queue: AtomicUsize,
    create_pipeline_layout: AtomicUsize,
    free_pipeline_layout: AtomicUsize,
    create_descriptor_set: AtomicUsize,
    free_descriptor_set: AtomicUsize,
    update_descriptor_set: AtomicUsize,
    create_render_pass: AtomicUsize,
    destroy_render_pass: AtomicUsize,
    create_framebuffer: AtomicUsize,
    destroy_framebuffer: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CallCounts {
        let load = |c: &AtomicUsize| c.load(Ordering::Relaxed);
        CallCounts {
            get_queue: load(&self.get_queue),
            create_pipeline_layout: load(&self.create_pipeline_layout),
            free_pipeline_layout: load(&self.free_pipeline_layout),
            create_descriptor_set: load(&self.create_descriptor_set),
            free_descriptor_set: load(&self.free_descriptor_set),
            update_descriptor_set: load(&self.update_descriptor_set),
            create_render_pass: load(&self.create_render_pass),
            destroy_render_pass: load(&self.destroy_render_pass),
            create_framebuffer: load(&self.create_framebuffer),
            destroy_framebuffer: load(&self.destroy_framebuffer),
        }
    }
}

/// This struct holds all the objects and state, protected by an Arc.
struct HeadlessBackendInternal {
    device_id: DeviceId,
    queue_counts: [u32; 3],
    layouts: Mutex<HashMap<PipelineLayoutId, LayoutEntry>>,
    descriptor_sets: Mutex<HashMap<DescriptorSetId, DescriptorSetEntry>>,
    render_passes: Mutex<HashMap<RenderPassId, RenderPassKey>>,
    framebuffers: Mutex<HashMap<FramebufferId, FramebufferKey>>,
    updates: Mutex<Vec<DescriptorUpdate>>,
    counters: Counters,
    next_id: AtomicU64,
    fail_next_allocation: AtomicBool,
}

/// A graphics backend that keeps every object in memory.
///
/// Handles are drawn from one increasing counter, so no two objects of any kind
/// ever share a raw id. Freeing an unknown or already-freed handle fails with
/// [`ResourceError::InvalidHandle`], which makes double frees observable, and a
/// render pass cannot be destroyed while a live framebuffer references it.
///
/// Cloning is cheap; clones share the same device state.
#[derive(Clone)]
pub struct HeadlessBackend {
    internal: Arc<HeadlessBackendInternal>,
}

impl std::fmt::Debug for HeadlessBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessBackend")
            .field("device_id", &self.internal.device_id)
            .field("counts", &self.internal.counters.snapshot())
            .finish()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Creates a device exposing one queue of each type.
    pub fn new() -> Self {
        Self::with_queue_counts(1, 1, 1)
    }

    /// Creates a device exposing the given number of graphics, compute and
    /// transfer queues.
    pub fn with_queue_counts(graphics: u32, compute: u32, transfer: u32) -> Self {
        let device_id = DeviceId(NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed));
        log::debug!("HeadlessBackend: Created device {device_id:?}");
        Self {
            internal: Arc::new(HeadlessBackendInternal {
                device_id,
                queue_counts: [graphics, compute, transfer],
                layouts: Mutex::new(HashMap::new()),
                descriptor_sets: Mutex::new(HashMap::new()),
                render_passes: Mutex::new(HashMap::new()),
                framebuffers: Mutex::new(HashMap::new()),
                updates: Mutex::new(Vec::new()),
                counters: Counters::default(),
                next_id: AtomicU64::new(1),
                fail_next_allocation: AtomicBool::new(false),
            }),
        }
    }

    // --- ID Generation Helpers ---

    fn generate_id(&self) -> u64 {
        self.internal.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn take_failure(&self) -> bool {
        self.internal
            .fail_next_allocation
            .swap(false, Ordering::AcqRel)
    }

    // --- Inspection ---

    /// Makes the next object creation of any kind fail.
    pub fn fail_next_allocation(&self) {
        self.internal
            .fail_next_allocation
            .store(true, Ordering::Release);
    }

    /// Returns how often each entry point has succeeded so far.
    pub fn call_counts(&self) -> CallCounts {
        self.internal.counters.snapshot()
    }

    /// Number of live pipeline layouts.
    pub fn live_pipeline_layouts(&self) -> usize {
        lock(&self.internal.layouts).len()
    }

    /// Number of live descriptor sets.
    pub fn live_descriptor_sets(&self) -> usize {
        lock(&self.internal.descriptor_sets).len()
    }

    /// Number of live render passes.
    pub fn live_render_passes(&self) -> usize {
        lock(&self.internal.render_passes).len()
    }

    /// Number of live framebuffers.
    pub fn live_framebuffers(&self) -> usize {
        lock(&self.internal.framebuffers).len()
    }

    /// Returns the debug label a live layout was created with.
    pub fn pipeline_layout_label(&self, id: PipelineLayoutId) -> Option<String> {
        lock(&self.internal.layouts)
            .get(&id)
            .and_then(|entry| entry.label.clone())
    }

    /// Returns the layout and set index a live descriptor set was allocated for.
    pub fn descriptor_set_info(&self, id: DescriptorSetId) -> Option<(PipelineLayoutId, u32)> {
        lock(&self.internal.descriptor_sets)
            .get(&id)
            .map(|entry| (entry.layout, entry.set_index))
    }

    /// Returns the value last written into `binding` of a live set.
    pub fn slot(&self, set: DescriptorSetId, binding: u32) -> Option<DescriptorData> {
        lock(&self.internal.descriptor_sets)
            .get(&set)
            .and_then(|entry| entry.slots.get(&binding).cloned())
    }

    /// Returns every batched update issued so far, in order.
    pub fn updates(&self) -> Vec<DescriptorUpdate> {
        lock(&self.internal.updates).clone()
    }

    /// Returns the batched updates issued against one set.
    pub fn updates_for(&self, set: DescriptorSetId) -> Vec<DescriptorUpdate> {
        lock(&self.internal.updates)
            .iter()
            .filter(|update| update.set == set)
            .cloned()
            .collect()
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn device_id(&self) -> DeviceId {
        self.internal.device_id
    }

    fn get_queue(&self, queue_type: QueueType, index: u32) -> Result<QueueId, ResourceError> {
        Counters::bump(&self.internal.counters.get_queue);
        let slot = match queue_type {
            QueueType::Graphics => 0u64,
            QueueType::Compute => 1,
            QueueType::Transfer => 2,
        };
        if index >= self.internal.queue_counts[slot as usize] {
            return Err(ResourceError::NotFound);
        }
        Ok(QueueId(
            (self.internal.device_id.0 << 32) | (slot << 16) | index as u64,
        ))
    }

    fn create_pipeline_layout(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<PipelineLayoutId, ResourceError> {
        if self.take_failure() {
            return Err(PipelineError::LayoutCreationFailed(
                "headless allocation failure injected".to_string(),
            )
            .into());
        }
        let set_indices = ParameterTable::group(descriptor.resources)
            .iter()
            .map(|table| table.set)
            .collect();
        let id = PipelineLayoutId(self.generate_id());
        lock(&self.internal.layouts).insert(
            id,
            LayoutEntry {
                label: descriptor.label.as_ref().map(|l| l.to_string()),
                set_indices,
            },
        );
        Counters::bump(&self.internal.counters.create_pipeline_layout);
        log::debug!("HeadlessBackend: Created pipeline layout {id:?}");
        Ok(id)
    }

    fn free_pipeline_layout(&self, id: PipelineLayoutId) -> Result<(), ResourceError> {
        match lock(&self.internal.layouts).remove(&id) {
            Some(_) => {
                Counters::bump(&self.internal.counters.free_pipeline_layout);
                log::debug!("HeadlessBackend: Freed pipeline layout {id:?}");
                Ok(())
            }
            None => Err(ResourceError::InvalidHandle),
        }
    }

    fn create_descriptor_set(
        &self,
        descriptor: &DescriptorSetDescriptor,
    ) -> Result<DescriptorSetId, ResourceError> {
        {
            let layouts = lock(&self.internal.layouts);
            let layout = layouts
                .get(&descriptor.layout)
                .ok_or(ResourceError::InvalidHandle)?;
            if !layout.set_indices.contains(&descriptor.set_index) {
                return Err(DescriptorError::SetIndexOutOfRange {
                    layout: descriptor.layout,
                    set_index: descriptor.set_index,
                }
                .into());
            }
        }
        if self.take_failure() {
            return Err(DescriptorError::SetAllocationFailed {
                set_index: descriptor.set_index,
                details: "headless allocation failure injected".to_string(),
            }
            .into());
        }
        let id = DescriptorSetId(self.generate_id());
        lock(&self.internal.descriptor_sets).insert(
            id,
            DescriptorSetEntry {
                layout: descriptor.layout,
                set_index: descriptor.set_index,
                slots: BTreeMap::new(),
            },
        );
        Counters::bump(&self.internal.counters.create_descriptor_set);
        Ok(id)
    }

    fn free_descriptor_set(&self, id: DescriptorSetId) -> Result<(), ResourceError> {
        match lock(&self.internal.descriptor_sets).remove(&id) {
            Some(_) => {
                Counters::bump(&self.internal.counters.free_descriptor_set);
                Ok(())
            }
            None => Err(ResourceError::InvalidHandle),
        }
    }

    fn update_descriptor_set(
        &self,
        set: DescriptorSetId,
        data: &[DescriptorData],
    ) -> Result<(), ResourceError> {
        let mut sets = lock(&self.internal.descriptor_sets);
        let entry = sets
            .get_mut(&set)
            .ok_or(DescriptorError::UnknownSet(set))?;
        for value in data {
            entry.slots.insert(value.binding, value.clone());
        }
        drop(sets);

        lock(&self.internal.updates).push(DescriptorUpdate {
            set,
            bindings: data.iter().map(|value| value.binding).collect(),
        });
        Counters::bump(&self.internal.counters.update_descriptor_set);
        Ok(())
    }

    fn create_render_pass(&self, key: &RenderPassKey) -> Result<RenderPassId, ResourceError> {
        if self.take_failure() {
            return Err(ResourceError::BackendError(
                "headless render pass creation failure injected".to_string(),
            ));
        }
        let id = RenderPassId(self.generate_id());
        lock(&self.internal.render_passes).insert(id, *key);
        Counters::bump(&self.internal.counters.create_render_pass);
        Ok(id)
    }

    fn destroy_render_pass(&self, id: RenderPassId) -> Result<(), ResourceError> {
        let referenced = lock(&self.internal.framebuffers)
            .values()
            .any(|key| key.render_pass_id() == id);
        if referenced {
            return Err(ResourceError::BackendError(format!(
                "{id:?} is still used by a live framebuffer"
            )));
        }
        match lock(&self.internal.render_passes).remove(&id) {
            Some(_) => {
                Counters::bump(&self.internal.counters.destroy_render_pass);
                Ok(())
            }
            None => Err(ResourceError::InvalidHandle),
        }
    }

    fn create_framebuffer(&self, key: &FramebufferKey) -> Result<FramebufferId, ResourceError> {
        if !lock(&self.internal.render_passes).contains_key(&key.render_pass_id()) {
            return Err(ResourceError::InvalidHandle);
        }
        if self.take_failure() {
            return Err(ResourceError::BackendError(
                "headless framebuffer creation failure injected".to_string(),
            ));
        }
        let id = FramebufferId(self.generate_id());
        lock(&self.internal.framebuffers).insert(id, *key);
        Counters::bump(&self.internal.counters.create_framebuffer);
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        match lock(&self.internal.framebuffers).remove(&id) {
            Some(_) => {
                Counters::bump(&self.internal.counters.destroy_framebuffer);
                Ok(())
            }
            None => Err(ResourceError::InvalidHandle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources() -> Vec<ShaderResource> {
        vec![
            ShaderResource::new("colorTex", ResourceType::Texture, 0, 0),
            ShaderResource::new("params", ResourceType::UniformBuffer, 2, 0),
        ]
    }

    #[test]
    fn freeing_twice_is_an_invalid_handle() {
        let backend = HeadlessBackend::new();
        let resources = resources();
        let layout = backend
            .create_pipeline_layout(&PipelineLayoutDescriptor::new(
                PipelineType::Graphics,
                &resources,
            ))
            .unwrap();
        assert!(backend.free_pipeline_layout(layout).is_ok());
        assert!(matches!(
            backend.free_pipeline_layout(layout),
            Err(ResourceError::InvalidHandle)
        ));
        assert_eq!(backend.call_counts().free_pipeline_layout, 1);
    }

    #[test]
    fn descriptor_sets_respect_declared_set_indices() {
        let backend = HeadlessBackend::new();
        let resources = resources();
        let layout = backend
            .create_pipeline_layout(&PipelineLayoutDescriptor::new(
                PipelineType::Graphics,
                &resources,
            ))
            .unwrap();
        let set = backend
            .create_descriptor_set(&DescriptorSetDescriptor {
                layout,
                set_index: 2,
            })
            .unwrap();
        assert_eq!(backend.descriptor_set_info(set), Some((layout, 2)));
        assert!(matches!(
            backend.create_descriptor_set(&DescriptorSetDescriptor {
                layout,
                set_index: 1,
            }),
            Err(ResourceError::Descriptor(
                DescriptorError::SetIndexOutOfRange { set_index: 1, .. }
            ))
        ));
    }

    #[test]
    fn one_update_call_is_one_batch() {
        let backend = HeadlessBackend::new();
        let resources = resources();
        let layout = backend
            .create_pipeline_layout(&PipelineLayoutDescriptor::new(
                PipelineType::Graphics,
                &resources,
            ))
            .unwrap();
        let set = backend
            .create_descriptor_set(&DescriptorSetDescriptor {
                layout,
                set_index: 0,
            })
            .unwrap();
        let data = [
            DescriptorData::texture("a", TextureViewId(1)).at_binding(0),
            DescriptorData::texture("b", TextureViewId(2)).at_binding(1),
        ];
        backend.update_descriptor_set(set, &data).unwrap();
        assert_eq!(backend.call_counts().update_descriptor_set, 1);
        assert_eq!(backend.updates_for(set)[0].bindings, vec![0, 1]);
        assert_eq!(backend.slot(set, 1), Some(data[1].clone()));
    }

    #[test]
    fn injected_failure_affects_one_creation() {
        let backend = HeadlessBackend::new();
        backend.fail_next_allocation();
        assert!(backend
            .create_render_pass(&RenderPassKey::new(SampleCount::X1))
            .is_err());
        assert!(backend
            .create_render_pass(&RenderPassKey::new(SampleCount::X1))
            .is_ok());
        assert_eq!(backend.live_render_passes(), 1);
    }

    #[test]
    fn queues_are_bounded_by_family_size() {
        let backend = HeadlessBackend::with_queue_counts(2, 1, 0);
        let first = backend.get_queue(QueueType::Graphics, 0).unwrap();
        let second = backend.get_queue(QueueType::Graphics, 1).unwrap();
        assert_ne!(first, second);
        assert!(matches!(
            backend.get_queue(QueueType::Transfer, 0),
            Err(ResourceError::NotFound)
        ));
    }
}
