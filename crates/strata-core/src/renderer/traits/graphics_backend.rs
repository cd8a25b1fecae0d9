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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The primitives the resource-layout layer consumes from a graphics backend.
///
/// Implementations wrap a single logical device. Every handle they return is
/// opaque; ownership rules are enforced by the callers in `strata-resources`,
/// which destroy each object they create exactly once.
pub trait GraphicsBackend: Send + Sync + Debug + 'static {
    /// Returns the identity of the logical device this backend wraps.
    fn device_id(&self) -> DeviceId;

    /// Retrieves a queue of the device.
    /// ## Arguments
    /// * `queue_type` - The capability class of the queue.
    /// * `index` - The queue index inside that class.
    /// ## Returns
    /// A `Result` containing the queue handle.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the device exposes no such queue.
    fn get_queue(&self, queue_type: QueueType, index: u32) -> Result<QueueId, ResourceError>;

    /// Creates a pipeline layout from the provided descriptor.
    /// ## Arguments
    /// * `descriptor` - A reference to a `PipelineLayoutDescriptor` containing the layout configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created pipeline layout or an error if the creation fails.
    /// ## Errors
    /// * `ResourceError` - If the pipeline layout creation fails.
    fn create_pipeline_layout(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<PipelineLayoutId, ResourceError>;

    /// Destroys the pipeline layout associated with the given ID.
    /// ## Arguments
    /// * `id` - The ID of the pipeline layout to be destroyed.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the layout is not live.
    fn free_pipeline_layout(&self, id: PipelineLayoutId) -> Result<(), ResourceError>;

    /// Allocates a descriptor set for one set index of a pipeline layout.
    /// ## Arguments
    /// * `descriptor` - The layout and set index to allocate against.
    /// ## Returns
    /// A `Result` containing the ID of the new descriptor set.
    /// ## Errors
    /// * `ResourceError::Descriptor` - If the allocation fails.
    fn create_descriptor_set(
        &self,
        descriptor: &DescriptorSetDescriptor,
    ) -> Result<DescriptorSetId, ResourceError>;

    /// Frees a descriptor set.
    /// ## Arguments
    /// * `id` - The ID of the descriptor set to be freed.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn free_descriptor_set(&self, id: DescriptorSetId) -> Result<(), ResourceError>;

    /// Writes a batch of slot values into a descriptor set.
    ///
    /// One call is one backend update, regardless of how many slots it writes.
    /// ## Arguments
    /// * `set` - The descriptor set to update.
    /// * `data` - The slot values, each carrying its binding number.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn update_descriptor_set(
        &self,
        set: DescriptorSetId,
        data: &[DescriptorData],
    ) -> Result<(), ResourceError>;

    /// Creates a render pass matching the given key.
    /// ## Arguments
    /// * `key` - The attachment formats, actions and sample count.
    /// ## Returns
    /// A `Result` containing the ID of the created render pass.
    fn create_render_pass(&self, key: &RenderPassKey) -> Result<RenderPassId, ResourceError>;

    /// Destroys a render pass.
    fn destroy_render_pass(&self, id: RenderPassId) -> Result<(), ResourceError>;

    /// Creates a framebuffer matching the given key.
    /// ## Arguments
    /// * `key` - The render pass, image views and extent.
    /// ## Returns
    /// A `Result` containing the ID of the created framebuffer.
    fn create_framebuffer(&self, key: &FramebufferKey) -> Result<FramebufferId, ResourceError>;

    /// Destroys a framebuffer.
    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError>;
}
