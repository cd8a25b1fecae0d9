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

//! Defines descriptor sets and the values bound into their slots.
//!
//! A descriptor set is the backend object holding the resources of one
//! [`ParameterTable`](crate::renderer::api::pipeline::ParameterTable). Its
//! contents are written through [`DescriptorData`] values, one per binding slot,
//! and a single backend update call takes a whole batch of them.

use crate::renderer::api::pipeline::PipelineLayoutId;
use crate::renderer::api::resource::{
    AccelerationStructureId, BufferId, ResourceType, SamplerId, TextureViewId,
};

/// An opaque handle to a descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorSetId(pub u64);

/// Describes a descriptor set to be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorSetDescriptor {
    /// The pipeline layout the set is allocated against.
    pub layout: PipelineLayoutId,
    /// The set number inside that layout.
    pub set_index: u32,
}

/// A single resource written into a descriptor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingResource {
    /// A buffer; its range lives in the owning [`DescriptorData`].
    Buffer(BufferId),
    /// A texture view.
    TextureView(TextureViewId),
    /// A sampler.
    Sampler(SamplerId),
    /// A ray-tracing acceleration structure.
    AccelerationStructure(AccelerationStructureId),
}

/// The value of one descriptor slot.
///
/// `name` selects the slot in a bind table; `binding` is filled in from the
/// resolved location when the value is staged. Equality compares every field,
/// including each element's buffer offset and size, so that re-staging the same
/// value is detected as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorData {
    /// The shader resource name this value is bound to.
    pub name: Option<String>,
    /// The binding number inside the set.
    pub binding: u32,
    /// The kind of resource in the slot.
    pub binding_type: ResourceType,
    /// One entry per array element.
    pub resources: Vec<BindingResource>,
    /// Byte offset per buffer element; empty for non-buffer slots.
    pub buffer_offsets: Vec<u64>,
    /// Byte size per buffer element; empty for non-buffer slots.
    pub buffer_sizes: Vec<u64>,
}

impl DescriptorData {
    fn named(name: impl Into<String>, binding_type: ResourceType, resource: BindingResource) -> Self {
        Self {
            name: Some(name.into()),
            binding: 0,
            binding_type,
            resources: vec![resource],
            buffer_offsets: Vec::new(),
            buffer_sizes: Vec::new(),
        }
    }

    /// A whole-buffer binding of the given type.
    pub fn buffer(name: impl Into<String>, binding_type: ResourceType, buffer: BufferId) -> Self {
        let mut data = Self::named(name, binding_type, BindingResource::Buffer(buffer));
        data.buffer_offsets.push(0);
        data.buffer_sizes.push(u64::MAX);
        data
    }

    /// A sub-range of a buffer.
    pub fn buffer_range(
        name: impl Into<String>,
        binding_type: ResourceType,
        buffer: BufferId,
        offset: u64,
        size: u64,
    ) -> Self {
        let mut data = Self::named(name, binding_type, BindingResource::Buffer(buffer));
        data.buffer_offsets.push(offset);
        data.buffer_sizes.push(size);
        data
    }

    /// A sampled texture view.
    pub fn texture(name: impl Into<String>, view: TextureViewId) -> Self {
        Self::named(name, ResourceType::Texture, BindingResource::TextureView(view))
    }

    /// A storage texture view.
    pub fn storage_texture(name: impl Into<String>, view: TextureViewId) -> Self {
        Self::named(
            name,
            ResourceType::StorageTexture,
            BindingResource::TextureView(view),
        )
    }

    /// A sampler.
    pub fn sampler(name: impl Into<String>, sampler: SamplerId) -> Self {
        Self::named(name, ResourceType::Sampler, BindingResource::Sampler(sampler))
    }

    /// An acceleration structure.
    pub fn acceleration_structure(name: impl Into<String>, tlas: AccelerationStructureId) -> Self {
        Self::named(
            name,
            ResourceType::AccelerationStructure,
            BindingResource::AccelerationStructure(tlas),
        )
    }

    /// Returns a copy of this value targeting `binding`.
    pub fn at_binding(&self, binding: u32) -> Self {
        Self {
            binding,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_ranges_participate_in_equality() {
        let a = DescriptorData::buffer_range("params", ResourceType::UniformBuffer, BufferId(1), 0, 256);
        let b = DescriptorData::buffer_range("params", ResourceType::UniformBuffer, BufferId(1), 256, 256);
        assert_ne!(a, b);
        assert_eq!(
            a,
            DescriptorData::buffer_range("params", ResourceType::UniformBuffer, BufferId(1), 0, 256)
        );
    }

    #[test]
    fn at_binding_keeps_resources() {
        let data = DescriptorData::texture("colorTex", TextureViewId(9)).at_binding(3);
        assert_eq!(data.binding, 3);
        assert_eq!(data.resources, vec![BindingResource::TextureView(TextureViewId(9))]);
        assert!(data.buffer_offsets.is_empty());
    }
}
