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

use crate::renderer::api::command::DescriptorSetId;
use std::ops::Range;

/// Anything descriptor sets can be bound into.
pub trait DescriptorSetBinder {
    /// Binds `set` at `index` for subsequent commands.
    fn bind_descriptor_set(&mut self, index: u32, set: DescriptorSetId);
}

/// A trait representing an active render pass, used for recording drawing commands.
pub trait RenderPassEncoder: DescriptorSetBinder {
    /// Records a non-indexed draw call.
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);
}

/// A trait representing an active compute pass, used for recording dispatch commands.
pub trait ComputePassEncoder: DescriptorSetBinder {
    /// Records a compute dispatch.
    fn dispatch_workgroups(&mut self, x: u32, y: u32, z: u32);
}
