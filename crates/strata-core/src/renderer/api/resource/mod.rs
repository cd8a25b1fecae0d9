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

//! Resource handles and shader-resource classification.

/// An opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// An opaque handle to a texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureViewId(pub u64);

/// An opaque handle to a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerId(pub u64);

/// An opaque handle to a ray-tracing acceleration structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccelerationStructureId(pub u64);

/// The kind of resource a shader binding expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceType {
    /// A standalone sampler.
    Sampler = 0,
    /// A sampled (read-only) texture.
    Texture = 1,
    /// A storage (read/write) texture.
    StorageTexture = 2,
    /// A uniform buffer.
    UniformBuffer = 3,
    /// A storage buffer.
    StorageBuffer = 4,
    /// A texel buffer.
    TexelBuffer = 5,
    /// A subpass input attachment.
    InputAttachment = 6,
    /// A ray-tracing acceleration structure.
    AccelerationStructure = 7,
    /// A push-constant block.
    PushConstant = 8,
}

impl ResourceType {
    /// Returns the stable raw value used in structural hashes.
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// The view dimension of a texture binding; `Undefined` for non-textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum TextureDimension {
    /// Not a texture binding.
    #[default]
    Undefined = 0,
    /// A 1D texture.
    D1 = 1,
    /// A 2D texture.
    D2 = 2,
    /// A multisampled 2D texture.
    D2Multisample = 3,
    /// A 3D texture.
    D3 = 4,
    /// A cube texture.
    Cube = 5,
    /// A 1D texture array.
    D1Array = 6,
    /// A 2D texture array.
    D2Array = 7,
    /// A multisampled 2D texture array.
    D2MultisampleArray = 8,
    /// A cube texture array.
    CubeArray = 9,
}

impl TextureDimension {
    /// Returns the stable raw value used in structural hashes.
    pub const fn raw(self) -> u32 {
        self as u32
    }
}
