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

//! State descriptors for the pipeline, with field-wise structural hashing.

use super::enums::*;
use crate::hash::{StructuralHash, StructuralHasher};
use crate::renderer::api::util::enums::{IndexFormat, TextureFormat};

/// Describes a single vertex attribute within a vertex buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeDescriptor {
    /// The input location of this attribute in the vertex shader.
    pub shader_location: u32,
    /// The format of the attribute's data.
    pub format: VertexFormat,
    /// The byte offset of this attribute from the start of the vertex.
    pub offset: u64,
}

impl StructuralHash for VertexAttributeDescriptor {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.shader_location);
        state.write_u32(self.format as u32);
        state.write_u64(self.offset);
    }
}

/// Describes the memory layout of a single vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayoutDescriptor {
    /// The byte distance between consecutive elements in the buffer.
    pub array_stride: u64,
    /// How often the vertex buffer is advanced.
    pub step_mode: VertexStepMode,
    /// The attributes contained within each element of the buffer.
    pub attributes: Vec<VertexAttributeDescriptor>,
}

impl StructuralHash for VertexBufferLayoutDescriptor {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u64(self.array_stride);
        state.write_u32(self.step_mode as u32);
        self.attributes.structural_hash(state);
    }
}

/// Describes the state for primitive assembly and rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveStateDescriptor {
    /// The topology of the primitives.
    pub topology: PrimitiveTopology,
    /// The index format to use for strip topologies.
    pub strip_index_format: Option<IndexFormat>,
    /// The vertex winding order that determines the "front" face of a triangle.
    pub front_face: FrontFace,
    /// The face culling mode.
    pub cull_mode: CullMode,
    /// The rasterization mode for polygons.
    pub polygon_mode: PolygonMode,
    /// If `true`, disables clipping of fragments based on their depth.
    pub unclipped_depth: bool,
    /// If `true`, enables conservative rasterization.
    pub conservative: bool,
}

impl Default for PrimitiveStateDescriptor {
    fn default() -> Self {
        PrimitiveStateDescriptor {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        }
    }
}

impl StructuralHash for PrimitiveStateDescriptor {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.topology as u32);
        match self.strip_index_format {
            Some(format) => state.write_u32(format as u32 + 1),
            None => state.write_u32(0),
        }
        state.write_u32(self.front_face as u32);
        state.write_u32(self.cull_mode as u32);
        state.write_u32(self.polygon_mode as u32);
        state.write_bool(self.unclipped_depth);
        state.write_bool(self.conservative);
    }
}

/// Describes the stencil test and operations for a single face of a primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// The comparison function used for the stencil test.
    pub compare: CompareFunction,
    /// The operation to perform if the stencil test fails.
    pub fail_op: StencilOperation,
    /// The operation to perform if the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// The operation to perform if both the stencil and depth tests pass.
    pub depth_pass_op: StencilOperation,
}

impl StructuralHash for StencilFaceState {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.compare as u32);
        state.write_u32(self.fail_op as u32);
        state.write_u32(self.depth_fail_op as u32);
        state.write_u32(self.depth_pass_op as u32);
    }
}

/// Describes depth biasing, used to prevent z-fighting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthBiasState {
    /// A constant value added to the depth of each fragment.
    pub constant: i32,
    /// A factor that scales with the fragment's depth slope.
    pub slope_scale: f32,
    /// The maximum bias that can be applied.
    pub clamp: f32,
}

impl StructuralHash for DepthBiasState {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_i32(self.constant);
        state.write_f32(self.slope_scale);
        state.write_f32(self.clamp);
    }
}

/// Describes the state for depth and stencil testing.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthStencilStateDescriptor {
    /// The format of the depth/stencil texture.
    pub format: TextureFormat,
    /// If `true`, depth values will be written to the depth buffer.
    pub depth_write_enabled: bool,
    /// The comparison function used for the depth test.
    pub depth_compare: CompareFunction,
    /// The stencil state for front-facing primitives.
    pub stencil_front: StencilFaceState,
    /// The stencil state for back-facing primitives.
    pub stencil_back: StencilFaceState,
    /// A bitmask for reading from the stencil buffer.
    pub stencil_read_mask: u32,
    /// A bitmask for writing to the stencil buffer.
    pub stencil_write_mask: u32,
    /// The depth bias state.
    pub bias: DepthBiasState,
}

impl StructuralHash for DepthStencilStateDescriptor {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.format.raw());
        state.write_bool(self.depth_write_enabled);
        state.write_u32(self.depth_compare as u32);
        self.stencil_front.structural_hash(state);
        self.stencil_back.structural_hash(state);
        state.write_u32(self.stencil_read_mask);
        state.write_u32(self.stencil_write_mask);
        self.bias.structural_hash(state);
    }
}

/// Describes a complete blend equation for a single color component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponentDescriptor {
    /// The blend factor for the source color.
    pub src_factor: BlendFactor,
    /// The blend factor for the destination color.
    pub dst_factor: BlendFactor,
    /// The operation combining source and destination.
    pub operation: BlendOperation,
}

impl StructuralHash for BlendComponentDescriptor {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.src_factor as u32);
        state.write_u32(self.dst_factor as u32);
        state.write_u32(self.operation as u32);
    }
}

/// Describes the blend state for a single color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateDescriptor {
    /// The blend equation for the RGB color components.
    pub color: BlendComponentDescriptor,
    /// The blend equation for the alpha component.
    pub alpha: BlendComponentDescriptor,
}

impl StructuralHash for BlendStateDescriptor {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        self.color.structural_hash(state);
        self.alpha.structural_hash(state);
    }
}

/// A bitmask to enable or disable writes to individual color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorWrites(pub u8);

impl ColorWrites {
    /// Enable writes to the red channel.
    pub const R: Self = Self(0b0001);
    /// Enable writes to the green channel.
    pub const G: Self = Self(0b0010);
    /// Enable writes to the blue channel.
    pub const B: Self = Self(0b0100);
    /// Enable writes to the alpha channel.
    pub const A: Self = Self(0b1000);
    /// Enable writes to all channels.
    pub const ALL: Self = Self(0b1111);
}

/// Describes the state of a single color target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorTargetStateDescriptor {
    /// The texture format of this color target.
    pub format: TextureFormat,
    /// The blending state for this target. If `None`, blending is disabled.
    pub blend: Option<BlendStateDescriptor>,
    /// A bitmask controlling which color channels are written to.
    pub write_mask: ColorWrites,
}

impl StructuralHash for ColorTargetStateDescriptor {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.format.raw());
        self.blend.structural_hash(state);
        state.write_u8(self.write_mask.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_state(slope_scale: f32) -> DepthStencilStateDescriptor {
        DepthStencilStateDescriptor {
            format: TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: CompareFunction::LessEqual,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            bias: DepthBiasState {
                constant: 1,
                slope_scale,
                clamp: 0.0,
            },
        }
    }

    #[test]
    fn equal_depth_states_hash_equal() {
        assert_eq!(
            depth_state(1.5).structural_digest(),
            depth_state(1.5).structural_digest()
        );
        assert_ne!(
            depth_state(1.5).structural_digest(),
            depth_state(2.0).structural_digest()
        );
    }

    #[test]
    fn blend_presence_changes_color_target_hash() {
        let opaque = ColorTargetStateDescriptor {
            format: TextureFormat::Rgba8Unorm,
            blend: None,
            write_mask: ColorWrites::ALL,
        };
        let blended = ColorTargetStateDescriptor {
            blend: Some(BlendStateDescriptor {
                color: BlendComponentDescriptor {
                    src_factor: BlendFactor::SrcAlpha,
                    dst_factor: BlendFactor::OneMinusSrcAlpha,
                    operation: BlendOperation::Add,
                },
                alpha: BlendComponentDescriptor {
                    src_factor: BlendFactor::One,
                    dst_factor: BlendFactor::Zero,
                    operation: BlendOperation::Add,
                },
            }),
            ..opaque.clone()
        };
        assert_ne!(opaque.structural_digest(), blended.structural_digest());
    }

    #[test]
    fn attribute_order_matters_in_vertex_layout() {
        let position = VertexAttributeDescriptor {
            shader_location: 0,
            format: VertexFormat::Float32x3,
            offset: 0,
        };
        let uv = VertexAttributeDescriptor {
            shader_location: 1,
            format: VertexFormat::Float32x2,
            offset: 12,
        };
        let a = VertexBufferLayoutDescriptor {
            array_stride: 20,
            step_mode: VertexStepMode::Vertex,
            attributes: vec![position, uv],
        };
        let b = VertexBufferLayoutDescriptor {
            attributes: vec![uv, position],
            ..a.clone()
        };
        assert_ne!(a.structural_digest(), b.structural_digest());
    }

    #[test]
    fn strip_index_format_none_differs_from_uint16() {
        let list = PrimitiveStateDescriptor::default();
        let strip = PrimitiveStateDescriptor {
            strip_index_format: Some(IndexFormat::Uint16),
            ..list
        };
        assert_ne!(list.structural_digest(), strip.structural_digest());
    }
}
