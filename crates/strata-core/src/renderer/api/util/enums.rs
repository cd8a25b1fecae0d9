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

//! Generic rendering enums.
//!
//! Enums that end up inside plain-old-data keys carry explicit discriminants:
//! the raw values are part of the cache key and must not shift when variants
//! are added.

/// Defines the programmable stage in the pipeline a shader entry is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The tessellation control stage.
    TessControl,
    /// The tessellation evaluation stage.
    TessEval,
    /// The geometry shader stage.
    Geometry,
    /// The fragment (or pixel) shader stage.
    Fragment,
    /// The compute shader stage.
    Compute,
    /// Any ray-tracing stage.
    RayTracing,
}

/// The number of samples per pixel for Multisample Anti-Aliasing (MSAA).
///
/// The discriminant equals the sample count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum SampleCount {
    /// 1 sample per pixel (MSAA disabled).
    #[default]
    X1 = 1,
    /// 2 samples per pixel.
    X2 = 2,
    /// 4 samples per pixel.
    X4 = 4,
    /// 8 samples per pixel.
    X8 = 8,
    /// 16 samples per pixel.
    X16 = 16,
}

impl SampleCount {
    /// Returns the number of samples.
    pub const fn count(self) -> u32 {
        self as u32
    }

    /// Converts a raw sample count back, if it is a supported value.
    pub const fn from_count(count: u32) -> Option<Self> {
        match count {
            1 => Some(SampleCount::X1),
            2 => Some(SampleCount::X2),
            4 => Some(SampleCount::X4),
            8 => Some(SampleCount::X8),
            16 => Some(SampleCount::X16),
            _ => None,
        }
    }
}

/// Specifies the data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// Indices are 16-bit unsigned integers.
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

/// Defines the memory format of pixels in a texture.
///
/// `Undefined` is zero so that an unused attachment slot in a zeroed key reads
/// as "no attachment".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum TextureFormat {
    /// No format; marks an unused slot.
    #[default]
    Undefined = 0,
    /// One 8-bit unsigned normalized component.
    R8Unorm = 1,
    /// Two 8-bit unsigned normalized components.
    Rg8Unorm = 2,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm = 3,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb = 4,
    /// Four 8-bit unsigned normalized components (BGRA).
    Bgra8Unorm = 5,
    /// Four 8-bit unsigned normalized components (BGRA) in the sRGB color space.
    Bgra8UnormSrgb = 6,
    /// One 16-bit float component.
    R16Float = 7,
    /// Two 16-bit float components.
    Rg16Float = 8,
    /// Four 16-bit float components.
    Rgba16Float = 9,
    /// One 32-bit float component.
    R32Float = 10,
    /// Two 32-bit float components.
    Rg32Float = 11,
    /// Four 32-bit float components.
    Rgba32Float = 12,
    /// A 16-bit unsigned normalized depth format.
    Depth16Unorm = 13,
    /// A 24-bit depth format with an 8-bit stencil component.
    Depth24UnormStencil8 = 14,
    /// A 32-bit float depth format.
    Depth32Float = 15,
    /// A 32-bit float depth format with an 8-bit stencil component.
    Depth32FloatStencil8 = 16,
}

impl TextureFormat {
    /// Returns the raw value used inside POD keys.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Converts a raw key value back into a format.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => TextureFormat::Undefined,
            1 => TextureFormat::R8Unorm,
            2 => TextureFormat::Rg8Unorm,
            3 => TextureFormat::Rgba8Unorm,
            4 => TextureFormat::Rgba8UnormSrgb,
            5 => TextureFormat::Bgra8Unorm,
            6 => TextureFormat::Bgra8UnormSrgb,
            7 => TextureFormat::R16Float,
            8 => TextureFormat::Rg16Float,
            9 => TextureFormat::Rgba16Float,
            10 => TextureFormat::R32Float,
            11 => TextureFormat::Rg32Float,
            12 => TextureFormat::Rgba32Float,
            13 => TextureFormat::Depth16Unorm,
            14 => TextureFormat::Depth24UnormStencil8,
            15 => TextureFormat::Depth32Float,
            16 => TextureFormat::Depth32FloatStencil8,
            _ => return None,
        })
    }

    /// Returns `true` for formats with a depth aspect.
    pub const fn has_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16Unorm
                | TextureFormat::Depth24UnormStencil8
                | TextureFormat::Depth32Float
                | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Returns `true` for formats with a stencil aspect.
    pub const fn has_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth24UnormStencil8 | TextureFormat::Depth32FloatStencil8
        )
    }
}
