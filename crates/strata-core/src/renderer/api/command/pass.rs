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

//! Fixed-layout keys describing render passes and framebuffers.
//!
//! Both keys are `#[repr(C)]` plain-old-data with fixed-size attachment arrays
//! and no pointers. Deriving [`bytemuck::Pod`] fails to compile if a field
//! change ever introduces padding, so hashing and comparing their raw bytes is
//! exact. Unused array slots stay zeroed.

use crate::renderer::api::resource::TextureViewId;
use crate::renderer::api::util::{SampleCount, TextureFormat};
use crate::renderer::error::ResourceError;
use bytemuck::{Pod, Zeroable};

/// Maximum number of color attachments in a render pass.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// Maximum number of image views in a framebuffer (colors plus depth-stencil).
pub const MAX_FRAMEBUFFER_ATTACHMENTS: usize = MAX_COLOR_ATTACHMENTS + 1;

/// An opaque handle to a backend render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPassId(pub u64);

/// An opaque handle to a backend framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub u64);

/// What happens to an attachment's contents at the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LoadAction {
    /// Contents are undefined.
    #[default]
    DontCare = 0,
    /// Previous contents are preserved.
    Load = 1,
    /// Contents are cleared.
    Clear = 2,
}

/// What happens to an attachment's contents at the end of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum StoreAction {
    /// Results are written back.
    #[default]
    Store = 0,
    /// Results may be discarded.
    Discard = 1,
}

/// The structural description of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct RenderPassKey {
    /// Raw [`TextureFormat`] per color attachment.
    pub color_formats: [u32; MAX_COLOR_ATTACHMENTS],
    /// Raw [`LoadAction`] per color attachment.
    pub color_load_actions: [u8; MAX_COLOR_ATTACHMENTS],
    /// Raw [`StoreAction`] per color attachment.
    pub color_store_actions: [u8; MAX_COLOR_ATTACHMENTS],
    /// Raw depth [`LoadAction`].
    pub depth_load_action: u8,
    /// Raw depth [`StoreAction`].
    pub depth_store_action: u8,
    /// Raw stencil [`LoadAction`].
    pub stencil_load_action: u8,
    /// Raw stencil [`StoreAction`].
    pub stencil_store_action: u8,
    /// Raw depth-stencil [`TextureFormat`], `Undefined` if the pass has none.
    pub depth_stencil_format: u32,
    /// Samples per pixel.
    pub sample_count: u32,
    /// Number of populated color slots.
    pub color_attachment_count: u32,
}

impl RenderPassKey {
    /// Creates a key with no attachments.
    pub fn new(sample_count: SampleCount) -> Self {
        Self {
            sample_count: sample_count.count(),
            ..Self::zeroed()
        }
    }

    /// Appends a color attachment.
    ///
    /// Fails with [`ResourceError::OutOfBounds`] past [`MAX_COLOR_ATTACHMENTS`].
    pub fn with_color(
        mut self,
        format: TextureFormat,
        load: LoadAction,
        store: StoreAction,
    ) -> Result<Self, ResourceError> {
        let slot = self.color_attachment_count as usize;
        if slot >= MAX_COLOR_ATTACHMENTS {
            return Err(ResourceError::OutOfBounds);
        }
        self.color_formats[slot] = format.raw();
        self.color_load_actions[slot] = load as u8;
        self.color_store_actions[slot] = store as u8;
        self.color_attachment_count += 1;
        Ok(self)
    }

    /// Sets the depth-stencil attachment. Stencil actions are ignored by
    /// backends when the format carries no stencil aspect.
    pub fn with_depth_stencil(
        mut self,
        format: TextureFormat,
        depth: (LoadAction, StoreAction),
        stencil: (LoadAction, StoreAction),
    ) -> Self {
        self.depth_stencil_format = format.raw();
        self.depth_load_action = depth.0 as u8;
        self.depth_store_action = depth.1 as u8;
        self.stencil_load_action = stencil.0 as u8;
        self.stencil_store_action = stencil.1 as u8;
        self
    }

    /// Returns the format of color attachment `index`, if populated.
    pub fn color_format(&self, index: usize) -> Option<TextureFormat> {
        if index < self.color_attachment_count as usize {
            TextureFormat::from_raw(self.color_formats[index])
        } else {
            None
        }
    }

    /// Returns the depth-stencil format, if the pass has one.
    pub fn depth_stencil(&self) -> Option<TextureFormat> {
        TextureFormat::from_raw(self.depth_stencil_format)
            .filter(|format| *format != TextureFormat::Undefined)
    }
}

/// The structural description of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct FramebufferKey {
    /// Raw [`RenderPassId`] the framebuffer is compatible with.
    pub render_pass: u64,
    /// Raw [`TextureViewId`] per attachment, in pass attachment order.
    pub attachments: [u64; MAX_FRAMEBUFFER_ATTACHMENTS],
    /// Number of populated attachment slots.
    pub attachment_count: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of array layers.
    pub layers: u32,
}

impl FramebufferKey {
    /// Creates a key with no attachments.
    pub fn new(render_pass: RenderPassId, width: u32, height: u32, layers: u32) -> Self {
        Self {
            render_pass: render_pass.0,
            width,
            height,
            layers,
            ..Self::zeroed()
        }
    }

    /// Appends an image view.
    ///
    /// Fails with [`ResourceError::OutOfBounds`] past [`MAX_FRAMEBUFFER_ATTACHMENTS`].
    pub fn with_attachment(mut self, view: TextureViewId) -> Result<Self, ResourceError> {
        let slot = self.attachment_count as usize;
        if slot >= MAX_FRAMEBUFFER_ATTACHMENTS {
            return Err(ResourceError::OutOfBounds);
        }
        self.attachments[slot] = view.0;
        self.attachment_count += 1;
        Ok(self)
    }

    /// The render pass this framebuffer targets.
    pub fn render_pass_id(&self) -> RenderPassId {
        RenderPassId(self.render_pass)
    }

    /// The populated attachment views.
    pub fn views(&self) -> impl Iterator<Item = TextureViewId> + '_ {
        self.attachments[..self.attachment_count as usize]
            .iter()
            .map(|raw| TextureViewId(*raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{pod_eq, pod_hash};

    #[test]
    fn keys_have_no_padding() {
        assert_eq!(std::mem::size_of::<RenderPassKey>(), 64);
        assert_eq!(std::mem::size_of::<FramebufferKey>(), 96);
    }

    #[test]
    fn color_slots_overflow_is_reported() {
        let mut key = RenderPassKey::new(SampleCount::X1);
        for _ in 0..MAX_COLOR_ATTACHMENTS {
            key = key
                .with_color(TextureFormat::Rgba8Unorm, LoadAction::Clear, StoreAction::Store)
                .unwrap();
        }
        assert!(matches!(
            key.with_color(TextureFormat::Rgba8Unorm, LoadAction::Clear, StoreAction::Store),
            Err(ResourceError::OutOfBounds)
        ));
    }

    #[test]
    fn one_load_action_changes_the_key() {
        let clear = RenderPassKey::new(SampleCount::X4)
            .with_color(TextureFormat::Bgra8UnormSrgb, LoadAction::Clear, StoreAction::Store)
            .unwrap();
        let load = RenderPassKey::new(SampleCount::X4)
            .with_color(TextureFormat::Bgra8UnormSrgb, LoadAction::Load, StoreAction::Store)
            .unwrap();
        assert!(!pod_eq(&clear, &load));
        assert_ne!(pod_hash(&clear), pod_hash(&load));
        assert_eq!(clear.color_format(0), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(clear.color_format(1), None);
        assert_eq!(clear.depth_stencil(), None);
    }

    #[test]
    fn framebuffer_views_follow_insertion_order() {
        let key = FramebufferKey::new(RenderPassId(2), 1280, 720, 1)
            .with_attachment(TextureViewId(10))
            .and_then(|k| k.with_attachment(TextureViewId(11)))
            .unwrap();
        let views: Vec<_> = key.views().collect();
        assert_eq!(views, vec![TextureViewId(10), TextureViewId(11)]);
        assert_eq!(key.render_pass_id(), RenderPassId(2));
    }
}
