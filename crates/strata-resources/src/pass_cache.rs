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

//! Structural caches for render passes and framebuffers.

use std::sync::Arc;

use strata_core::renderer::api::*;
use strata_core::renderer::{GraphicsBackend, ResourceError};

use crate::structural_cache::StructuralCache;

/// Deduplicates render passes and framebuffers of one device.
///
/// Every handle that enters the cache, including handles replaced by a
/// duplicate [`add_render_pass`](Self::add_render_pass), is destroyed exactly
/// once by [`destroy`](Self::destroy) or on drop. Framebuffers are destroyed
/// before the render passes they reference.
pub struct PassCache {
    backend: Arc<dyn GraphicsBackend>,
    render_passes: StructuralCache<RenderPassKey, RenderPassId>,
    framebuffers: StructuralCache<FramebufferKey, FramebufferId>,
}

impl std::fmt::Debug for PassCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassCache")
            .field("render_passes", &self.render_passes)
            .field("framebuffers", &self.framebuffers)
            .finish()
    }
}

impl PassCache {
    /// Creates empty caches sized from `settings`.
    pub fn new(backend: Arc<dyn GraphicsBackend>, settings: &ResourceSettings) -> Self {
        Self {
            backend,
            render_passes: StructuralCache::new(
                "render pass",
                settings.render_pass_cache_capacity,
                settings.warn_on_duplicate_cache_insert,
            ),
            framebuffers: StructuralCache::new(
                "framebuffer",
                settings.framebuffer_cache_capacity,
                settings.warn_on_duplicate_cache_insert,
            ),
        }
    }

    /// Looks up a cached render pass.
    pub fn try_find_render_pass(&self, key: &RenderPassKey) -> Option<RenderPassId> {
        self.render_passes.try_find(key)
    }

    /// Caches a render pass created by the caller. The cache takes ownership.
    pub fn add_render_pass(&mut self, key: RenderPassKey, id: RenderPassId) {
        self.render_passes.add(key, id);
    }

    /// Returns the cached render pass for `key`, creating it on a miss.
    pub fn get_or_create_render_pass(
        &mut self,
        key: &RenderPassKey,
    ) -> Result<RenderPassId, ResourceError> {
        if let Some(id) = self.render_passes.try_find(key) {
            return Ok(id);
        }
        let id = self.backend.create_render_pass(key)?;
        log::debug!("PassCache: Created {id:?}");
        self.render_passes.add(*key, id);
        Ok(id)
    }

    /// Looks up a cached framebuffer.
    pub fn try_find_framebuffer(&self, key: &FramebufferKey) -> Option<FramebufferId> {
        self.framebuffers.try_find(key)
    }

    /// Caches a framebuffer created by the caller. The cache takes ownership.
    pub fn add_framebuffer(&mut self, key: FramebufferKey, id: FramebufferId) {
        self.framebuffers.add(key, id);
    }

    /// Returns the cached framebuffer for `key`, creating it on a miss.
    pub fn get_or_create_framebuffer(
        &mut self,
        key: &FramebufferKey,
    ) -> Result<FramebufferId, ResourceError> {
        if let Some(id) = self.framebuffers.try_find(key) {
            return Ok(id);
        }
        let id = self.backend.create_framebuffer(key)?;
        log::debug!("PassCache: Created {id:?}");
        self.framebuffers.add(*key, id);
        Ok(id)
    }

    /// Number of cached render passes.
    pub fn render_pass_count(&self) -> usize {
        self.render_passes.len()
    }

    /// Number of cached framebuffers.
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Destroys every cached object. Every handle is attempted; the first
    /// backend error is returned.
    pub fn destroy(&mut self) -> Result<(), ResourceError> {
        let framebuffers = self.framebuffers.drain();
        let render_passes = self.render_passes.drain();
        if !framebuffers.is_empty() || !render_passes.is_empty() {
            log::info!(
                "PassCache: Destroying {} framebuffers and {} render passes",
                framebuffers.len(),
                render_passes.len()
            );
        }

        let mut result = Ok(());
        let mut keep_first = |outcome: Result<(), ResourceError>| {
            if let Err(e) = outcome {
                log::error!("PassCache: Failed to destroy a cached object: {e}");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        };
        for id in framebuffers {
            keep_first(self.backend.destroy_framebuffer(id));
        }
        for id in render_passes {
            keep_first(self.backend.destroy_render_pass(id));
        }
        result
    }
}

impl Drop for PassCache {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::error!("PassCache: Teardown on drop failed: {e}");
        }
    }
}
