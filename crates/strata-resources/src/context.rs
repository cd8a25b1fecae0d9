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

//! The per-device owner of every resource-layout service.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use strata_core::renderer::api::*;
use strata_core::renderer::{GraphicsBackend, ResourceError};

use crate::bind_table::BindTable;
use crate::layout_pool::LayoutPool;
use crate::merged_bind_table::MergedBindTable;
use crate::pass_cache::PassCache;
use crate::pipeline_layout::PipelineLayout;
use crate::runtime_table::RuntimeTable;

/// Owns the layout pool, the pass cache and the runtime table of one device.
///
/// There is one context per backend device and no global state; everything that
/// needs these services receives the context or one of its parts.
///
/// Teardown runs in a fixed order: the runtime table's early sweep, then the
/// layout pool, then the pass cache, and finally the runtime table's drop
/// sweep. [`teardown`](Self::teardown) reports errors; dropping the context
/// performs the same steps and logs them.
pub struct DeviceContext {
    backend: Arc<dyn GraphicsBackend>,
    settings: ResourceSettings,
    layout_pool: Arc<LayoutPool>,
    pass_cache: PassCache,
    runtime: RuntimeTable,
    torn_down: bool,
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("device", &self.backend.device_id())
            .field("layout_pool", &self.layout_pool)
            .field("pass_cache", &self.pass_cache)
            .field("runtime", &self.runtime)
            .finish()
    }
}

impl DeviceContext {
    /// Creates the services of one device.
    pub fn new(backend: Arc<dyn GraphicsBackend>, settings: ResourceSettings) -> Self {
        log::info!(
            "DeviceContext: Initializing resource services for {:?}",
            backend.device_id()
        );
        Self {
            layout_pool: Arc::new(LayoutPool::new(backend.clone(), &settings)),
            pass_cache: PassCache::new(backend.clone(), &settings),
            runtime: RuntimeTable::new(),
            backend,
            settings,
            torn_down: false,
        }
    }

    /// Creates the services of one device with settings loaded from a JSON file.
    pub fn from_settings_file(
        backend: Arc<dyn GraphicsBackend>,
        path: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        let settings = ResourceSettings::load(path.as_ref())
            .context("Failed to configure the device context")?;
        Ok(Self::new(backend, settings))
    }

    /// The backend device.
    pub fn backend(&self) -> &Arc<dyn GraphicsBackend> {
        &self.backend
    }

    /// The settings the context was created with.
    pub fn settings(&self) -> &ResourceSettings {
        &self.settings
    }

    /// The shared layout pool. Clone the `Arc` to build layouts from other threads.
    pub fn layout_pool(&self) -> &Arc<LayoutPool> {
        &self.layout_pool
    }

    /// The render-pass and framebuffer cache.
    pub fn pass_cache(&self) -> &PassCache {
        &self.pass_cache
    }

    /// The render-pass and framebuffer cache, mutably.
    pub fn pass_cache_mut(&mut self) -> &mut PassCache {
        &mut self.pass_cache
    }

    /// The runtime table.
    pub fn runtime(&self) -> &RuntimeTable {
        &self.runtime
    }

    /// The runtime table, mutably.
    pub fn runtime_mut(&mut self) -> &mut RuntimeTable {
        &mut self.runtime
    }

    /// Builds or reuses a pooled pipeline layout.
    pub fn acquire_layout(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<Arc<PipelineLayout>, ResourceError> {
        self.layout_pool.acquire(descriptor)
    }

    /// Releases one reference to a pooled layout.
    pub fn release_layout(&self, layout: &PipelineLayout) -> Result<bool, ResourceError> {
        self.layout_pool.deallocate(layout)
    }

    /// Creates a bind table for `layout`.
    pub fn create_bind_table(
        &self,
        layout: &Arc<PipelineLayout>,
        names: &[&str],
    ) -> Result<BindTable, ResourceError> {
        BindTable::create(self.backend.clone(), layout.clone(), names)
    }

    /// Creates an empty merged bind table for `layout`.
    pub fn create_merged_bind_table(&self, layout: &Arc<PipelineLayout>) -> MergedBindTable {
        MergedBindTable::create(self.backend.clone(), layout.clone())
    }

    /// Resolves a queue of this device through the runtime table.
    pub fn get_queue(&mut self, queue_type: QueueType, index: u32) -> Result<QueueId, ResourceError> {
        self.runtime
            .get_queue(self.backend.as_ref(), queue_type, index)
    }

    /// Tears every service down in order, returning the first error.
    pub fn teardown(mut self) -> Result<(), ResourceError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), ResourceError> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;
        log::info!(
            "DeviceContext: Tearing down resource services for {:?}",
            self.backend.device_id()
        );

        let swept = self.runtime.early_sweep();
        log::debug!("DeviceContext: Early sweep ran {swept} callbacks");

        let pool_result = self.layout_pool.destroy();
        let cache_result = self.pass_cache.destroy();
        drop(std::mem::take(&mut self.runtime));

        pool_result.and(cache_result)
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("DeviceContext: Teardown on drop failed: {e}");
        }
    }
}
