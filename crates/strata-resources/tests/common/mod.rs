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

#![allow(dead_code)]

use std::sync::Arc;

use strata_core::renderer::api::*;
use strata_core::renderer::GraphicsBackend;
use strata_infra::HeadlessBackend;
use strata_resources::{LayoutPool, PipelineLayout};

/// Installs the test logger once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A headless backend plus the same device behind the trait object.
pub fn backend() -> (HeadlessBackend, Arc<dyn GraphicsBackend>) {
    let backend = HeadlessBackend::new();
    let shared: Arc<dyn GraphicsBackend> = Arc::new(backend.clone());
    (backend, shared)
}

/// Two tables: `colorTex` at (set 0, binding 0) and `params` at (set 1, binding 0).
pub fn scene_resources() -> Vec<ShaderResource> {
    vec![
        ShaderResource::new("colorTex", ResourceType::Texture, 0, 0)
            .with_dimension(TextureDimension::D2)
            .with_stages(ShaderStageFlags::FRAGMENT),
        ShaderResource::new("linearSampler", ResourceType::Sampler, 0, 1)
            .with_stages(ShaderStageFlags::FRAGMENT),
        ShaderResource::new("params", ResourceType::UniformBuffer, 1, 0)
            .with_stages(ShaderStageFlags::VERTEX_FRAGMENT),
    ]
}

/// A pooled layout over [`scene_resources`].
pub fn scene_layout(pool: &LayoutPool) -> Arc<PipelineLayout> {
    let resources = scene_resources();
    pool.acquire(&PipelineLayoutDescriptor::new(PipelineType::Graphics, &resources))
        .expect("Scene layout creation should succeed")
}
