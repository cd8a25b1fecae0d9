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

//! Global settings for the resource-layout layer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by the layout pool, the pass cache and the device context.
///
/// Missing fields fall back to [`ResourceSettings::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    /// Initial capacity of the pipeline-layout pool's lookup maps.
    pub layout_pool_capacity: usize,
    /// Initial capacity of the render-pass cache.
    pub render_pass_cache_capacity: usize,
    /// Initial capacity of the framebuffer cache.
    pub framebuffer_cache_capacity: usize,
    /// Log a warning when a cache key is inserted twice.
    pub warn_on_duplicate_cache_insert: bool,
    /// Emit debug logs for every pool hit, miss and release.
    pub log_pool_activity: bool,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            layout_pool_capacity: 64,
            render_pass_cache_capacity: 32,
            framebuffer_cache_capacity: 64,
            warn_on_duplicate_cache_insert: true,
            log_pool_activity: false,
        }
    }
}

impl ResourceSettings {
    /// Parses settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse resource settings JSON")
    }

    /// Loads settings from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resource settings from '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid resource settings in '{}'", path.display()))
    }
}
