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

//! # Strata Resources
//!
//! Resource-layout management on top of a [`GraphicsBackend`](strata_core::renderer::GraphicsBackend):
//! a deduplicating pipeline-layout pool, name-indexed bind tables and their
//! merge resolver, structural caches for render passes and framebuffers, and the
//! per-device runtime table. [`DeviceContext`] owns all of them for one device.

#![warn(missing_docs)]

pub mod bind_table;
pub mod context;
pub mod layout_pool;
pub mod merged_bind_table;
pub mod pass_cache;
pub mod pipeline_layout;
pub mod runtime_table;
pub mod structural_cache;

pub use bind_table::{BindTable, BindTableLocation};
pub use context::DeviceContext;
pub use layout_pool::{LayoutPool, PoolStats};
pub use merged_bind_table::{MergedBindTable, ResolvedSet};
pub use pass_cache::PassCache;
pub use pipeline_layout::PipelineLayout;
pub use runtime_table::{RuntimeTable, SweepPhase};
pub use structural_cache::StructuralCache;
