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

//! Provides the public, backend-agnostic contracts for GPU resource layouts.
//!
//! This module defines the "common language" shared by the layout pool, the bind
//! tables and the pass cache. It contains the abstract `traits` (like
//! [`GraphicsBackend`]), the descriptor types, and the error hierarchy.
//!
//! The 'how' lives in a concrete backend (see the `strata-infra` crate), which
//! implements these traits; `strata-resources` builds on them without knowing
//! which graphics API sits underneath.

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{DescriptorError, PipelineError, ResourceError};
pub use self::traits::{ComputePassEncoder, DescriptorSetBinder, GraphicsBackend, RenderPassEncoder};
