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

use std::ops::Range;

use strata_core::renderer::api::command::DescriptorSetId;
use strata_core::renderer::{ComputePassEncoder, DescriptorSetBinder, RenderPassEncoder};

/// A command recorded by a [`RecordingEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCommand {
    /// A descriptor set was bound at a set index.
    BindDescriptorSet {
        /// The set index.
        index: u32,
        /// The bound set.
        set: DescriptorSetId,
    },
    /// A non-indexed draw.
    Draw {
        /// Vertex range.
        vertices: Range<u32>,
        /// Instance range.
        instances: Range<u32>,
    },
    /// A compute dispatch.
    Dispatch {
        /// Workgroup counts.
        workgroups: [u32; 3],
    },
}

/// A pass encoder that records every command in order.
///
/// Implements both [`RenderPassEncoder`] and [`ComputePassEncoder`].
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    commands: Vec<RecordedCommand>,
}

impl RecordingEncoder {
    /// Creates an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded commands.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// The `(index, set)` pairs of every bind, in recording order.
    pub fn bound_sets(&self) -> Vec<(u32, DescriptorSetId)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RecordedCommand::BindDescriptorSet { index, set } => Some((*index, *set)),
                _ => None,
            })
            .collect()
    }

    /// Forgets every recorded command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DescriptorSetBinder for RecordingEncoder {
    fn bind_descriptor_set(&mut self, index: u32, set: DescriptorSetId) {
        self.commands
            .push(RecordedCommand::BindDescriptorSet { index, set });
    }
}

impl RenderPassEncoder for RecordingEncoder {
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.commands.push(RecordedCommand::Draw {
            vertices,
            instances,
        });
    }
}

impl ComputePassEncoder for RecordingEncoder {
    fn dispatch_workgroups(&mut self, x: u32, y: u32, z: u32) {
        self.commands.push(RecordedCommand::Dispatch {
            workgroups: [x, y, z],
        });
    }
}
