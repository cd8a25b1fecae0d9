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

//! The resolved form of a pipeline layout.

use strata_core::renderer::api::*;
use strata_core::renderer::{GraphicsBackend, ResourceError};

/// A pipeline layout created on the backend, with its reflected tables.
///
/// Layouts obtained from a [`LayoutPool`](crate::LayoutPool) are shared behind an
/// `Arc` and owned by the pool; bind tables only hold a reference to them.
#[derive(Debug)]
pub struct PipelineLayout {
    id: PipelineLayoutId,
    label: Option<String>,
    tables: Vec<ParameterTable>,
    push_constants: Vec<ShaderResource>,
    static_samplers: Vec<StaticSampler>,
    pipeline_type: PipelineType,
    characteristic: Characteristic,
}

impl PipelineLayout {
    /// Creates the backend object for `descriptor` without consulting any pool.
    pub fn create(
        backend: &dyn GraphicsBackend,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<Self, ResourceError> {
        let tables = ParameterTable::group(descriptor.resources);
        let id = backend.create_pipeline_layout(descriptor)?;
        Ok(Self::from_parts(id, descriptor, tables))
    }

    pub(crate) fn from_parts(
        id: PipelineLayoutId,
        descriptor: &PipelineLayoutDescriptor,
        tables: Vec<ParameterTable>,
    ) -> Self {
        let static_samplers = StaticSamplerBinding::resolve(descriptor.static_samplers, &tables);
        let characteristic = Characteristic::compute(
            &tables,
            descriptor.push_constants,
            &static_samplers,
            descriptor.pipeline_type,
        );
        Self {
            id,
            label: descriptor.label.as_ref().map(|label| label.to_string()),
            tables,
            push_constants: descriptor.push_constants.to_vec(),
            static_samplers,
            pipeline_type: descriptor.pipeline_type,
            characteristic,
        }
    }

    /// The backend handle.
    pub fn id(&self) -> PipelineLayoutId {
        self.id
    }

    /// The debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Parameter tables ordered by ascending set number.
    pub fn tables(&self) -> &[ParameterTable] {
        &self.tables
    }

    /// Number of parameter tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Push-constant blocks.
    pub fn push_constants(&self) -> &[ShaderResource] {
        &self.push_constants
    }

    /// Static samplers that matched a sampler resource.
    pub fn static_samplers(&self) -> &[StaticSampler] {
        &self.static_samplers
    }

    /// The pipeline kind.
    pub fn pipeline_type(&self) -> PipelineType {
        self.pipeline_type
    }

    /// The structural fingerprint.
    pub fn characteristic(&self) -> Characteristic {
        self.characteristic
    }

    /// Maps a set number to its table index.
    pub fn table_index(&self, set: u32) -> Option<usize> {
        self.tables.iter().position(|table| table.set == set)
    }

    /// Finds a binding resource by name, returning its table index.
    pub fn find_resource(&self, name: &str) -> Option<(usize, &ShaderResource)> {
        self.tables
            .iter()
            .enumerate()
            .find_map(|(index, table)| table.find(name).map(|resource| (index, resource)))
    }

    /// Full structural comparison against a candidate built from the same inputs.
    pub(crate) fn matches(
        &self,
        tables: &[ParameterTable],
        push_constants: &[ShaderResource],
        static_samplers: &[StaticSampler],
        pipeline_type: PipelineType,
    ) -> bool {
        self.pipeline_type == pipeline_type
            && self.tables == tables
            && self.push_constants == push_constants
            && self.static_samplers == static_samplers
    }

    pub(crate) fn matches_layout(&self, other: &PipelineLayout) -> bool {
        self.characteristic == other.characteristic
            && self.matches(
                &other.tables,
                &other.push_constants,
                &other.static_samplers,
                other.pipeline_type,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor_resources() -> Vec<ShaderResource> {
        vec![
            ShaderResource::new("shadowMap", ResourceType::Texture, 2, 0),
            ShaderResource::new("colorTex", ResourceType::Texture, 0, 0),
            ShaderResource::new("params", ResourceType::UniformBuffer, 1, 0),
        ]
    }

    #[test]
    fn table_index_is_independent_of_set_number() {
        let resources = descriptor_resources();
        let descriptor = PipelineLayoutDescriptor::new(PipelineType::Graphics, &resources);
        let layout = PipelineLayout::from_parts(
            PipelineLayoutId(1),
            &descriptor,
            ParameterTable::group(&resources),
        );
        assert_eq!(layout.table_count(), 3);
        assert_eq!(layout.table_index(2), Some(2));
        assert_eq!(layout.table_index(5), None);

        let (index, resource) = layout.find_resource("params").unwrap();
        assert_eq!(index, 1);
        assert_eq!(resource.binding, 0);
        assert!(layout.find_resource("missing").is_none());
    }

    #[test]
    fn equal_inputs_match_regardless_of_handle() {
        let resources = descriptor_resources();
        let descriptor = PipelineLayoutDescriptor::new(PipelineType::Compute, &resources)
            .with_label("culling");
        let a = PipelineLayout::from_parts(PipelineLayoutId(1), &descriptor, ParameterTable::group(&resources));
        let b = PipelineLayout::from_parts(PipelineLayoutId(2), &descriptor, ParameterTable::group(&resources));
        assert!(a.matches_layout(&b));
        assert_eq!(a.label(), Some("culling"));
    }
}
