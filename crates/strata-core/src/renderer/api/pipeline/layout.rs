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

//! Pipeline layout descriptors and their structural characteristic.

use crate::hash::{name_hash, StructuralHash, StructuralHasher};
use crate::renderer::api::resource::{ResourceType, SamplerId, TextureDimension};
use crate::renderer::api::util::ShaderStageFlags;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// An opaque handle to a backend pipeline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineLayoutId(pub u64);

/// The kind of pipeline a layout is declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PipelineType {
    /// Rasterization pipelines.
    #[default]
    Graphics = 0,
    /// Compute pipelines.
    Compute = 1,
    /// Ray-tracing pipelines.
    RayTracing = 2,
}

impl PipelineType {
    /// Returns the stable raw value used in structural hashes.
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// One reflected shader resource: a binding slot or a push-constant block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderResource {
    /// The name the shader declares the resource under.
    pub name: String,
    /// The kind of resource.
    pub ty: ResourceType,
    /// View dimension for texture bindings.
    pub dimension: TextureDimension,
    /// The descriptor set number.
    pub set: u32,
    /// The binding number inside the set.
    pub binding: u32,
    /// Array element count for bindings, byte size for push constants.
    pub size: u32,
    /// Byte offset, only meaningful for push constants.
    pub offset: u32,
    /// Stages that access the resource.
    pub stages: ShaderStageFlags,
}

impl ShaderResource {
    /// Creates a single-element resource visible to every stage.
    pub fn new(name: impl Into<String>, ty: ResourceType, set: u32, binding: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            dimension: TextureDimension::Undefined,
            set,
            binding,
            size: 1,
            offset: 0,
            stages: ShaderStageFlags::ALL,
        }
    }

    /// Creates a push-constant block of `size` bytes at `offset`.
    pub fn push_constant(name: impl Into<String>, offset: u32, size: u32) -> Self {
        Self {
            offset,
            size,
            ..Self::new(name, ResourceType::PushConstant, 0, 0)
        }
    }

    /// Sets the texture view dimension.
    pub fn with_dimension(mut self, dimension: TextureDimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Sets the array element count.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Restricts the stages that access the resource.
    pub fn with_stages(mut self, stages: ShaderStageFlags) -> Self {
        self.stages = stages;
        self
    }
}

impl StructuralHash for ShaderResource {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u64(name_hash(&self.name));
        state.write_u32(self.ty.raw());
        state.write_u32(self.dimension.raw());
        state.write_u32(self.set);
        state.write_u32(self.binding);
        state.write_u32(self.size);
        state.write_u32(self.offset);
        state.write_u32(self.stages.bits());
    }
}

/// The resources of one descriptor set inside a pipeline layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterTable {
    /// The descriptor set number.
    pub set: u32,
    /// Resources ordered by binding number.
    pub resources: Vec<ShaderResource>,
}

impl ParameterTable {
    /// Splits a flat reflected resource list into tables ordered by set number.
    ///
    /// Push-constant blocks are skipped; within a table resources are sorted by
    /// binding so reflection order does not affect the characteristic.
    pub fn group(resources: &[ShaderResource]) -> Vec<ParameterTable> {
        let mut by_set: BTreeMap<u32, Vec<ShaderResource>> = BTreeMap::new();
        for resource in resources
            .iter()
            .filter(|r| r.ty != ResourceType::PushConstant)
        {
            by_set
                .entry(resource.set)
                .or_default()
                .push(resource.clone());
        }
        by_set
            .into_iter()
            .map(|(set, mut resources)| {
                resources.sort_by_key(|r| r.binding);
                ParameterTable { set, resources }
            })
            .collect()
    }

    /// Finds a resource of this table by name.
    pub fn find(&self, name: &str) -> Option<&ShaderResource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

impl StructuralHash for ParameterTable {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.set);
        self.resources.structural_hash(state);
    }
}

/// A sampler baked into the layout, declared against a shader resource by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticSamplerBinding {
    /// Name of the sampler resource in the shader.
    pub name: String,
    /// The sampler object to bake in.
    pub sampler: SamplerId,
}

impl StaticSamplerBinding {
    /// Creates a new static sampler declaration.
    pub fn new(name: impl Into<String>, sampler: SamplerId) -> Self {
        Self {
            name: name.into(),
            sampler,
        }
    }

    /// Resolves declarations against the layout's tables.
    ///
    /// Declarations whose name matches no sampler resource are dropped without
    /// error; a shader may have optimized the sampler out.
    pub fn resolve(bindings: &[StaticSamplerBinding], tables: &[ParameterTable]) -> Vec<StaticSampler> {
        bindings
            .iter()
            .filter_map(|binding| {
                let found = tables.iter().find_map(|table| {
                    table
                        .find(&binding.name)
                        .filter(|r| r.ty == ResourceType::Sampler)
                });
                if found.is_none() {
                    log::debug!(
                        "Static sampler '{}' matches no sampler resource, ignoring it.",
                        binding.name
                    );
                }
                found.map(|resource| StaticSampler {
                    name: binding.name.clone(),
                    set: resource.set,
                    binding: resource.binding,
                    sampler: binding.sampler,
                })
            })
            .collect()
    }
}

/// A static sampler resolved to its set and binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticSampler {
    /// Name of the sampler resource.
    pub name: String,
    /// The descriptor set number.
    pub set: u32,
    /// The binding number.
    pub binding: u32,
    /// The baked sampler.
    pub sampler: SamplerId,
}

impl StructuralHash for StaticSampler {
    fn structural_hash(&self, state: &mut StructuralHasher) {
        state.write_u32(self.set);
        state.write_u32(self.binding);
        state.write_u64(self.sampler.0);
    }
}

/// A descriptor for a [`PipelineLayoutId`].
///
/// `resources` is the flat reflected binding list of every stage of the
/// program; it is grouped into [`ParameterTable`]s by set number.
#[derive(Debug, Clone)]
pub struct PipelineLayoutDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Reflected binding resources.
    pub resources: &'a [ShaderResource],
    /// Push-constant blocks.
    pub push_constants: &'a [ShaderResource],
    /// Samplers baked into the layout, matched by name.
    pub static_samplers: &'a [StaticSamplerBinding],
    /// The pipeline kind the layout is used with.
    pub pipeline_type: PipelineType,
}

impl<'a> PipelineLayoutDescriptor<'a> {
    /// Creates a descriptor without push constants or static samplers.
    pub fn new(pipeline_type: PipelineType, resources: &'a [ShaderResource]) -> Self {
        Self {
            label: None,
            resources,
            push_constants: &[],
            static_samplers: &[],
            pipeline_type,
        }
    }

    /// Sets the debug label.
    pub fn with_label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the push-constant blocks.
    pub fn with_push_constants(mut self, push_constants: &'a [ShaderResource]) -> Self {
        self.push_constants = push_constants;
        self
    }

    /// Sets the static samplers.
    pub fn with_static_samplers(mut self, static_samplers: &'a [StaticSamplerBinding]) -> Self {
        self.static_samplers = static_samplers;
        self
    }
}

/// The structural fingerprint of a pipeline layout.
///
/// Two layouts with equal tables, push constants, static samplers and pipeline
/// type always produce the same characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Characteristic(pub u64);

impl Characteristic {
    /// Computes the characteristic of a candidate layout.
    ///
    /// The table hash rolls over every resource of every table in order; the
    /// push-constant and static-sampler lists are hashed separately and folded in
    /// together with the pipeline type.
    pub fn compute(
        tables: &[ParameterTable],
        push_constants: &[ShaderResource],
        static_samplers: &[StaticSampler],
        pipeline_type: PipelineType,
    ) -> Self {
        let mut state = StructuralHasher::new();
        tables.structural_hash(&mut state);
        state.write_u64(push_constants.structural_digest());
        state.write_u64(static_samplers.structural_digest());
        state.write_u32(pipeline_type.raw());
        Characteristic(state.finish())
    }
}
