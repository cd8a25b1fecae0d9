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

mod common;

use strata_core::renderer::api::*;
use strata_infra::RecordingEncoder;
use strata_resources::{BindTable, LayoutPool, MergedBindTable, ResolvedSet};

#[test]
fn test_scene_scenario() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let pool = LayoutPool::new(shared.clone(), &ResourceSettings::default());
    let layout = common::scene_layout(&pool);
    assert_eq!(layout.table_count(), 2);

    // Table A binds both names: one set per table.
    let mut a = BindTable::create(shared.clone(), layout.clone(), &["colorTex", "params"]).unwrap();
    assert_eq!(backend.call_counts().create_descriptor_set, 2);

    // One update touching table 0 only.
    let calls = a
        .update(&[DescriptorData::texture("colorTex", TextureViewId(1))])
        .unwrap();
    assert_eq!(calls, 1);
    let updates = backend.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].set, a.descriptor_set(0).unwrap());

    a.update(&[DescriptorData::buffer(
        "params",
        ResourceType::UniformBuffer,
        BufferId(10),
    )])
    .unwrap();

    // Table B binds only table 1.
    let mut b = BindTable::create(shared.clone(), layout.clone(), &["params"]).unwrap();
    b.update(&[DescriptorData::buffer(
        "params",
        ResourceType::UniformBuffer,
        BufferId(20),
    )])
    .unwrap();
    let sets_before_merge = backend.call_counts().create_descriptor_set;

    let mut merged = MergedBindTable::create(shared, layout.clone());
    merged.merge(&[&a, &b]).unwrap();

    assert_eq!(
        backend.call_counts().create_descriptor_set,
        sets_before_merge + 1,
        "exactly one merged set for the overlapping index"
    );
    assert_eq!(merged.resolved(0), ResolvedSet::Borrowed(a.descriptor_set(0).unwrap()));
    assert_eq!(merged.resolved(1), ResolvedSet::Owned(1));
    assert_eq!(merged.copied_set(0), a.descriptor_set(0));
    assert_eq!(merged.owned_set_count(), 1);

    // B was merged last and wins the shared binding.
    let merged_set = merged.result_set(1).unwrap();
    assert_eq!(
        backend.slot(merged_set, 0).map(|data| data.resources),
        Some(vec![BindingResource::Buffer(BufferId(20))])
    );
}

#[test]
fn test_disjoint_tables_merge_without_new_sets() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let pool = LayoutPool::new(shared.clone(), &ResourceSettings::default());
    let layout = common::scene_layout(&pool);

    let color = BindTable::create(shared.clone(), layout.clone(), &["colorTex"]).unwrap();
    let params = BindTable::create(shared.clone(), layout.clone(), &["params"]).unwrap();
    let created = backend.call_counts().create_descriptor_set;

    let mut merged = MergedBindTable::create(shared, layout);
    assert_eq!(merged.merge(&[&color, &params]).unwrap(), 0);
    assert_eq!(backend.call_counts().create_descriptor_set, created);
    assert_eq!(merged.owned_set_count(), 0);

    let mut encoder = RecordingEncoder::new();
    merged.bind(&mut encoder);
    assert_eq!(
        encoder.bound_sets(),
        vec![
            (0, color.descriptor_set(0).unwrap()),
            (1, params.descriptor_set(1).unwrap()),
        ]
    );
}

#[test]
fn test_untouched_index_is_skipped_at_bind() {
    common::init_logging();
    let (_backend, shared) = common::backend();
    let pool = LayoutPool::new(shared.clone(), &ResourceSettings::default());
    let layout = common::scene_layout(&pool);

    let params = BindTable::create(shared.clone(), layout.clone(), &["params"]).unwrap();
    let mut merged = MergedBindTable::create(shared, layout);
    merged.merge(&[&params]).unwrap();

    assert_eq!(merged.resolved(0), ResolvedSet::Empty);
    let mut encoder = RecordingEncoder::new();
    merged.bind(&mut encoder);
    assert_eq!(encoder.bound_sets(), vec![(1, params.descriptor_set(1).unwrap())]);
}

#[test]
fn test_merged_set_is_reused_across_merges() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let pool = LayoutPool::new(shared.clone(), &ResourceSettings::default());
    let layout = common::scene_layout(&pool);

    let mut a = BindTable::create(shared.clone(), layout.clone(), &["colorTex"]).unwrap();
    let mut b = BindTable::create(shared.clone(), layout.clone(), &["linearSampler"]).unwrap();
    a.update(&[DescriptorData::texture("colorTex", TextureViewId(1))])
        .unwrap();
    b.update(&[DescriptorData::sampler("linearSampler", SamplerId(2))])
        .unwrap();

    let mut merged = MergedBindTable::create(shared, layout);
    assert_eq!(merged.merge(&[&a, &b]).unwrap(), 1);
    let first = merged.result_set(0).unwrap();
    let created = backend.call_counts().create_descriptor_set;

    a.update(&[DescriptorData::texture("colorTex", TextureViewId(5))])
        .unwrap();
    assert_eq!(merged.merge(&[&a, &b]).unwrap(), 1);
    assert_eq!(merged.result_set(0), Some(first));
    assert_eq!(backend.call_counts().create_descriptor_set, created);

    // Both contributors' bindings land in the one merged set.
    assert_eq!(backend.updates_for(first).last().unwrap().bindings, vec![0, 1]);
    assert_eq!(
        backend.slot(first, 0).map(|data| data.resources),
        Some(vec![BindingResource::TextureView(TextureViewId(5))])
    );
}

#[test]
fn test_free_destroys_only_owned_sets() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let pool = LayoutPool::new(shared.clone(), &ResourceSettings::default());
    let layout = common::scene_layout(&pool);

    let a = BindTable::create(shared.clone(), layout.clone(), &["colorTex", "params"]).unwrap();
    let b = BindTable::create(shared.clone(), layout.clone(), &["params"]).unwrap();
    let mut merged = MergedBindTable::create(shared, layout);
    merged.merge(&[&a, &b]).unwrap();
    assert_eq!(backend.live_descriptor_sets(), 4);

    merged.free().unwrap();
    assert_eq!(backend.live_descriptor_sets(), 3);
    assert!(a.descriptor_set(0).is_some());

    drop(a);
    drop(b);
    assert_eq!(backend.live_descriptor_sets(), 0);
}

#[test]
fn test_tables_of_another_layout_are_skipped() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let pool = LayoutPool::new(shared.clone(), &ResourceSettings::default());
    let layout = common::scene_layout(&pool);
    let other_resources = [ShaderResource::new("params", ResourceType::UniformBuffer, 1, 0)];
    let other_layout = pool
        .acquire(&PipelineLayoutDescriptor::new(PipelineType::Compute, &other_resources))
        .unwrap();

    let own = BindTable::create(shared.clone(), layout.clone(), &["params"]).unwrap();
    let foreign = BindTable::create(shared.clone(), other_layout, &["params"]).unwrap();
    let created = backend.call_counts().create_descriptor_set;

    let mut merged = MergedBindTable::create(shared, layout);
    merged.merge(&[&own, &foreign]).unwrap();
    assert_eq!(merged.resolved(1), ResolvedSet::Borrowed(own.descriptor_set(1).unwrap()));
    assert_eq!(backend.call_counts().create_descriptor_set, created);
}
