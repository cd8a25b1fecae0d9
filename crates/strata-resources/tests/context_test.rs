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

use std::sync::{Arc, Mutex};

use strata_core::renderer::api::*;
use strata_core::renderer::{GraphicsBackend, RenderPassEncoder};
use strata_infra::{HeadlessBackend, RecordingEncoder};
use strata_resources::{DeviceContext, SweepPhase};

fn context() -> (HeadlessBackend, DeviceContext) {
    common::init_logging();
    let (backend, shared) = common::backend();
    (backend, DeviceContext::new(shared, ResourceSettings::default()))
}

#[test]
fn test_end_to_end_frame() {
    let (backend, mut context) = context();
    let resources = common::scene_resources();
    let layout = context
        .acquire_layout(&PipelineLayoutDescriptor::new(PipelineType::Graphics, &resources))
        .unwrap();

    let mut table = context
        .create_bind_table(&layout, &["colorTex", "params"])
        .unwrap();
    table
        .update(&[
            DescriptorData::texture("colorTex", TextureViewId(1)),
            DescriptorData::buffer("params", ResourceType::UniformBuffer, BufferId(2)),
        ])
        .unwrap();

    let pass = context
        .pass_cache_mut()
        .get_or_create_render_pass(
            &RenderPassKey::new(SampleCount::X1)
                .with_color(TextureFormat::Bgra8UnormSrgb, LoadAction::Clear, StoreAction::Store)
                .unwrap(),
        )
        .unwrap();
    let framebuffer_key = FramebufferKey::new(pass, 800, 600, 1)
        .with_attachment(TextureViewId(3))
        .unwrap();
    context
        .pass_cache_mut()
        .get_or_create_framebuffer(&framebuffer_key)
        .unwrap();

    let mut encoder = RecordingEncoder::new();
    table.bind(&mut encoder);
    encoder.draw(0..3, 0..1);
    assert_eq!(encoder.bound_sets().len(), 2);

    table.free().unwrap();
    assert!(context.release_layout(&layout).unwrap());
    context.teardown().unwrap();

    assert_eq!(backend.live_pipeline_layouts(), 0);
    assert_eq!(backend.live_descriptor_sets(), 0);
    assert_eq!(backend.live_render_passes(), 0);
    assert_eq!(backend.live_framebuffers(), 0);
}

#[test]
fn test_queue_lookups_go_through_the_runtime_table() {
    let (backend, mut context) = context();
    let first = context.get_queue(QueueType::Graphics, 0).unwrap();
    let second = context.get_queue(QueueType::Graphics, 0).unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.call_counts().get_queue, 1);
    assert_eq!(
        context
            .runtime()
            .try_get_queue(backend.device_id(), QueueType::Graphics, 0),
        Some(first)
    );
}

#[test]
fn test_teardown_runs_in_order() {
    let (backend, mut context) = context();
    let events = Arc::new(Mutex::new(Vec::new()));

    let resources = common::scene_resources();
    let _layout = context
        .acquire_layout(&PipelineLayoutDescriptor::new(PipelineType::Graphics, &resources))
        .unwrap();

    let runtime = context.runtime_mut();
    runtime.add_custom_data("ext.state", 0u32);
    let (early, late) = (events.clone(), events.clone());
    let observer = backend.clone();
    runtime.add_sweep(SweepPhase::Early, "ext.state", move |_| {
        early
            .lock()
            .unwrap()
            .push(("early", observer.live_pipeline_layouts()));
    });
    let observer = backend.clone();
    runtime.add_sweep(SweepPhase::Drop, "ext.state", move |_| {
        late.lock()
            .unwrap()
            .push(("drop", observer.live_pipeline_layouts()));
    });

    context.teardown().unwrap();

    // The early sweep sees the layout alive, the drop sweep runs after the pool.
    assert_eq!(*events.lock().unwrap(), vec![("early", 1), ("drop", 0)]);
}

#[test]
fn test_dropping_the_context_releases_everything() {
    let (backend, context) = context();
    let resources = common::scene_resources();
    let _layout = context
        .acquire_layout(&PipelineLayoutDescriptor::new(PipelineType::Graphics, &resources))
        .unwrap();
    drop(context);
    assert_eq!(backend.live_pipeline_layouts(), 0);
}

#[test]
fn test_settings_file_configures_the_context() {
    common::init_logging();
    let (_backend, shared) = common::backend();
    let path = std::env::temp_dir().join(format!(
        "strata-settings-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, r#"{ "warn_on_duplicate_cache_insert": false }"#).unwrap();

    let context = DeviceContext::from_settings_file(shared.clone(), &path).unwrap();
    assert!(!context.settings().warn_on_duplicate_cache_insert);
    std::fs::remove_file(&path).unwrap();

    let missing = DeviceContext::from_settings_file(shared, path.with_extension("missing"));
    assert!(missing.is_err());
}
