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
use strata_core::renderer::GraphicsBackend;
use strata_resources::PassCache;

fn forward_pass() -> RenderPassKey {
    RenderPassKey::new(SampleCount::X1)
        .with_color(TextureFormat::Rgba16Float, LoadAction::Clear, StoreAction::Store)
        .and_then(|key| {
            key.with_color(TextureFormat::Rgba8Unorm, LoadAction::Clear, StoreAction::Store)
        })
        .unwrap()
        .with_depth_stencil(
            TextureFormat::Depth32Float,
            (LoadAction::Clear, StoreAction::Discard),
            (LoadAction::DontCare, StoreAction::Discard),
        )
}

#[test]
fn test_equal_content_hits_the_same_entry() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let mut cache = PassCache::new(shared, &ResourceSettings::default());

    let first = cache.get_or_create_render_pass(&forward_pass()).unwrap();
    // Built independently, same bytes.
    let second = cache.get_or_create_render_pass(&forward_pass()).unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.call_counts().create_render_pass, 1);
    assert_eq!(cache.render_pass_count(), 1);
}

#[test]
fn test_one_byte_difference_is_a_distinct_key() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let mut cache = PassCache::new(shared, &ResourceSettings::default());

    let base = forward_pass();
    let mut load = base;
    load.color_load_actions[1] = LoadAction::Load as u8;

    let a = cache.get_or_create_render_pass(&base).unwrap();
    let b = cache.get_or_create_render_pass(&load).unwrap();
    assert_ne!(a, b);
    assert_eq!(cache.try_find_render_pass(&load), Some(b));
    assert_eq!(backend.live_render_passes(), 2);
}

#[test]
fn test_framebuffers_are_keyed_by_views_and_extent() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let mut cache = PassCache::new(shared, &ResourceSettings::default());
    let pass = cache.get_or_create_render_pass(&forward_pass()).unwrap();

    let key = |width| {
        FramebufferKey::new(pass, width, 720, 1)
            .with_attachment(TextureViewId(1))
            .and_then(|k| k.with_attachment(TextureViewId(2)))
            .unwrap()
    };
    let a = cache.get_or_create_framebuffer(&key(1280)).unwrap();
    let b = cache.get_or_create_framebuffer(&key(1280)).unwrap();
    let c = cache.get_or_create_framebuffer(&key(1920)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(backend.call_counts().create_framebuffer, 2);
    assert_eq!(cache.framebuffer_count(), 2);
}

#[test]
fn test_duplicate_add_still_destroys_every_handle_once() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let mut cache = PassCache::new(shared, &ResourceSettings::default());
    let key = forward_pass();

    let first = backend.create_render_pass(&key).unwrap();
    let second = backend.create_render_pass(&key).unwrap();
    cache.add_render_pass(key, first);
    cache.add_render_pass(key, second);
    assert_eq!(cache.try_find_render_pass(&key), Some(second));
    assert_eq!(cache.render_pass_count(), 1);

    cache.destroy().unwrap();
    assert_eq!(backend.live_render_passes(), 0);
    assert_eq!(backend.call_counts().destroy_render_pass, 2);

    // Nothing left for the drop path.
    drop(cache);
    assert_eq!(backend.call_counts().destroy_render_pass, 2);
}

#[test]
fn test_drop_destroys_framebuffers_before_passes() {
    common::init_logging();
    let (backend, shared) = common::backend();
    {
        let mut cache = PassCache::new(shared, &ResourceSettings::default());
        let pass = cache.get_or_create_render_pass(&forward_pass()).unwrap();
        let key = FramebufferKey::new(pass, 64, 64, 1)
            .with_attachment(TextureViewId(7))
            .unwrap();
        cache.get_or_create_framebuffer(&key).unwrap();
    }
    assert_eq!(backend.live_framebuffers(), 0);
    assert_eq!(backend.live_render_passes(), 0);
    assert_eq!(backend.call_counts().destroy_framebuffer, 1);
    assert_eq!(backend.call_counts().destroy_render_pass, 1);
}

#[test]
fn test_creation_failure_is_not_cached() {
    common::init_logging();
    let (backend, shared) = common::backend();
    let mut cache = PassCache::new(shared, &ResourceSettings::default());
    backend.fail_next_allocation();
    assert!(cache.get_or_create_render_pass(&forward_pass()).is_err());
    assert_eq!(cache.render_pass_count(), 0);
    assert!(cache.get_or_create_render_pass(&forward_pass()).is_ok());
}
