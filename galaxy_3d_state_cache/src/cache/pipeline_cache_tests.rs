//! Unit tests for pipeline_cache.rs

use crate::cache::pipeline_cache::GraphicsPipelineCache;
use crate::cache::stats::{CacheStatsRegistry, CacheType};
use crate::descriptor::GraphicsPipelineDesc;
use crate::error::Error;
use crate::serial::Serial;
use crate::state::{CullMode, RasterizerState};
use crate::test_support::{MockFactory, MockNative};
use crate::transition::GraphicsPipelineTransitionBits;
use std::sync::Arc;

fn defaults() -> GraphicsPipelineDesc {
    let mut desc = GraphicsPipelineDesc::new();
    desc.init_defaults();
    desc
}

#[test]
fn test_get_pipeline_hit_returns_stored_key() {
    let factory = MockFactory::new();
    let mut cache = GraphicsPipelineCache::new();
    let desc = defaults();

    let (key_a, handle_a) = cache.get_pipeline(&desc, |_| Ok(factory.create())).unwrap();
    let (key_b, handle_b) = cache.get_pipeline(&desc, |_| Ok(factory.create())).unwrap();

    assert_eq!(handle_a, handle_b);
    assert!(Arc::ptr_eq(&key_a, &key_b));
    assert_eq!(*key_a, desc);
    assert_eq!(factory.created(), 1);
    assert_eq!(cache.stats().hit_count(), 1);
    assert_eq!(cache.stats().miss_count(), 1);
}

#[test]
fn test_stored_key_survives_later_insertions() {
    let factory = MockFactory::new();
    let mut cache = GraphicsPipelineCache::new();
    let (first_key, first) = cache.get_pipeline(&defaults(), |_| Ok(factory.create())).unwrap();

    for width in 2..100 {
        let mut desc = defaults();
        desc.update_line_width(&mut GraphicsPipelineTransitionBits::empty(), width as f32);
        cache.get_pipeline(&desc, |_| Ok(factory.create())).unwrap();
    }

    assert_eq!(*first_key, defaults());
    assert_eq!(cache.pipeline(first).map(|p| p.id), Some(1));
    assert_eq!(cache.len(), 99);
}

#[test]
fn test_creation_failure_inserts_nothing() {
    let mut cache = GraphicsPipelineCache::<MockNative>::new();
    let result = cache.get_pipeline(&defaults(), |_| Err(Error::OutOfMemory));
    assert!(result.is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_populate_does_not_count() {
    let factory = MockFactory::new();
    let mut cache = GraphicsPipelineCache::new();
    let (_, handle) = cache.populate(&defaults(), factory.create());
    let (_, again) = cache.populate(&defaults(), factory.create());
    assert_eq!(handle, again);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().lookup_count(), 0);
    // the duplicate was dropped
    assert_eq!(factory.destroyed(), 1);
}

#[test]
fn test_transition_found_for_same_change() {
    let factory = MockFactory::new();
    let mut cache = GraphicsPipelineCache::new();
    let (_, source) = cache.get_pipeline(&defaults(), |_| Ok(factory.create())).unwrap();

    let mut target_desc = defaults();
    let mut bits = GraphicsPipelineTransitionBits::empty();
    target_desc.update_line_width(&mut bits, 3.0);
    let (target_key, target) = cache.get_pipeline(&target_desc, |_| Ok(factory.create())).unwrap();
    cache.add_transition(source, bits, target_key, target).unwrap();

    // same change replayed from the source state
    let mut probe = defaults();
    let mut probe_bits = GraphicsPipelineTransitionBits::empty();
    probe.update_line_width(&mut probe_bits, 3.0);
    let found = cache.find_transition(source, probe_bits, &probe).map(|(_, handle)| handle);
    assert_eq!(found, Some(target));

    // a different line width does not match
    let mut other = defaults();
    let mut other_bits = GraphicsPipelineTransitionBits::empty();
    other.update_line_width(&mut other_bits, 5.0);
    assert!(cache.find_transition(source, other_bits, &other).is_none());
}

#[test]
fn test_transition_rejects_extra_unrelated_change() {
    let factory = MockFactory::new();
    let mut cache = GraphicsPipelineCache::new();
    let (_, source) = cache.get_pipeline(&defaults(), |_| Ok(factory.create())).unwrap();

    let mut target_desc = defaults();
    let mut bits = GraphicsPipelineTransitionBits::empty();
    target_desc.update_line_width(&mut bits, 2.0);
    let (target_key, target) = cache.get_pipeline(&target_desc, |_| Ok(factory.create())).unwrap();
    cache.add_transition(source, bits, target_key, target).unwrap();

    // line width matches but cull mode also changed
    let mut probe = defaults();
    let mut probe_bits = GraphicsPipelineTransitionBits::empty();
    probe.update_line_width(&mut probe_bits, 2.0);
    let raster = RasterizerState { cull_face: true, cull_mode: CullMode::Back, ..Default::default() };
    probe.update_cull_mode(&mut probe_bits, &raster);

    assert!(cache.find_transition(source, probe_bits, &probe).is_none());
}

#[test]
fn test_transitions_append_without_dedup() {
    let factory = MockFactory::new();
    let mut cache = GraphicsPipelineCache::new();
    let (key, handle) = cache.get_pipeline(&defaults(), |_| Ok(factory.create())).unwrap();
    let bits = GraphicsPipelineTransitionBits::from_bits(1);
    cache.add_transition(handle, bits, Arc::clone(&key), handle).unwrap();
    cache.add_transition(handle, bits, key, handle).unwrap();
    assert_eq!(cache.helper(handle).map(|h| h.transitions().len()), Some(2));
}

#[test]
fn test_serial_and_destroy() {
    let factory = MockFactory::new();
    let mut cache = GraphicsPipelineCache::new();
    let (_, handle) = cache.get_pipeline(&defaults(), |_| Ok(factory.create())).unwrap();

    assert_eq!(cache.helper(handle).map(|h| h.serial()), Some(Serial::INVALID));
    if let Some(helper) = cache.helper_mut(handle) {
        helper.update_serial(Serial::new(7));
    }
    assert_eq!(cache.helper(handle).map(|h| h.serial()), Some(Serial::new(7)));

    let mut registry = CacheStatsRegistry::new();
    cache.accumulate_cache_stats(&mut registry);
    assert_eq!(registry.get(CacheType::GraphicsPipeline).miss_count(), 1);

    cache.destroy();
    assert!(cache.pipeline(handle).is_none());
    assert_eq!(factory.destroyed(), 1);
    assert!(cache.add_transition(handle, GraphicsPipelineTransitionBits::empty(), Arc::new(defaults()), handle).is_err());
}
