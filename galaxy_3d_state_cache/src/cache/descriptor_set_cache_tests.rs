//! Unit tests for descriptor_set_cache.rs

use crate::cache::descriptor_set_cache::{
    DescriptorSetCache, DriverUniformsDescriptorSetCache, ShaderBuffersDescriptorSetCache,
    TextureDescriptorSetCache,
};
use crate::cache::stats::{CacheStatsRegistry, CacheType};
use crate::descriptor::{ShaderBuffersDescriptorDesc, TextureDescriptorDesc};
use crate::serial::{ImageOrBufferViewSubresourceSerial, ImageSubresourceRange, ResourceSerialFactory};

#[test]
fn test_get_counts_hits_and_misses() {
    let factory = ResourceSerialFactory::new();
    let mut key = TextureDescriptorDesc::new();
    key.update(
        0,
        ImageOrBufferViewSubresourceSerial::new(factory.generate_image_or_buffer_view_serial(), ImageSubresourceRange::new(0, 1, 0, false)),
        factory.generate_sampler_serial(),
    );

    let mut cache = TextureDescriptorSetCache::<u64>::new(CacheType::TextureDescriptors);
    assert_eq!(cache.get(&key), None);
    cache.insert(key, 0xD5);
    assert_eq!(cache.get(&key), Some(0xD5));
    assert_eq!(cache.stats().miss_count(), 1);
    assert_eq!(cache.stats().hit_count(), 1);

    let mut registry = CacheStatsRegistry::new();
    cache.accumulate_cache_stats(&mut registry);
    assert_eq!(registry.get(CacheType::TextureDescriptors).lookup_count(), 2);

    cache.destroy();
}

#[test]
fn test_clear_forgets_sets() {
    let mut cache = ShaderBuffersDescriptorSetCache::<u64>::new(CacheType::ShaderBuffersDescriptors);
    let mut key = ShaderBuffersDescriptorDesc::new();
    key.append_32bit_value(12);
    cache.insert(key.clone(), 1);
    assert_eq!(cache.len(), 1);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get(&key), None);
}

#[test]
fn test_driver_uniforms_cache() {
    let mut cache = DriverUniformsDescriptorSetCache::<u64>::new();
    cache.insert(7, 70);
    assert_eq!(cache.get(7), Some(70));
    assert_eq!(cache.get(8), None);

    let mut registry = CacheStatsRegistry::new();
    cache.accumulate_cache_stats(&mut registry);
    assert_eq!(registry.get(CacheType::DriverUniformsDescriptors).hit_count(), 1);
    assert_eq!(registry.get(CacheType::DriverUniformsDescriptors).miss_count(), 1);

    cache.destroy();
    assert!(cache.is_empty());
}

#[test]
#[serial_test::serial]
#[cfg(not(debug_assertions))]
fn test_drop_non_empty_logs_error() {
    use crate::log::LogSeverity;
    use crate::test_support::CaptureLogger;

    let capture = CaptureLogger::install();
    {
        let mut cache = DescriptorSetCache::<u32, u64>::new(CacheType::UniformsAndXfbDescriptors);
        cache.insert(1, 1);
    }
    let errors = capture.count(LogSeverity::Error);
    CaptureLogger::uninstall();
    assert_eq!(errors, 1);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "descriptor set cache must be cleared before drop")]
fn test_drop_non_empty_asserts() {
    let mut cache = DescriptorSetCache::<u32, u64>::new(CacheType::UniformsAndXfbDescriptors);
    cache.insert(1, 1);
    drop(cache);
}

#[test]
#[should_panic(expected = "frame recording failed")]
fn test_drop_non_empty_while_unwinding_keeps_original_panic() {
    let mut cache = DescriptorSetCache::<u32, u64>::new(CacheType::UniformsAndXfbDescriptors);
    cache.insert(1, 1);
    panic!("frame recording failed");
}
