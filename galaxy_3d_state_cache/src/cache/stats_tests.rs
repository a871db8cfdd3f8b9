//! Unit tests for stats.rs

use crate::cache::stats::{CacheStats, CacheStatsAccumulator, CacheStatsRegistry, CacheType};
use crate::log::LogSeverity;
use crate::test_support::CaptureLogger;
use serial_test::serial;

#[test]
fn test_hit_miss_counters() {
    let mut stats = CacheStats::new();
    stats.miss();
    stats.hit();
    stats.hit();
    stats.hit();
    assert_eq!(stats.hit_count(), 3);
    assert_eq!(stats.miss_count(), 1);
    assert_eq!(stats.lookup_count(), 4);
    assert_eq!(stats.hit_ratio(), 0.75);
}

#[test]
fn test_hit_ratio_of_empty_stats_is_zero() {
    assert_eq!(CacheStats::new().hit_ratio(), 0.0);
}

#[test]
fn test_accumulate_sums() {
    let mut a = CacheStats::new();
    a.hit();
    let mut b = CacheStats::new();
    b.hit();
    b.miss();
    a.accumulate(&b);
    assert_eq!(a.hit_count(), 2);
    assert_eq!(a.miss_count(), 1);
    // source untouched by plain accumulate
    assert_eq!(b.lookup_count(), 2);
}

#[test]
fn test_drain_resets_source() {
    let mut registry = CacheStatsRegistry::new();
    let mut stats = CacheStats::new();
    stats.hit();
    stats.miss();

    stats.drain_into(CacheType::Sampler, &mut registry);
    assert_eq!(stats, CacheStats::new());
    // draining twice does not double count
    stats.drain_into(CacheType::Sampler, &mut registry);

    assert_eq!(registry.get(CacheType::Sampler).hit_count(), 1);
    assert_eq!(registry.get(CacheType::Sampler).miss_count(), 1);
    assert_eq!(registry.get(CacheType::Framebuffer).lookup_count(), 0);
}

#[test]
fn test_registry_total_and_reset() {
    let mut registry = CacheStatsRegistry::new();
    let mut stats = CacheStats::new();
    stats.hit();
    registry.accumulate_cache_stats(CacheType::GraphicsPipeline, &stats);
    registry.accumulate_cache_stats(CacheType::PipelineLayout, &stats);
    assert_eq!(registry.total().hit_count(), 2);

    registry.reset();
    assert_eq!(registry.total().lookup_count(), 0);
}

#[test]
fn test_cache_type_names_are_unique() {
    let mut names: Vec<_> = CacheType::ALL.iter().map(|t| t.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), CacheType::COUNT);
}

#[test]
#[serial]
fn test_report_logs_only_used_caches() {
    let capture = CaptureLogger::install();

    let mut registry = CacheStatsRegistry::new();
    let mut stats = CacheStats::new();
    stats.miss();
    registry.accumulate_cache_stats(CacheType::Sampler, &stats);
    registry.accumulate_cache_stats(CacheType::Framebuffer, &stats);
    registry.report();

    let entries = capture.entries();
    CaptureLogger::uninstall();

    assert_eq!(capture.count(LogSeverity::Info), 2);
    assert!(entries.iter().any(|e| e.message.starts_with("Sampler:")));
    assert!(entries.iter().all(|e| e.source == "galaxy3d::cache::CacheStats"));
}
