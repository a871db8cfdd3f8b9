//! Descriptor set caches
//!
//! Descriptor sets belong to an external pool, so these caches only remember which set was
//! written for a key. Entries must be cleared (when the pool is reset) before the cache is
//! dropped.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::cache::stats::{CacheStats, CacheStatsAccumulator, CacheType};
use crate::cache_error;
use crate::descriptor::{ShaderBuffersDescriptorDesc, TextureDescriptorDesc, UniformsAndXfbDescriptorDesc};

const SOURCE: &str = "galaxy3d::cache::DescriptorSetCache";

/// Key -> descriptor set handle map
pub struct DescriptorSetCache<K: Eq + Hash, H: Copy> {
    cache_type: CacheType,
    payload: FxHashMap<K, H>,
    stats: CacheStats,
}

pub type TextureDescriptorSetCache<H> = DescriptorSetCache<TextureDescriptorDesc, H>;
pub type UniformsAndXfbDescriptorSetCache<H> = DescriptorSetCache<UniformsAndXfbDescriptorDesc, H>;
pub type ShaderBuffersDescriptorSetCache<H> = DescriptorSetCache<ShaderBuffersDescriptorDesc, H>;

impl<K: Eq + Hash, H: Copy> DescriptorSetCache<K, H> {
    pub fn new(cache_type: CacheType) -> Self {
        Self {
            cache_type,
            payload: FxHashMap::default(),
            stats: CacheStats::new(),
        }
    }

    /// Counts a hit or a miss
    pub fn get(&mut self, key: &K) -> Option<H> {
        match self.payload.get(key) {
            Some(handle) => {
                self.stats.hit();
                Some(*handle)
            }
            None => {
                self.stats.miss();
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, handle: H) {
        self.payload.insert(key, handle);
    }

    /// Forget every set (their pool was reset)
    pub fn clear(&mut self) {
        self.payload.clear();
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn cache_type(&self) -> CacheType {
        self.cache_type
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Clear the cache at teardown
    pub fn destroy(&mut self) {
        self.clear();
    }

    pub fn accumulate_cache_stats(&mut self, accumulator: &mut dyn CacheStatsAccumulator) {
        self.stats.drain_into(self.cache_type, accumulator);
    }
}

impl<K: Eq + Hash, H: Copy> Drop for DescriptorSetCache<K, H> {
    fn drop(&mut self) {
        if !self.payload.is_empty() {
            cache_error!(
                SOURCE,
                "{} cache dropped with {} descriptor sets still cached",
                self.cache_type.name(),
                self.payload.len()
            );
        }
        // Dropped during unwinding: a second panic would abort
        if !std::thread::panicking() {
            debug_assert!(self.payload.is_empty(), "descriptor set cache must be cleared before drop");
        }
    }
}

/// Driver uniforms sets keyed by buffer serial
pub struct DriverUniformsDescriptorSetCache<H: Copy> {
    inner: DescriptorSetCache<u32, H>,
}

impl<H: Copy> DriverUniformsDescriptorSetCache<H> {
    pub fn new() -> Self {
        Self {
            inner: DescriptorSetCache::new(CacheType::DriverUniformsDescriptors),
        }
    }

    pub fn get(&mut self, serial: u32) -> Option<H> {
        self.inner.get(&serial)
    }

    pub fn insert(&mut self, serial: u32, handle: H) {
        self.inner.insert(serial, handle);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        self.inner.stats()
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
    }

    pub fn accumulate_cache_stats(&mut self, accumulator: &mut dyn CacheStatsAccumulator) {
        self.inner.accumulate_cache_stats(accumulator);
    }
}

impl<H: Copy> Default for DriverUniformsDescriptorSetCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "descriptor_set_cache_tests.rs"]
mod tests;
