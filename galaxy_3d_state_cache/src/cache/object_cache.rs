//! Single-level caches of shared native objects
//!
//! Samplers, layouts, Y'CbCr conversions and framebuffers all follow the same shape: a
//! packed key maps to an `Arc` of the native wrapper. The cache holds one reference; every
//! binding that uses the object holds another, and the native handle is destroyed when the
//! last `Arc` drops.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::stats::{CacheStats, CacheStatsAccumulator, CacheType};
use crate::descriptor::{DescriptorSetLayoutDesc, FramebufferDesc, PipelineLayoutDesc, SamplerDesc};
use crate::error::Result;
use crate::cache_error;

/// Compile-time identity of an object cache
pub trait CacheKind {
    const CACHE_TYPE: CacheType;
    /// Log source of the cache
    const NAME: &'static str;
    type Key: Eq + Hash + Clone;
}

pub struct SamplerKind;
pub struct DescriptorSetLayoutKind;
pub struct PipelineLayoutKind;
pub struct SamplerYcbcrConversionKind;
pub struct FramebufferKind;

impl CacheKind for SamplerKind {
    const CACHE_TYPE: CacheType = CacheType::Sampler;
    const NAME: &'static str = "galaxy3d::cache::SamplerCache";
    type Key = SamplerDesc;
}

impl CacheKind for DescriptorSetLayoutKind {
    const CACHE_TYPE: CacheType = CacheType::DescriptorSetLayout;
    const NAME: &'static str = "galaxy3d::cache::DescriptorSetLayoutCache";
    type Key = DescriptorSetLayoutDesc;
}

impl CacheKind for PipelineLayoutKind {
    const CACHE_TYPE: CacheType = CacheType::PipelineLayout;
    const NAME: &'static str = "galaxy3d::cache::PipelineLayoutCache";
    type Key = PipelineLayoutDesc;
}

impl CacheKind for SamplerYcbcrConversionKind {
    const CACHE_TYPE: CacheType = CacheType::SamplerYcbcrConversion;
    const NAME: &'static str = "galaxy3d::cache::SamplerYcbcrConversionCache";
    /// External (hardware-specific) format
    type Key = u64;
}

impl CacheKind for FramebufferKind {
    const CACHE_TYPE: CacheType = CacheType::Framebuffer;
    const NAME: &'static str = "galaxy3d::cache::FramebufferCache";
    type Key = FramebufferDesc;
}

/// Key -> shared native object map with hit/miss accounting
pub struct SharedObjectCache<C: CacheKind, T> {
    payload: FxHashMap<C::Key, Arc<T>>,
    stats: CacheStats,
    _kind: PhantomData<C>,
}

pub type SamplerCache<T> = SharedObjectCache<SamplerKind, T>;
pub type DescriptorSetLayoutCache<T> = SharedObjectCache<DescriptorSetLayoutKind, T>;
pub type PipelineLayoutCache<T> = SharedObjectCache<PipelineLayoutKind, T>;
pub type SamplerYcbcrConversionCache<T> = SharedObjectCache<SamplerYcbcrConversionKind, T>;
pub type FramebufferCache<T> = SharedObjectCache<FramebufferKind, T>;

impl<C: CacheKind, T> SharedObjectCache<C, T> {
    pub fn new() -> Self {
        Self {
            payload: FxHashMap::default(),
            stats: CacheStats::new(),
            _kind: PhantomData,
        }
    }

    /// Return the object cached under `key`, creating it with `create` on a miss
    ///
    /// A failing `create` leaves the cache unchanged.
    pub fn get_or_create<F>(&mut self, key: &C::Key, create: F) -> Result<Arc<T>>
    where
        F: FnOnce(&C::Key) -> Result<T>,
    {
        if let Some(object) = self.payload.get(key) {
            self.stats.hit();
            return Ok(Arc::clone(object));
        }

        self.stats.miss();
        let object = Arc::new(create(key)?);
        self.payload.insert(key.clone(), Arc::clone(&object));
        Ok(object)
    }

    /// Lookup without creation and without touching the statistics
    pub fn get(&self, key: &C::Key) -> Option<Arc<T>> {
        self.payload.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Release the cache's references; objects still bound elsewhere stay alive
    pub fn destroy(&mut self) {
        let shared = self.payload.values().filter(|object| Arc::strong_count(object) > 1).count();
        if shared > 0 {
            cache_error!(
                C::NAME,
                "Destroying cache while {} of {} objects are still referenced",
                shared,
                self.payload.len()
            );
        }
        self.payload.clear();
    }

    pub fn accumulate_cache_stats(&mut self, accumulator: &mut dyn CacheStatsAccumulator) {
        self.stats.drain_into(C::CACHE_TYPE, accumulator);
    }
}

impl<C: CacheKind, T> Default for SharedObjectCache<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "object_cache_tests.rs"]
mod tests;
