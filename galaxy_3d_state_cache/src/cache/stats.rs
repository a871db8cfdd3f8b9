//! Hit/miss accounting shared by every cache

use crate::cache_info;

/// Identity of each cache, used to aggregate statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheType {
    CompatibleRenderPass,
    RenderPassWithOps,
    GraphicsPipeline,
    PipelineLayout,
    Sampler,
    SamplerYcbcrConversion,
    DescriptorSetLayout,
    DriverUniformsDescriptors,
    TextureDescriptors,
    UniformsAndXfbDescriptors,
    ShaderBuffersDescriptors,
    Framebuffer,
}

impl CacheType {
    pub const COUNT: usize = 12;

    pub const ALL: [CacheType; CacheType::COUNT] = [
        CacheType::CompatibleRenderPass,
        CacheType::RenderPassWithOps,
        CacheType::GraphicsPipeline,
        CacheType::PipelineLayout,
        CacheType::Sampler,
        CacheType::SamplerYcbcrConversion,
        CacheType::DescriptorSetLayout,
        CacheType::DriverUniformsDescriptors,
        CacheType::TextureDescriptors,
        CacheType::UniformsAndXfbDescriptors,
        CacheType::ShaderBuffersDescriptors,
        CacheType::Framebuffer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CacheType::CompatibleRenderPass => "CompatibleRenderPass",
            CacheType::RenderPassWithOps => "RenderPassWithOps",
            CacheType::GraphicsPipeline => "GraphicsPipeline",
            CacheType::PipelineLayout => "PipelineLayout",
            CacheType::Sampler => "Sampler",
            CacheType::SamplerYcbcrConversion => "SamplerYcbcrConversion",
            CacheType::DescriptorSetLayout => "DescriptorSetLayout",
            CacheType::DriverUniformsDescriptors => "DriverUniformsDescriptors",
            CacheType::TextureDescriptors => "TextureDescriptors",
            CacheType::UniformsAndXfbDescriptors => "UniformsAndXfbDescriptors",
            CacheType::ShaderBuffersDescriptors => "ShaderBuffersDescriptors",
            CacheType::Framebuffer => "Framebuffer",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Hit and miss counters of one cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    hit_count: u64,
    miss_count: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn hit(&mut self) {
        self.hit_count += 1;
    }

    #[inline]
    pub fn miss(&mut self) {
        self.miss_count += 1;
    }

    /// Add `other`'s counters to this one
    pub fn accumulate(&mut self, other: &CacheStats) {
        self.hit_count += other.hit_count;
        self.miss_count += other.miss_count;
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    pub fn miss_count(&self) -> u64 {
        self.miss_count
    }

    pub fn lookup_count(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// Hits over lookups, 0 when nothing was looked up
    pub fn hit_ratio(&self) -> f64 {
        match self.lookup_count() {
            0 => 0.0,
            total => self.hit_count as f64 / total as f64,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Hand the counters to `accumulator` and reset them
    pub fn drain_into(&mut self, cache_type: CacheType, accumulator: &mut dyn CacheStatsAccumulator) {
        accumulator.accumulate_cache_stats(cache_type, self);
        self.reset();
    }
}

/// Receiver of drained cache statistics
pub trait CacheStatsAccumulator {
    fn accumulate_cache_stats(&mut self, cache_type: CacheType, stats: &CacheStats);
}

/// Per-device aggregate of every cache's statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStatsRegistry {
    stats: [CacheStats; CacheType::COUNT],
}

impl CacheStatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cache_type: CacheType) -> &CacheStats {
        &self.stats[cache_type.index()]
    }

    /// Sum over all caches
    pub fn total(&self) -> CacheStats {
        let mut total = CacheStats::new();
        for stats in &self.stats {
            total.accumulate(stats);
        }
        total
    }

    pub fn reset(&mut self) {
        self.stats = Default::default();
    }

    /// Log one line per cache that saw lookups
    pub fn report(&self) {
        for cache_type in CacheType::ALL {
            let stats = self.get(cache_type);
            if stats.lookup_count() == 0 {
                continue;
            }
            cache_info!(
                "galaxy3d::cache::CacheStats",
                "{}: {} hits, {} misses ({:.1}% hit ratio)",
                cache_type.name(),
                stats.hit_count(),
                stats.miss_count(),
                stats.hit_ratio() * 100.0
            );
        }
    }
}

impl CacheStatsAccumulator for CacheStatsRegistry {
    fn accumulate_cache_stats(&mut self, cache_type: CacheType, stats: &CacheStats) {
        self.stats[cache_type.index()].accumulate(stats);
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
