//! State cache configuration

use crate::log::{LogSeverity, StateCacheLog};

/// Device capabilities and workarounds that shape sampler descriptions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerFeatures {
    /// Replace linear mag/min filters by nearest
    pub force_nearest_filtering: bool,
    /// Replace linear mipmap filtering by nearest
    pub force_nearest_mip_filtering: bool,
    /// Device supports anisotropic filtering
    pub sampler_anisotropy: bool,
    /// Device limit on max anisotropy
    pub max_sampler_anisotropy: f32,
}

impl Default for SamplerFeatures {
    fn default() -> Self {
        Self {
            force_nearest_filtering: false,
            force_nearest_mip_filtering: false,
            sampler_anisotropy: false,
            max_sampler_anisotropy: 1.0,
        }
    }
}

/// Per-device state cache configuration
#[derive(Debug, Clone)]
pub struct StateCacheConfig {
    /// Resolve incremental pipeline changes through recorded transitions
    pub enable_pipeline_transitions: bool,
    /// Log every cache miss that creates a native object
    pub log_cache_misses: bool,
    /// Log accumulated hit/miss statistics when the caches are destroyed
    pub report_stats_on_destroy: bool,
    /// Minimum severity of the global state cache log
    pub min_log_severity: LogSeverity,
    pub sampler_features: SamplerFeatures,
}

impl Default for StateCacheConfig {
    fn default() -> Self {
        Self {
            enable_pipeline_transitions: true,
            log_cache_misses: cfg!(debug_assertions),
            report_stats_on_destroy: true,
            min_log_severity: LogSeverity::Info,
            sampler_features: SamplerFeatures::default(),
        }
    }
}

impl StateCacheConfig {
    /// Push the logging part of the configuration to the global log
    pub fn apply_logging(&self) {
        StateCacheLog::set_min_severity(self.min_log_severity);
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
