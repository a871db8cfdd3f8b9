//! Descriptor-keyed caches of native objects and descriptor sets

pub mod stats;
pub mod object_cache;
pub mod render_pass_cache;
pub mod pipeline_cache;
pub mod descriptor_set_cache;

pub use stats::{CacheStats, CacheStatsAccumulator, CacheStatsRegistry, CacheType};
pub use object_cache::{
    CacheKind, DescriptorSetLayoutCache, FramebufferCache, PipelineLayoutCache, SamplerCache,
    SamplerYcbcrConversionCache, SharedObjectCache,
};
pub use render_pass_cache::{default_attachment_ops, RenderPassCache};
pub use pipeline_cache::{
    GraphicsPipelineCache, GraphicsPipelineTransition, PipelineCacheId, PipelineHandle, PipelineHelper,
};
pub use descriptor_set_cache::{
    DescriptorSetCache, DriverUniformsDescriptorSetCache, ShaderBuffersDescriptorSetCache,
    TextureDescriptorSetCache, UniformsAndXfbDescriptorSetCache,
};
