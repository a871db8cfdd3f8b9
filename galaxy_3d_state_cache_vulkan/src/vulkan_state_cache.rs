/// VulkanStateCache - every state cache of one Vulkan device
///
/// Glues the backend-agnostic caches to `VulkanObjectFactory`: each `get_*` call is a
/// cache lookup whose miss path creates the native object. Graphics pipelines are cached
/// per program in `VulkanProgramPipelines`, since their key carries no shaders.

use ash::vk;
use std::sync::Arc;

use galaxy_3d_state_cache::galaxy3d::cache::{
    CacheStatsAccumulator, CacheStatsRegistry, CacheType, DescriptorSetLayoutCache,
    DriverUniformsDescriptorSetCache, FramebufferCache, GraphicsPipelineCache, PipelineLayoutCache,
    RenderPassCache, SamplerCache, SamplerYcbcrConversionCache, ShaderBuffersDescriptorSetCache,
    TextureDescriptorSetCache, UniformsAndXfbDescriptorSetCache,
};
use galaxy_3d_state_cache::galaxy3d::descriptor::{
    AttachmentOpsArray, DescriptorSetLayoutDesc, FramebufferDesc, PipelineLayoutDesc, RenderPassDesc,
    SamplerDesc,
};
use galaxy_3d_state_cache::galaxy3d::serial::Serial;
use galaxy_3d_state_cache::galaxy3d::state::DescriptorSetIndex;
use galaxy_3d_state_cache::galaxy3d::{
    Error, GraphicsPipelineTracker, PipelineSource, Result, StateCacheConfig,
};
use galaxy_3d_state_cache::cache_debug;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_descriptor_set::VulkanDescriptorSetLayout;
use crate::vulkan_factory::{GraphicsPipelineShaders, VulkanObjectFactory};
use crate::vulkan_frame_buffer::VulkanFramebuffer;
use crate::vulkan_pipeline::{VulkanPipeline, VulkanPipelineLayout};
use crate::vulkan_render_pass::VulkanRenderPass;
use crate::vulkan_sampler::{VulkanSampler, VulkanSamplerYcbcrConversion};

const SOURCE: &str = "galaxy3d::vulkan::StateCache";

/// Descriptor set caches; the sets themselves belong to the caller's pools
pub struct DescriptorSetCaches {
    pub driver_uniforms: DriverUniformsDescriptorSetCache<vk::DescriptorSet>,
    pub textures: TextureDescriptorSetCache<vk::DescriptorSet>,
    pub uniforms_and_xfb: UniformsAndXfbDescriptorSetCache<vk::DescriptorSet>,
    pub shader_buffers: ShaderBuffersDescriptorSetCache<vk::DescriptorSet>,
}

impl DescriptorSetCaches {
    fn new() -> Self {
        Self {
            driver_uniforms: DriverUniformsDescriptorSetCache::new(),
            textures: TextureDescriptorSetCache::new(CacheType::TextureDescriptors),
            uniforms_and_xfb: UniformsAndXfbDescriptorSetCache::new(CacheType::UniformsAndXfbDescriptors),
            shader_buffers: ShaderBuffersDescriptorSetCache::new(CacheType::ShaderBuffersDescriptors),
        }
    }

    /// Forget every set, e.g. after the owning pools were reset
    pub fn clear(&mut self) {
        self.driver_uniforms.clear();
        self.textures.clear();
        self.uniforms_and_xfb.clear();
        self.shader_buffers.clear();
    }

    fn destroy(&mut self) {
        self.driver_uniforms.destroy();
        self.textures.destroy();
        self.uniforms_and_xfb.destroy();
        self.shader_buffers.destroy();
    }

    fn accumulate_cache_stats(&mut self, accumulator: &mut dyn CacheStatsAccumulator) {
        self.driver_uniforms.accumulate_cache_stats(accumulator);
        self.textures.accumulate_cache_stats(accumulator);
        self.uniforms_and_xfb.accumulate_cache_stats(accumulator);
        self.shader_buffers.accumulate_cache_stats(accumulator);
    }
}

pub struct VulkanStateCache {
    factory: VulkanObjectFactory,
    config: StateCacheConfig,
    render_passes: RenderPassCache<VulkanRenderPass>,
    descriptor_set_layouts: DescriptorSetLayoutCache<VulkanDescriptorSetLayout>,
    pipeline_layouts: PipelineLayoutCache<VulkanPipelineLayout>,
    ycbcr_conversions: SamplerYcbcrConversionCache<VulkanSamplerYcbcrConversion>,
    samplers: SamplerCache<VulkanSampler>,
    framebuffers: FramebufferCache<VulkanFramebuffer>,
    descriptor_sets: DescriptorSetCaches,
    stats: CacheStatsRegistry,
    destroyed: bool,
}

impl VulkanStateCache {
    pub fn new(device: ash::Device, config: StateCacheConfig) -> Self {
        config.apply_logging();
        Self {
            factory: VulkanObjectFactory::new(device, config.log_cache_misses),
            config,
            render_passes: RenderPassCache::new(),
            descriptor_set_layouts: DescriptorSetLayoutCache::new(),
            pipeline_layouts: PipelineLayoutCache::new(),
            ycbcr_conversions: SamplerYcbcrConversionCache::new(),
            samplers: SamplerCache::new(),
            framebuffers: FramebufferCache::new(),
            descriptor_sets: DescriptorSetCaches::new(),
            stats: CacheStatsRegistry::new(),
            destroyed: false,
        }
    }

    /// State cache on the context's device, with its sampler capabilities
    pub fn from_context(context: &VulkanContext, mut config: StateCacheConfig) -> Self {
        config.sampler_features = context.sampler_features();
        Self::new(context.device().clone(), config)
    }

    pub fn config(&self) -> &StateCacheConfig {
        &self.config
    }

    pub fn factory(&self) -> &VulkanObjectFactory {
        &self.factory
    }

    // ===== RENDER PASSES =====

    pub fn get_compatible_render_pass(&mut self, desc: &RenderPassDesc) -> Result<&VulkanRenderPass> {
        let factory = &self.factory;
        self.render_passes
            .get_compatible_render_pass(desc, |desc, ops| factory.create_render_pass(desc, ops))
    }

    pub fn get_render_pass_with_ops(
        &mut self,
        desc: &RenderPassDesc,
        ops: &AttachmentOpsArray,
    ) -> Result<&VulkanRenderPass> {
        let factory = &self.factory;
        self.render_passes
            .get_render_pass_with_ops(desc, ops, |desc, ops| factory.create_render_pass(desc, ops))
    }

    // ===== LAYOUTS =====

    pub fn get_descriptor_set_layout(&mut self, desc: &DescriptorSetLayoutDesc) -> Result<Arc<VulkanDescriptorSetLayout>> {
        let factory = &self.factory;
        self.descriptor_set_layouts
            .get_or_create(desc, |desc| factory.create_descriptor_set_layout(desc))
    }

    /// Pipeline layout for `desc`, creating the set layouts of every set index on a miss
    pub fn get_pipeline_layout(&mut self, desc: &PipelineLayoutDesc) -> Result<Arc<VulkanPipelineLayout>> {
        let factory = &self.factory;
        let set_layout_cache = &mut self.descriptor_set_layouts;
        self.pipeline_layouts.get_or_create(desc, |desc| {
            let set_layouts = DescriptorSetIndex::ALL
                .iter()
                .map(|&set_index| {
                    set_layout_cache.get_or_create(desc.descriptor_set_layout(set_index), |set_desc| {
                        factory.create_descriptor_set_layout(set_desc)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            factory.create_pipeline_layout(desc, set_layouts)
        })
    }

    // ===== SAMPLERS =====

    pub fn get_sampler_ycbcr_conversion(&mut self, format_key: u64) -> Result<Arc<VulkanSamplerYcbcrConversion>> {
        let factory = &self.factory;
        self.ycbcr_conversions
            .get_or_create(&format_key, |&key| factory.create_sampler_ycbcr_conversion(key))
    }

    /// Sampler for `desc`; a non-zero external format pulls in its Y'CbCr conversion
    pub fn get_sampler(&mut self, desc: &SamplerDesc) -> Result<Arc<VulkanSampler>> {
        let conversion = if desc.external_format() != 0 && self.samplers.get(desc).is_none() {
            Some(self.get_sampler_ycbcr_conversion(desc.external_format())?)
        } else {
            None
        };
        let factory = &self.factory;
        self.samplers
            .get_or_create(desc, |desc| factory.create_sampler(desc, conversion))
    }

    // ===== FRAMEBUFFERS =====

    /// Framebuffer for `desc`, created against a render pass compatible with `render_pass_desc`
    ///
    /// `views` lists one image view per native attachment and is only read on a miss.
    pub fn get_framebuffer(
        &mut self,
        desc: &FramebufferDesc,
        render_pass_desc: &RenderPassDesc,
        views: &[vk::ImageView],
        width: u32,
        height: u32,
    ) -> Result<Arc<VulkanFramebuffer>> {
        let factory = &self.factory;
        let render_passes = &mut self.render_passes;
        self.framebuffers.get_or_create(desc, |desc| {
            let render_pass = render_passes
                .get_compatible_render_pass(render_pass_desc, |rp_desc, ops| factory.create_render_pass(rp_desc, ops))?;
            factory.create_framebuffer(desc, render_pass, views, width, height)
        })
    }

    // ===== DESCRIPTOR SETS =====

    pub fn descriptor_sets(&self) -> &DescriptorSetCaches {
        &self.descriptor_sets
    }

    pub fn descriptor_sets_mut(&mut self) -> &mut DescriptorSetCaches {
        &mut self.descriptor_sets
    }

    // ===== STATISTICS =====

    /// Move the counters of every owned cache into the registry
    pub fn accumulate_cache_stats(&mut self) {
        let stats = &mut self.stats;
        self.render_passes.accumulate_cache_stats(stats);
        self.descriptor_set_layouts.accumulate_cache_stats(stats);
        self.pipeline_layouts.accumulate_cache_stats(stats);
        self.ycbcr_conversions.accumulate_cache_stats(stats);
        self.samplers.accumulate_cache_stats(stats);
        self.framebuffers.accumulate_cache_stats(stats);
        self.descriptor_sets.accumulate_cache_stats(stats);
    }

    pub fn stats_registry(&self) -> &CacheStatsRegistry {
        &self.stats
    }

    pub fn stats_registry_mut(&mut self) -> &mut CacheStatsRegistry {
        &mut self.stats
    }

    // ===== TEARDOWN =====

    /// Release every cached object; the device must be idle
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        self.accumulate_cache_stats();
        if self.config.report_stats_on_destroy {
            self.stats.report();
        }

        self.descriptor_sets.destroy();
        self.framebuffers.destroy();
        self.samplers.destroy();
        self.ycbcr_conversions.destroy();
        self.pipeline_layouts.destroy();
        self.descriptor_set_layouts.destroy();
        self.render_passes.destroy();

        self.destroyed = true;
        cache_debug!(SOURCE, "State cache destroyed");
    }
}

impl Drop for VulkanStateCache {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Graphics pipelines of one shader program
pub struct VulkanProgramPipelines {
    shaders: GraphicsPipelineShaders,
    layout: Arc<VulkanPipelineLayout>,
    cache: GraphicsPipelineCache<VulkanPipeline>,
}

impl VulkanProgramPipelines {
    pub fn new(shaders: GraphicsPipelineShaders, layout: Arc<VulkanPipelineLayout>) -> Self {
        Self {
            shaders,
            layout,
            cache: GraphicsPipelineCache::new(),
        }
    }

    pub fn layout(&self) -> &Arc<VulkanPipelineLayout> {
        &self.layout
    }

    pub fn cache(&self) -> &GraphicsPipelineCache<VulkanPipeline> {
        &self.cache
    }

    /// Native pipeline for the tracker's working state
    ///
    /// Pipelines are created against a render pass compatible with the descriptor's
    /// render pass description. Invalidate `tracker` when it last resolved against
    /// another program.
    pub fn resolve(
        &mut self,
        state_cache: &mut VulkanStateCache,
        tracker: &mut GraphicsPipelineTracker,
        queue_serial: Serial,
    ) -> Result<(vk::Pipeline, PipelineSource)> {
        let render_pass = state_cache
            .get_compatible_render_pass(tracker.desc().render_pass_desc())?
            .handle();
        let factory = state_cache.factory();
        let shaders = &self.shaders;
        let layout = self.layout.handle();

        let (handle, source) = tracker.resolve_pipeline(&mut self.cache, queue_serial, |desc| {
            factory.create_graphics_pipeline(desc, shaders, layout, render_pass)
        })?;

        let pipeline = self
            .cache
            .pipeline(handle)
            .map(VulkanPipeline::handle)
            .ok_or_else(|| Error::InvalidResource("resolved pipeline handle is stale".to_string()))?;
        Ok((pipeline, source))
    }

    pub fn accumulate_cache_stats(&mut self, accumulator: &mut dyn CacheStatsAccumulator) {
        self.cache.accumulate_cache_stats(accumulator);
    }

    /// Destroy every pipeline of the program; the device must be idle
    pub fn destroy(&mut self) {
        self.cache.destroy();
    }
}
