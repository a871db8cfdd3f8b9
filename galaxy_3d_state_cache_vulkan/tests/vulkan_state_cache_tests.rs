//! GPU tests for VulkanStateCache
//!
//! Every test creates a headless context and real Vulkan objects. All of them require a
//! GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_state_cache_tests -- --ignored
//! Add `--features vulkan-validation` to check the created objects against the
//! validation layer.

mod common;

use ash::vk;
use galaxy_3d_state_cache::galaxy3d::cache::CacheType;
use galaxy_3d_state_cache::galaxy3d::descriptor::{
    AttachmentOpsArray, DescriptorSetLayoutDesc, FramebufferDesc, LoadOp, PackedAttachmentIndex,
    PipelineLayoutDesc, RenderPassDesc, SamplerDesc, StoreOp,
};
use galaxy_3d_state_cache::galaxy3d::format::FormatId;
use galaxy_3d_state_cache::galaxy3d::serial::{
    ImageOrBufferViewSubresourceSerial, ImageSubresourceRange, ResourceSerialFactory, SerialFactory,
};
use galaxy_3d_state_cache::galaxy3d::state::{
    CullMode, DescriptorSetIndex, DescriptorType, Filter, ImageLayout, RasterizerState, SamplerState,
    ShaderStageFlags, ShaderType,
};
use galaxy_3d_state_cache::galaxy3d::{
    Error, GraphicsPipelineTracker, PipelineSource, StateCacheConfig,
};
use galaxy_3d_state_cache_vulkan::{
    build_pipeline_layout_desc, reflect_shader, GraphicsPipelineShaders, VulkanProgramPipelines,
    VulkanStateCache,
};
use serial_test::serial;
use std::sync::Arc;

use common::*;

fn single_color_render_pass() -> RenderPassDesc {
    let mut desc = RenderPassDesc::new();
    desc.set_samples(1);
    desc.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);
    desc
}

fn cull(mode: CullMode) -> RasterizerState {
    RasterizerState { cull_face: true, cull_mode: mode, ..Default::default() }
}

// ============================================================================
// RENDER PASS TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_compatible_render_pass_is_reused() {
    let context = create_context();
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());
    let desc = single_color_render_pass();

    let first = state_cache.get_compatible_render_pass(&desc).unwrap().handle();
    let second = state_cache.get_compatible_render_pass(&desc).unwrap().handle();

    assert_ne!(first, vk::RenderPass::null());
    assert_eq!(first, second);

    state_cache.accumulate_cache_stats();
    let registry = state_cache.stats_registry();
    assert_eq!(registry.get(CacheType::CompatibleRenderPass).hit_count(), 1);
    assert_eq!(registry.get(CacheType::CompatibleRenderPass).miss_count(), 1);
    assert_eq!(registry.get(CacheType::RenderPassWithOps).miss_count(), 1);
    state_cache.destroy();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_render_pass_ops_select_distinct_objects() {
    let context = create_context();
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());

    let mut desc = single_color_render_pass();
    desc.pack_depth_stencil_attachment(FormatId::D24_UNORM_S8_UINT);

    let mut load_ops = AttachmentOpsArray::new();
    load_ops.init_with_load_store(
        PackedAttachmentIndex::new(0),
        ImageLayout::ColorAttachment,
        ImageLayout::ColorAttachment,
    );
    load_ops.init_with_load_store(
        PackedAttachmentIndex::new(1),
        ImageLayout::DepthStencilAttachment,
        ImageLayout::DepthStencilAttachment,
    );
    let mut clear_ops = load_ops;
    clear_ops.set_ops(PackedAttachmentIndex::new(0), LoadOp::Clear, StoreOp::Store);

    let with_load = state_cache.get_render_pass_with_ops(&desc, &load_ops).unwrap();
    assert_eq!(with_load.attachment_count(), 2);
    let with_load = with_load.handle();
    let with_clear = state_cache.get_render_pass_with_ops(&desc, &clear_ops).unwrap().handle();
    let again = state_cache.get_render_pass_with_ops(&desc, &load_ops).unwrap().handle();

    assert_ne!(with_load, with_clear);
    assert_eq!(with_load, again);
    state_cache.destroy();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_depth_stencil_resolve_is_unsupported() {
    let context = create_context();
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());

    let mut desc = RenderPassDesc::new();
    desc.set_samples(4);
    desc.pack_depth_stencil_attachment(FormatId::D32_FLOAT);
    desc.pack_depth_stencil_resolve_attachment();

    let result = state_cache.get_compatible_render_pass(&desc);
    assert!(matches!(result, Err(Error::Unsupported(_))));
    state_cache.destroy();
}

// ============================================================================
// LAYOUT TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_pipeline_layout_shares_set_layouts() {
    let context = create_context();
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());

    let mut textures = DescriptorSetLayoutDesc::new();
    textures.update(0, DescriptorType::CombinedImageSampler, 2, ShaderStageFlags::FRAGMENT, None);
    let mut desc = PipelineLayoutDesc::new();
    desc.update_descriptor_set_layout(DescriptorSetIndex::Texture, &textures);
    desc.update_push_constant_range(ShaderType::Vertex, 0, 16);

    let layout = state_cache.get_pipeline_layout(&desc).unwrap();
    let again = state_cache.get_pipeline_layout(&desc).unwrap();
    assert!(Arc::ptr_eq(&layout, &again));
    assert_eq!(layout.set_layouts().len(), DescriptorSetIndex::ALL.len());

    let texture_set_layout = state_cache.get_descriptor_set_layout(&textures).unwrap();
    assert!(Arc::ptr_eq(&texture_set_layout, &layout.set_layouts()[DescriptorSetIndex::Texture.to_raw() as usize]));

    // Empty sets collapse to one layout object
    let empty = state_cache.get_descriptor_set_layout(&DescriptorSetLayoutDesc::new()).unwrap();
    assert!(Arc::ptr_eq(&empty, &layout.set_layouts()[0]));
    assert!(Arc::ptr_eq(&empty, &layout.set_layouts()[3]));

    drop((layout, again, texture_set_layout, empty));
    state_cache.destroy();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_layout_from_reflected_shaders() {
    let context = create_context();
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());

    let vertex = reflect_shader(VERTEX_SHADER, ShaderType::Vertex).unwrap();
    let fragment = reflect_shader(FRAGMENT_SHADER, ShaderType::Fragment).unwrap();
    let desc = build_pipeline_layout_desc(&[vertex, fragment]).unwrap();

    let layout = state_cache.get_pipeline_layout(&desc).unwrap();
    assert_ne!(layout.handle(), vk::PipelineLayout::null());

    drop(layout);
    state_cache.destroy();
}

// ============================================================================
// GRAPHICS PIPELINE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_pipeline_tracker_reuses_and_transitions() {
    let context = create_context();
    let config = StateCacheConfig::default();
    let mut state_cache = VulkanStateCache::from_context(&context, config.clone());

    let vertex = create_shader_module(&context, VERTEX_SHADER);
    let fragment = create_shader_module(&context, FRAGMENT_SHADER);
    let layout = state_cache.get_pipeline_layout(&PipelineLayoutDesc::new()).unwrap();
    let shaders = GraphicsPipelineShaders { vertex, fragment: Some(fragment), ..Default::default() };
    let mut program = VulkanProgramPipelines::new(shaders, layout);

    let serials = SerialFactory::default();
    let mut tracker = GraphicsPipelineTracker::new(&config);
    let render_pass_desc = single_color_render_pass();
    tracker.update(|desc, bits| desc.update_render_pass_desc(bits, &render_pass_desc));

    let (no_cull, source) = program.resolve(&mut state_cache, &mut tracker, serials.generate()).unwrap();
    assert_eq!(source, PipelineSource::Created);
    assert_ne!(no_cull, vk::Pipeline::null());

    let (unchanged, source) = program.resolve(&mut state_cache, &mut tracker, serials.generate()).unwrap();
    assert_eq!(source, PipelineSource::Unchanged);
    assert_eq!(unchanged, no_cull);

    tracker.update(|desc, bits| desc.update_cull_mode(bits, &cull(CullMode::Back)));
    let (back, source) = program.resolve(&mut state_cache, &mut tracker, serials.generate()).unwrap();
    assert_eq!(source, PipelineSource::Created);
    assert_ne!(back, no_cull);

    tracker.update(|desc, bits| desc.update_cull_mode(bits, &RasterizerState::default()));
    let (back_to_none, source) = program.resolve(&mut state_cache, &mut tracker, serials.generate()).unwrap();
    assert_eq!(source, PipelineSource::CacheHit);
    assert_eq!(back_to_none, no_cull);

    tracker.update(|desc, bits| desc.update_cull_mode(bits, &cull(CullMode::Back)));
    let (via_transition, source) = program.resolve(&mut state_cache, &mut tracker, serials.generate()).unwrap();
    assert_eq!(source, PipelineSource::Transition);
    assert_eq!(via_transition, back);
    assert_eq!(program.cache().len(), 2);

    program.accumulate_cache_stats(state_cache.stats_registry_mut());
    let pipelines = state_cache.stats_registry().get(CacheType::GraphicsPipeline);
    assert_eq!(pipelines.miss_count(), 2);

    program.destroy();
    drop(program);
    state_cache.destroy();
    destroy_shader_module(&context, vertex);
    destroy_shader_module(&context, fragment);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_pipeline_with_dynamic_scissor() {
    let context = create_context();
    let config = StateCacheConfig::default();
    let mut state_cache = VulkanStateCache::from_context(&context, config.clone());

    let vertex = create_shader_module(&context, VERTEX_SHADER);
    let layout = state_cache.get_pipeline_layout(&PipelineLayoutDesc::new()).unwrap();
    let mut program = VulkanProgramPipelines::new(GraphicsPipelineShaders { vertex, ..Default::default() }, layout);

    let mut tracker = GraphicsPipelineTracker::new(&config);
    let render_pass_desc = single_color_render_pass();
    tracker.update(|desc, bits| {
        desc.update_render_pass_desc(bits, &render_pass_desc);
        desc.set_dynamic_scissor();
    });

    let (pipeline, source) = program.resolve(&mut state_cache, &mut tracker, SerialFactory::default().generate()).unwrap();
    assert_eq!(source, PipelineSource::Created);
    assert_ne!(pipeline, vk::Pipeline::null());
    assert!(tracker.desc().scissor().is_dynamic());

    program.destroy();
    drop(program);
    state_cache.destroy();
    destroy_shader_module(&context, vertex);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_pipeline_with_color_attachment_gap() {
    let context = create_context();
    let config = StateCacheConfig::default();
    let mut state_cache = VulkanStateCache::from_context(&context, config.clone());

    let vertex = create_shader_module(&context, VERTEX_SHADER);
    let fragment = create_shader_module(&context, FRAGMENT_SHADER);
    let layout = state_cache.get_pipeline_layout(&PipelineLayoutDesc::new()).unwrap();
    let shaders = GraphicsPipelineShaders { vertex, fragment: Some(fragment), ..Default::default() };
    let mut program = VulkanProgramPipelines::new(shaders, layout);

    // Colors at 0 and 2, slot 1 disabled: three subpass color references
    let mut render_pass_desc = RenderPassDesc::new();
    render_pass_desc.set_samples(1);
    render_pass_desc.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);
    render_pass_desc.pack_color_attachment_gap(1);
    render_pass_desc.pack_color_attachment(2, FormatId::R8G8B8A8_UNORM);
    assert_eq!(render_pass_desc.color_attachment_range(), 3);
    assert_eq!(render_pass_desc.attachment_count(), 2);

    let mut tracker = GraphicsPipelineTracker::new(&config);
    tracker.update(|desc, bits| desc.update_render_pass_desc(bits, &render_pass_desc));

    let (pipeline, source) = program.resolve(&mut state_cache, &mut tracker, SerialFactory::default().generate()).unwrap();
    assert_eq!(source, PipelineSource::Created);
    assert_ne!(pipeline, vk::Pipeline::null());

    program.destroy();
    drop(program);
    state_cache.destroy();
    destroy_shader_module(&context, vertex);
    destroy_shader_module(&context, fragment);

    #[cfg(feature = "vulkan-validation")]
    assert_eq!(galaxy_3d_state_cache_vulkan::validation_stats().errors, 0);
}

// ============================================================================
// SAMPLER TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_sampler_is_shared() {
    let context = create_context();
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());
    let features = state_cache.config().sampler_features;

    let linear = SamplerDesc::from_state(&SamplerState::default(), &features, false, 0);
    let nearest_state = SamplerState { mag_filter: Filter::Nearest, min_filter: Filter::Nearest, ..Default::default() };
    let nearest = SamplerDesc::from_state(&nearest_state, &features, false, 0);

    let a = state_cache.get_sampler(&linear).unwrap();
    let b = state_cache.get_sampler(&linear).unwrap();
    let c = state_cache.get_sampler(&nearest).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_ne!(a.handle(), c.handle());
    assert!(a.ycbcr_conversion().is_none());

    state_cache.accumulate_cache_stats();
    let samplers = state_cache.stats_registry().get(CacheType::Sampler);
    assert_eq!((samplers.hit_count(), samplers.miss_count()), (1, 2));

    drop((a, b, c));
    state_cache.destroy();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_sampler_with_ycbcr_conversion() {
    let context = create_context();
    if !context.supports_sampler_ycbcr_conversion() {
        return;
    }
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());

    let format_key = vk::Format::G8_B8R8_2PLANE_420_UNORM.as_raw() as u64;
    let state = SamplerState { mag_filter: Filter::Nearest, min_filter: Filter::Nearest, ..Default::default() };
    let desc = SamplerDesc::from_state(&state, &state_cache.config().sampler_features, false, format_key);

    let sampler = state_cache.get_sampler(&desc).unwrap();
    let conversion = sampler.ycbcr_conversion().unwrap();
    assert_eq!(conversion.format(), vk::Format::G8_B8R8_2PLANE_420_UNORM);

    let cached = state_cache.get_sampler_ycbcr_conversion(format_key).unwrap();
    assert!(Arc::ptr_eq(conversion, &cached));

    drop((sampler, cached));
    state_cache.destroy();
}

// ============================================================================
// FRAMEBUFFER TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_framebuffer_is_shared() {
    let context = create_context();
    let mut allocator = create_allocator(&context);
    let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());
    let image = create_color_image(&context, &mut allocator, vk::Format::R8G8B8A8_UNORM, 64, 32);

    let render_pass_desc = single_color_render_pass();

    let serials = ResourceSerialFactory::new();
    let view_serial = ImageOrBufferViewSubresourceSerial::new(
        serials.generate_image_or_buffer_view_serial(),
        ImageSubresourceRange::new(0, 1, 0, false),
    );
    let mut desc = FramebufferDesc::new();
    desc.update_color(0, view_serial);
    desc.update_layer_count(1);

    let first = state_cache.get_framebuffer(&desc, &render_pass_desc, &[image.view], 64, 32).unwrap();
    let second = state_cache.get_framebuffer(&desc, &render_pass_desc, &[image.view], 64, 32).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_ne!(first.handle(), vk::Framebuffer::null());
    assert_eq!((first.width(), first.height(), first.layers()), (64, 32, 1));

    // A different key with the wrong number of views fails without caching anything
    let mut layered = desc;
    layered.update_layer_count(2);
    let result = state_cache.get_framebuffer(&layered, &render_pass_desc, &[image.view, image.view], 64, 32);
    assert!(matches!(result, Err(Error::InvalidResource(_))));

    state_cache.accumulate_cache_stats();
    let framebuffers = state_cache.stats_registry().get(CacheType::Framebuffer);
    assert_eq!((framebuffers.hit_count(), framebuffers.miss_count()), (1, 2));

    drop((first, second));
    state_cache.destroy();
    destroy_image(&context, &mut allocator, image);
}

// ============================================================================
// VALIDATION TESTS
// ============================================================================

#[cfg(feature = "vulkan-validation")]
#[test]
#[ignore] // Requires GPU and VK_LAYER_KHRONOS_validation
#[serial]
fn test_vulkan_cached_objects_pass_validation() {
    use galaxy_3d_state_cache_vulkan::{validation_stats, VulkanContext, VulkanContextConfig};

    let context = VulkanContext::new(VulkanContextConfig::default()).unwrap();
    let config = StateCacheConfig::default();
    let mut state_cache = VulkanStateCache::from_context(&context, config.clone());

    let mut render_pass_desc = single_color_render_pass();
    render_pass_desc.pack_depth_stencil_attachment(FormatId::D32_FLOAT);
    state_cache.get_compatible_render_pass(&render_pass_desc).unwrap();

    let sampler_desc = SamplerDesc::from_state(&SamplerState::default(), &config.sampler_features, false, 0);
    let sampler = state_cache.get_sampler(&sampler_desc).unwrap();

    let vertex = create_shader_module(&context, VERTEX_SHADER);
    let layout = state_cache.get_pipeline_layout(&PipelineLayoutDesc::new()).unwrap();
    let mut program = VulkanProgramPipelines::new(GraphicsPipelineShaders { vertex, ..Default::default() }, layout);
    let mut tracker = GraphicsPipelineTracker::new(&config);
    tracker.update(|desc, bits| desc.update_render_pass_desc(bits, &render_pass_desc));
    program.resolve(&mut state_cache, &mut tracker, SerialFactory::default().generate()).unwrap();

    program.destroy();
    drop((program, sampler));
    state_cache.destroy();
    destroy_shader_module(&context, vertex);

    assert_eq!(validation_stats().errors, 0);
}
