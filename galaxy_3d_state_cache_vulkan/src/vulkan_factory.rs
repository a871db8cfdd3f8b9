/// VulkanObjectFactory - native object creation for every state cache
///
/// Each `create_*` entry point unpacks one descriptor into the matching
/// `vk::*CreateInfo` and performs exactly one creation call. Caches invoke them on a
/// miss; a failure is logged here and leaves the calling cache unchanged.

use ash::vk;
use ash::vk::Handle;
use std::sync::Arc;

use galaxy_3d_state_cache::galaxy3d::descriptor::{
    AttachmentOpsArray, DescriptorSetLayoutDesc, FramebufferDesc, GraphicsPipelineDesc,
    PackedAttachmentIndex, PackedStencilOpState, PipelineLayoutDesc, RenderPassDesc, SamplerDesc,
    MAX_VERTEX_ATTRIBS,
};
use galaxy_3d_state_cache::galaxy3d::format::FormatId;
use galaxy_3d_state_cache::galaxy3d::state::{PrimitiveTopology, ShaderType};
use galaxy_3d_state_cache::galaxy3d::{Error, Result};
use galaxy_3d_state_cache::{cache_debug, cache_err, cache_error};

use crate::vulkan_conversions::*;
use crate::vulkan_descriptor_set::VulkanDescriptorSetLayout;
use crate::vulkan_frame_buffer::VulkanFramebuffer;
use crate::vulkan_pipeline::{VulkanPipeline, VulkanPipelineLayout};
use crate::vulkan_render_pass::VulkanRenderPass;
use crate::vulkan_sampler::{VulkanSampler, VulkanSamplerYcbcrConversion};

const SOURCE: &str = "galaxy3d::vulkan::Factory";

/// Shader modules of one program, owned by the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphicsPipelineShaders {
    pub vertex: vk::ShaderModule,
    pub tessellation_control: Option<vk::ShaderModule>,
    pub tessellation_evaluation: Option<vk::ShaderModule>,
    pub geometry: Option<vk::ShaderModule>,
    pub fragment: Option<vk::ShaderModule>,
}

impl GraphicsPipelineShaders {
    fn stages(&self) -> Vec<vk::PipelineShaderStageCreateInfo<'static>> {
        let optional = [
            (vk::ShaderStageFlags::TESSELLATION_CONTROL, self.tessellation_control),
            (vk::ShaderStageFlags::TESSELLATION_EVALUATION, self.tessellation_evaluation),
            (vk::ShaderStageFlags::GEOMETRY, self.geometry),
            (vk::ShaderStageFlags::FRAGMENT, self.fragment),
        ];

        std::iter::once((vk::ShaderStageFlags::VERTEX, Some(self.vertex)))
            .chain(optional)
            .filter_map(|(stage, module)| {
                module.map(|module| {
                    vk::PipelineShaderStageCreateInfo::default()
                        .stage(stage)
                        .module(module)
                        .name(c"main")
                })
            })
            .collect()
    }
}

/// Map a failed creation call to the crate error, logging it
fn creation_error(what: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            cache_error!(SOURCE, "Failed to create {}: {:?}", what, result);
            Error::OutOfMemory
        }
        _ => cache_err!(SOURCE, "Failed to create {}: {:?}", what, result),
    }
}

fn unsupported(what: &str) -> Error {
    cache_error!(SOURCE, "Unsupported {}", what);
    Error::Unsupported(what.to_string())
}

fn stencil_op_state(face: &PackedStencilOpState, reference: u8) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: vk_stencil_op(face.fail_op()),
        pass_op: vk_stencil_op(face.pass_op()),
        depth_fail_op: vk_stencil_op(face.depth_fail_op()),
        compare_op: vk_compare_op(face.compare_op()),
        compare_mask: u32::from(face.compare_mask()),
        write_mask: u32::from(face.write_mask()),
        reference: u32::from(reference),
    }
}

pub struct VulkanObjectFactory {
    device: ash::Device,
    /// Log every creation (i.e. every cache miss) at debug level
    log_creations: bool,
}

impl VulkanObjectFactory {
    pub fn new(device: ash::Device, log_creations: bool) -> Self {
        Self { device, log_creations }
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    // ===== RENDER PASS =====

    /// Single-subpass render pass listing attachments in GL order
    ///
    /// Native attachment order: enabled colors, depth/stencil, color resolves. Disabled
    /// color slots stay in the subpass as `VK_ATTACHMENT_UNUSED`.
    pub fn create_render_pass(&self, desc: &RenderPassDesc, ops: &AttachmentOpsArray) -> Result<VulkanRenderPass> {
        if desc.has_depth_stencil_resolve_attachment() {
            return Err(unsupported("depth/stencil resolve attachment"));
        }
        if desc.has_unresolve_attachments() {
            return Err(unsupported("unresolve attachments"));
        }

        let samples = vk_sample_count(desc.samples());
        let framebuffer_fetch = desc.has_framebuffer_fetch();
        let color_layout = if framebuffer_fetch {
            vk::ImageLayout::GENERAL
        } else {
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
        };
        let unused = vk::AttachmentReference { attachment: vk::ATTACHMENT_UNUSED, layout: vk::ImageLayout::UNDEFINED };

        let mut attachments = Vec::with_capacity(desc.attachment_count());
        let mut color_refs = Vec::with_capacity(desc.color_attachment_range());
        let mut packed_index = 0u32;

        for color_index_gl in 0..desc.color_attachment_range() {
            if !desc.is_color_attachment_enabled(color_index_gl) {
                color_refs.push(unused);
                continue;
            }

            let op = ops[PackedAttachmentIndex::new(packed_index)];
            attachments.push(
                vk::AttachmentDescription::default()
                    .format(vk_format(desc.format_at(color_index_gl)))
                    .samples(samples)
                    .load_op(vk_load_op(op.load_op()))
                    .store_op(vk_store_op(op.store_op()))
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk_image_layout(op.initial_layout()))
                    .final_layout(vk_image_layout(op.final_layout())),
            );
            color_refs.push(vk::AttachmentReference { attachment: packed_index, layout: color_layout });
            packed_index += 1;
        }

        let depth_stencil_ref = if desc.has_depth_stencil_attachment() {
            let format = desc.format_at(desc.depth_stencil_attachment_index());
            let op = ops[PackedAttachmentIndex::new(packed_index)];
            let (load_op, store_op) = if format.has_depth() {
                (vk_load_op(op.load_op()), vk_store_op(op.store_op()))
            } else {
                (vk::AttachmentLoadOp::DONT_CARE, vk::AttachmentStoreOp::DONT_CARE)
            };
            let (stencil_load_op, stencil_store_op) = if format.has_stencil() {
                (vk_load_op(op.stencil_load_op()), vk_store_op(op.stencil_store_op()))
            } else {
                (vk::AttachmentLoadOp::DONT_CARE, vk::AttachmentStoreOp::DONT_CARE)
            };

            attachments.push(
                vk::AttachmentDescription::default()
                    .format(vk_format(format))
                    .samples(samples)
                    .load_op(load_op)
                    .store_op(store_op)
                    .stencil_load_op(stencil_load_op)
                    .stencil_store_op(stencil_store_op)
                    .initial_layout(vk_image_layout(op.initial_layout()))
                    .final_layout(vk_image_layout(op.final_layout())),
            );
            let reference = vk::AttachmentReference {
                attachment: packed_index,
                layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            };
            packed_index += 1;
            Some(reference)
        } else {
            None
        };

        let mut resolve_refs = vec![unused; color_refs.len()];
        for (color_index_gl, resolve_ref) in resolve_refs.iter_mut().enumerate() {
            if !desc.has_color_resolve_attachment(color_index_gl) {
                continue;
            }
            attachments.push(
                vk::AttachmentDescription::default()
                    .format(vk_format(desc.format_at(color_index_gl)))
                    .samples(vk::SampleCountFlags::TYPE_1)
                    .load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .store_op(vk::AttachmentStoreOp::STORE)
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk::ImageLayout::UNDEFINED)
                    .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
            );
            *resolve_ref = vk::AttachmentReference {
                attachment: packed_index,
                layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            };
            packed_index += 1;
        }

        // Framebuffer fetch reads every color attachment as an input attachment
        let input_refs: Vec<vk::AttachmentReference> = if framebuffer_fetch { color_refs.clone() } else { Vec::new() };

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .input_attachments(&input_refs)
            .color_attachments(&color_refs);
        if desc.color_resolve_attachment_mask().bits() != 0 {
            subpass = subpass.resolve_attachments(&resolve_refs);
        }
        if let Some(reference) = depth_stencil_ref.as_ref() {
            subpass = subpass.depth_stencil_attachment(reference);
        }

        let dependencies: Vec<vk::SubpassDependency> = if framebuffer_fetch {
            vec![vk::SubpassDependency::default()
                .src_subpass(0)
                .dst_subpass(0)
                .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
                .dst_stage_mask(vk::PipelineStageFlags::FRAGMENT_SHADER)
                .src_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
                .dst_access_mask(vk::AccessFlags::INPUT_ATTACHMENT_READ)
                .dependency_flags(vk::DependencyFlags::BY_REGION)]
        } else {
            Vec::new()
        };

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(&dependencies);

        if self.log_creations {
            cache_debug!(
                SOURCE,
                "Creating render pass ({} attachments, {} samples)",
                attachments.len(),
                desc.samples()
            );
        }

        let render_pass = unsafe { self.device.create_render_pass(&create_info, None) }
            .map_err(|e| creation_error("render pass", e))?;
        Ok(VulkanRenderPass::new(render_pass, packed_index, self.device.clone()))
    }

    // ===== GRAPHICS PIPELINE =====

    /// Graphics pipeline baking every state of `desc`
    ///
    /// A dynamic scissor in `desc` becomes `VK_DYNAMIC_STATE_SCISSOR`. Attribute `i` reads
    /// from vertex binding `i`.
    pub fn create_graphics_pipeline(
        &self,
        desc: &GraphicsPipelineDesc,
        shaders: &GraphicsPipelineShaders,
        layout: vk::PipelineLayout,
        render_pass: vk::RenderPass,
    ) -> Result<VulkanPipeline> {
        let stages = shaders.stages();

        // Vertex input
        let mut bindings = Vec::new();
        let mut attributes = Vec::new();
        for attrib_index in 0..MAX_VERTEX_ATTRIBS {
            let attrib = desc.vertex_attrib(attrib_index);
            if attrib.format() == FormatId::NONE {
                continue;
            }
            let input_rate = if attrib.divisor() > 0 {
                vk::VertexInputRate::INSTANCE
            } else {
                vk::VertexInputRate::VERTEX
            };
            bindings.push(
                vk::VertexInputBindingDescription::default()
                    .binding(attrib_index as u32)
                    .stride(attrib.stride())
                    .input_rate(input_rate),
            );
            attributes.push(
                vk::VertexInputAttributeDescription::default()
                    .location(attrib_index as u32)
                    .binding(attrib_index as u32)
                    .format(vk_format(attrib.format()))
                    .offset(attrib.relative_offset()),
            );
        }
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk_topology(desc.topology()))
            .primitive_restart_enable(desc.primitive_restart_enabled());

        let tessellation = (desc.topology() == PrimitiveTopology::PatchList).then(|| {
            vk::PipelineTessellationStateCreateInfo::default().patch_control_points(desc.patch_vertices())
        });

        // Viewport / scissor
        let packed_viewport = desc.viewport();
        let viewport = vk::Viewport {
            x: packed_viewport.x,
            y: packed_viewport.y,
            width: packed_viewport.width,
            height: packed_viewport.height,
            min_depth: packed_viewport.min_depth,
            max_depth: packed_viewport.max_depth,
        };
        let packed_scissor = desc.scissor();
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: i32::from(packed_scissor.x), y: i32::from(packed_scissor.y) },
            extent: vk::Extent2D {
                width: u32::from(packed_scissor.width),
                height: u32::from(packed_scissor.height),
            },
        };
        let mut dynamic_states = Vec::new();
        let mut viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(std::slice::from_ref(&viewport));
        if packed_scissor.is_dynamic() {
            dynamic_states.push(vk::DynamicState::SCISSOR);
            viewport_state = viewport_state.scissor_count(1);
        } else {
            viewport_state = viewport_state.scissors(std::slice::from_ref(&scissor));
        }

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(desc.depth_clamp_enabled())
            .rasterizer_discard_enable(desc.rasterizer_discard_enabled())
            .polygon_mode(vk_polygon_mode(desc.polygon_mode()))
            .cull_mode(vk_cull_mode(desc.cull_mode()))
            .front_face(vk_front_face(desc.front_face()))
            .depth_bias_enable(desc.depth_bias_enabled())
            .depth_bias_constant_factor(desc.depth_bias_constant_factor())
            .depth_bias_clamp(desc.depth_bias_clamp())
            .depth_bias_slope_factor(desc.depth_bias_slope_factor())
            .line_width(desc.line_width());

        let samples = desc.rasterization_samples();
        let sample_mask = [desc.sample_mask(0), desc.sample_mask(1)];
        let sample_mask_words = (samples as usize).div_ceil(32);
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk_sample_count(samples))
            .sample_shading_enable(desc.sample_shading_enabled())
            .min_sample_shading(desc.min_sample_shading())
            .sample_mask(&sample_mask[..sample_mask_words])
            .alpha_to_coverage_enable(desc.alpha_to_coverage_enabled())
            .alpha_to_one_enable(desc.alpha_to_one_enabled());

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(desc.depth_test_enabled())
            .depth_write_enable(desc.depth_write_enabled())
            .depth_compare_op(vk_compare_op(desc.depth_compare_op()))
            .depth_bounds_test_enable(desc.depth_bounds_test_enabled())
            .stencil_test_enable(desc.stencil_test_enabled())
            .front(stencil_op_state(desc.stencil_front(), desc.stencil_front_reference()))
            .back(stencil_op_state(desc.stencil_back(), desc.stencil_back_reference()))
            .min_depth_bounds(desc.min_depth_bounds())
            .max_depth_bounds(desc.max_depth_bounds());

        // One blend attachment per subpass color reference, gaps included
        let blend_enable_mask = desc.blend_enable_mask();
        let render_pass_desc = desc.render_pass_desc();
        let blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> = (0..render_pass_desc
            .color_attachment_range())
            .map(|color_index_gl| {
                if !render_pass_desc.is_color_attachment_enabled(color_index_gl) {
                    return vk::PipelineColorBlendAttachmentState::default()
                        .blend_enable(false)
                        .color_write_mask(vk::ColorComponentFlags::empty());
                }
                let blend = desc.blend_attachment(color_index_gl);
                vk::PipelineColorBlendAttachmentState::default()
                    .blend_enable(blend_enable_mask.test(color_index_gl))
                    .src_color_blend_factor(vk_blend_factor(blend.src_color_blend_factor()))
                    .dst_color_blend_factor(vk_blend_factor(blend.dst_color_blend_factor()))
                    .color_blend_op(vk_blend_op(blend.color_blend_op()))
                    .src_alpha_blend_factor(vk_blend_factor(blend.src_alpha_blend_factor()))
                    .dst_alpha_blend_factor(vk_blend_factor(blend.dst_alpha_blend_factor()))
                    .alpha_blend_op(vk_blend_op(blend.alpha_blend_op()))
                    .color_write_mask(vk_color_components(desc.color_write_mask(color_index_gl)))
            })
            .collect();
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(desc.logic_op_enabled())
            .logic_op(vk_logic_op(desc.logic_op()))
            .attachments(&blend_attachments)
            .blend_constants(desc.blend_constants());

        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let mut create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(desc.subpass());
        if let Some(tessellation) = tessellation.as_ref() {
            create_info = create_info.tessellation_state(tessellation);
        }

        if self.log_creations {
            cache_debug!(
                SOURCE,
                "Creating graphics pipeline ({} stages, {} vertex attributes, {} color attachments)",
                stages.len(),
                attributes.len(),
                blend_attachments.len()
            );
        }

        let pipelines = unsafe {
            self.device.create_graphics_pipelines(vk::PipelineCache::null(), std::slice::from_ref(&create_info), None)
        }
        .map_err(|(_, e)| creation_error("graphics pipeline", e))?;

        let pipeline = pipelines
            .into_iter()
            .next()
            .ok_or_else(|| cache_err!(SOURCE, "Graphics pipeline creation returned no pipeline"))?;
        Ok(VulkanPipeline::new(pipeline, self.device.clone()))
    }

    // ===== LAYOUTS =====

    pub fn create_descriptor_set_layout(&self, desc: &DescriptorSetLayoutDesc) -> Result<VulkanDescriptorSetLayout> {
        let unpacked = desc.unpack_bindings();

        // Immutable sampler arrays must outlive the create call
        let immutable_samplers: Vec<Vec<vk::Sampler>> = unpacked
            .iter()
            .map(|binding| match binding.immutable_sampler {
                Some(raw) => vec![vk::Sampler::from_raw(raw); binding.count as usize],
                None => Vec::new(),
            })
            .collect();

        let bindings: Vec<vk::DescriptorSetLayoutBinding> = unpacked
            .iter()
            .zip(&immutable_samplers)
            .map(|(binding, samplers)| {
                let vk_binding = vk::DescriptorSetLayoutBinding::default()
                    .binding(binding.binding)
                    .descriptor_type(vk_descriptor_type(binding.descriptor_type))
                    .stage_flags(vk_shader_stages(binding.stages));
                if samplers.is_empty() {
                    vk_binding.descriptor_count(binding.count)
                } else {
                    vk_binding.immutable_samplers(samplers)
                }
            })
            .collect();

        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        if self.log_creations {
            cache_debug!(SOURCE, "Creating descriptor set layout ({} bindings)", bindings.len());
        }

        let set_layout = unsafe { self.device.create_descriptor_set_layout(&create_info, None) }
            .map_err(|e| creation_error("descriptor set layout", e))?;
        Ok(VulkanDescriptorSetLayout::new(set_layout, self.device.clone()))
    }

    /// `set_layouts` holds one layout per descriptor set index, in index order
    pub fn create_pipeline_layout(
        &self,
        desc: &PipelineLayoutDesc,
        set_layouts: Vec<Arc<VulkanDescriptorSetLayout>>,
    ) -> Result<VulkanPipelineLayout> {
        let set_layout_handles: Vec<vk::DescriptorSetLayout> = set_layouts.iter().map(|layout| layout.handle()).collect();

        let push_constant_ranges: Vec<vk::PushConstantRange> = ShaderType::ALL
            .iter()
            .map(|&shader_type| (shader_type, desc.push_constant_range(shader_type)))
            .filter(|(_, range)| range.size > 0)
            .map(|(shader_type, range)| vk::PushConstantRange {
                stage_flags: vk_shader_stages(shader_type.stage_flags()),
                offset: range.offset,
                size: range.size,
            })
            .collect();

        let create_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&set_layout_handles)
            .push_constant_ranges(&push_constant_ranges);

        if self.log_creations {
            cache_debug!(
                SOURCE,
                "Creating pipeline layout ({} set layouts, {} push constant ranges)",
                set_layout_handles.len(),
                push_constant_ranges.len()
            );
        }

        let pipeline_layout = unsafe { self.device.create_pipeline_layout(&create_info, None) }
            .map_err(|e| creation_error("pipeline layout", e))?;
        Ok(VulkanPipelineLayout::new(pipeline_layout, set_layouts, self.device.clone()))
    }

    // ===== SAMPLERS =====

    /// Sampler for `desc`; with a conversion the address modes are forced to clamp to edge
    /// and anisotropy is disabled, as Y'CbCr sampling requires
    pub fn create_sampler(
        &self,
        desc: &SamplerDesc,
        ycbcr_conversion: Option<Arc<VulkanSamplerYcbcrConversion>>,
    ) -> Result<VulkanSampler> {
        let mut conversion_info = vk::SamplerYcbcrConversionInfo::default();

        let mut create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk_filter(desc.mag_filter()))
            .min_filter(vk_filter(desc.min_filter()))
            .mipmap_mode(vk_mipmap_mode(desc.mipmap_mode()))
            .address_mode_u(vk_address_mode(desc.address_mode_u()))
            .address_mode_v(vk_address_mode(desc.address_mode_v()))
            .address_mode_w(vk_address_mode(desc.address_mode_w()))
            .mip_lod_bias(desc.mip_lod_bias())
            .anisotropy_enable(desc.anisotropy_enabled())
            .max_anisotropy(desc.max_anisotropy())
            .compare_enable(desc.compare_enabled())
            .compare_op(vk_compare_op(desc.compare_op()))
            .min_lod(desc.min_lod())
            .max_lod(desc.max_lod())
            .border_color(vk::BorderColor::FLOAT_TRANSPARENT_BLACK)
            .unnormalized_coordinates(false);

        if let Some(conversion) = ycbcr_conversion.as_ref() {
            conversion_info.conversion = conversion.handle();
            create_info = create_info
                .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                .anisotropy_enable(false)
                .max_anisotropy(1.0)
                .push_next(&mut conversion_info);
        }

        if self.log_creations {
            cache_debug!(
                SOURCE,
                "Creating sampler (anisotropy {}, compare {}, external format {})",
                desc.max_anisotropy(),
                desc.compare_enabled(),
                desc.external_format()
            );
        }

        let sampler = unsafe { self.device.create_sampler(&create_info, None) }
            .map_err(|e| creation_error("sampler", e))?;
        Ok(VulkanSampler::new(sampler, ycbcr_conversion, self.device.clone()))
    }

    /// Conversion for the multi-planar format whose raw `VkFormat` value is `format_key`
    pub fn create_sampler_ycbcr_conversion(&self, format_key: u64) -> Result<VulkanSamplerYcbcrConversion> {
        let raw_format = i32::try_from(format_key).map_err(|_| {
            cache_error!(SOURCE, "Y'CbCr format key {:#x} is not a VkFormat", format_key);
            Error::InvalidResource(format!("Y'CbCr format key {:#x}", format_key))
        })?;
        let format = vk::Format::from_raw(raw_format);

        let create_info = vk::SamplerYcbcrConversionCreateInfo::default()
            .format(format)
            .ycbcr_model(vk::SamplerYcbcrModelConversion::YCBCR_709)
            .ycbcr_range(vk::SamplerYcbcrRange::ITU_NARROW)
            .components(vk::ComponentMapping::default())
            .x_chroma_offset(vk::ChromaLocation::COSITED_EVEN)
            .y_chroma_offset(vk::ChromaLocation::COSITED_EVEN)
            .chroma_filter(vk::Filter::NEAREST)
            .force_explicit_reconstruction(false);

        if self.log_creations {
            cache_debug!(SOURCE, "Creating Y'CbCr conversion for {:?}", format);
        }

        let conversion = unsafe { self.device.create_sampler_ycbcr_conversion(&create_info, None) }
            .map_err(|e| creation_error("sampler Y'CbCr conversion", e))?;
        Ok(VulkanSamplerYcbcrConversion::new(conversion, format, self.device.clone()))
    }

    // ===== FRAMEBUFFER =====

    /// `views` lists one image view per native attachment of `render_pass`, in native order
    pub fn create_framebuffer(
        &self,
        desc: &FramebufferDesc,
        render_pass: &VulkanRenderPass,
        views: &[vk::ImageView],
        width: u32,
        height: u32,
    ) -> Result<VulkanFramebuffer> {
        if views.len() != render_pass.attachment_count() as usize {
            cache_error!(
                SOURCE,
                "Framebuffer has {} views but its render pass has {} attachments",
                views.len(),
                render_pass.attachment_count()
            );
            return Err(Error::InvalidResource(format!(
                "{} image views for {} render pass attachments",
                views.len(),
                render_pass.attachment_count()
            )));
        }

        let layers = desc.layer_count().max(1);
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass.handle())
            .attachments(views)
            .width(width)
            .height(height)
            .layers(layers);

        if self.log_creations {
            cache_debug!(SOURCE, "Creating framebuffer {}x{}x{} ({} attachments)", width, height, layers, views.len());
        }

        let framebuffer = unsafe { self.device.create_framebuffer(&create_info, None) }
            .map_err(|e| creation_error("framebuffer", e))?;
        Ok(VulkanFramebuffer::new(framebuffer, width, height, layers, self.device.clone()))
    }
}
