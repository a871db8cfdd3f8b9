/// Conversions from packed descriptor values to Vulkan enums
///
/// Fixed-function enums of the state cache use the Vulkan enumerant values as their
/// discriminants, so most conversions are a `from_raw`. Formats, layouts and attachment
/// ops have their own numbering and are mapped explicitly.

use ash::vk;
use galaxy_3d_state_cache::galaxy3d::descriptor::{LoadOp, StoreOp};
use galaxy_3d_state_cache::galaxy3d::format::FormatId;
use galaxy_3d_state_cache::galaxy3d::state::{
    AddressMode, BlendFactor, BlendOp, ColorComponentFlags, CompareOp, CullMode, DescriptorType,
    Filter, FrontFace, ImageLayout, LogicOp, MipmapMode, PolygonMode, PrimitiveTopology,
    ShaderStageFlags, StencilOp,
};

pub fn vk_format(format: FormatId) -> vk::Format {
    match format {
        FormatId::NONE => vk::Format::UNDEFINED,
        FormatId::D16_UNORM => vk::Format::D16_UNORM,
        FormatId::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        FormatId::D24_UNORM_X8_UINT => vk::Format::X8_D24_UNORM_PACK32,
        FormatId::D32_FLOAT => vk::Format::D32_SFLOAT,
        FormatId::D32_FLOAT_S8X24_UINT => vk::Format::D32_SFLOAT_S8_UINT,
        FormatId::S8_UINT => vk::Format::S8_UINT,
        FormatId::R8_UNORM => vk::Format::R8_UNORM,
        FormatId::R8G8_UNORM => vk::Format::R8G8_UNORM,
        FormatId::R8G8B8_UNORM => vk::Format::R8G8B8_UNORM,
        FormatId::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        FormatId::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        FormatId::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        FormatId::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        FormatId::R5G6B5_UNORM => vk::Format::R5G6B5_UNORM_PACK16,
        // GL's RGB10_A2 is Vulkan's A2B10G10R10 (component order is reversed in packed formats)
        FormatId::R10G10B10A2_UNORM => vk::Format::A2B10G10R10_UNORM_PACK32,
        FormatId::R11G11B10_FLOAT => vk::Format::B10G11R11_UFLOAT_PACK32,
        FormatId::R16_FLOAT => vk::Format::R16_SFLOAT,
        FormatId::R16G16_FLOAT => vk::Format::R16G16_SFLOAT,
        FormatId::R16G16B16A16_FLOAT => vk::Format::R16G16B16A16_SFLOAT,
        FormatId::R32_FLOAT => vk::Format::R32_SFLOAT,
        FormatId::R32G32_FLOAT => vk::Format::R32G32_SFLOAT,
        FormatId::R32G32B32_FLOAT => vk::Format::R32G32B32_SFLOAT,
        FormatId::R32G32B32A32_FLOAT => vk::Format::R32G32B32A32_SFLOAT,
        FormatId::R8_UINT => vk::Format::R8_UINT,
        FormatId::R16_UINT => vk::Format::R16_UINT,
        FormatId::R32_UINT => vk::Format::R32_UINT,
        FormatId::R32G32B32A32_UINT => vk::Format::R32G32B32A32_UINT,
        FormatId::R8_SINT => vk::Format::R8_SINT,
        FormatId::R32_SINT => vk::Format::R32_SINT,
        FormatId::R32G32B32A32_SINT => vk::Format::R32G32B32A32_SINT,
    }
}

/// Sample count flag of a power-of-two sample count
pub fn vk_sample_count(samples: u32) -> vk::SampleCountFlags {
    debug_assert!(samples.is_power_of_two() && samples <= 64);
    vk::SampleCountFlags::from_raw(samples)
}

pub fn vk_topology(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    vk::PrimitiveTopology::from_raw(i32::from(topology.to_raw()))
}

pub fn vk_cull_mode(cull_mode: CullMode) -> vk::CullModeFlags {
    vk::CullModeFlags::from_raw(u32::from(cull_mode.to_raw()))
}

pub fn vk_front_face(front_face: FrontFace) -> vk::FrontFace {
    vk::FrontFace::from_raw(i32::from(front_face.to_raw()))
}

pub fn vk_polygon_mode(polygon_mode: PolygonMode) -> vk::PolygonMode {
    vk::PolygonMode::from_raw(i32::from(polygon_mode.to_raw()))
}

pub fn vk_compare_op(op: CompareOp) -> vk::CompareOp {
    vk::CompareOp::from_raw(i32::from(op.to_raw()))
}

pub fn vk_stencil_op(op: StencilOp) -> vk::StencilOp {
    vk::StencilOp::from_raw(i32::from(op.to_raw()))
}

pub fn vk_blend_factor(factor: BlendFactor) -> vk::BlendFactor {
    vk::BlendFactor::from_raw(i32::from(factor.to_raw()))
}

pub fn vk_blend_op(op: BlendOp) -> vk::BlendOp {
    vk::BlendOp::from_raw(i32::from(op.to_raw()))
}

pub fn vk_logic_op(op: LogicOp) -> vk::LogicOp {
    vk::LogicOp::from_raw(i32::from(op.to_raw()))
}

pub fn vk_filter(filter: Filter) -> vk::Filter {
    vk::Filter::from_raw(i32::from(filter.to_raw()))
}

pub fn vk_mipmap_mode(mode: MipmapMode) -> vk::SamplerMipmapMode {
    vk::SamplerMipmapMode::from_raw(i32::from(mode.to_raw()))
}

pub fn vk_address_mode(mode: AddressMode) -> vk::SamplerAddressMode {
    vk::SamplerAddressMode::from_raw(i32::from(mode.to_raw()))
}

pub fn vk_descriptor_type(descriptor_type: DescriptorType) -> vk::DescriptorType {
    vk::DescriptorType::from_raw(i32::from(descriptor_type.to_raw()))
}

pub fn vk_shader_stages(stages: ShaderStageFlags) -> vk::ShaderStageFlags {
    vk::ShaderStageFlags::from_raw(u32::from(stages.bits()))
}

pub fn vk_color_components(mask: ColorComponentFlags) -> vk::ColorComponentFlags {
    vk::ColorComponentFlags::from_raw(u32::from(mask.bits()))
}

pub fn vk_image_layout(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::General => vk::ImageLayout::GENERAL,
        ImageLayout::ColorAttachment => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilAttachment => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilReadOnly => vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
        ImageLayout::ShaderReadOnly => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        ImageLayout::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::Present => vk::ImageLayout::PRESENT_SRC_KHR,
        ImageLayout::DepthReadOnlyStencilAttachment => vk::ImageLayout::DEPTH_READ_ONLY_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthAttachmentStencilReadOnly => vk::ImageLayout::DEPTH_ATTACHMENT_STENCIL_READ_ONLY_OPTIMAL,
    }
}

pub fn vk_load_op(op: LoadOp) -> vk::AttachmentLoadOp {
    match op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub fn vk_store_op(op: StoreOp) -> vk::AttachmentStoreOp {
    match op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
        StoreOp::None => vk::AttachmentStoreOp::NONE,
    }
}

#[cfg(test)]
#[path = "vulkan_conversions_tests.rs"]
mod tests;
