//! Shared helpers for the GPU integration tests

#![allow(dead_code)]

use ash::vk;
use galaxy_3d_state_cache_vulkan::{VulkanContext, VulkanContextConfig};
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use gpu_allocator::MemoryLocation;

/// `void main() {}` vertex shader
pub const VERTEX_SHADER: &[u32] = &[
    0x07230203, 0x00010000, 0, 5, 0,
    0x00020011, 1,
    0x0003000E, 0, 1,
    0x0005000F, 0, 3, 0x6E69616D, 0,
    0x00020013, 1,
    0x00030021, 2, 1,
    0x00050036, 1, 3, 0, 2,
    0x000200F8, 4,
    0x000100FD,
    0x00010038,
];

/// `void main() {}` fragment shader (origin upper left)
pub const FRAGMENT_SHADER: &[u32] = &[
    0x07230203, 0x00010000, 0, 5, 0,
    0x00020011, 1,
    0x0003000E, 0, 1,
    0x0005000F, 4, 3, 0x6E69616D, 0,
    0x00030010, 3, 7,
    0x00020013, 1,
    0x00030021, 2, 1,
    0x00050036, 1, 3, 0, 2,
    0x000200F8, 4,
    0x000100FD,
    0x00010038,
];

pub fn create_context() -> VulkanContext {
    VulkanContext::new(VulkanContextConfig {
        panic_on_validation_error: true,
        ..Default::default()
    })
    .unwrap()
}

pub fn create_shader_module(context: &VulkanContext, code: &[u32]) -> vk::ShaderModule {
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    unsafe { context.device().create_shader_module(&create_info, None).unwrap() }
}

pub fn destroy_shader_module(context: &VulkanContext, module: vk::ShaderModule) {
    unsafe { context.device().destroy_shader_module(module, None) };
}

/// Color attachment image with its view, backed by gpu-allocator memory
pub struct TestImage {
    pub image: vk::Image,
    pub view: vk::ImageView,
    allocation: Option<Allocation>,
}

pub fn create_allocator(context: &VulkanContext) -> Allocator {
    Allocator::new(&AllocatorCreateDesc {
        instance: context.instance().clone(),
        device: context.device().clone(),
        physical_device: context.physical_device(),
        debug_settings: Default::default(),
        buffer_device_address: false,
        allocation_sizes: Default::default(),
    })
    .unwrap()
}

pub fn create_color_image(
    context: &VulkanContext,
    allocator: &mut Allocator,
    format: vk::Format,
    width: u32,
    height: u32,
) -> TestImage {
    let device = context.device();
    unsafe {
        let image_create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D { width, height, depth: 1 })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);
        let image = device.create_image(&image_create_info, None).unwrap();

        let requirements = device.get_image_memory_requirements(image);
        let allocation = allocator
            .allocate(&AllocationCreateDesc {
                name: "test_color_image",
                requirements,
                location: MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .unwrap();
        device
            .bind_image_memory(image, allocation.memory(), allocation.offset())
            .unwrap();

        let view_create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        let view = device.create_image_view(&view_create_info, None).unwrap();

        TestImage { image, view, allocation: Some(allocation) }
    }
}

pub fn destroy_image(context: &VulkanContext, allocator: &mut Allocator, mut image: TestImage) {
    unsafe {
        context.device().destroy_image_view(image.view, None);
        context.device().destroy_image(image.image, None);
    }
    if let Some(allocation) = image.allocation.take() {
        allocator.free(allocation).unwrap();
    }
}
