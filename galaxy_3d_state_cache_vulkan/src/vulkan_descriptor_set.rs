/// VulkanDescriptorSetLayout - native descriptor set layout
///
/// Descriptor sets themselves are never wrapped: they belong to an external pool and
/// the descriptor set caches only remember their raw handles.

use ash::vk;

pub struct VulkanDescriptorSetLayout {
    pub(crate) set_layout: vk::DescriptorSetLayout,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl VulkanDescriptorSetLayout {
    pub(crate) fn new(set_layout: vk::DescriptorSetLayout, device: ash::Device) -> Self {
        Self { set_layout, device }
    }

    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.set_layout
    }
}

impl Drop for VulkanDescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.set_layout, None);
        }
    }
}
