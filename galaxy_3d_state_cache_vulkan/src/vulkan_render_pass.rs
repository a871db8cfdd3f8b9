/// VulkanRenderPass - native render pass owned by the render pass cache

use ash::vk;

/// Wraps a vk::RenderPass. Destroyed when dropped.
pub struct VulkanRenderPass {
    /// Vulkan render pass handle
    pub(crate) render_pass: vk::RenderPass,
    /// Attachments in the native attachment list (gaps excluded)
    attachment_count: u32,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl VulkanRenderPass {
    pub(crate) fn new(render_pass: vk::RenderPass, attachment_count: u32, device: ash::Device) -> Self {
        Self { render_pass, attachment_count, device }
    }

    pub fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// Image views a framebuffer of this render pass must provide
    pub fn attachment_count(&self) -> u32 {
        self.attachment_count
    }
}

impl Drop for VulkanRenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
