/// VulkanFramebuffer - native framebuffer owned by the framebuffer cache
///
/// Groups the image views of every attachment of one render pass. Destroyed when the
/// last `Arc` drops.

use ash::vk;

pub struct VulkanFramebuffer {
    /// Vulkan framebuffer handle
    pub(crate) framebuffer: vk::Framebuffer,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    layers: u32,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl VulkanFramebuffer {
    pub(crate) fn new(framebuffer: vk::Framebuffer, width: u32, height: u32, layers: u32, device: ash::Device) -> Self {
        Self { framebuffer, width, height, layers, device }
    }

    pub fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }
}

impl Drop for VulkanFramebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
