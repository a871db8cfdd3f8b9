/// VulkanPipeline / VulkanPipelineLayout - native pipeline objects

use ash::vk;
use std::sync::Arc;

use crate::vulkan_descriptor_set::VulkanDescriptorSetLayout;

/// Graphics pipeline owned by a `GraphicsPipelineCache` entry
pub struct VulkanPipeline {
    /// Vulkan graphics pipeline
    pub(crate) pipeline: vk::Pipeline,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl VulkanPipeline {
    pub(crate) fn new(pipeline: vk::Pipeline, device: ash::Device) -> Self {
        Self { pipeline, device }
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }
}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
        }
    }
}

/// Pipeline layout; keeps its descriptor set layouts alive
pub struct VulkanPipelineLayout {
    pub(crate) pipeline_layout: vk::PipelineLayout,
    /// One per descriptor set index
    set_layouts: Vec<Arc<VulkanDescriptorSetLayout>>,
    device: ash::Device,
}

impl VulkanPipelineLayout {
    pub(crate) fn new(
        pipeline_layout: vk::PipelineLayout,
        set_layouts: Vec<Arc<VulkanDescriptorSetLayout>>,
        device: ash::Device,
    ) -> Self {
        Self { pipeline_layout, set_layouts, device }
    }

    pub fn handle(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    pub fn set_layouts(&self) -> &[Arc<VulkanDescriptorSetLayout>] {
        &self.set_layouts
    }
}

impl Drop for VulkanPipelineLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
