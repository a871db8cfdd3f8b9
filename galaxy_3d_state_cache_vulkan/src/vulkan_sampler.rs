/// VulkanSampler / VulkanSamplerYcbcrConversion - shared sampler objects
///
/// Both are handed out as `Arc`s by their caches; the native handle is destroyed when
/// the cache and every binding have released it.

use ash::vk;
use std::sync::Arc;

pub struct VulkanSampler {
    pub(crate) sampler: vk::Sampler,
    /// Conversion baked into the sampler, kept alive as long as the sampler
    ycbcr_conversion: Option<Arc<VulkanSamplerYcbcrConversion>>,
    device: ash::Device,
}

impl VulkanSampler {
    pub(crate) fn new(
        sampler: vk::Sampler,
        ycbcr_conversion: Option<Arc<VulkanSamplerYcbcrConversion>>,
        device: ash::Device,
    ) -> Self {
        Self { sampler, ycbcr_conversion, device }
    }

    pub fn handle(&self) -> vk::Sampler {
        self.sampler
    }

    pub fn ycbcr_conversion(&self) -> Option<&Arc<VulkanSamplerYcbcrConversion>> {
        self.ycbcr_conversion.as_ref()
    }
}

impl Drop for VulkanSampler {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler(self.sampler, None);
        }
    }
}

/// Y'CbCr conversion for sampling a multi-planar format
pub struct VulkanSamplerYcbcrConversion {
    pub(crate) conversion: vk::SamplerYcbcrConversion,
    format: vk::Format,
    device: ash::Device,
}

impl VulkanSamplerYcbcrConversion {
    pub(crate) fn new(conversion: vk::SamplerYcbcrConversion, format: vk::Format, device: ash::Device) -> Self {
        Self { conversion, format, device }
    }

    pub fn handle(&self) -> vk::SamplerYcbcrConversion {
        self.conversion
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }
}

impl Drop for VulkanSamplerYcbcrConversion {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler_ycbcr_conversion(self.conversion, None);
        }
    }
}
