/*!
# Galaxy 3D State Cache - Vulkan Backend

Vulkan object creation for the Galaxy 3D state caches.

The backend-agnostic crate decides when an object must exist; this crate turns its
packed descriptors into `vk::*CreateInfo` structures through Ash and owns the resulting
handles. `VulkanStateCache` bundles every cache of one device, `VulkanProgramPipelines`
holds the graphics pipelines of one shader program.

```no_run
use galaxy_3d_state_cache::galaxy3d::StateCacheConfig;
use galaxy_3d_state_cache_vulkan::{VulkanContext, VulkanContextConfig, VulkanStateCache};

let context = VulkanContext::new(VulkanContextConfig::default())?;
let mut state_cache = VulkanStateCache::from_context(&context, StateCacheConfig::default());
// ... lookups ...
state_cache.destroy();
# Ok::<(), galaxy_3d_state_cache::galaxy3d::Error>(())
```
*/

mod vulkan_conversions;
mod vulkan_context;
mod vulkan_descriptor_set;
mod vulkan_factory;
mod vulkan_frame_buffer;
mod vulkan_pipeline;
mod vulkan_reflection;
mod vulkan_render_pass;
mod vulkan_sampler;
mod vulkan_state_cache;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan_context::{VulkanContext, VulkanContextConfig};
pub use vulkan_descriptor_set::VulkanDescriptorSetLayout;
pub use vulkan_factory::{GraphicsPipelineShaders, VulkanObjectFactory};
pub use vulkan_frame_buffer::VulkanFramebuffer;
pub use vulkan_pipeline::{VulkanPipeline, VulkanPipelineLayout};
pub use vulkan_reflection::{build_pipeline_layout_desc, reflect_shader, ReflectedBinding, ShaderReflection};
pub use vulkan_render_pass::VulkanRenderPass;
pub use vulkan_sampler::{VulkanSampler, VulkanSamplerYcbcrConversion};
pub use vulkan_state_cache::{DescriptorSetCaches, VulkanProgramPipelines, VulkanStateCache};

// Validation message counters
#[cfg(feature = "vulkan-validation")]
pub use debug::{validation_stats, ValidationStats};

/// Descriptor to `vk::*` enum mappings
pub mod conversions {
    pub use crate::vulkan_conversions::*;
}
