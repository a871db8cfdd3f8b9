/// VulkanContext - headless instance and device for the state caches
///
/// Owns the entry, instance, logical device and (with `vulkan-validation`) the debug
/// messenger. Every cached object holds a clone of the device handle, so all caches must
/// be destroyed before the context is dropped.

use ash::vk;
use galaxy_3d_state_cache::galaxy3d::{Error, Result, SamplerFeatures};
use galaxy_3d_state_cache::{cache_err, cache_info, cache_warn};

const SOURCE: &str = "galaxy3d::vulkan::Context";

/// Context creation options
#[derive(Debug, Clone)]
pub struct VulkanContextConfig {
    /// Enable VK_LAYER_KHRONOS_validation (needs the `vulkan-validation` feature)
    pub enable_validation: bool,
    /// Panic on the first validation error
    pub panic_on_validation_error: bool,
}

impl Default for VulkanContextConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(feature = "vulkan-validation"),
            panic_on_validation_error: false,
        }
    }
}

pub struct VulkanContext {
    /// Keeps the loader alive for the instance lifetime
    _entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    graphics_queue: vk::Queue,
    graphics_queue_family: u32,
    sampler_features: SamplerFeatures,
    sampler_ycbcr_conversion: bool,
    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanContext {
    /// Create a headless context on the first physical device with a graphics queue
    pub fn new(config: VulkanContextConfig) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| cache_err!(SOURCE, "Failed to load Vulkan: {}", e))?;

            let app_info = vk::ApplicationInfo::default()
                .application_name(c"Galaxy3D State Cache")
                .application_version(vk::make_api_version(0, 0, 1, 0))
                .engine_name(c"Galaxy3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            let validation = config.enable_validation && Self::validation_available(&entry);

            let mut extension_names = Vec::new();
            let mut layer_names = Vec::new();
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                layer_names.push(c"VK_LAYER_KHRONOS_validation".as_ptr());
            }

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| cache_err!(SOURCE, "Failed to create instance: {:?}", e))?;

            #[cfg(feature = "vulkan-validation")]
            let debug_messenger = if validation {
                match Self::create_debug_messenger(&entry, &instance, config.panic_on_validation_error) {
                    Ok(messenger) => Some(messenger),
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                None
            };

            match Self::create_device(&instance) {
                Ok((physical_device, device, graphics_queue_family, sampler_features, sampler_ycbcr_conversion)) => {
                    let graphics_queue = device.get_device_queue(graphics_queue_family, 0);
                    cache_info!(
                        SOURCE,
                        "Headless context ready (validation: {}, Y'CbCr conversion: {})",
                        validation,
                        sampler_ycbcr_conversion
                    );
                    Ok(Self {
                        _entry: entry,
                        instance,
                        physical_device,
                        device,
                        graphics_queue,
                        graphics_queue_family,
                        sampler_features,
                        sampler_ycbcr_conversion,
                        #[cfg(feature = "vulkan-validation")]
                        debug_messenger,
                    })
                }
                Err(e) => {
                    #[cfg(feature = "vulkan-validation")]
                    if let Some((debug_utils, messenger)) = debug_messenger {
                        debug_utils.destroy_debug_utils_messenger(messenger, None);
                    }
                    instance.destroy_instance(None);
                    Err(e)
                }
            }
        }
    }

    #[cfg(feature = "vulkan-validation")]
    fn validation_available(entry: &ash::Entry) -> bool {
        let layers = unsafe { entry.enumerate_instance_layer_properties() }.unwrap_or_default();
        let found = layers.iter().any(|layer| {
            layer
                .layer_name_as_c_str()
                .map(|name| name == c"VK_LAYER_KHRONOS_validation")
                .unwrap_or(false)
        });
        if !found {
            cache_warn!(SOURCE, "VK_LAYER_KHRONOS_validation not installed, running without validation");
        }
        found
    }

    #[cfg(not(feature = "vulkan-validation"))]
    fn validation_available(_entry: &ash::Entry) -> bool {
        cache_warn!(SOURCE, "Validation requested but the vulkan-validation feature is disabled");
        false
    }

    #[cfg(feature = "vulkan-validation")]
    unsafe fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
        panic_on_error: bool,
    ) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);
        crate::debug::init_validation(panic_on_error);

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        let messenger = debug_utils
            .create_debug_utils_messenger(&debug_info, None)
            .map_err(|e| cache_err!(SOURCE, "Failed to create debug messenger: {:?}", e))?;
        Ok((debug_utils, messenger))
    }

    /// Pick the device, enable the sampler features it supports, create the logical device
    unsafe fn create_device(
        instance: &ash::Instance,
    ) -> Result<(vk::PhysicalDevice, ash::Device, u32, SamplerFeatures, bool)> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| cache_err!(SOURCE, "Failed to enumerate physical devices: {:?}", e))?;

        let (physical_device, graphics_queue_family) = physical_devices
            .into_iter()
            .find_map(|physical_device| {
                instance
                    .get_physical_device_queue_family_properties(physical_device)
                    .iter()
                    .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|index| (physical_device, index as u32))
            })
            .ok_or_else(|| Error::Unsupported("no Vulkan device with a graphics queue".to_string()))?;

        let properties = instance.get_physical_device_properties(physical_device);
        let supported = instance.get_physical_device_features(physical_device);

        let mut ycbcr_supported = vk::PhysicalDeviceSamplerYcbcrConversionFeatures::default();
        if properties.api_version >= vk::API_VERSION_1_1 {
            let mut features2 = vk::PhysicalDeviceFeatures2::default().push_next(&mut ycbcr_supported);
            instance.get_physical_device_features2(physical_device, &mut features2);
        }
        let sampler_ycbcr_conversion = ycbcr_supported.sampler_ycbcr_conversion == vk::TRUE;

        let sampler_features = SamplerFeatures {
            sampler_anisotropy: supported.sampler_anisotropy == vk::TRUE,
            max_sampler_anisotropy: properties.limits.max_sampler_anisotropy,
            ..SamplerFeatures::default()
        };

        let enabled_features = vk::PhysicalDeviceFeatures::default()
            .sampler_anisotropy(sampler_features.sampler_anisotropy)
            .depth_clamp(supported.depth_clamp == vk::TRUE)
            .depth_bounds(supported.depth_bounds == vk::TRUE)
            .fill_mode_non_solid(supported.fill_mode_non_solid == vk::TRUE)
            .wide_lines(supported.wide_lines == vk::TRUE)
            .sample_rate_shading(supported.sample_rate_shading == vk::TRUE)
            .logic_op(supported.logic_op == vk::TRUE)
            .geometry_shader(supported.geometry_shader == vk::TRUE)
            .tessellation_shader(supported.tessellation_shader == vk::TRUE);
        let mut enabled_ycbcr =
            vk::PhysicalDeviceSamplerYcbcrConversionFeatures::default().sampler_ycbcr_conversion(sampler_ycbcr_conversion);

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_queue_family)
            .queue_priorities(&queue_priorities)];

        let mut device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_features(&enabled_features);
        if sampler_ycbcr_conversion {
            device_create_info = device_create_info.push_next(&mut enabled_ycbcr);
        }

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| cache_err!(SOURCE, "Failed to create device: {:?}", e))?;

        Ok((physical_device, device, graphics_queue_family, sampler_features, sampler_ycbcr_conversion))
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }

    /// Sampler capabilities to copy into `StateCacheConfig::sampler_features`
    pub fn sampler_features(&self) -> SamplerFeatures {
        self.sampler_features
    }

    pub fn supports_sampler_ycbcr_conversion(&self) -> bool {
        self.sampler_ycbcr_conversion
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            self.device.destroy_device(None);

            #[cfg(feature = "vulkan-validation")]
            if let Some((debug_utils, messenger)) = self.debug_messenger.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}
