/// SPIR-V reflection into pipeline layout descriptors
///
/// Each shader module is reflected on its own with spirq, then the per-stage results are
/// merged into one `PipelineLayoutDesc`: a binding used by several stages gets the union
/// of their stage flags.

use std::collections::BTreeMap;

use galaxy_3d_state_cache::galaxy3d::descriptor::{
    DescriptorSetLayoutDesc, PipelineLayoutDesc, MAX_DESCRIPTOR_SET_LAYOUTS, MAX_DESCRIPTOR_SET_LAYOUT_BINDINGS,
};
use galaxy_3d_state_cache::galaxy3d::state::{DescriptorSetIndex, DescriptorType, ShaderStageFlags, ShaderType};
use galaxy_3d_state_cache::galaxy3d::{Error, Result};
use galaxy_3d_state_cache::{cache_bail, cache_err, cache_error};

const SOURCE: &str = "galaxy3d::vulkan::Reflection";

/// One descriptor binding declared by a shader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectedBinding {
    pub set: u32,
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub count: u32,
}

/// Resources one shader stage declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderReflection {
    pub stage: ShaderType,
    pub bindings: Vec<ReflectedBinding>,
    /// Size in bytes of the push constant block, 0 when the stage declares none
    pub push_constant_size: u32,
}

impl ShaderReflection {
    pub fn new(stage: ShaderType) -> Self {
        Self { stage, bindings: Vec::new(), push_constant_size: 0 }
    }
}

fn descriptor_type(desc_ty: &spirq::ty::DescriptorType) -> Result<DescriptorType> {
    use spirq::ty::DescriptorType as SpirqType;
    match desc_ty {
        SpirqType::Sampler(..) => Ok(DescriptorType::Sampler),
        SpirqType::CombinedImageSampler(..) => Ok(DescriptorType::CombinedImageSampler),
        SpirqType::SampledImage(..) => Ok(DescriptorType::SampledImage),
        SpirqType::StorageImage(..) => Ok(DescriptorType::StorageImage),
        SpirqType::UniformTexelBuffer(..) => Ok(DescriptorType::UniformTexelBuffer),
        SpirqType::StorageTexelBuffer(..) => Ok(DescriptorType::StorageTexelBuffer),
        SpirqType::UniformBuffer(..) => Ok(DescriptorType::UniformBuffer),
        SpirqType::StorageBuffer(..) => Ok(DescriptorType::StorageBuffer),
        SpirqType::InputAttachment(..) => Ok(DescriptorType::InputAttachment),
        other => {
            cache_error!(SOURCE, "Unsupported SPIR-V descriptor type: {:?}", other);
            Err(Error::Unsupported(format!("SPIR-V descriptor type {:?}", other)))
        }
    }
}

/// Reflect the descriptors and push constants of one SPIR-V module
pub fn reflect_shader(code: &[u32], stage: ShaderType) -> Result<ShaderReflection> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(code)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| cache_err!(SOURCE, "SPIR-V reflection failed: {:?}", e))?;

    let mut reflection = ShaderReflection::new(stage);

    for entry_point in &entry_points {
        for var in entry_point.vars.iter() {
            match var {
                spirq::var::Variable::Descriptor { desc_bind, desc_ty, nbind, .. } => {
                    reflection.bindings.push(ReflectedBinding {
                        set: desc_bind.set(),
                        binding: desc_bind.bind(),
                        descriptor_type: descriptor_type(desc_ty)?,
                        // Runtime-sized arrays report 0
                        count: (*nbind).max(1),
                    });
                }
                spirq::var::Variable::PushConstant { ty, .. } => {
                    let size = ty.nbyte().unwrap_or(0) as u32;
                    reflection.push_constant_size = reflection.push_constant_size.max(size);
                }
                _ => {}
            }
        }
    }

    Ok(reflection)
}

/// Merge per-stage reflections into a pipeline layout descriptor
///
/// Every stage's push constant block starts at offset 0. Two stages declaring the same
/// set/binding with different descriptor types is an error.
pub fn build_pipeline_layout_desc(stages: &[ShaderReflection]) -> Result<PipelineLayoutDesc> {
    // (set, binding) -> (type, count, stages)
    let mut merged: BTreeMap<(u32, u32), (DescriptorType, u32, ShaderStageFlags)> = BTreeMap::new();

    for reflection in stages {
        let stage_flags = reflection.stage.stage_flags();

        for binding in &reflection.bindings {
            if binding.set as usize >= MAX_DESCRIPTOR_SET_LAYOUTS {
                cache_error!(SOURCE, "Descriptor set {} out of range", binding.set);
                return Err(Error::InvalidResource(format!("descriptor set {}", binding.set)));
            }
            if binding.binding as usize >= MAX_DESCRIPTOR_SET_LAYOUT_BINDINGS {
                cache_error!(SOURCE, "Binding {} of set {} out of range", binding.binding, binding.set);
                return Err(Error::InvalidResource(format!("binding {}", binding.binding)));
            }

            let entry = merged
                .entry((binding.set, binding.binding))
                .or_insert((binding.descriptor_type, binding.count, ShaderStageFlags::empty()));
            if entry.0 != binding.descriptor_type {
                cache_bail!(
                    SOURCE,
                    "Set {} binding {} declared as both {:?} and {:?}",
                    binding.set,
                    binding.binding,
                    entry.0,
                    binding.descriptor_type
                );
            }
            entry.1 = entry.1.max(binding.count);
            entry.2 |= stage_flags;
        }
    }

    let mut set_layouts = [DescriptorSetLayoutDesc::new(); MAX_DESCRIPTOR_SET_LAYOUTS];
    for (&(set, binding), &(descriptor_type, count, stage_flags)) in &merged {
        set_layouts[set as usize].update(binding, descriptor_type, count, stage_flags, None);
    }

    let mut desc = PipelineLayoutDesc::new();
    for &set_index in DescriptorSetIndex::ALL {
        desc.update_descriptor_set_layout(set_index, &set_layouts[set_index.to_raw() as usize]);
    }
    for reflection in stages {
        if reflection.push_constant_size > 0 {
            desc.update_push_constant_range(reflection.stage, 0, reflection.push_constant_size);
        }
    }

    Ok(desc)
}

#[cfg(test)]
#[path = "vulkan_reflection_tests.rs"]
mod tests;
