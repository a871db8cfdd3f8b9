//! Descriptor set layout and pipeline layout descriptions
//!
//! Both describe the shape of resource bindings (types, counts, stages) and never the bound
//! resources themselves.

use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

use crate::descriptor::packing::UnpackEnum;
use crate::descriptor::{MAX_DESCRIPTOR_SET_LAYOUTS, MAX_DESCRIPTOR_SET_LAYOUT_BINDINGS};
use crate::state::{DescriptorSetIndex, DescriptorType, ShaderStageFlags, ShaderType};

// ===== DESCRIPTOR SET LAYOUT =====

#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct PackedDescriptorSetBinding {
    descriptor_type: u8,
    stages: u8,
    /// 0 marks an unused binding
    count: u16,
    pad: u32,
    /// Raw native sampler handle, 0 if none
    immutable_sampler: u64,
}

const _: () = assert!(size_of::<PackedDescriptorSetBinding>() == 16);

/// One active binding, as unpacked for the native layout creation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub count: u32,
    pub stages: ShaderStageFlags,
    /// Raw native sampler handle baked into the layout
    pub immutable_sampler: Option<u64>,
}

/// Shape of one descriptor set
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct DescriptorSetLayoutDesc {
    bindings: [PackedDescriptorSetBinding; MAX_DESCRIPTOR_SET_LAYOUT_BINDINGS],
}

impl_packed_descriptor!(DescriptorSetLayoutDesc);

impl DescriptorSetLayoutDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare binding `binding_index`; a `count` of 0 removes it
    pub fn update(
        &mut self,
        binding_index: u32,
        descriptor_type: DescriptorType,
        count: u32,
        stages: ShaderStageFlags,
        immutable_sampler: Option<u64>,
    ) {
        debug_assert!((binding_index as usize) < MAX_DESCRIPTOR_SET_LAYOUT_BINDINGS);
        debug_assert!(count <= u32::from(u16::MAX), "descriptor count {} exceeds 16 bits", count);

        let packed = &mut self.bindings[binding_index as usize];
        packed.descriptor_type = descriptor_type.to_raw();
        packed.stages = stages.bits();
        packed.count = count as u16;
        packed.immutable_sampler = immutable_sampler.unwrap_or(0);
    }

    /// Active bindings in increasing binding order
    pub fn unpack_bindings(&self) -> Vec<DescriptorSetLayoutBinding> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, packed)| packed.count > 0)
            .map(|(index, packed)| DescriptorSetLayoutBinding {
                binding: index as u32,
                descriptor_type: DescriptorType::from_raw_or_default(packed.descriptor_type.into()),
                count: u32::from(packed.count),
                stages: ShaderStageFlags::from_bits_truncate(packed.stages),
                immutable_sampler: (packed.immutable_sampler != 0).then_some(packed.immutable_sampler),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.iter().all(|packed| packed.count == 0)
    }
}

// ===== PIPELINE LAYOUT =====

/// Push constant range of one shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedPushConstantRange {
    pub offset: u32,
    pub size: u32,
}

/// Set layouts of every descriptor set slot plus per-stage push constants
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct PipelineLayoutDesc {
    descriptor_set_layouts: [DescriptorSetLayoutDesc; MAX_DESCRIPTOR_SET_LAYOUTS],
    push_constant_ranges: [PackedPushConstantRange; ShaderType::COUNT],
}

impl_packed_descriptor!(PipelineLayoutDesc);

const _: () = assert!(
    size_of::<PipelineLayoutDesc>()
        == size_of::<DescriptorSetLayoutDesc>() * MAX_DESCRIPTOR_SET_LAYOUTS
            + size_of::<PackedPushConstantRange>() * ShaderType::COUNT
);

impl PipelineLayoutDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_descriptor_set_layout(&mut self, set_index: DescriptorSetIndex, desc: &DescriptorSetLayoutDesc) {
        self.descriptor_set_layouts[set_index.to_raw() as usize] = *desc;
    }

    pub fn descriptor_set_layout(&self, set_index: DescriptorSetIndex) -> &DescriptorSetLayoutDesc {
        &self.descriptor_set_layouts[set_index.to_raw() as usize]
    }

    pub fn update_push_constant_range(&mut self, shader_type: ShaderType, offset: u32, size: u32) {
        debug_assert!(shader_type != ShaderType::Compute || offset == 0);
        self.push_constant_ranges[shader_type.to_raw() as usize] = PackedPushConstantRange { offset, size };
    }

    pub fn push_constant_range(&self, shader_type: ShaderType) -> PackedPushConstantRange {
        self.push_constant_ranges[shader_type.to_raw() as usize]
    }
}

#[cfg(test)]
#[path = "layout_desc_tests.rs"]
mod tests;
