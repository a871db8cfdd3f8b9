//! Unit tests for layout_desc.rs

use crate::descriptor::{DescriptorSetLayoutDesc, PackedDescriptor, PackedPushConstantRange, PipelineLayoutDesc};
use crate::state::{DescriptorSetIndex, DescriptorType, ShaderStageFlags, ShaderType};

#[test]
fn test_unpack_skips_unused_bindings() {
    let mut desc = DescriptorSetLayoutDesc::new();
    desc.update(3, DescriptorType::CombinedImageSampler, 2, ShaderStageFlags::FRAGMENT, Some(0xABCD));
    desc.update(0, DescriptorType::UniformBufferDynamic, 1, ShaderStageFlags::ALL_GRAPHICS, None);

    let bindings = desc.unpack_bindings();
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0].binding, 0);
    assert_eq!(bindings[0].descriptor_type, DescriptorType::UniformBufferDynamic);
    assert_eq!(bindings[0].immutable_sampler, None);
    assert_eq!(bindings[1].binding, 3);
    assert_eq!(bindings[1].count, 2);
    assert_eq!(bindings[1].stages, ShaderStageFlags::FRAGMENT);
    assert_eq!(bindings[1].immutable_sampler, Some(0xABCD));
}

#[test]
fn test_zero_count_removes_binding() {
    let mut desc = DescriptorSetLayoutDesc::new();
    desc.update(5, DescriptorType::StorageBuffer, 1, ShaderStageFlags::VERTEX, None);
    assert!(!desc.is_empty());
    desc.update(5, DescriptorType::Sampler, 0, ShaderStageFlags::empty(), None);
    assert!(desc.is_empty());
    assert_eq!(desc, DescriptorSetLayoutDesc::new());
}

#[test]
fn test_layout_equality_is_bitwise() {
    let mut a = DescriptorSetLayoutDesc::new();
    let mut b = DescriptorSetLayoutDesc::new();
    a.update(1, DescriptorType::SampledImage, 4, ShaderStageFlags::FRAGMENT, None);
    b.update(1, DescriptorType::SampledImage, 4, ShaderStageFlags::FRAGMENT, None);
    assert_eq!(a, b);
    assert_eq!(a.hash_value(), b.hash_value());

    b.update(1, DescriptorType::SampledImage, 4, ShaderStageFlags::VERTEX, None);
    assert_ne!(a, b);
}

#[test]
fn test_binding_size() {
    assert_eq!(std::mem::size_of::<DescriptorSetLayoutDesc>(), 16 * 64);
}

#[test]
fn test_pipeline_layout_sets_and_push_constants() {
    let mut set = DescriptorSetLayoutDesc::new();
    set.update(0, DescriptorType::CombinedImageSampler, 1, ShaderStageFlags::FRAGMENT, None);

    let mut layout = PipelineLayoutDesc::new();
    layout.update_descriptor_set_layout(DescriptorSetIndex::Texture, &set);
    layout.update_push_constant_range(ShaderType::Fragment, 16, 32);

    assert_eq!(layout.descriptor_set_layout(DescriptorSetIndex::Texture), &set);
    assert!(layout.descriptor_set_layout(DescriptorSetIndex::Internal).is_empty());
    assert_eq!(layout.push_constant_range(ShaderType::Fragment), PackedPushConstantRange { offset: 16, size: 32 });
    assert_eq!(layout.push_constant_range(ShaderType::Vertex), PackedPushConstantRange::default());

    let mut other = PipelineLayoutDesc::new();
    other.update_descriptor_set_layout(DescriptorSetIndex::Texture, &set);
    assert_ne!(layout, other);
    other.update_push_constant_range(ShaderType::Fragment, 16, 32);
    assert_eq!(layout, other);
}
