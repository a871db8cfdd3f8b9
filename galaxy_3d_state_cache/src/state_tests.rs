//! Unit tests for state.rs

use crate::state::*;

// ============================================================================
// PACKED ENUM VALUES
// ============================================================================

#[test]
fn test_enum_values_match_vulkan() {
    assert_eq!(PrimitiveTopology::TriangleList.to_raw(), 3);
    assert_eq!(PrimitiveTopology::PatchList.to_raw(), 10);
    assert_eq!(CullMode::FrontAndBack.to_raw(), 3);
    assert_eq!(CompareOp::Always.to_raw(), 7);
    assert_eq!(StencilOp::DecrementAndWrap.to_raw(), 7);
    assert_eq!(BlendFactor::OneMinusSrc1Alpha.to_raw(), 18);
    assert_eq!(BlendOp::Max.to_raw(), 4);
    assert_eq!(LogicOp::Set.to_raw(), 15);
    assert_eq!(AddressMode::MirrorClampToEdge.to_raw(), 4);
    assert_eq!(DescriptorType::InputAttachment.to_raw(), 10);
}

#[test]
fn test_packed_enums_fit_their_fields() {
    // Field widths used by the packed descriptors
    assert!(BlendFactor::ALL.iter().all(|f| f.to_raw() < 1 << 5));
    assert!(BlendOp::ALL.iter().all(|o| o.to_raw() < 1 << 6));
    assert!(CompareOp::ALL.iter().all(|o| o.to_raw() < 1 << 3));
    assert!(StencilOp::ALL.iter().all(|o| o.to_raw() < 1 << 4));
    assert!(AddressMode::ALL.iter().all(|m| m.to_raw() < 1 << 3));
    assert!(ImageLayout::ALL.iter().all(|l| l.to_raw() < 1 << 4));
    assert!(SurfaceRotation::ALL.len() <= 8);
    assert!(PrimitiveTopology::ALL.iter().all(|t| (t.to_raw() as u32) < 1 << 9));
}

#[test]
fn test_from_raw_rejects_unknown_values() {
    assert_eq!(CullMode::from_raw(2), Some(CullMode::Back));
    assert_eq!(CullMode::from_raw(4), None);
    assert_eq!(ImageLayout::from_raw(15), None);
}

#[test]
fn test_front_face_inversion() {
    assert_eq!(FrontFace::CounterClockwise.inverted(), FrontFace::Clockwise);
    assert_eq!(FrontFace::Clockwise.inverted(), FrontFace::CounterClockwise);
}

#[test]
fn test_shader_type_stage_flags() {
    assert_eq!(ShaderType::Fragment.stage_flags(), ShaderStageFlags::FRAGMENT);
    assert_eq!(ShaderType::ALL.len(), ShaderType::COUNT);
    assert!(ShaderStageFlags::ALL_GRAPHICS.contains(ShaderStageFlags::GEOMETRY));
    assert!(!ShaderStageFlags::ALL_GRAPHICS.contains(ShaderStageFlags::COMPUTE));
}

// ============================================================================
// DRAW BUFFER MASK
// ============================================================================

#[test]
fn test_draw_buffer_mask_bits() {
    let mut mask = DrawBufferMask::empty();
    mask.set_index(0, true);
    mask.set_index(5, true);
    assert!(mask.test(0));
    assert!(!mask.test(1));
    assert!(mask.test(5));
    assert!(!mask.test(8));
    assert_eq!(mask.indices().collect::<Vec<_>>(), vec![0, 5]);
    mask.set_index(0, false);
    assert_eq!(mask.bits(), 1 << 5);
}

// ============================================================================
// HIGH-LEVEL STATE DEFAULTS
// ============================================================================

#[test]
fn test_rasterizer_effective_cull_mode() {
    let mut raster = RasterizerState::default();
    assert_eq!(raster.effective_cull_mode(), CullMode::None);
    raster.cull_face = true;
    assert_eq!(raster.effective_cull_mode(), CullMode::Back);
}

#[test]
fn test_blend_enabled_mask() {
    let mut blend = BlendStateExt::default();
    assert!(blend.blend_enabled_mask().is_empty());
    blend.attachments[2].blend_enable = true;
    assert_eq!(blend.blend_enabled_mask(), DrawBufferMask::with(2));
}

#[test]
fn test_default_depth_stencil_state() {
    let ds = DepthStencilState::default();
    assert!(!ds.depth_test);
    assert!(ds.depth_mask);
    assert_eq!(ds.depth_func, CompareOp::Less);
    assert_eq!(ds.front.compare_mask, 0xFF);
}
