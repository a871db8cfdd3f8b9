//! Unit tests for render_pass_desc.rs

use crate::descriptor::{PackedDescriptor, RenderPassDesc};
use crate::format::FormatId;
use crate::state::{DrawBufferMask, SrgbWriteControlMode};
use rustc_hash::FxHashSet;

// ============================================================================
// COLOR ATTACHMENTS
// ============================================================================

#[test]
fn test_pack_color_attachment_with_gap() {
    let mut desc = RenderPassDesc::new();
    desc.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);
    desc.pack_color_attachment(2, FormatId::R16G16B16A16_FLOAT);
    desc.pack_color_attachment_gap(1);

    assert_eq!(desc.color_attachment_range(), 3);
    assert!(desc.is_color_attachment_enabled(0));
    assert!(!desc.is_color_attachment_enabled(1));
    assert!(desc.is_color_attachment_enabled(2));
    assert_eq!(desc.attachment_count(), 2);
}

#[test]
fn test_enabling_one_index_leaves_others_unaffected() {
    for index in 0..8 {
        let mut desc = RenderPassDesc::new();
        desc.pack_color_attachment(index, FormatId::B8G8R8A8_UNORM);
        for other in 0..8 {
            assert_eq!(desc.is_color_attachment_enabled(other), other == index);
        }
        assert_eq!(desc.color_attachment_range(), index + 1);
        assert_eq!(desc.color_attachment_mask(), DrawBufferMask::with(index));
    }
}

#[test]
fn test_packed_color_indices_skip_gaps() {
    let mut desc = RenderPassDesc::new();
    desc.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);
    desc.pack_color_attachment_gap(1);
    desc.pack_color_attachment_gap(2);
    desc.pack_color_attachment(3, FormatId::R8G8B8A8_UNORM);

    let pairs: Vec<_> = desc.packed_color_indices().collect();
    assert_eq!(pairs, vec![(0, 0), (3, 1)]);
}

// ============================================================================
// DEPTH/STENCIL
// ============================================================================

#[test]
fn test_depth_stencil_follows_color_range() {
    let mut desc = RenderPassDesc::new();
    desc.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);
    desc.pack_color_attachment(1, FormatId::R8G8B8A8_UNORM);
    desc.pack_depth_stencil_attachment(FormatId::D24_UNORM_S8_UINT);

    assert_eq!(desc.depth_stencil_attachment_index(), 2);
    assert!(desc.has_depth_stencil_attachment());
    assert_eq!(desc.format_at(2), FormatId::D24_UNORM_S8_UINT);
    assert_eq!(desc.attachment_count(), 3);
}

#[test]
fn test_depth_stencil_shares_byte_with_flags_at_full_range() {
    let mut desc = RenderPassDesc::new();
    for index in 0..8 {
        desc.pack_color_attachment(index, FormatId::R8G8B8A8_UNORM);
    }
    desc.update_render_to_texture(true);
    desc.set_write_control_mode(SrgbWriteControlMode::Linear);
    desc.pack_depth_stencil_attachment(FormatId::D32_FLOAT_S8X24_UINT);
    desc.pack_depth_stencil_resolve_attachment();

    assert_eq!(desc.format_at(8), FormatId::D32_FLOAT_S8X24_UINT);
    assert!(desc.is_render_to_texture());
    assert!(desc.has_depth_stencil_resolve_attachment());
    assert_eq!(desc.write_control_mode(), SrgbWriteControlMode::Linear);
    assert_eq!(desc.attachment_count(), 10);
}

#[test]
fn test_depth_only_render_pass() {
    let mut desc = RenderPassDesc::new();
    desc.pack_depth_stencil_attachment(FormatId::D16_UNORM);
    assert_eq!(desc.color_attachment_range(), 0);
    assert!(desc.has_depth_stencil_attachment());
    assert_eq!(desc.attachment_count(), 1);
}

// ============================================================================
// RESOLVE / UNRESOLVE
// ============================================================================

#[test]
fn test_color_resolve_and_unresolve() {
    let mut desc = RenderPassDesc::new();
    desc.set_samples(4);
    desc.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);
    desc.pack_color_resolve_attachment(0);
    desc.pack_color_unresolve_attachment(0);

    assert_eq!(desc.samples(), 4);
    assert!(desc.has_color_resolve_attachment(0));
    assert!(desc.has_color_unresolve_attachment(0));
    assert!(desc.has_unresolve_attachments());
    assert_eq!(desc.attachment_count(), 2);

    desc.remove_color_unresolve_attachment(0);
    assert!(!desc.has_unresolve_attachments());
    desc.remove_color_resolve_attachment(0);
    assert_eq!(desc.attachment_count(), 1);
}

#[test]
fn test_depth_stencil_unresolve_flags() {
    let mut desc = RenderPassDesc::new();
    desc.pack_depth_stencil_attachment(FormatId::D24_UNORM_S8_UINT);
    desc.pack_depth_stencil_resolve_attachment();
    desc.pack_depth_stencil_unresolve_attachment(true, false);

    assert!(desc.has_depth_unresolve_attachment());
    assert!(!desc.has_stencil_unresolve_attachment());
    assert!(desc.has_depth_stencil_unresolve_attachment());

    desc.remove_depth_stencil_unresolve_attachment();
    assert!(!desc.has_depth_stencil_unresolve_attachment());
    assert!(desc.has_depth_stencil_resolve_attachment());
    assert_eq!(desc.format_at(0), FormatId::D24_UNORM_S8_UINT);
}

// ============================================================================
// IDENTITY
// ============================================================================

#[test]
fn test_equality_and_hash_follow_bytes() {
    let mut a = RenderPassDesc::new();
    a.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);
    let mut b = RenderPassDesc::new();
    b.pack_color_attachment(0, FormatId::R8G8B8A8_UNORM);

    assert_eq!(a, b);
    assert_eq!(a.hash_value(), b.hash_value());

    b.set_framebuffer_fetch_mode(true);
    assert!(b.has_framebuffer_fetch());
    assert_ne!(a, b);

    let set: FxHashSet<RenderPassDesc> = [a, b, a].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_samples_stored_as_log2() {
    let mut desc = RenderPassDesc::new();
    assert_eq!(desc.samples(), 1);
    for samples in [1, 2, 4, 8, 16, 32, 64] {
        desc.set_samples(samples);
        assert_eq!(desc.samples(), samples);
    }
}
