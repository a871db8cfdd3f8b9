//! Unit tests for transition.rs

use crate::descriptor::GraphicsPipelineDesc;
use crate::transition::{
    diff_words, transition_match, GraphicsPipelineTransitionBits, GRAPHICS_PIPELINE_DIRTY_BIT_COUNT,
};

fn defaults() -> GraphicsPipelineDesc {
    let mut desc = GraphicsPipelineDesc::new();
    desc.init_defaults();
    desc
}

// ============================================================================
// BIT SET
// ============================================================================

#[test]
fn test_dirty_bit_count_covers_descriptor() {
    assert_eq!(GRAPHICS_PIPELINE_DIRTY_BIT_COUNT, 63);
}

#[test]
fn test_set_range_inside_one_word() {
    let mut bits = GraphicsPipelineTransitionBits::empty();
    bits.set_range(9, 2);
    assert_eq!(bits.iter().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn test_set_range_straddling_words() {
    let mut bits = GraphicsPipelineTransitionBits::empty();
    // bytes 6..12 touch words 1 and 2
    bits.set_range(6, 6);
    assert_eq!(bits.iter().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(bits.count(), 2);
}

#[test]
fn test_iteration_is_ascending() {
    let bits = GraphicsPipelineTransitionBits::from_bits((1 << 40) | (1 << 3) | (1 << 62));
    assert_eq!(bits.into_iter().collect::<Vec<_>>(), vec![3, 40, 62]);
}

#[test]
fn test_reset_and_or() {
    let mut a = GraphicsPipelineTransitionBits::empty();
    a.set(1);
    let mut b = GraphicsPipelineTransitionBits::empty();
    b.set(5);

    let mut merged = a | b;
    assert!(merged.test(1) && merged.test(5));
    assert!(!merged.test(64));

    merged.reset();
    assert!(merged.is_empty());
    assert!(!merged.any());

    a |= b;
    assert_eq!(a.bits(), 0b100010);
}

// ============================================================================
// MATCHING
// ============================================================================

#[test]
fn test_match_requires_identical_bits() {
    let desc = defaults();
    let a = GraphicsPipelineTransitionBits::from_bits(0b01);
    let b = GraphicsPipelineTransitionBits::from_bits(0b11);
    assert!(!transition_match(a, b, &desc, &desc));
}

#[test]
fn test_match_ignores_unflagged_words() {
    let a = defaults();
    let mut b = defaults();
    let mut ignored = GraphicsPipelineTransitionBits::empty();
    b.update_line_width(&mut ignored, 4.0);

    let mut flagged = GraphicsPipelineTransitionBits::empty();
    let mut scratch = a;
    scratch.update_drawable_size(&mut flagged, 1, 1);

    // drawable size word is equal in both, line width word is not flagged
    assert!(transition_match(flagged, flagged, &a, &b));
    // once the differing word is flagged the descriptors no longer match
    let both = flagged | ignored;
    assert!(!transition_match(both, both, &a, &b));
}

#[test]
fn test_empty_bits_always_match() {
    let a = defaults();
    let b = GraphicsPipelineDesc::new();
    let empty = GraphicsPipelineTransitionBits::empty();
    assert!(transition_match(empty, empty, &a, &b));
}

#[test]
fn test_diff_words_is_exact() {
    let a = defaults();
    assert!(diff_words(&a, &a).is_empty());

    let mut b = a;
    let mut bits = GraphicsPipelineTransitionBits::empty();
    b.update_line_width(&mut bits, 2.5);
    assert_eq!(diff_words(&a, &b), bits);
    assert_eq!(a.diff(&b), bits);
}
