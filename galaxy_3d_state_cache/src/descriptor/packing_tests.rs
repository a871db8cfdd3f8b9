//! Unit tests for packing.rs

use crate::descriptor::packing::*;

// ============================================================================
// BITFIELD HELPERS
// ============================================================================

#[test]
fn test_bit_mask_widths() {
    assert_eq!(bit_mask(0), 0);
    assert_eq!(bit_mask(1), 1);
    assert_eq!(bit_mask(6), 0x3F);
    assert_eq!(bit_mask(32), u32::MAX);
}

#[test]
fn test_set_bits_leaves_neighbours_untouched() {
    let mut word = 0xFFFF_FFFFu32;
    set_bits(&mut word, 4, 4, 0x5);
    assert_eq!(word, 0xFFFF_FF5F);
    assert_eq!(get_bits(word, 4, 4), 0x5);
    assert_eq!(get_bits(word, 0, 4), 0xF);
    assert_eq!(get_bits(word, 8, 24), 0xFF_FFFF);
}

#[test]
fn test_set_bits_top_field() {
    let mut word = 0u32;
    set_bits(&mut word, 24, 8, 0xAB);
    assert_eq!(word, 0xAB00_0000);
}

#[test]
fn test_narrow_word_helpers() {
    let mut half = 0u16;
    set_bits_u16(&mut half, 9, 6, 33);
    assert_eq!(get_bits_u16(half, 9, 6), 33);
    assert_eq!(get_bits_u16(half, 0, 9), 0);

    let mut byte = 0u8;
    set_flag_u8(&mut byte, 7, true);
    set_bits_u8(&mut byte, 0, 3, 5);
    assert_eq!(byte, 0x85);
    set_flag_u8(&mut byte, 7, false);
    assert_eq!(byte, 0x05);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "does not fit")]
fn test_set_bits_rejects_wide_value() {
    let mut word = 0u32;
    set_bits(&mut word, 0, 3, 8);
}

// ============================================================================
// PACKED DESCRIPTOR HASH
// ============================================================================

struct Bytes([u8; 4]);

impl PackedDescriptor for Bytes {
    fn byte_image(&self) -> &[u8] {
        &self.0
    }
}

#[test]
fn test_hash_value_is_deterministic() {
    let a = Bytes([1, 2, 3, 4]);
    let b = Bytes([1, 2, 3, 4]);
    let c = Bytes([1, 2, 3, 5]);
    assert_eq!(a.hash_value(), b.hash_value());
    assert_ne!(a.hash_value(), c.hash_value());
}

// ============================================================================
// PACKED ENUMS
// ============================================================================

#[test]
fn test_unpack_enum_reads_stored_variant() {
    use crate::format::FormatId;
    use crate::state::{CompareOp, ShaderType};

    assert_eq!(FormatId::from_raw_or_default(FormatId::D32_FLOAT.to_raw().into()), FormatId::D32_FLOAT);
    assert_eq!(FormatId::from_raw_or_default(0), FormatId::NONE);
    assert_eq!(CompareOp::from_raw_or_default(CompareOp::Greater.to_raw().into()), CompareOp::Greater);
    assert_eq!(ShaderType::from_raw_or_default(ShaderType::Fragment.to_raw().into()), ShaderType::Fragment);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "invalid packed FormatId value 300")]
fn test_unpack_enum_rejects_unknown_pattern() {
    crate::format::FormatId::from_raw_or_default(300);
}
