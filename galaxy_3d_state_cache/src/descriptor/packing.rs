/// Bitfield helpers and the byte-image contract shared by every packed descriptor

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// A fixed-size, padding-free value compared and hashed through its byte image
pub trait PackedDescriptor {
    /// The bytes that define this descriptor's identity
    fn byte_image(&self) -> &[u8];

    /// Deterministic hash of the byte image
    ///
    /// Equal descriptors always produce equal values; this is the same hash the caches
    /// feed to their `FxHashMap`s.
    fn hash_value(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(self.byte_image());
        hasher.finish()
    }
}

/// Packed enum read back out of a bitfield
pub(crate) trait UnpackEnum: Sized + Default {
    const NAME: &'static str;

    fn try_from_raw(raw: u8) -> Option<Self>;

    /// Variant stored in `raw`, or the default variant for a pattern no variant produces
    #[inline]
    fn from_raw_or_default(raw: u32) -> Self {
        let value = u8::try_from(raw).ok().and_then(Self::try_from_raw);
        debug_assert!(value.is_some(), "invalid packed {} value {}", Self::NAME, raw);
        value.unwrap_or_default()
    }
}

/// Mask covering the low `width` bits
#[inline]
pub(crate) const fn bit_mask(width: u32) -> u32 {
    if width >= 32 { u32::MAX } else { (1u32 << width) - 1 }
}

#[inline]
pub(crate) fn get_bits(word: u32, shift: u32, width: u32) -> u32 {
    (word >> shift) & bit_mask(width)
}

/// Store `value` into `width` bits at `shift`, leaving every other bit untouched
///
/// `value` must fit the field; wider values are truncated in release builds.
#[inline]
pub(crate) fn set_bits(word: &mut u32, shift: u32, width: u32, value: u32) {
    debug_assert!(
        value <= bit_mask(width),
        "value {} does not fit in {} bits",
        value,
        width
    );
    let mask = bit_mask(width) << shift;
    *word = (*word & !mask) | ((value << shift) & mask);
}

#[inline]
pub(crate) fn get_bits_u16(word: u16, shift: u32, width: u32) -> u32 {
    get_bits(u32::from(word), shift, width)
}

#[inline]
pub(crate) fn set_bits_u16(word: &mut u16, shift: u32, width: u32, value: u32) {
    let mut wide = u32::from(*word);
    set_bits(&mut wide, shift, width, value);
    *word = wide as u16;
}

#[inline]
pub(crate) fn get_bits_u8(word: u8, shift: u32, width: u32) -> u32 {
    get_bits(u32::from(word), shift, width)
}

#[inline]
pub(crate) fn set_bits_u8(word: &mut u8, shift: u32, width: u32, value: u32) {
    let mut wide = u32::from(*word);
    set_bits(&mut wide, shift, width, value);
    *word = wide as u8;
}

/// Set or clear a single bit of a byte mask
#[inline]
pub(crate) fn set_flag_u8(word: &mut u8, bit: u32, enabled: bool) {
    set_bits_u8(word, bit, 1, u32::from(enabled));
}

#[cfg(test)]
#[path = "packing_tests.rs"]
mod tests;
