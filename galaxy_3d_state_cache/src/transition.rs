//! Pipeline transition bits
//!
//! Each bit covers one 4-byte word of `GraphicsPipelineDesc`. Mutators OR in the bits of
//! every word they touch, so after a series of state changes the accumulated bits name
//! exactly the words that may differ from the previously bound pipeline's descriptor.
//! Two situations are then equivalent when they flagged the same words and agree on the
//! contents of those words, which avoids comparing (or hashing) the whole descriptor.

use crate::descriptor::graphics_pipeline_desc::GraphicsPipelineDesc;
use crate::descriptor::PackedDescriptor;

/// Bytes of `GraphicsPipelineDesc` covered by one transition bit
pub const GRAPHICS_PIPELINE_DIRTY_BIT_BYTES: usize = 4;

/// Number of transition bits (one per descriptor word)
pub const GRAPHICS_PIPELINE_DIRTY_BIT_COUNT: usize =
    std::mem::size_of::<GraphicsPipelineDesc>() / GRAPHICS_PIPELINE_DIRTY_BIT_BYTES;

const _: () = assert!(std::mem::size_of::<GraphicsPipelineDesc>() % GRAPHICS_PIPELINE_DIRTY_BIT_BYTES == 0);
const _: () = assert!(GRAPHICS_PIPELINE_DIRTY_BIT_COUNT <= 64);

/// Set of dirty descriptor words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GraphicsPipelineTransitionBits(u64);

impl GraphicsPipelineTransitionBits {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn set(&mut self, bit: usize) {
        debug_assert!(bit < GRAPHICS_PIPELINE_DIRTY_BIT_COUNT);
        self.0 |= 1 << bit;
    }

    /// Flag every word overlapping `[offset, offset + size)`
    pub fn set_range(&mut self, offset: usize, size: usize) {
        debug_assert!(size > 0);
        debug_assert!(offset + size <= std::mem::size_of::<GraphicsPipelineDesc>());
        let first = offset / GRAPHICS_PIPELINE_DIRTY_BIT_BYTES;
        let last = (offset + size - 1) / GRAPHICS_PIPELINE_DIRTY_BIT_BYTES;
        for bit in first..=last {
            self.set(bit);
        }
    }

    pub fn test(self, bit: usize) -> bool {
        bit < 64 && self.0 & (1 << bit) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn any(self) -> bool {
        self.0 != 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Set bits in increasing order
    pub fn iter(self) -> TransitionBitIter {
        TransitionBitIter(self.0)
    }
}

impl std::ops::BitOr for GraphicsPipelineTransitionBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for GraphicsPipelineTransitionBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl IntoIterator for GraphicsPipelineTransitionBits {
    type Item = usize;
    type IntoIter = TransitionBitIter;

    fn into_iter(self) -> TransitionBitIter {
        self.iter()
    }
}

/// Iterator over set transition bits
#[derive(Debug, Clone)]
pub struct TransitionBitIter(u64);

impl Iterator for TransitionBitIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

fn word(desc: &GraphicsPipelineDesc, bit: usize) -> &[u8] {
    let start = bit * GRAPHICS_PIPELINE_DIRTY_BIT_BYTES;
    &desc.byte_image()[start..start + GRAPHICS_PIPELINE_DIRTY_BIT_BYTES]
}

/// Whether a recorded transition `(bits_a, desc_a)` applies to a probe `(bits_b, desc_b)`
///
/// The bit sets must be identical and both descriptors must agree on every flagged word.
pub fn transition_match(
    bits_a: GraphicsPipelineTransitionBits,
    bits_b: GraphicsPipelineTransitionBits,
    desc_a: &GraphicsPipelineDesc,
    desc_b: &GraphicsPipelineDesc,
) -> bool {
    if bits_a != bits_b {
        return false;
    }
    bits_a.iter().all(|bit| word(desc_a, bit) == word(desc_b, bit))
}

/// Exact set of words where two descriptors differ
pub fn diff_words(a: &GraphicsPipelineDesc, b: &GraphicsPipelineDesc) -> GraphicsPipelineTransitionBits {
    let mut bits = GraphicsPipelineTransitionBits::empty();
    let chunks_a = a.byte_image().chunks_exact(GRAPHICS_PIPELINE_DIRTY_BIT_BYTES);
    let chunks_b = b.byte_image().chunks_exact(GRAPHICS_PIPELINE_DIRTY_BIT_BYTES);
    for (bit, (word_a, word_b)) in chunks_a.zip(chunks_b).enumerate() {
        if word_a != word_b {
            bits.set(bit);
        }
    }
    bits
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
