/// Load/store ops and layouts of render pass attachments
///
/// This is the second level of the render pass cache key: two render passes with the
/// same `RenderPassDesc` are compatible whatever their ops, but a render pass begun with
/// specific ops must match them exactly.

use bytemuck::{Pod, Zeroable};
use std::ops::Index;

use crate::descriptor::packing::{get_bits, set_bits, UnpackEnum};
use crate::descriptor::MAX_ATTACHMENT_OPS;
use crate::state::ImageLayout;

packed_enum! {
    /// Attachment load operation
    pub enum LoadOp {
        /// Preserve previous contents
        #[default]
        Load = 0,
        /// Clear to the clear value
        Clear = 1,
        /// Contents are undefined
        DontCare = 2,
    }
}

packed_enum! {
    /// Attachment store operation
    pub enum StoreOp {
        /// Write results to memory
        #[default]
        Store = 0,
        /// Results may be discarded
        DontCare = 1,
        /// Attachment is not accessed for store at all
        None = 2,
    }
}

const LOAD_OP_SHIFT: u32 = 0;
const STORE_OP_SHIFT: u32 = 2;
const STENCIL_LOAD_OP_SHIFT: u32 = 4;
const STENCIL_STORE_OP_SHIFT: u32 = 6;
const OP_BITS: u32 = 2;
const INVALIDATED_BIT: u32 = 8;
const STENCIL_INVALIDATED_BIT: u32 = 9;
const INITIAL_LAYOUT_SHIFT: u32 = 16;
const FINAL_LAYOUT_SHIFT: u32 = 20;
const LAYOUT_BITS: u32 = 4;

/// Index of an attachment in the native (packed) render pass, as opposed to a GL index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedAttachmentIndex(u32);

impl PackedAttachmentIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Ops and layouts of one attachment (32 bits)
///
/// | bits  | field |
/// |-------|-------|
/// | 0-7   | load, store, stencil load, stencil store (2 bits each) |
/// | 8     | invalidated |
/// | 9     | stencil invalidated |
/// | 16-19 | initial layout |
/// | 20-23 | final layout |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct PackedAttachmentOpsDesc(u32);

impl PackedAttachmentOpsDesc {
    pub fn load_op(self) -> LoadOp {
        LoadOp::from_raw_or_default(get_bits(self.0, LOAD_OP_SHIFT, OP_BITS))
    }

    pub fn store_op(self) -> StoreOp {
        StoreOp::from_raw_or_default(get_bits(self.0, STORE_OP_SHIFT, OP_BITS))
    }

    pub fn stencil_load_op(self) -> LoadOp {
        LoadOp::from_raw_or_default(get_bits(self.0, STENCIL_LOAD_OP_SHIFT, OP_BITS))
    }

    pub fn stencil_store_op(self) -> StoreOp {
        StoreOp::from_raw_or_default(get_bits(self.0, STENCIL_STORE_OP_SHIFT, OP_BITS))
    }

    /// Contents were invalidated; a matching resolve attachment may skip its store
    pub fn is_invalidated(self) -> bool {
        get_bits(self.0, INVALIDATED_BIT, 1) != 0
    }

    pub fn is_stencil_invalidated(self) -> bool {
        get_bits(self.0, STENCIL_INVALIDATED_BIT, 1) != 0
    }

    pub fn initial_layout(self) -> ImageLayout {
        ImageLayout::from_raw_or_default(get_bits(self.0, INITIAL_LAYOUT_SHIFT, LAYOUT_BITS))
    }

    pub fn final_layout(self) -> ImageLayout {
        ImageLayout::from_raw_or_default(get_bits(self.0, FINAL_LAYOUT_SHIFT, LAYOUT_BITS))
    }
}

/// Ops of every packed attachment of a render pass (40 bytes)
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct AttachmentOpsArray {
    ops: [PackedAttachmentOpsDesc; MAX_ATTACHMENT_OPS],
}

impl_packed_descriptor!(AttachmentOpsArray);

const _: () = assert!(std::mem::size_of::<AttachmentOpsArray>() == 40);

impl Index<PackedAttachmentIndex> for AttachmentOpsArray {
    type Output = PackedAttachmentOpsDesc;

    fn index(&self, index: PackedAttachmentIndex) -> &Self::Output {
        &self.ops[index.get() as usize]
    }
}

impl AttachmentOpsArray {
    pub fn new() -> Self {
        Self::default()
    }

    fn word(&mut self, index: PackedAttachmentIndex) -> &mut u32 {
        debug_assert!((index.get() as usize) < MAX_ATTACHMENT_OPS);
        &mut self.ops[index.get() as usize].0
    }

    /// Load and store both aspects, with the given layouts
    pub fn init_with_load_store(
        &mut self,
        index: PackedAttachmentIndex,
        initial_layout: ImageLayout,
        final_layout: ImageLayout,
    ) {
        self.set_layouts(index, initial_layout, final_layout);
        self.set_ops(index, LoadOp::Load, StoreOp::Store);
        self.set_stencil_ops(index, LoadOp::Load, StoreOp::Store);
    }

    pub fn set_layouts(
        &mut self,
        index: PackedAttachmentIndex,
        initial_layout: ImageLayout,
        final_layout: ImageLayout,
    ) {
        let word = self.word(index);
        set_bits(word, INITIAL_LAYOUT_SHIFT, LAYOUT_BITS, initial_layout.to_raw().into());
        set_bits(word, FINAL_LAYOUT_SHIFT, LAYOUT_BITS, final_layout.to_raw().into());
    }

    pub fn set_ops(&mut self, index: PackedAttachmentIndex, load_op: LoadOp, store_op: StoreOp) {
        let word = self.word(index);
        set_bits(word, LOAD_OP_SHIFT, OP_BITS, load_op.to_raw().into());
        set_bits(word, STORE_OP_SHIFT, OP_BITS, store_op.to_raw().into());
        set_bits(word, INVALIDATED_BIT, 1, 0);
    }

    pub fn set_stencil_ops(&mut self, index: PackedAttachmentIndex, load_op: LoadOp, store_op: StoreOp) {
        let word = self.word(index);
        set_bits(word, STENCIL_LOAD_OP_SHIFT, OP_BITS, load_op.to_raw().into());
        set_bits(word, STENCIL_STORE_OP_SHIFT, OP_BITS, store_op.to_raw().into());
        set_bits(word, STENCIL_INVALIDATED_BIT, 1, 0);
    }

    pub fn set_clear_op(&mut self, index: PackedAttachmentIndex) {
        set_bits(self.word(index), LOAD_OP_SHIFT, OP_BITS, LoadOp::Clear.to_raw().into());
    }

    pub fn set_clear_stencil_op(&mut self, index: PackedAttachmentIndex) {
        set_bits(self.word(index), STENCIL_LOAD_OP_SHIFT, OP_BITS, LoadOp::Clear.to_raw().into());
    }

    /// Record invalidation of the color/depth and stencil aspects
    pub fn set_invalidated(&mut self, index: PackedAttachmentIndex, invalidated: bool, stencil_invalidated: bool) {
        let word = self.word(index);
        set_bits(word, INVALIDATED_BIT, 1, u32::from(invalidated));
        set_bits(word, STENCIL_INVALIDATED_BIT, 1, u32::from(stencil_invalidated));
    }
}

#[cfg(test)]
#[path = "attachment_ops_tests.rs"]
mod tests;
