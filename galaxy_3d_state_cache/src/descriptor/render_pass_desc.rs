//! Packed render pass description
//!
//! Color attachment formats are stored at their GL indices (with gaps for disabled
//! slots); the depth/stencil format follows at index `color_attachment_range()`. When the
//! native render pass is built, disabled slots are dropped and the remaining attachments
//! are listed in GL order, so subpass references either point into the packed list or
//! are marked unused. Resolve attachments are packed after the non-resolve ones and reuse
//! their formats.
//!
//! Depth/stencil formats only need 3 bits, so the upper 5 bits of the last format byte
//! carry render-pass-wide flags.

use bytemuck::{Pod, Zeroable};

use crate::descriptor::packing::{get_bits_u8, set_bits_u8, set_flag_u8, UnpackEnum};
use crate::descriptor::{MAX_DRAW_BUFFERS, MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS};
use crate::format::FormatId;
use crate::state::{DrawBufferMask, SrgbWriteControlMode};

const LOG_SAMPLES_SHIFT: u32 = 0;
const LOG_SAMPLES_BITS: u32 = 3;
const COLOR_RANGE_SHIFT: u32 = 3;
const COLOR_RANGE_BITS: u32 = 4;
const FRAMEBUFFER_FETCH_BIT: u32 = 7;

const DEPTH_STENCIL_FORMAT_MASK: u8 = 0x07;
const IS_RENDER_TO_TEXTURE: u8 = 0x80;
const RESOLVE_DEPTH_STENCIL: u8 = 0x40;
const UNRESOLVE_DEPTH: u8 = 0x20;
const UNRESOLVE_STENCIL: u8 = 0x10;
const SRGB_WRITE_CONTROL: u8 = 0x08;

const FLAGS_INDEX: usize = MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS - 1;

/// Render pass "compatibility" key: attachment formats, sample count and resolve shape,
/// without load/store ops (12 bytes)
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct RenderPassDesc {
    /// log2(samples):3 | color attachment range:4 | framebuffer fetch:1
    header: u8,
    color_resolve_mask: u8,
    color_unresolve_mask: u8,
    attachment_formats: [u8; MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS],
}

impl_packed_descriptor!(RenderPassDesc);

const _: () = assert!(std::mem::size_of::<RenderPassDesc>() == 12);

impl RenderPassDesc {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== SAMPLES =====

    /// `samples` must be a power of two no larger than 64
    pub fn set_samples(&mut self, samples: u32) {
        debug_assert!(samples.is_power_of_two(), "sample count {} is not a power of two", samples);
        set_bits_u8(&mut self.header, LOG_SAMPLES_SHIFT, LOG_SAMPLES_BITS, samples.trailing_zeros());
    }

    pub fn samples(&self) -> u32 {
        1 << get_bits_u8(self.header, LOG_SAMPLES_SHIFT, LOG_SAMPLES_BITS)
    }

    // ===== COLOR ATTACHMENTS =====

    /// Color attachments live in `[0, color_attachment_range())`, possibly with gaps
    pub fn color_attachment_range(&self) -> usize {
        get_bits_u8(self.header, COLOR_RANGE_SHIFT, COLOR_RANGE_BITS) as usize
    }

    pub fn depth_stencil_attachment_index(&self) -> usize {
        self.color_attachment_range()
    }

    fn extend_color_range(&mut self, color_index_gl: usize) {
        let range = self.color_attachment_range().max(color_index_gl + 1);
        set_bits_u8(&mut self.header, COLOR_RANGE_SHIFT, COLOR_RANGE_BITS, range as u32);
    }

    /// Set the format of an enabled GL color attachment
    pub fn pack_color_attachment(&mut self, color_index_gl: usize, format: FormatId) {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        debug_assert!(format != FormatId::NONE, "use pack_color_attachment_gap for disabled slots");
        self.attachment_formats[color_index_gl] = format.to_raw();
        self.extend_color_range(color_index_gl);
    }

    /// Mark a GL color attachment index as disabled
    pub fn pack_color_attachment_gap(&mut self, color_index_gl: usize) {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        self.attachment_formats[color_index_gl] = FormatId::NONE.to_raw();
        self.extend_color_range(color_index_gl);
    }

    pub fn is_color_attachment_enabled(&self, color_index_gl: usize) -> bool {
        color_index_gl < self.color_attachment_range()
            && self.attachment_formats[color_index_gl] != FormatId::NONE.to_raw()
    }

    /// Enabled GL color attachments
    pub fn color_attachment_mask(&self) -> DrawBufferMask {
        let mut mask = DrawBufferMask::empty();
        for index in 0..self.color_attachment_range() {
            mask.set_index(index, self.is_color_attachment_enabled(index));
        }
        mask
    }

    // ===== DEPTH/STENCIL ATTACHMENT =====

    /// Must be called after every color attachment has been packed
    pub fn pack_depth_stencil_attachment(&mut self, format: FormatId) {
        debug_assert!(format.is_depth_or_stencil(), "{:?} is not a depth/stencil format", format);
        let index = self.depth_stencil_attachment_index();
        let packed = &mut self.attachment_formats[index];
        *packed = (*packed & !DEPTH_STENCIL_FORMAT_MASK) | format.to_raw();
    }

    pub fn has_depth_stencil_attachment(&self) -> bool {
        self.format_at(self.depth_stencil_attachment_index()) != FormatId::NONE
    }

    /// Format at a GL-space index; the depth/stencil slot is read without its flag bits
    pub fn format_at(&self, index: usize) -> FormatId {
        debug_assert!(index < MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS);
        let mut raw = self.attachment_formats[index];
        if index >= self.depth_stencil_attachment_index() {
            raw &= DEPTH_STENCIL_FORMAT_MASK;
        }
        FormatId::from_raw_or_default(raw.into())
    }

    // ===== RESOLVE / UNRESOLVE =====

    /// Give a color attachment a corresponding resolve attachment
    pub fn pack_color_resolve_attachment(&mut self, color_index_gl: usize) {
        debug_assert!(self.is_color_attachment_enabled(color_index_gl));
        set_flag_u8(&mut self.color_resolve_mask, color_index_gl as u32, true);
    }

    pub fn remove_color_resolve_attachment(&mut self, color_index_gl: usize) {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        set_flag_u8(&mut self.color_resolve_mask, color_index_gl as u32, false);
    }

    pub fn has_color_resolve_attachment(&self, color_index_gl: usize) -> bool {
        self.color_resolve_attachment_mask().test(color_index_gl)
    }

    pub fn color_resolve_attachment_mask(&self) -> DrawBufferMask {
        DrawBufferMask::from_bits_retain(self.color_resolve_mask)
    }

    /// Initialize a color attachment from its resolve attachment in an initial subpass
    pub fn pack_color_unresolve_attachment(&mut self, color_index_gl: usize) {
        debug_assert!(self.has_color_resolve_attachment(color_index_gl));
        set_flag_u8(&mut self.color_unresolve_mask, color_index_gl as u32, true);
    }

    pub fn remove_color_unresolve_attachment(&mut self, color_index_gl: usize) {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        set_flag_u8(&mut self.color_unresolve_mask, color_index_gl as u32, false);
    }

    pub fn has_color_unresolve_attachment(&self, color_index_gl: usize) -> bool {
        self.color_unresolve_attachment_mask().test(color_index_gl)
    }

    pub fn color_unresolve_attachment_mask(&self) -> DrawBufferMask {
        DrawBufferMask::from_bits_retain(self.color_unresolve_mask)
    }

    fn flags(&self) -> u8 {
        self.attachment_formats[FLAGS_INDEX]
    }

    fn set_flag(&mut self, flag: u8, enabled: bool) {
        let packed = &mut self.attachment_formats[FLAGS_INDEX];
        if enabled {
            *packed |= flag;
        } else {
            *packed &= !flag;
        }
    }

    pub fn pack_depth_stencil_resolve_attachment(&mut self) {
        debug_assert!(self.has_depth_stencil_attachment());
        self.set_flag(RESOLVE_DEPTH_STENCIL, true);
    }

    pub fn has_depth_stencil_resolve_attachment(&self) -> bool {
        self.flags() & RESOLVE_DEPTH_STENCIL != 0
    }

    pub fn pack_depth_stencil_unresolve_attachment(&mut self, unresolve_depth: bool, unresolve_stencil: bool) {
        debug_assert!(self.has_depth_stencil_resolve_attachment());
        self.set_flag(UNRESOLVE_DEPTH, unresolve_depth);
        self.set_flag(UNRESOLVE_STENCIL, unresolve_stencil);
    }

    pub fn remove_depth_stencil_unresolve_attachment(&mut self) {
        self.set_flag(UNRESOLVE_DEPTH | UNRESOLVE_STENCIL, false);
    }

    pub fn has_depth_stencil_unresolve_attachment(&self) -> bool {
        self.flags() & (UNRESOLVE_DEPTH | UNRESOLVE_STENCIL) != 0
    }

    pub fn has_depth_unresolve_attachment(&self) -> bool {
        self.flags() & UNRESOLVE_DEPTH != 0
    }

    pub fn has_stencil_unresolve_attachment(&self) -> bool {
        self.flags() & UNRESOLVE_STENCIL != 0
    }

    /// Whether an initial unresolve subpass is needed
    pub fn has_unresolve_attachments(&self) -> bool {
        self.color_unresolve_mask != 0 || self.has_depth_stencil_unresolve_attachment()
    }

    // ===== MODES =====

    pub fn set_write_control_mode(&mut self, mode: SrgbWriteControlMode) {
        self.set_flag(SRGB_WRITE_CONTROL, mode == SrgbWriteControlMode::Linear);
    }

    pub fn write_control_mode(&self) -> SrgbWriteControlMode {
        if self.flags() & SRGB_WRITE_CONTROL != 0 {
            SrgbWriteControlMode::Linear
        } else {
            SrgbWriteControlMode::Default
        }
    }

    pub fn set_framebuffer_fetch_mode(&mut self, has_framebuffer_fetch: bool) {
        set_flag_u8(&mut self.header, FRAMEBUFFER_FETCH_BIT, has_framebuffer_fetch);
    }

    pub fn has_framebuffer_fetch(&self) -> bool {
        get_bits_u8(self.header, FRAMEBUFFER_FETCH_BIT, 1) != 0
    }

    pub fn update_render_to_texture(&mut self, is_render_to_texture: bool) {
        self.set_flag(IS_RENDER_TO_TEXTURE, is_render_to_texture);
    }

    pub fn is_render_to_texture(&self) -> bool {
        self.flags() & IS_RENDER_TO_TEXTURE != 0
    }

    // ===== COUNTS =====

    /// Number of attachments in the native render pass (disabled color slots removed)
    pub fn attachment_count(&self) -> usize {
        let color_count = (0..self.color_attachment_range())
            .filter(|&index| self.is_color_attachment_enabled(index))
            .count();
        let color_resolve_count = self.color_resolve_mask.count_ones() as usize;
        let depth_stencil_count = usize::from(self.has_depth_stencil_attachment());
        let depth_stencil_resolve_count = usize::from(self.has_depth_stencil_resolve_attachment());
        color_count + color_resolve_count + depth_stencil_count + depth_stencil_resolve_count
    }

    /// Packed (native) index of every enabled GL color attachment, in GL order
    pub fn packed_color_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.color_attachment_range())
            .filter(|&index| self.is_color_attachment_enabled(index))
            .enumerate()
            .map(|(packed, gl)| (gl, packed))
    }
}

#[cfg(test)]
#[path = "render_pass_desc_tests.rs"]
mod tests;
