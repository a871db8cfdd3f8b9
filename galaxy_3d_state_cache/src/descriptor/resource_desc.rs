//! Serial-keyed descriptions: descriptor set contents and framebuffers
//!
//! These keys name resources by serial, so rebinding the same view or buffer produces an
//! equal key without re-describing the resource.

use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::mem::size_of;

use crate::descriptor::packing::{get_bits, set_bits, PackedDescriptor, UnpackEnum};
use crate::descriptor::{
    MAX_ACTIVE_TEXTURES, MAX_DRAW_BUFFERS, MAX_FRAMEBUFFER_ATTACHMENTS, MAX_FRAMEBUFFER_LAYERS,
    MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS, MAX_TRANSFORM_FEEDBACK_BUFFERS,
};
use crate::serial::{BufferSerial, ImageOrBufferViewSerial, ImageOrBufferViewSubresourceSerial, SamplerSerial};
use crate::state::SrgbWriteControlMode;

// ===== TEXTURES =====

/// View and sampler bound to one texture unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct TexUnitSerials {
    pub view: ImageOrBufferViewSubresourceSerial,
    pub sampler: SamplerSerial,
}

/// Key of the texture descriptor set cache
///
/// Only units below `max_index` take part in equality and hashing.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct TextureDescriptorDesc {
    /// Exclusive upper bound of the bound units
    max_index: u32,
    serials: [TexUnitSerials; MAX_ACTIVE_TEXTURES],
}

const _: () = assert!(size_of::<TexUnitSerials>() == 12);

impl TextureDescriptorDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, tex_unit: usize, view: ImageOrBufferViewSubresourceSerial, sampler: SamplerSerial) {
        debug_assert!(tex_unit < MAX_ACTIVE_TEXTURES);
        self.serials[tex_unit] = TexUnitSerials { view, sampler };
        self.max_index = self.max_index.max(tex_unit as u32 + 1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn max_index(&self) -> usize {
        self.max_index as usize
    }

    pub fn unit(&self, tex_unit: usize) -> &TexUnitSerials {
        &self.serials[tex_unit]
    }
}

impl Default for TextureDescriptorDesc {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}

impl PackedDescriptor for TextureDescriptorDesc {
    fn byte_image(&self) -> &[u8] {
        let used = size_of::<u32>() + self.max_index as usize * size_of::<TexUnitSerials>();
        &bytemuck::bytes_of(self)[..used]
    }
}

impl PartialEq for TextureDescriptorDesc {
    fn eq(&self, other: &Self) -> bool {
        self.byte_image() == other.byte_image()
    }
}

impl Eq for TextureDescriptorDesc {}

impl Hash for TextureDescriptorDesc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.byte_image());
    }
}

// ===== UNIFORMS AND TRANSFORM FEEDBACK =====

const DEFAULT_UNIFORM_BUFFER_INDEX: usize = 0;
const XFB_BUFFER_BASE_INDEX: usize = 1;

/// Key of the default-uniforms / transform-feedback descriptor set cache
///
/// Slot 0 is the default uniform buffer, slots 1.. the transform feedback buffers.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct UniformsAndXfbDescriptorDesc {
    buffer_count: u32,
    buffer_serials: [BufferSerial; MAX_TRANSFORM_FEEDBACK_BUFFERS + 1],
    xfb_buffer_offsets: [u32; MAX_TRANSFORM_FEEDBACK_BUFFERS],
}

impl_packed_descriptor!(UniformsAndXfbDescriptorDesc);

impl UniformsAndXfbDescriptorDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_default_uniform_buffer(&mut self, serial: BufferSerial) {
        self.buffer_serials[DEFAULT_UNIFORM_BUFFER_INDEX] = serial;
        self.buffer_count = self.buffer_count.max(1);
    }

    pub fn update_transform_feedback_buffer(&mut self, xfb_index: usize, serial: BufferSerial, offset: u32) {
        debug_assert!(xfb_index < MAX_TRANSFORM_FEEDBACK_BUFFERS);
        let buffer_index = XFB_BUFFER_BASE_INDEX + xfb_index;
        self.buffer_serials[buffer_index] = serial;
        self.xfb_buffer_offsets[xfb_index] = offset;
        self.buffer_count = self.buffer_count.max(buffer_index as u32 + 1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn buffer_count(&self) -> usize {
        self.buffer_count as usize
    }

    pub fn default_uniform_buffer_serial(&self) -> BufferSerial {
        self.buffer_serials[DEFAULT_UNIFORM_BUFFER_INDEX]
    }

    pub fn transform_feedback_buffer(&self, xfb_index: usize) -> (BufferSerial, u32) {
        (self.buffer_serials[XFB_BUFFER_BASE_INDEX + xfb_index], self.xfb_buffer_offsets[xfb_index])
    }
}

// ===== SHADER BUFFERS =====

const SHADER_BUFFERS_INLINE_WORDS: usize = 32;

/// Key of the shader resource descriptor set cache: a variable-length list of 32-bit words
/// (buffer serials, offsets, sizes) appended in binding order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ShaderBuffersDescriptorDesc {
    payload: SmallVec<[u32; SHADER_BUFFERS_INLINE_WORDS]>,
}

impl ShaderBuffersDescriptorDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_buffer_serial(&mut self, serial: BufferSerial) {
        self.payload.push(serial.value());
    }

    pub fn append_32bit_value(&mut self, value: u32) {
        self.payload.push(value);
    }

    pub fn reset(&mut self) {
        self.payload.clear();
    }

    pub fn payload(&self) -> &[u32] {
        &self.payload
    }
}

impl PackedDescriptor for ShaderBuffersDescriptorDesc {
    fn byte_image(&self) -> &[u8] {
        bytemuck::cast_slice(self.payload.as_slice())
    }
}

// ===== FRAMEBUFFER =====

const MAX_INDEX_SHIFT: u32 = 0;
const MAX_INDEX_BITS: u32 = 5;
const FETCH_BIT: u32 = 5;
const LAYER_COUNT_SHIFT: u32 = 6;
const LAYER_COUNT_BITS: u32 = 9;
const SRGB_WRITE_CONTROL_BIT: u32 = 15;
const UNRESOLVE_MASK_SHIFT: u32 = 16;
const UNRESOLVE_MASK_BITS: u32 = 9;
const RENDER_TO_TEXTURE_BIT: u32 = 25;

/// Index of the depth/stencil attachment
pub const FRAMEBUFFER_DEPTH_STENCIL_INDEX: usize = 0;
/// Index of color attachment 0; colors follow contiguously
pub const FRAMEBUFFER_COLOR_INDEX_OFFSET: usize = 1;
pub const FRAMEBUFFER_DEPTH_STENCIL_RESOLVE_INDEX: usize = MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS;
pub const FRAMEBUFFER_COLOR_RESOLVE_INDEX_OFFSET: usize = FRAMEBUFFER_DEPTH_STENCIL_RESOLVE_INDEX + 1;

/// Framebuffer cache key (148 bytes): attachment view serials plus framebuffer-wide modes
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct FramebufferDesc {
    /// max index:5 | fetch:1 | layer count:9 | sRGB write control:1 | unresolve mask:9 | render to texture:1
    header: u32,
    serials: [ImageOrBufferViewSubresourceSerial; MAX_FRAMEBUFFER_ATTACHMENTS],
}

impl_packed_descriptor!(FramebufferDesc);

const _: () = assert!(size_of::<FramebufferDesc>() == 148);
const _: () = assert!(MAX_FRAMEBUFFER_ATTACHMENTS < 1 << MAX_INDEX_BITS);
const _: () = assert!(MAX_FRAMEBUFFER_LAYERS < 1 << LAYER_COUNT_BITS);
const _: () = assert!(FRAMEBUFFER_COLOR_RESOLVE_INDEX_OFFSET + MAX_DRAW_BUFFERS == MAX_FRAMEBUFFER_ATTACHMENTS);

impl FramebufferDesc {
    pub fn new() -> Self {
        Self::default()
    }

    fn header_bits(&self, shift: u32, width: u32) -> u32 {
        get_bits(self.header, shift, width)
    }

    fn set_header_bits(&mut self, shift: u32, width: u32, value: u32) {
        set_bits(&mut self.header, shift, width, value);
    }

    fn update(&mut self, index: usize, serial: ImageOrBufferViewSubresourceSerial) {
        debug_assert!(index < MAX_FRAMEBUFFER_ATTACHMENTS);
        self.serials[index] = serial;
        if serial.valid() {
            let max_index = self.max_index().max(index + 1);
            self.set_header_bits(MAX_INDEX_SHIFT, MAX_INDEX_BITS, max_index as u32);
        }
    }

    pub fn update_color(&mut self, color_index_gl: usize, serial: ImageOrBufferViewSubresourceSerial) {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        self.update(FRAMEBUFFER_COLOR_INDEX_OFFSET + color_index_gl, serial);
    }

    pub fn update_color_resolve(&mut self, color_index_gl: usize, serial: ImageOrBufferViewSubresourceSerial) {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        self.update(FRAMEBUFFER_COLOR_RESOLVE_INDEX_OFFSET + color_index_gl, serial);
    }

    pub fn update_depth_stencil(&mut self, serial: ImageOrBufferViewSubresourceSerial) {
        self.update(FRAMEBUFFER_DEPTH_STENCIL_INDEX, serial);
    }

    pub fn update_depth_stencil_resolve(&mut self, serial: ImageOrBufferViewSubresourceSerial) {
        self.update(FRAMEBUFFER_DEPTH_STENCIL_RESOLVE_INDEX, serial);
    }

    /// Bits 0..8 are color attachments, bit 8 is depth/stencil
    pub fn update_unresolve_mask(&mut self, mask: u32) {
        self.set_header_bits(UNRESOLVE_MASK_SHIFT, UNRESOLVE_MASK_BITS, mask);
    }

    pub fn unresolve_mask(&self) -> u32 {
        self.header_bits(UNRESOLVE_MASK_SHIFT, UNRESOLVE_MASK_BITS)
    }

    pub fn update_layer_count(&mut self, layer_count: u32) {
        debug_assert!(layer_count <= MAX_FRAMEBUFFER_LAYERS, "layer count {} exceeds {}", layer_count, MAX_FRAMEBUFFER_LAYERS);
        self.set_header_bits(LAYER_COUNT_SHIFT, LAYER_COUNT_BITS, layer_count);
    }

    pub fn layer_count(&self) -> u32 {
        self.header_bits(LAYER_COUNT_SHIFT, LAYER_COUNT_BITS)
    }

    pub fn update_framebuffer_fetch_mode(&mut self, has_framebuffer_fetch: bool) {
        self.set_header_bits(FETCH_BIT, 1, u32::from(has_framebuffer_fetch));
    }

    pub fn has_framebuffer_fetch(&self) -> bool {
        self.header_bits(FETCH_BIT, 1) != 0
    }

    pub fn update_render_to_texture(&mut self, enabled: bool) {
        self.set_header_bits(RENDER_TO_TEXTURE_BIT, 1, u32::from(enabled));
    }

    pub fn is_render_to_texture(&self) -> bool {
        self.header_bits(RENDER_TO_TEXTURE_BIT, 1) != 0
    }

    pub fn set_write_control_mode(&mut self, mode: SrgbWriteControlMode) {
        self.set_header_bits(SRGB_WRITE_CONTROL_BIT, 1, mode.to_raw().into());
    }

    pub fn write_control_mode(&self) -> SrgbWriteControlMode {
        SrgbWriteControlMode::from_raw_or_default(self.header_bits(SRGB_WRITE_CONTROL_BIT, 1))
    }

    /// Exclusive upper bound of the attachment indices ever set
    pub fn max_index(&self) -> usize {
        self.header_bits(MAX_INDEX_SHIFT, MAX_INDEX_BITS) as usize
    }

    /// Number of attachments holding a valid view
    pub fn attachment_count(&self) -> usize {
        self.serials[..self.max_index()].iter().filter(|serial| serial.valid()).count()
    }

    pub fn attachment(&self, index: usize) -> &ImageOrBufferViewSubresourceSerial {
        &self.serials[index]
    }

    pub fn color_image_view_serial(&self, color_index_gl: usize) -> ImageOrBufferViewSerial {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        self.serials[FRAMEBUFFER_COLOR_INDEX_OFFSET + color_index_gl].view
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "resource_desc_tests.rs"]
mod tests;
