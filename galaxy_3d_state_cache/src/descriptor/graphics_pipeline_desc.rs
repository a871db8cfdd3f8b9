//! Packed graphics pipeline description (252 bytes)
//!
//! Every sub-block is `#[repr(C)]` and padding-free (`bytemuck::Pod` refuses to derive
//! otherwise), so the whole descriptor is a plain byte image. This is what makes
//! word-granular transition bits valid: each `update_*` mutator changes only the bytes of
//! the field it owns and flags the words those bytes live in.
//!
//! | offset | size | block |
//! |--------|------|-------|
//! | 0      | 96   | vertex input attributes |
//! | 96     | 12   | render pass description |
//! | 108    | 32   | rasterization and multisample state |
//! | 140    | 20   | depth/stencil state |
//! | 160    | 56   | input assembly and color blend state |
//! | 216    | 24   | viewport |
//! | 240    | 8    | scissor |
//! | 248    | 4    | drawable size |

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use std::mem::{offset_of, size_of};

use crate::descriptor::packing::{
    get_bits, get_bits_u16, get_bits_u8, set_bits, set_bits_u16, set_bits_u8, UnpackEnum,
};
use crate::descriptor::render_pass_desc::RenderPassDesc;
use crate::descriptor::{
    ATTRIBUTE_OFFSET_MAX_BITS, MAX_DRAW_BUFFERS, MAX_SAMPLE_MASK_WORDS, MAX_VERTEX_ATTRIBS,
};
use crate::format::FormatId;
use crate::state::{
    BlendFactor, BlendOp, BlendStateExt, ColorComponentFlags, CompareOp, CullMode,
    DepthStencilState, DrawBufferMask, DrawFramebufferInfo, FrontFace, LogicOp, PolygonMode,
    PrimitiveTopology, RasterizerState, StencilOp, SurfaceRotation,
};
use crate::transition::{diff_words, GraphicsPipelineTransitionBits};

// ===== VERTEX INPUT =====

/// One vertex attribute (6 bytes)
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedAttribDesc {
    format: u8,
    divisor: u8,
    /// relative offset:15 | compressed:1
    offset_and_compressed: u16,
    stride: u16,
}

impl PackedAttribDesc {
    pub fn format(&self) -> FormatId {
        FormatId::from_raw_or_default(self.format.into())
    }

    /// Instance divisor (0 = per-vertex), saturated at 255
    pub fn divisor(&self) -> u32 {
        u32::from(self.divisor)
    }

    pub fn relative_offset(&self) -> u32 {
        get_bits_u16(self.offset_and_compressed, 0, ATTRIBUTE_OFFSET_MAX_BITS)
    }

    /// The attribute uses a compressed (emulated) vertex format
    pub fn compressed(&self) -> bool {
        get_bits_u16(self.offset_and_compressed, ATTRIBUTE_OFFSET_MAX_BITS, 1) != 0
    }

    pub fn stride(&self) -> u32 {
        u32::from(self.stride)
    }
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct VertexInputAttributes {
    attribs: [PackedAttribDesc; MAX_VERTEX_ATTRIBS],
}

// ===== RASTERIZATION AND MULTISAMPLE =====

const SUBPASS_SHIFT: u32 = 0;
const SUBPASS_BITS: u32 = 6;
const DEPTH_CLAMP_BIT: u32 = 6;
const RASTERIZER_DISCARD_BIT: u32 = 7;
const POLYGON_MODE_SHIFT: u32 = 8;
const CULL_MODE_SHIFT: u32 = 12;
const FRONT_FACE_SHIFT: u32 = 16;
const NIBBLE_BITS: u32 = 4;
const DEPTH_BIAS_BIT: u32 = 20;
const SAMPLE_SHADING_BIT: u32 = 21;
const ALPHA_TO_COVERAGE_BIT: u32 = 22;
const ALPHA_TO_ONE_BIT: u32 = 23;
const SAMPLES_SHIFT: u32 = 24;
const SAMPLES_BITS: u32 = 8;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct RasterizationAndMultisampleState {
    bits: u32,
    min_sample_shading: f32,
    sample_mask: [u32; MAX_SAMPLE_MASK_WORDS],
    depth_bias_clamp: f32,
    depth_bias_constant_factor: f32,
    depth_bias_slope_factor: f32,
    line_width: f32,
}

// ===== DEPTH/STENCIL =====

/// Stencil ops of one face (4 bytes)
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedStencilOpState {
    /// fail:4 | pass:4 | depth fail:4 | compare:4
    ops: u16,
    compare_mask: u8,
    write_mask: u8,
}

impl PackedStencilOpState {
    pub fn fail_op(&self) -> StencilOp {
        StencilOp::from_raw_or_default(get_bits_u16(self.ops, 0, NIBBLE_BITS))
    }

    pub fn pass_op(&self) -> StencilOp {
        StencilOp::from_raw_or_default(get_bits_u16(self.ops, 4, NIBBLE_BITS))
    }

    pub fn depth_fail_op(&self) -> StencilOp {
        StencilOp::from_raw_or_default(get_bits_u16(self.ops, 8, NIBBLE_BITS))
    }

    pub fn compare_op(&self) -> CompareOp {
        CompareOp::from_raw_or_default(get_bits_u16(self.ops, 12, NIBBLE_BITS))
    }

    pub fn compare_mask(&self) -> u8 {
        self.compare_mask
    }

    pub fn write_mask(&self) -> u8 {
        self.write_mask
    }

    fn set_ops(&mut self, fail: StencilOp, pass: StencilOp, depth_fail: StencilOp) {
        set_bits_u16(&mut self.ops, 0, NIBBLE_BITS, fail.to_raw().into());
        set_bits_u16(&mut self.ops, 4, NIBBLE_BITS, pass.to_raw().into());
        set_bits_u16(&mut self.ops, 8, NIBBLE_BITS, depth_fail.to_raw().into());
    }

    fn set_compare_op(&mut self, op: CompareOp) {
        set_bits_u16(&mut self.ops, 12, NIBBLE_BITS, op.to_raw().into());
    }
}

const DEPTH_TEST_SHIFT: u32 = 0;
const DEPTH_WRITE_SHIFT: u32 = 2;
const DEPTH_BOUNDS_TEST_SHIFT: u32 = 4;
const STENCIL_TEST_SHIFT: u32 = 6;
const DEPTH_COMPARE_SHIFT: u32 = 0;
const SURFACE_ROTATION_SHIFT: u32 = 4;
const SURFACE_ROTATION_BITS: u32 = 3;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct DepthStencilStateInfo {
    /// depth test:2 | depth write:2 | depth bounds test:2 | stencil test:2
    enable: u8,
    front_stencil_reference: u8,
    back_stencil_reference: u8,
    /// depth compare op:4 | surface rotation:3
    depth_compare_op_and_surface_rotation: u8,
    min_depth_bounds: f32,
    max_depth_bounds: f32,
    front: PackedStencilOpState,
    back: PackedStencilOpState,
}

// ===== INPUT ASSEMBLY AND COLOR BLEND =====

/// Blend factors and ops of one color attachment (32 bits)
///
/// src color:5 | dst color:5 | color op:6 | src alpha:5 | dst alpha:5 | alpha op:6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct PackedColorBlendAttachmentState(u32);

impl PackedColorBlendAttachmentState {
    pub fn src_color_blend_factor(self) -> BlendFactor {
        BlendFactor::from_raw_or_default(get_bits(self.0, 0, 5))
    }

    pub fn dst_color_blend_factor(self) -> BlendFactor {
        BlendFactor::from_raw_or_default(get_bits(self.0, 5, 5))
    }

    pub fn color_blend_op(self) -> BlendOp {
        BlendOp::from_raw_or_default(get_bits(self.0, 10, 6))
    }

    pub fn src_alpha_blend_factor(self) -> BlendFactor {
        BlendFactor::from_raw_or_default(get_bits(self.0, 16, 5))
    }

    pub fn dst_alpha_blend_factor(self) -> BlendFactor {
        BlendFactor::from_raw_or_default(get_bits(self.0, 21, 5))
    }

    pub fn alpha_blend_op(self) -> BlendOp {
        BlendOp::from_raw_or_default(get_bits(self.0, 26, 6))
    }

    fn set_factors(&mut self, src_color: BlendFactor, dst_color: BlendFactor, src_alpha: BlendFactor, dst_alpha: BlendFactor) {
        set_bits(&mut self.0, 0, 5, src_color.to_raw().into());
        set_bits(&mut self.0, 5, 5, dst_color.to_raw().into());
        set_bits(&mut self.0, 16, 5, src_alpha.to_raw().into());
        set_bits(&mut self.0, 21, 5, dst_alpha.to_raw().into());
    }

    fn set_ops(&mut self, color_op: BlendOp, alpha_op: BlendOp) {
        set_bits(&mut self.0, 10, 6, color_op.to_raw().into());
        set_bits(&mut self.0, 26, 6, alpha_op.to_raw().into());
    }
}

const TOPOLOGY_SHIFT: u32 = 0;
const TOPOLOGY_BITS: u32 = 9;
const PATCH_VERTICES_SHIFT: u32 = 9;
const PATCH_VERTICES_BITS: u32 = 6;
const PRIMITIVE_RESTART_BIT: u32 = 15;
const LOGIC_OP_ENABLE_BIT: u32 = 0;
const LOGIC_OP_SHIFT: u32 = 1;
const LOGIC_OP_BITS: u32 = 7;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct InputAssemblyAndColorBlendState {
    /// 4 bits per color attachment
    color_write_mask_bits: [u8; MAX_DRAW_BUFFERS / 2],
    attachments: [PackedColorBlendAttachmentState; MAX_DRAW_BUFFERS],
    blend_constants: [f32; 4],
    /// enable:1 | op:7
    logic: u8,
    blend_enable_mask: u8,
    /// topology:9 | patch vertices:6 | primitive restart:1
    primitive: u16,
}

// ===== VIEWPORT / SCISSOR / EXTENT =====

/// Viewport rectangle and depth range (24 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// Scissor rectangle; `x == DYNAMIC_SCISSOR_SENTINEL` marks a dynamic scissor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedScissor {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Scissor x value meaning "scissor is dynamic state, not baked into the pipeline"
pub const DYNAMIC_SCISSOR_SENTINEL: u16 = u16::MAX;

impl PackedScissor {
    /// Coordinates must fit in 16 bits and `x` must not be the dynamic sentinel
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        debug_assert!(x < u32::from(DYNAMIC_SCISSOR_SENTINEL));
        debug_assert!(y <= u32::from(u16::MAX) && width <= u32::from(u16::MAX) && height <= u32::from(u16::MAX));
        Self { x: x as u16, y: y as u16, width: width as u16, height: height as u16 }
    }

    pub fn is_dynamic(&self) -> bool {
        self.x == DYNAMIC_SCISSOR_SENTINEL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedExtent {
    pub width: u16,
    pub height: u16,
}

// ===== GRAPHICS PIPELINE DESC =====

/// Complete key of the graphics pipeline cache
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct GraphicsPipelineDesc {
    vertex_input_attribs: VertexInputAttributes,
    render_pass_desc: RenderPassDesc,
    rasterization_and_multisample: RasterizationAndMultisampleState,
    depth_stencil: DepthStencilStateInfo,
    input_assembly_and_color_blend: InputAssemblyAndColorBlendState,
    viewport: PackedViewport,
    scissor: PackedScissor,
    drawable_size: PackedExtent,
}

impl_packed_descriptor!(GraphicsPipelineDesc);

const _: () = assert!(size_of::<PackedAttribDesc>() == 6);
const _: () = assert!(size_of::<VertexInputAttributes>() == 96);
const _: () = assert!(size_of::<RasterizationAndMultisampleState>() == 32);
const _: () = assert!(size_of::<PackedStencilOpState>() == 4);
const _: () = assert!(size_of::<DepthStencilStateInfo>() == 20);
const _: () = assert!(size_of::<InputAssemblyAndColorBlendState>() == 56);
const _: () = assert!(
    size_of::<GraphicsPipelineDesc>()
        == size_of::<VertexInputAttributes>()
            + size_of::<RenderPassDesc>()
            + size_of::<RasterizationAndMultisampleState>()
            + size_of::<DepthStencilStateInfo>()
            + size_of::<InputAssemblyAndColorBlendState>()
            + size_of::<PackedViewport>()
            + size_of::<PackedScissor>()
            + size_of::<PackedExtent>()
);
const _: () = assert!(size_of::<GraphicsPipelineDesc>() == 252);

// Byte offsets of each block, used to compute transition bits
const VERTEX_INPUT_OFFSET: usize = offset_of!(GraphicsPipelineDesc, vertex_input_attribs);
const RENDER_PASS_OFFSET: usize = offset_of!(GraphicsPipelineDesc, render_pass_desc);
const RASTER_OFFSET: usize = offset_of!(GraphicsPipelineDesc, rasterization_and_multisample);
const DEPTH_STENCIL_OFFSET: usize = offset_of!(GraphicsPipelineDesc, depth_stencil);
const BLEND_OFFSET: usize = offset_of!(GraphicsPipelineDesc, input_assembly_and_color_blend);
const VIEWPORT_OFFSET: usize = offset_of!(GraphicsPipelineDesc, viewport);
const SCISSOR_OFFSET: usize = offset_of!(GraphicsPipelineDesc, scissor);
const DRAWABLE_SIZE_OFFSET: usize = offset_of!(GraphicsPipelineDesc, drawable_size);

const RASTER_BITS_RANGE: (usize, usize) =
    (RASTER_OFFSET + offset_of!(RasterizationAndMultisampleState, bits), size_of::<u32>());
const DS_ENABLE_RANGE: (usize, usize) =
    (DEPTH_STENCIL_OFFSET + offset_of!(DepthStencilStateInfo, enable), size_of::<u8>());
const DS_COMPARE_ROTATION_RANGE: (usize, usize) = (
    DEPTH_STENCIL_OFFSET + offset_of!(DepthStencilStateInfo, depth_compare_op_and_surface_rotation),
    size_of::<u8>(),
);
const PRIMITIVE_RANGE: (usize, usize) =
    (BLEND_OFFSET + offset_of!(InputAssemblyAndColorBlendState, primitive), size_of::<u16>());

fn mark(transition: &mut GraphicsPipelineTransitionBits, range: (usize, usize)) {
    transition.set_range(range.0, range.1);
}

fn blend_attachment_range(index: usize) -> (usize, usize) {
    let size = size_of::<PackedColorBlendAttachmentState>();
    (BLEND_OFFSET + offset_of!(InputAssemblyAndColorBlendState, attachments) + index * size, size)
}

fn stencil_face_range(front: bool) -> (usize, usize) {
    let field = if front {
        offset_of!(DepthStencilStateInfo, front)
    } else {
        offset_of!(DepthStencilStateInfo, back)
    };
    (DEPTH_STENCIL_OFFSET + field, size_of::<PackedStencilOpState>())
}

fn stencil_reference_range(front: bool) -> (usize, usize) {
    let field = if front {
        offset_of!(DepthStencilStateInfo, front_stencil_reference)
    } else {
        offset_of!(DepthStencilStateInfo, back_stencil_reference)
    };
    (DEPTH_STENCIL_OFFSET + field, size_of::<u8>())
}

impl GraphicsPipelineDesc {
    /// All-zero canonical state; use `init_defaults` for the default pipeline state
    pub fn new() -> Self {
        Self::default()
    }

    /// Default fixed-function state of a freshly created context
    pub fn init_defaults(&mut self) {
        *self = Self::default();

        let raster = &mut self.rasterization_and_multisample;
        set_bits(&mut raster.bits, POLYGON_MODE_SHIFT, NIBBLE_BITS, PolygonMode::Fill.to_raw().into());
        set_bits(&mut raster.bits, CULL_MODE_SHIFT, NIBBLE_BITS, CullMode::None.to_raw().into());
        set_bits(&mut raster.bits, FRONT_FACE_SHIFT, NIBBLE_BITS, FrontFace::CounterClockwise.to_raw().into());
        set_bits(&mut raster.bits, SAMPLES_SHIFT, SAMPLES_BITS, 1);
        raster.min_sample_shading = 1.0;
        raster.sample_mask = [u32::MAX; MAX_SAMPLE_MASK_WORDS];
        raster.line_width = 1.0;

        let depth_stencil = &mut self.depth_stencil;
        set_bits_u8(&mut depth_stencil.depth_compare_op_and_surface_rotation, DEPTH_COMPARE_SHIFT, NIBBLE_BITS, CompareOp::Less.to_raw().into());
        depth_stencil.max_depth_bounds = 1.0;
        for face in [&mut depth_stencil.front, &mut depth_stencil.back] {
            face.set_ops(StencilOp::Keep, StencilOp::Keep, StencilOp::Keep);
            face.set_compare_op(CompareOp::Always);
            face.compare_mask = u8::MAX;
            face.write_mask = u8::MAX;
        }

        let blend = &mut self.input_assembly_and_color_blend;
        blend.color_write_mask_bits = [0xFF; MAX_DRAW_BUFFERS / 2];
        for attachment in blend.attachments.iter_mut() {
            attachment.set_factors(BlendFactor::One, BlendFactor::Zero, BlendFactor::One, BlendFactor::Zero);
            attachment.set_ops(BlendOp::Add, BlendOp::Add);
        }
        set_bits_u8(&mut blend.logic, LOGIC_OP_SHIFT, LOGIC_OP_BITS, LogicOp::Copy.to_raw().into());
        set_bits_u16(&mut blend.primitive, TOPOLOGY_SHIFT, TOPOLOGY_BITS, PrimitiveTopology::TriangleList.to_raw().into());
        set_bits_u16(&mut blend.primitive, PATCH_VERTICES_SHIFT, PATCH_VERTICES_BITS, 3);

        self.viewport.max_depth = 1.0;
        self.drawable_size = PackedExtent { width: 1, height: 1 };
    }

    /// Exact transition bits of the words where `self` and `other` differ
    pub fn diff(&self, other: &GraphicsPipelineDesc) -> GraphicsPipelineTransitionBits {
        diff_words(self, other)
    }

    // ===== VERTEX INPUT =====

    pub fn vertex_attrib(&self, attrib_index: usize) -> &PackedAttribDesc {
        &self.vertex_input_attribs.attribs[attrib_index]
    }

    /// `stride` must fit 16 bits and `relative_offset` 15 bits; divisors above 255 saturate
    #[allow(clippy::too_many_arguments)]
    pub fn update_vertex_input(
        &mut self,
        transition: &mut GraphicsPipelineTransitionBits,
        attrib_index: usize,
        stride: u32,
        divisor: u32,
        format: FormatId,
        compressed: bool,
        relative_offset: u32,
    ) {
        debug_assert!(attrib_index < MAX_VERTEX_ATTRIBS);
        debug_assert!(stride <= u32::from(u16::MAX), "stride {} exceeds 16 bits", stride);

        let attrib = &mut self.vertex_input_attribs.attribs[attrib_index];
        attrib.stride = stride as u16;
        attrib.divisor = divisor.min(u32::from(u8::MAX)) as u8;
        attrib.format = format.to_raw();
        set_bits_u16(&mut attrib.offset_and_compressed, 0, ATTRIBUTE_OFFSET_MAX_BITS, relative_offset);
        set_bits_u16(&mut attrib.offset_and_compressed, ATTRIBUTE_OFFSET_MAX_BITS, 1, u32::from(compressed));

        let size = size_of::<PackedAttribDesc>();
        transition.set_range(VERTEX_INPUT_OFFSET + attrib_index * size, size);
    }

    // ===== INPUT ASSEMBLY =====

    pub fn topology(&self) -> PrimitiveTopology {
        PrimitiveTopology::from_raw_or_default(get_bits_u16(self.input_assembly_and_color_blend.primitive, TOPOLOGY_SHIFT, TOPOLOGY_BITS))
    }

    pub fn update_topology(&mut self, transition: &mut GraphicsPipelineTransitionBits, topology: PrimitiveTopology) {
        set_bits_u16(&mut self.input_assembly_and_color_blend.primitive, TOPOLOGY_SHIFT, TOPOLOGY_BITS, topology.to_raw().into());
        mark(transition, PRIMITIVE_RANGE);
    }

    pub fn primitive_restart_enabled(&self) -> bool {
        get_bits_u16(self.input_assembly_and_color_blend.primitive, PRIMITIVE_RESTART_BIT, 1) != 0
    }

    pub fn update_primitive_restart_enabled(&mut self, transition: &mut GraphicsPipelineTransitionBits, enabled: bool) {
        set_bits_u16(&mut self.input_assembly_and_color_blend.primitive, PRIMITIVE_RESTART_BIT, 1, u32::from(enabled));
        mark(transition, PRIMITIVE_RANGE);
    }

    pub fn patch_vertices(&self) -> u32 {
        get_bits_u16(self.input_assembly_and_color_blend.primitive, PATCH_VERTICES_SHIFT, PATCH_VERTICES_BITS)
    }

    /// Control points per patch (at most 63)
    pub fn update_patch_vertices(&mut self, transition: &mut GraphicsPipelineTransitionBits, count: u32) {
        set_bits_u16(&mut self.input_assembly_and_color_blend.primitive, PATCH_VERTICES_SHIFT, PATCH_VERTICES_BITS, count);
        mark(transition, PRIMITIVE_RANGE);
    }

    // ===== RASTERIZATION =====

    fn raster_bits(&self, shift: u32, width: u32) -> u32 {
        get_bits(self.rasterization_and_multisample.bits, shift, width)
    }

    fn set_raster_bits(&mut self, shift: u32, width: u32, value: u32) {
        set_bits(&mut self.rasterization_and_multisample.bits, shift, width, value);
    }

    pub fn cull_mode(&self) -> CullMode {
        CullMode::from_raw_or_default(self.raster_bits(CULL_MODE_SHIFT, NIBBLE_BITS))
    }

    pub fn set_cull_mode(&mut self, cull_mode: CullMode) {
        self.set_raster_bits(CULL_MODE_SHIFT, NIBBLE_BITS, cull_mode.to_raw().into());
    }

    pub fn update_cull_mode(&mut self, transition: &mut GraphicsPipelineTransitionBits, raster: &RasterizerState) {
        self.set_cull_mode(raster.effective_cull_mode());
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn front_face(&self) -> FrontFace {
        FrontFace::from_raw_or_default(self.raster_bits(FRONT_FACE_SHIFT, NIBBLE_BITS))
    }

    /// `invert_front_face` flips the winding when rendering upside down
    pub fn update_front_face(&mut self, transition: &mut GraphicsPipelineTransitionBits, raster: &RasterizerState, invert_front_face: bool) {
        let front_face = if invert_front_face { raster.front_face.inverted() } else { raster.front_face };
        self.set_raster_bits(FRONT_FACE_SHIFT, NIBBLE_BITS, front_face.to_raw().into());
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        PolygonMode::from_raw_or_default(self.raster_bits(POLYGON_MODE_SHIFT, NIBBLE_BITS))
    }

    pub fn update_polygon_mode(&mut self, transition: &mut GraphicsPipelineTransitionBits, mode: PolygonMode) {
        self.set_raster_bits(POLYGON_MODE_SHIFT, NIBBLE_BITS, mode.to_raw().into());
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn line_width(&self) -> f32 {
        self.rasterization_and_multisample.line_width
    }

    pub fn update_line_width(&mut self, transition: &mut GraphicsPipelineTransitionBits, line_width: f32) {
        self.rasterization_and_multisample.line_width = line_width;
        transition.set_range(RASTER_OFFSET + offset_of!(RasterizationAndMultisampleState, line_width), size_of::<f32>());
    }

    pub fn rasterizer_discard_enabled(&self) -> bool {
        self.raster_bits(RASTERIZER_DISCARD_BIT, 1) != 0
    }

    pub fn update_rasterizer_discard_enabled(&mut self, transition: &mut GraphicsPipelineTransitionBits, enabled: bool) {
        self.set_raster_bits(RASTERIZER_DISCARD_BIT, 1, u32::from(enabled));
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn depth_clamp_enabled(&self) -> bool {
        self.raster_bits(DEPTH_CLAMP_BIT, 1) != 0
    }

    pub fn set_depth_clamp_enabled(&mut self, enabled: bool) {
        self.set_raster_bits(DEPTH_CLAMP_BIT, 1, u32::from(enabled));
    }

    // ===== MULTISAMPLE =====

    pub fn rasterization_samples(&self) -> u32 {
        self.raster_bits(SAMPLES_SHIFT, SAMPLES_BITS)
    }

    pub fn set_rasterization_samples(&mut self, samples: u32) {
        debug_assert!(samples.is_power_of_two());
        self.set_raster_bits(SAMPLES_SHIFT, SAMPLES_BITS, samples);
    }

    pub fn update_rasterization_samples(&mut self, transition: &mut GraphicsPipelineTransitionBits, samples: u32) {
        self.set_rasterization_samples(samples);
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn alpha_to_coverage_enabled(&self) -> bool {
        self.raster_bits(ALPHA_TO_COVERAGE_BIT, 1) != 0
    }

    pub fn update_alpha_to_coverage_enable(&mut self, transition: &mut GraphicsPipelineTransitionBits, enable: bool) {
        self.set_raster_bits(ALPHA_TO_COVERAGE_BIT, 1, u32::from(enable));
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn alpha_to_one_enabled(&self) -> bool {
        self.raster_bits(ALPHA_TO_ONE_BIT, 1) != 0
    }

    pub fn update_alpha_to_one_enable(&mut self, transition: &mut GraphicsPipelineTransitionBits, enable: bool) {
        self.set_raster_bits(ALPHA_TO_ONE_BIT, 1, u32::from(enable));
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn sample_mask(&self, mask_number: usize) -> u32 {
        self.rasterization_and_multisample.sample_mask[mask_number]
    }

    pub fn update_sample_mask(&mut self, transition: &mut GraphicsPipelineTransitionBits, mask_number: usize, mask: u32) {
        debug_assert!(mask_number < MAX_SAMPLE_MASK_WORDS);
        self.rasterization_and_multisample.sample_mask[mask_number] = mask;
        transition.set_range(
            RASTER_OFFSET + offset_of!(RasterizationAndMultisampleState, sample_mask) + mask_number * size_of::<u32>(),
            size_of::<u32>(),
        );
    }

    pub fn sample_shading_enabled(&self) -> bool {
        self.raster_bits(SAMPLE_SHADING_BIT, 1) != 0
    }

    pub fn min_sample_shading(&self) -> f32 {
        self.rasterization_and_multisample.min_sample_shading
    }

    /// Disabled sample shading stores a minimum of 1.0
    pub fn update_sample_shading(&mut self, transition: &mut GraphicsPipelineTransitionBits, enable: bool, value: f32) {
        self.set_raster_bits(SAMPLE_SHADING_BIT, 1, u32::from(enable));
        self.rasterization_and_multisample.min_sample_shading = if enable { value } else { 1.0 };
        mark(transition, RASTER_BITS_RANGE);
        transition.set_range(RASTER_OFFSET + offset_of!(RasterizationAndMultisampleState, min_sample_shading), size_of::<f32>());
    }

    // ===== RENDER PASS =====

    pub fn render_pass_desc(&self) -> &RenderPassDesc {
        &self.render_pass_desc
    }

    pub fn set_render_pass_desc(&mut self, render_pass_desc: &RenderPassDesc) {
        self.render_pass_desc = *render_pass_desc;
    }

    pub fn update_render_pass_desc(&mut self, transition: &mut GraphicsPipelineTransitionBits, render_pass_desc: &RenderPassDesc) {
        self.set_render_pass_desc(render_pass_desc);
        transition.set_range(RENDER_PASS_OFFSET, size_of::<RenderPassDesc>());
    }

    // ===== COLOR BLEND =====

    pub fn blend_enable_mask(&self) -> DrawBufferMask {
        DrawBufferMask::from_bits_retain(self.input_assembly_and_color_blend.blend_enable_mask)
    }

    pub fn update_blend_enabled(&mut self, transition: &mut GraphicsPipelineTransitionBits, blend_enabled_mask: DrawBufferMask) {
        self.input_assembly_and_color_blend.blend_enable_mask = blend_enabled_mask.bits();
        transition.set_range(BLEND_OFFSET + offset_of!(InputAssemblyAndColorBlendState, blend_enable_mask), size_of::<u8>());
    }

    pub fn blend_constants(&self) -> [f32; 4] {
        self.input_assembly_and_color_blend.blend_constants
    }

    pub fn update_blend_color(&mut self, transition: &mut GraphicsPipelineTransitionBits, color: Vec4) {
        self.input_assembly_and_color_blend.blend_constants = color.to_array();
        transition.set_range(BLEND_OFFSET + offset_of!(InputAssemblyAndColorBlendState, blend_constants), size_of::<[f32; 4]>());
    }

    pub fn blend_attachment(&self, color_index_gl: usize) -> PackedColorBlendAttachmentState {
        self.input_assembly_and_color_blend.attachments[color_index_gl]
    }

    pub fn update_blend_funcs(&mut self, transition: &mut GraphicsPipelineTransitionBits, blend_state: &BlendStateExt) {
        for (index, state) in blend_state.attachments.iter().enumerate() {
            self.input_assembly_and_color_blend.attachments[index].set_factors(
                state.src_color,
                state.dst_color,
                state.src_alpha,
                state.dst_alpha,
            );
            mark(transition, blend_attachment_range(index));
        }
    }

    pub fn update_blend_equations(&mut self, transition: &mut GraphicsPipelineTransitionBits, blend_state: &BlendStateExt) {
        for (index, state) in blend_state.attachments.iter().enumerate() {
            self.input_assembly_and_color_blend.attachments[index].set_ops(state.color_op, state.alpha_op);
            mark(transition, blend_attachment_range(index));
        }
    }

    pub fn color_write_mask(&self, color_index_gl: usize) -> ColorComponentFlags {
        let byte = self.input_assembly_and_color_blend.color_write_mask_bits[color_index_gl / 2];
        let bits = get_bits_u8(byte, (color_index_gl as u32 % 2) * 4, 4);
        ColorComponentFlags::from_bits_truncate(bits as u8)
    }

    pub fn set_single_color_write_mask(&mut self, color_index_gl: usize, mask: ColorComponentFlags) {
        debug_assert!(color_index_gl < MAX_DRAW_BUFFERS);
        let byte = &mut self.input_assembly_and_color_blend.color_write_mask_bits[color_index_gl / 2];
        set_bits_u8(byte, (color_index_gl as u32 % 2) * 4, 4, mask.bits().into());
    }

    /// Disabled draw buffers get an empty mask; buffers in `alpha_mask` never write alpha
    /// (their format has no alpha channel that is visible to the application)
    pub fn set_color_write_masks(&mut self, blend_state: &BlendStateExt, alpha_mask: DrawBufferMask, enabled_draw_buffers: DrawBufferMask) {
        for (index, state) in blend_state.attachments.iter().enumerate() {
            let mut mask = if enabled_draw_buffers.test(index) {
                state.color_write_mask
            } else {
                ColorComponentFlags::empty()
            };
            if alpha_mask.test(index) {
                mask.remove(ColorComponentFlags::A);
            }
            self.set_single_color_write_mask(index, mask);
        }
    }

    pub fn update_color_write_masks(
        &mut self,
        transition: &mut GraphicsPipelineTransitionBits,
        blend_state: &BlendStateExt,
        alpha_mask: DrawBufferMask,
        enabled_draw_buffers: DrawBufferMask,
    ) {
        self.set_color_write_masks(blend_state, alpha_mask, enabled_draw_buffers);
        transition.set_range(
            BLEND_OFFSET + offset_of!(InputAssemblyAndColorBlendState, color_write_mask_bits),
            size_of::<[u8; MAX_DRAW_BUFFERS / 2]>(),
        );
    }

    pub fn logic_op_enabled(&self) -> bool {
        get_bits_u8(self.input_assembly_and_color_blend.logic, LOGIC_OP_ENABLE_BIT, 1) != 0
    }

    pub fn logic_op(&self) -> LogicOp {
        LogicOp::from_raw_or_default(get_bits_u8(self.input_assembly_and_color_blend.logic, LOGIC_OP_SHIFT, LOGIC_OP_BITS))
    }

    pub fn update_logic_op(&mut self, transition: &mut GraphicsPipelineTransitionBits, enabled: bool, op: LogicOp) {
        let logic = &mut self.input_assembly_and_color_blend.logic;
        set_bits_u8(logic, LOGIC_OP_ENABLE_BIT, 1, u32::from(enabled));
        set_bits_u8(logic, LOGIC_OP_SHIFT, LOGIC_OP_BITS, op.to_raw().into());
        transition.set_range(BLEND_OFFSET + offset_of!(InputAssemblyAndColorBlendState, logic), size_of::<u8>());
    }

    // ===== DEPTH =====

    fn enable_bit(&self, shift: u32) -> bool {
        get_bits_u8(self.depth_stencil.enable, shift, 2) != 0
    }

    fn set_enable_bit(&mut self, shift: u32, enabled: bool) {
        set_bits_u8(&mut self.depth_stencil.enable, shift, 2, u32::from(enabled));
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.enable_bit(DEPTH_TEST_SHIFT)
    }

    pub fn set_depth_test_enabled(&mut self, enabled: bool) {
        self.set_enable_bit(DEPTH_TEST_SHIFT, enabled);
    }

    /// Depth test only applies when the draw framebuffer has a depth aspect
    pub fn update_depth_test_enabled(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState, framebuffer: &DrawFramebufferInfo) {
        self.set_depth_test_enabled(depth_stencil.depth_test && framebuffer.has_depth);
        mark(transition, DS_ENABLE_RANGE);
    }

    pub fn depth_write_enabled(&self) -> bool {
        self.enable_bit(DEPTH_WRITE_SHIFT)
    }

    pub fn set_depth_write_enabled(&mut self, enabled: bool) {
        self.set_enable_bit(DEPTH_WRITE_SHIFT, enabled);
    }

    pub fn update_depth_write_enabled(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState, framebuffer: &DrawFramebufferInfo) {
        self.set_depth_write_enabled(depth_stencil.depth_test && depth_stencil.depth_mask && framebuffer.has_depth);
        mark(transition, DS_ENABLE_RANGE);
    }

    pub fn depth_bounds_test_enabled(&self) -> bool {
        self.enable_bit(DEPTH_BOUNDS_TEST_SHIFT)
    }

    pub fn min_depth_bounds(&self) -> f32 {
        self.depth_stencil.min_depth_bounds
    }

    pub fn max_depth_bounds(&self) -> f32 {
        self.depth_stencil.max_depth_bounds
    }

    pub fn depth_compare_op(&self) -> CompareOp {
        CompareOp::from_raw_or_default(get_bits_u8(self.depth_stencil.depth_compare_op_and_surface_rotation, DEPTH_COMPARE_SHIFT, NIBBLE_BITS))
    }

    pub fn set_depth_func(&mut self, op: CompareOp) {
        set_bits_u8(&mut self.depth_stencil.depth_compare_op_and_surface_rotation, DEPTH_COMPARE_SHIFT, NIBBLE_BITS, op.to_raw().into());
    }

    pub fn update_depth_func(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState) {
        self.set_depth_func(depth_stencil.depth_func);
        mark(transition, DS_COMPARE_ROTATION_RANGE);
    }

    // ===== STENCIL =====

    pub fn stencil_test_enabled(&self) -> bool {
        self.enable_bit(STENCIL_TEST_SHIFT)
    }

    pub fn set_stencil_test_enabled(&mut self, enabled: bool) {
        self.set_enable_bit(STENCIL_TEST_SHIFT, enabled);
    }

    pub fn update_stencil_test_enabled(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState, framebuffer: &DrawFramebufferInfo) {
        self.set_stencil_test_enabled(depth_stencil.stencil_test && framebuffer.has_stencil);
        mark(transition, DS_ENABLE_RANGE);
    }

    pub fn stencil_front(&self) -> &PackedStencilOpState {
        &self.depth_stencil.front
    }

    pub fn stencil_back(&self) -> &PackedStencilOpState {
        &self.depth_stencil.back
    }

    pub fn stencil_front_reference(&self) -> u8 {
        self.depth_stencil.front_stencil_reference
    }

    pub fn stencil_back_reference(&self) -> u8 {
        self.depth_stencil.back_stencil_reference
    }

    pub fn set_stencil_front_funcs(&mut self, reference: u8, compare_op: CompareOp, compare_mask: u8) {
        self.depth_stencil.front_stencil_reference = reference;
        self.depth_stencil.front.set_compare_op(compare_op);
        self.depth_stencil.front.compare_mask = compare_mask;
    }

    pub fn set_stencil_back_funcs(&mut self, reference: u8, compare_op: CompareOp, compare_mask: u8) {
        self.depth_stencil.back_stencil_reference = reference;
        self.depth_stencil.back.set_compare_op(compare_op);
        self.depth_stencil.back.compare_mask = compare_mask;
    }

    pub fn set_stencil_front_ops(&mut self, fail_op: StencilOp, pass_op: StencilOp, depth_fail_op: StencilOp) {
        self.depth_stencil.front.set_ops(fail_op, pass_op, depth_fail_op);
    }

    pub fn set_stencil_back_ops(&mut self, fail_op: StencilOp, pass_op: StencilOp, depth_fail_op: StencilOp) {
        self.depth_stencil.back.set_ops(fail_op, pass_op, depth_fail_op);
    }

    pub fn set_stencil_front_write_mask(&mut self, mask: u8) {
        self.depth_stencil.front.write_mask = mask;
    }

    pub fn set_stencil_back_write_mask(&mut self, mask: u8) {
        self.depth_stencil.back.write_mask = mask;
    }

    /// References are clamped to the 8-bit stencil range
    pub fn update_stencil_front_funcs(&mut self, transition: &mut GraphicsPipelineTransitionBits, reference: i32, depth_stencil: &DepthStencilState) {
        let face = &depth_stencil.front;
        self.set_stencil_front_funcs(reference.clamp(0, 255) as u8, face.func, face.compare_mask);
        mark(transition, stencil_reference_range(true));
        mark(transition, stencil_face_range(true));
    }

    pub fn update_stencil_back_funcs(&mut self, transition: &mut GraphicsPipelineTransitionBits, reference: i32, depth_stencil: &DepthStencilState) {
        let face = &depth_stencil.back;
        self.set_stencil_back_funcs(reference.clamp(0, 255) as u8, face.func, face.compare_mask);
        mark(transition, stencil_reference_range(false));
        mark(transition, stencil_face_range(false));
    }

    pub fn update_stencil_front_ops(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState) {
        let face = &depth_stencil.front;
        self.set_stencil_front_ops(face.fail_op, face.pass_op, face.depth_fail_op);
        mark(transition, stencil_face_range(true));
    }

    pub fn update_stencil_back_ops(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState) {
        let face = &depth_stencil.back;
        self.set_stencil_back_ops(face.fail_op, face.pass_op, face.depth_fail_op);
        mark(transition, stencil_face_range(false));
    }

    /// A framebuffer without stencil gets a zero write mask
    pub fn update_stencil_front_write_mask(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState, framebuffer: &DrawFramebufferInfo) {
        let mask = if framebuffer.has_stencil { depth_stencil.front.write_mask } else { 0 };
        self.set_stencil_front_write_mask(mask);
        mark(transition, stencil_face_range(true));
    }

    pub fn update_stencil_back_write_mask(&mut self, transition: &mut GraphicsPipelineTransitionBits, depth_stencil: &DepthStencilState, framebuffer: &DrawFramebufferInfo) {
        let mask = if framebuffer.has_stencil { depth_stencil.back.write_mask } else { 0 };
        self.set_stencil_back_write_mask(mask);
        mark(transition, stencil_face_range(false));
    }

    // ===== DEPTH BIAS =====

    pub fn depth_bias_enabled(&self) -> bool {
        self.raster_bits(DEPTH_BIAS_BIT, 1) != 0
    }

    pub fn depth_bias_constant_factor(&self) -> f32 {
        self.rasterization_and_multisample.depth_bias_constant_factor
    }

    pub fn depth_bias_slope_factor(&self) -> f32 {
        self.rasterization_and_multisample.depth_bias_slope_factor
    }

    pub fn depth_bias_clamp(&self) -> f32 {
        self.rasterization_and_multisample.depth_bias_clamp
    }

    pub fn update_polygon_offset_fill_enabled(&mut self, transition: &mut GraphicsPipelineTransitionBits, enabled: bool) {
        self.set_raster_bits(DEPTH_BIAS_BIT, 1, u32::from(enabled));
        mark(transition, RASTER_BITS_RANGE);
    }

    pub fn update_polygon_offset(&mut self, transition: &mut GraphicsPipelineTransitionBits, raster: &RasterizerState) {
        let state = &mut self.rasterization_and_multisample;
        state.depth_bias_slope_factor = raster.polygon_offset_factor;
        state.depth_bias_constant_factor = raster.polygon_offset_units;
        transition.set_range(RASTER_OFFSET + offset_of!(RasterizationAndMultisampleState, depth_bias_constant_factor), size_of::<f32>());
        transition.set_range(RASTER_OFFSET + offset_of!(RasterizationAndMultisampleState, depth_bias_slope_factor), size_of::<f32>());
    }

    // ===== VIEWPORT / SCISSOR =====

    pub fn viewport(&self) -> &PackedViewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: PackedViewport) {
        self.viewport = viewport;
    }

    pub fn update_viewport(&mut self, transition: &mut GraphicsPipelineTransitionBits, viewport: PackedViewport) {
        self.set_viewport(viewport);
        transition.set_range(VIEWPORT_OFFSET, size_of::<PackedViewport>());
    }

    pub fn update_depth_range(&mut self, transition: &mut GraphicsPipelineTransitionBits, near_plane: f32, far_plane: f32) {
        self.viewport.min_depth = near_plane;
        self.viewport.max_depth = far_plane;
        transition.set_range(VIEWPORT_OFFSET + offset_of!(PackedViewport, min_depth), size_of::<f32>());
        transition.set_range(VIEWPORT_OFFSET + offset_of!(PackedViewport, max_depth), size_of::<f32>());
    }

    pub fn scissor(&self) -> &PackedScissor {
        &self.scissor
    }

    /// Leave the scissor out of the pipeline; it is set as dynamic state instead
    pub fn set_dynamic_scissor(&mut self) {
        self.scissor = PackedScissor { x: DYNAMIC_SCISSOR_SENTINEL, y: 0, width: 0, height: 0 };
    }

    pub fn set_scissor(&mut self, scissor: PackedScissor) {
        self.scissor = scissor;
    }

    pub fn update_scissor(&mut self, transition: &mut GraphicsPipelineTransitionBits, scissor: PackedScissor) {
        self.set_scissor(scissor);
        transition.set_range(SCISSOR_OFFSET, size_of::<PackedScissor>());
    }

    // ===== SUBPASS =====

    pub fn subpass(&self) -> u32 {
        self.raster_bits(SUBPASS_SHIFT, SUBPASS_BITS)
    }

    pub fn set_subpass(&mut self, subpass: u32) {
        self.set_raster_bits(SUBPASS_SHIFT, SUBPASS_BITS, subpass);
    }

    fn update_subpass(&mut self, transition: &mut GraphicsPipelineTransitionBits, subpass: u32) {
        if self.subpass() != subpass {
            self.set_subpass(subpass);
            mark(transition, RASTER_BITS_RANGE);
        }
    }

    pub fn reset_subpass(&mut self, transition: &mut GraphicsPipelineTransitionBits) {
        self.update_subpass(transition, 0);
    }

    pub fn next_subpass(&mut self, transition: &mut GraphicsPipelineTransitionBits) {
        let next = self.subpass() + 1;
        self.update_subpass(transition, next);
    }

    // ===== SURFACE =====

    pub fn surface_rotation(&self) -> SurfaceRotation {
        SurfaceRotation::from_raw_or_default(get_bits_u8(
            self.depth_stencil.depth_compare_op_and_surface_rotation,
            SURFACE_ROTATION_SHIFT,
            SURFACE_ROTATION_BITS,
        ))
    }

    pub fn update_surface_rotation(&mut self, transition: &mut GraphicsPipelineTransitionBits, rotation: SurfaceRotation) {
        set_bits_u8(
            &mut self.depth_stencil.depth_compare_op_and_surface_rotation,
            SURFACE_ROTATION_SHIFT,
            SURFACE_ROTATION_BITS,
            rotation.to_raw().into(),
        );
        mark(transition, DS_COMPARE_ROTATION_RANGE);
    }

    pub fn drawable_size(&self) -> PackedExtent {
        self.drawable_size
    }

    pub fn update_drawable_size(&mut self, transition: &mut GraphicsPipelineTransitionBits, width: u32, height: u32) {
        debug_assert!(width <= u32::from(u16::MAX) && height <= u32::from(u16::MAX));
        self.drawable_size = PackedExtent { width: width as u16, height: height as u16 };
        transition.set_range(DRAWABLE_SIZE_OFFSET, size_of::<PackedExtent>());
    }
}

#[cfg(test)]
#[path = "graphics_pipeline_desc_tests.rs"]
mod tests;
