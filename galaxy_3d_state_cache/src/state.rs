/// Fixed-function enums and the high-level state that drives descriptor mutators
///
/// Enum discriminants equal the values the Vulkan API uses for the same enumerant, so
/// packed descriptors store them directly and the backend converts with `from_raw`.

use bitflags::bitflags;
use glam::Vec4;

use crate::descriptor::MAX_DRAW_BUFFERS;

// ===== INPUT ASSEMBLY ENUMS =====

packed_enum! {
    /// Primitive topology
    pub enum PrimitiveTopology {
        PointList = 0,
        LineList = 1,
        LineStrip = 2,
        #[default]
        TriangleList = 3,
        TriangleStrip = 4,
        TriangleFan = 5,
        LineListWithAdjacency = 6,
        LineStripWithAdjacency = 7,
        TriangleListWithAdjacency = 8,
        TriangleStripWithAdjacency = 9,
        /// Tessellation patches
        PatchList = 10,
    }
}

// ===== RASTERIZATION ENUMS =====

packed_enum! {
    /// Face culling mode
    pub enum CullMode {
        /// No culling
        #[default]
        None = 0,
        /// Cull front faces
        Front = 1,
        /// Cull back faces
        Back = 2,
        /// Cull everything (points and lines still draw)
        FrontAndBack = 3,
    }
}

packed_enum! {
    /// Front face winding order
    pub enum FrontFace {
        /// Counter-clockwise vertices define front face
        #[default]
        CounterClockwise = 0,
        /// Clockwise vertices define front face
        Clockwise = 1,
    }
}

impl FrontFace {
    /// The opposite winding (used when rendering upside down)
    pub fn inverted(self) -> Self {
        match self {
            FrontFace::CounterClockwise => FrontFace::Clockwise,
            FrontFace::Clockwise => FrontFace::CounterClockwise,
        }
    }
}

packed_enum! {
    /// Polygon rendering mode
    pub enum PolygonMode {
        /// Fill polygons
        #[default]
        Fill = 0,
        /// Draw edges only (wireframe)
        Line = 1,
        /// Draw vertices only
        Point = 2,
    }
}

// ===== DEPTH/STENCIL ENUMS =====

packed_enum! {
    /// Comparison operator for depth, stencil and sampler compare
    pub enum CompareOp {
        /// Never pass
        Never = 0,
        /// Pass if value < reference
        Less = 1,
        /// Pass if value == reference
        Equal = 2,
        /// Pass if value <= reference
        LessOrEqual = 3,
        /// Pass if value > reference
        Greater = 4,
        /// Pass if value != reference
        NotEqual = 5,
        /// Pass if value >= reference
        GreaterOrEqual = 6,
        /// Always pass
        #[default]
        Always = 7,
    }
}

packed_enum! {
    /// Stencil operation
    pub enum StencilOp {
        /// Keep current value
        #[default]
        Keep = 0,
        /// Set to zero
        Zero = 1,
        /// Replace with reference value
        Replace = 2,
        /// Increment and clamp to max
        IncrementAndClamp = 3,
        /// Decrement and clamp to zero
        DecrementAndClamp = 4,
        /// Bitwise invert
        Invert = 5,
        /// Increment and wrap around
        IncrementAndWrap = 6,
        /// Decrement and wrap around
        DecrementAndWrap = 7,
    }
}

// ===== COLOR BLEND ENUMS =====

packed_enum! {
    /// Blend factor for color blending equations
    pub enum BlendFactor {
        Zero = 0,
        #[default]
        One = 1,
        SrcColor = 2,
        OneMinusSrcColor = 3,
        DstColor = 4,
        OneMinusDstColor = 5,
        SrcAlpha = 6,
        OneMinusSrcAlpha = 7,
        DstAlpha = 8,
        OneMinusDstAlpha = 9,
        ConstantColor = 10,
        OneMinusConstantColor = 11,
        ConstantAlpha = 12,
        OneMinusConstantAlpha = 13,
        SrcAlphaSaturate = 14,
        Src1Color = 15,
        OneMinusSrc1Color = 16,
        Src1Alpha = 17,
        OneMinusSrc1Alpha = 18,
    }
}

packed_enum! {
    /// Blend operation
    pub enum BlendOp {
        /// result = src * srcFactor + dst * dstFactor
        #[default]
        Add = 0,
        /// result = src * srcFactor - dst * dstFactor
        Subtract = 1,
        /// result = dst * dstFactor - src * srcFactor
        ReverseSubtract = 2,
        /// result = min(src, dst)
        Min = 3,
        /// result = max(src, dst)
        Max = 4,
    }
}

packed_enum! {
    /// Framebuffer logic operation
    pub enum LogicOp {
        Clear = 0,
        And = 1,
        AndReverse = 2,
        #[default]
        Copy = 3,
        AndInverted = 4,
        NoOp = 5,
        Xor = 6,
        Or = 7,
        Nor = 8,
        Equivalent = 9,
        Invert = 10,
        OrReverse = 11,
        CopyInverted = 12,
        OrInverted = 13,
        Nand = 14,
        Set = 15,
    }
}

// ===== SAMPLER ENUMS =====

packed_enum! {
    /// Texel filter
    pub enum Filter {
        #[default]
        Nearest = 0,
        Linear = 1,
    }
}

packed_enum! {
    /// Mipmap filter
    pub enum MipmapMode {
        #[default]
        Nearest = 0,
        Linear = 1,
    }
}

packed_enum! {
    /// Texture coordinate wrapping
    pub enum AddressMode {
        #[default]
        Repeat = 0,
        MirroredRepeat = 1,
        ClampToEdge = 2,
        ClampToBorder = 3,
        MirrorClampToEdge = 4,
    }
}

// ===== DESCRIPTOR ENUMS =====

packed_enum! {
    /// Kind of resource bound at a descriptor set layout binding
    pub enum DescriptorType {
        Sampler = 0,
        #[default]
        CombinedImageSampler = 1,
        SampledImage = 2,
        StorageImage = 3,
        UniformTexelBuffer = 4,
        StorageTexelBuffer = 5,
        UniformBuffer = 6,
        StorageBuffer = 7,
        UniformBufferDynamic = 8,
        StorageBufferDynamic = 9,
        InputAttachment = 10,
    }
}

// ===== RENDER PASS ENUMS =====

packed_enum! {
    /// Image layout of a render pass attachment (4 bits when packed)
    pub enum ImageLayout {
        /// Contents are undefined (discarded)
        #[default]
        Undefined = 0,
        General = 1,
        /// Optimal for color attachment
        ColorAttachment = 2,
        /// Optimal for depth/stencil attachment
        DepthStencilAttachment = 3,
        /// Depth/stencil read-only
        DepthStencilReadOnly = 4,
        /// Optimal for shader read
        ShaderReadOnly = 5,
        /// Source of a transfer
        TransferSrc = 6,
        /// Destination of a transfer
        TransferDst = 7,
        /// Ready for presentation
        Present = 8,
        DepthReadOnlyStencilAttachment = 9,
        DepthAttachmentStencilReadOnly = 10,
    }
}

packed_enum! {
    /// Surface pre-rotation applied to rendering (3 bits when packed)
    pub enum SurfaceRotation {
        #[default]
        Identity = 0,
        Rotated90Degrees = 1,
        Rotated180Degrees = 2,
        Rotated270Degrees = 3,
        FlippedIdentity = 4,
        FlippedRotated90Degrees = 5,
        FlippedRotated180Degrees = 6,
        FlippedRotated270Degrees = 7,
    }
}

packed_enum! {
    /// sRGB write control of a framebuffer
    pub enum SrgbWriteControlMode {
        /// Writes to sRGB attachments are encoded
        #[default]
        Default = 0,
        /// sRGB attachments are written as linear
        Linear = 1,
    }
}

packed_enum! {
    /// Shader stage used to index push constant ranges
    pub enum ShaderType {
        #[default]
        Vertex = 0,
        TessControl = 1,
        TessEvaluation = 2,
        Geometry = 3,
        Fragment = 4,
        Compute = 5,
    }
}

impl ShaderType {
    pub const COUNT: usize = 6;

    pub fn stage_flags(self) -> ShaderStageFlags {
        match self {
            ShaderType::Vertex => ShaderStageFlags::VERTEX,
            ShaderType::TessControl => ShaderStageFlags::TESSELLATION_CONTROL,
            ShaderType::TessEvaluation => ShaderStageFlags::TESSELLATION_EVALUATION,
            ShaderType::Geometry => ShaderStageFlags::GEOMETRY,
            ShaderType::Fragment => ShaderStageFlags::FRAGMENT,
            ShaderType::Compute => ShaderStageFlags::COMPUTE,
        }
    }
}

packed_enum! {
    /// Descriptor set slot inside a pipeline layout
    pub enum DescriptorSetIndex {
        /// Driver uniforms and internal resources
        #[default]
        Internal = 0,
        /// Default uniforms and transform feedback buffers
        UniformsAndXfb = 1,
        /// Combined image samplers
        Texture = 2,
        /// Uniform/storage buffers, images, atomic counters
        ShaderResource = 3,
    }
}

bitflags! {
    /// Shader stages (values match VkShaderStageFlagBits, fits in 8 bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStageFlags: u8 {
        const VERTEX = 0x01;
        const TESSELLATION_CONTROL = 0x02;
        const TESSELLATION_EVALUATION = 0x04;
        const GEOMETRY = 0x08;
        const FRAGMENT = 0x10;
        const COMPUTE = 0x20;
        const ALL_GRAPHICS = 0x1F;
    }
}

bitflags! {
    /// Color channel write mask (values match VkColorComponentFlagBits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ColorComponentFlags: u8 {
        const R = 0x1;
        const G = 0x2;
        const B = 0x4;
        const A = 0x8;
        const RGBA = 0xF;
    }
}

bitflags! {
    /// One bit per GL draw buffer / color attachment index
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrawBufferMask: u8 {
        const _ = !0;
    }
}

impl DrawBufferMask {
    pub fn with(index: usize) -> Self {
        debug_assert!(index < MAX_DRAW_BUFFERS);
        DrawBufferMask::from_bits_retain(1 << index)
    }

    pub fn test(self, index: usize) -> bool {
        index < MAX_DRAW_BUFFERS && self.bits() & (1 << index) != 0
    }

    pub fn set_index(&mut self, index: usize, enabled: bool) {
        debug_assert!(index < MAX_DRAW_BUFFERS);
        if enabled {
            *self |= Self::with(index);
        } else {
            *self &= !Self::with(index);
        }
    }

    /// Set indices in increasing order
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..MAX_DRAW_BUFFERS).filter(move |&i| self.test(i))
    }
}

// ===== RASTERIZER STATE =====

/// Rasterizer state as set by the application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    /// Whether face culling is enabled
    pub cull_face: bool,
    /// Faces culled when `cull_face` is set
    pub cull_mode: CullMode,
    /// Front face winding order
    pub front_face: FrontFace,
    pub polygon_mode: PolygonMode,
    /// Depth bias (polygon offset) enabled for filled polygons
    pub polygon_offset_fill: bool,
    pub polygon_offset_factor: f32,
    pub polygon_offset_units: f32,
    pub rasterizer_discard: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_face: false,
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
            polygon_offset_fill: false,
            polygon_offset_factor: 0.0,
            polygon_offset_units: 0.0,
            rasterizer_discard: false,
        }
    }
}

impl RasterizerState {
    /// Cull mode actually applied by the pipeline
    pub fn effective_cull_mode(&self) -> CullMode {
        if self.cull_face { self.cull_mode } else { CullMode::None }
    }
}

// ===== DEPTH/STENCIL STATE =====

/// Stencil state of one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceState {
    /// Comparison operator
    pub func: CompareOp,
    /// Bits of stencil buffer read for compare
    pub compare_mask: u8,
    /// Bits of stencil buffer written
    pub write_mask: u8,
    /// Action on stencil test fail
    pub fail_op: StencilOp,
    /// Action on stencil pass + depth fail
    pub depth_fail_op: StencilOp,
    /// Action on stencil pass + depth pass
    pub pass_op: StencilOp,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            func: CompareOp::Always,
            compare_mask: 0xFF,
            write_mask: 0xFF,
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
        }
    }
}

/// Depth and stencil state as set by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_test: bool,
    /// Depth writes enabled
    pub depth_mask: bool,
    pub depth_func: CompareOp,
    pub stencil_test: bool,
    pub front: StencilFaceState,
    pub back: StencilFaceState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test: false,
            depth_mask: true,
            depth_func: CompareOp::Less,
            stencil_test: false,
            front: StencilFaceState::default(),
            back: StencilFaceState::default(),
        }
    }
}

/// Aspects present in the bound draw framebuffer
///
/// Depth/stencil mutators disable tests and writes for aspects the framebuffer lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawFramebufferInfo {
    pub has_depth: bool,
    pub has_stencil: bool,
}

// ===== BLEND STATE =====

/// Blend state of one draw buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendAttachmentState {
    pub blend_enable: bool,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub color_op: BlendOp,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub alpha_op: BlendOp,
    pub color_write_mask: ColorComponentFlags,
}

impl Default for BlendAttachmentState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color: BlendFactor::One,
            dst_color: BlendFactor::Zero,
            color_op: BlendOp::Add,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
            alpha_op: BlendOp::Add,
            color_write_mask: ColorComponentFlags::RGBA,
        }
    }
}

/// Blend state for every draw buffer plus the blend constant color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendStateExt {
    pub attachments: [BlendAttachmentState; MAX_DRAW_BUFFERS],
    pub blend_color: Vec4,
}

impl Default for BlendStateExt {
    fn default() -> Self {
        Self {
            attachments: [BlendAttachmentState::default(); MAX_DRAW_BUFFERS],
            blend_color: Vec4::ZERO,
        }
    }
}

impl BlendStateExt {
    pub fn blend_enabled_mask(&self) -> DrawBufferMask {
        let mut mask = DrawBufferMask::empty();
        for (index, attachment) in self.attachments.iter().enumerate() {
            mask.set_index(index, attachment.blend_enable);
        }
        mask
    }
}

// ===== SAMPLER STATE =====

/// Sampler state as set by the application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    pub mag_filter: Filter,
    pub min_filter: Filter,
    /// Mipmap filter; `None` for non-mipmapped minification
    pub mipmap_mode: Option<MipmapMode>,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    pub max_anisotropy: f32,
    /// Depth compare enabled (GL_COMPARE_REF_TO_TEXTURE)
    pub compare_mode: bool,
    pub compare_func: CompareOp,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            mag_filter: Filter::Linear,
            min_filter: Filter::Nearest,
            mipmap_mode: Some(MipmapMode::Linear),
            address_u: AddressMode::Repeat,
            address_v: AddressMode::Repeat,
            address_w: AddressMode::Repeat,
            min_lod: -1000.0,
            max_lod: 1000.0,
            lod_bias: 0.0,
            max_anisotropy: 1.0,
            compare_mode: false,
            compare_func: CompareOp::LessOrEqual,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
