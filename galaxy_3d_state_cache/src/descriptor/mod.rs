//! Packed descriptors: fixed-size, padding-free keys for the object caches

pub mod packing;
pub mod render_pass_desc;
pub mod attachment_ops;
pub mod graphics_pipeline_desc;
pub mod layout_desc;
pub mod sampler_desc;
pub mod resource_desc;

pub use packing::PackedDescriptor;
pub use render_pass_desc::RenderPassDesc;
pub use attachment_ops::{AttachmentOpsArray, LoadOp, PackedAttachmentIndex, PackedAttachmentOpsDesc, StoreOp};
pub use graphics_pipeline_desc::{
    GraphicsPipelineDesc, PackedAttribDesc, PackedColorBlendAttachmentState, PackedExtent,
    PackedScissor, PackedStencilOpState, PackedViewport, DYNAMIC_SCISSOR_SENTINEL,
};
pub use layout_desc::{
    DescriptorSetLayoutBinding, DescriptorSetLayoutDesc, PackedPushConstantRange, PipelineLayoutDesc,
};
pub use sampler_desc::SamplerDesc;
pub use resource_desc::{
    FramebufferDesc, ShaderBuffersDescriptorDesc, TexUnitSerials, TextureDescriptorDesc,
    UniformsAndXfbDescriptorDesc,
};

// ===== LIMITS =====

/// Color attachments / draw buffers
pub const MAX_DRAW_BUFFERS: usize = 8;
pub const MAX_VERTEX_ATTRIBS: usize = 16;
pub const MAX_SAMPLE_MASK_WORDS: usize = 2;
/// Colors plus depth/stencil
pub const MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS: usize = MAX_DRAW_BUFFERS + 1;
/// Non-resolve attachments plus their resolve attachments
pub const MAX_FRAMEBUFFER_ATTACHMENTS: usize = MAX_FRAMEBUFFER_NON_RESOLVE_ATTACHMENTS * 2;
/// Packed render pass attachments carrying load/store ops
pub const MAX_ATTACHMENT_OPS: usize = MAX_DRAW_BUFFERS + 2;
pub const MAX_ACTIVE_TEXTURES: usize = 64;
pub const MAX_DESCRIPTOR_SET_LAYOUT_BINDINGS: usize = 64;
pub const MAX_DESCRIPTOR_SET_LAYOUTS: usize = 4;
pub const MAX_TRANSFORM_FEEDBACK_BUFFERS: usize = 4;
/// Must stay below the 9-bit layer count field of `FramebufferDesc`
pub const MAX_FRAMEBUFFER_LAYERS: u32 = 510;
/// Vertex attribute relative offsets are stored in 15 bits
pub const ATTRIBUTE_OFFSET_MAX_BITS: u32 = 15;
