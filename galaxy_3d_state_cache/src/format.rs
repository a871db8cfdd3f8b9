//! Format identifiers stored in packed descriptors
//!
//! A `FormatId` occupies one byte in render pass and vertex input descriptors.
//! Depth/stencil formats are kept in `1..=7` so a depth/stencil format fits in 3 bits,
//! which lets `RenderPassDesc` use the remaining bits of that byte as flags.

packed_enum! {
    /// Packed format identifier (`NONE` marks a disabled slot)
    #[allow(non_camel_case_types)]
    pub enum FormatId {
        #[default]
        NONE = 0,

        // Depth/stencil formats (must stay within 1..=7)
        D16_UNORM = 1,
        D24_UNORM_S8_UINT = 2,
        D24_UNORM_X8_UINT = 3,
        D32_FLOAT = 4,
        D32_FLOAT_S8X24_UINT = 5,
        S8_UINT = 6,

        // Color formats
        R8_UNORM = 8,
        R8G8_UNORM = 9,
        R8G8B8_UNORM = 10,
        R8G8B8A8_UNORM = 11,
        R8G8B8A8_SRGB = 12,
        B8G8R8A8_UNORM = 13,
        B8G8R8A8_SRGB = 14,
        R5G6B5_UNORM = 15,
        R10G10B10A2_UNORM = 16,
        R11G11B10_FLOAT = 17,
        R16_FLOAT = 18,
        R16G16_FLOAT = 19,
        R16G16B16A16_FLOAT = 20,
        R32_FLOAT = 21,
        R32G32_FLOAT = 22,
        R32G32B32_FLOAT = 23,
        R32G32B32A32_FLOAT = 24,
        R8_UINT = 25,
        R16_UINT = 26,
        R32_UINT = 27,
        R32G32B32A32_UINT = 28,
        R8_SINT = 29,
        R32_SINT = 30,
        R32G32B32A32_SINT = 31,
    }
}

/// Largest value a depth/stencil `FormatId` may take
pub const MAX_DEPTH_STENCIL_FORMAT_ID: u8 = 7;

impl FormatId {
    /// Whether this is a depth and/or stencil format
    pub const fn is_depth_or_stencil(self) -> bool {
        let raw = self as u8;
        raw >= 1 && raw <= MAX_DEPTH_STENCIL_FORMAT_ID
    }

    pub const fn has_depth(self) -> bool {
        matches!(
            self,
            FormatId::D16_UNORM
                | FormatId::D24_UNORM_S8_UINT
                | FormatId::D24_UNORM_X8_UINT
                | FormatId::D32_FLOAT
                | FormatId::D32_FLOAT_S8X24_UINT
        )
    }

    pub const fn has_stencil(self) -> bool {
        matches!(
            self,
            FormatId::D24_UNORM_S8_UINT | FormatId::D32_FLOAT_S8X24_UINT | FormatId::S8_UINT
        )
    }

    pub const fn is_srgb(self) -> bool {
        matches!(self, FormatId::R8G8B8A8_SRGB | FormatId::B8G8R8A8_SRGB)
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
