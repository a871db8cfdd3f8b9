//! Packed sampler description

use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

use crate::config::SamplerFeatures;
use crate::descriptor::packing::{get_bits_u16, set_bits_u16, UnpackEnum};
use crate::state::{AddressMode, CompareOp, Filter, MipmapMode, SamplerState};

const MAG_FILTER_SHIFT: u32 = 0;
const MIN_FILTER_SHIFT: u32 = 1;
const MIPMAP_MODE_SHIFT: u32 = 2;
const ADDRESS_U_SHIFT: u32 = 3;
const ADDRESS_V_SHIFT: u32 = 6;
const ADDRESS_W_SHIFT: u32 = 9;
const ADDRESS_BITS: u32 = 3;
const COMPARE_ENABLED_SHIFT: u32 = 12;
const COMPARE_OP_SHIFT: u32 = 13;
const COMPARE_OP_BITS: u32 = 3;

/// LOD range that makes a non-mipmapped minification filter sample level 0 only
const NON_MIPMAPPED_MAX_LOD: f32 = 0.25;

/// Sampler cache key (32 bytes)
///
/// A nonzero `external_format` means the sampler needs a Y'CbCr conversion for that
/// hardware-specific format.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct SamplerDesc {
    mip_lod_bias: f32,
    max_anisotropy: f32,
    min_lod: f32,
    max_lod: f32,
    external_format: u64,
    /// mag:1 | min:1 | mip:1 | address u:3 | address v:3 | address w:3 | compare:1 | compare op:3
    packed: u16,
    reserved: [u16; 3],
}

impl_packed_descriptor!(SamplerDesc);

const _: () = assert!(size_of::<SamplerDesc>() == 32);

impl SamplerDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from application state and device features
    pub fn from_state(state: &SamplerState, features: &SamplerFeatures, stencil_mode: bool, external_format: u64) -> Self {
        let mut desc = Self::new();
        desc.update(state, features, stencil_mode, external_format);
        desc
    }

    pub fn update(&mut self, state: &SamplerState, features: &SamplerFeatures, stencil_mode: bool, external_format: u64) {
        self.mip_lod_bias = state.lod_bias;
        self.max_anisotropy = if features.sampler_anisotropy {
            state.max_anisotropy.min(features.max_sampler_anisotropy)
        } else {
            1.0
        };

        let (mut mag_filter, mut min_filter) = (state.mag_filter, state.min_filter);
        if features.force_nearest_filtering {
            mag_filter = Filter::Nearest;
            min_filter = Filter::Nearest;
        }
        let mut mipmap_mode = state.mipmap_mode.unwrap_or(MipmapMode::Nearest);
        if features.force_nearest_mip_filtering {
            mipmap_mode = MipmapMode::Nearest;
        }

        self.packed = 0;
        self.set_field(MAG_FILTER_SHIFT, 1, mag_filter.to_raw());
        self.set_field(MIN_FILTER_SHIFT, 1, min_filter.to_raw());
        self.set_field(MIPMAP_MODE_SHIFT, 1, mipmap_mode.to_raw());
        self.set_field(ADDRESS_U_SHIFT, ADDRESS_BITS, state.address_u.to_raw());
        self.set_field(ADDRESS_V_SHIFT, ADDRESS_BITS, state.address_v.to_raw());
        self.set_field(ADDRESS_W_SHIFT, ADDRESS_BITS, state.address_w.to_raw());
        // Stencil is sampled as an integer aspect, depth compare does not apply
        let compare_enabled = state.compare_mode && !stencil_mode;
        self.set_field(COMPARE_ENABLED_SHIFT, 1, u8::from(compare_enabled));
        self.set_field(COMPARE_OP_SHIFT, COMPARE_OP_BITS, state.compare_func.to_raw());

        if state.mipmap_mode.is_some() {
            self.min_lod = state.min_lod;
            self.max_lod = state.max_lod;
        } else {
            self.min_lod = 0.0;
            self.max_lod = NON_MIPMAPPED_MAX_LOD;
        }

        self.external_format = external_format;
        self.reserved = [0; 3];
    }

    fn field(&self, shift: u32, width: u32) -> u32 {
        get_bits_u16(self.packed, shift, width)
    }

    fn set_field(&mut self, shift: u32, width: u32, value: u8) {
        set_bits_u16(&mut self.packed, shift, width, value.into());
    }

    pub fn mag_filter(&self) -> Filter {
        Filter::from_raw_or_default(self.field(MAG_FILTER_SHIFT, 1))
    }

    pub fn min_filter(&self) -> Filter {
        Filter::from_raw_or_default(self.field(MIN_FILTER_SHIFT, 1))
    }

    pub fn mipmap_mode(&self) -> MipmapMode {
        MipmapMode::from_raw_or_default(self.field(MIPMAP_MODE_SHIFT, 1))
    }

    pub fn address_mode_u(&self) -> AddressMode {
        AddressMode::from_raw_or_default(self.field(ADDRESS_U_SHIFT, ADDRESS_BITS))
    }

    pub fn address_mode_v(&self) -> AddressMode {
        AddressMode::from_raw_or_default(self.field(ADDRESS_V_SHIFT, ADDRESS_BITS))
    }

    pub fn address_mode_w(&self) -> AddressMode {
        AddressMode::from_raw_or_default(self.field(ADDRESS_W_SHIFT, ADDRESS_BITS))
    }

    pub fn compare_enabled(&self) -> bool {
        self.field(COMPARE_ENABLED_SHIFT, 1) != 0
    }

    pub fn compare_op(&self) -> CompareOp {
        CompareOp::from_raw_or_default(self.field(COMPARE_OP_SHIFT, COMPARE_OP_BITS))
    }

    pub fn mip_lod_bias(&self) -> f32 {
        self.mip_lod_bias
    }

    pub fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    pub fn anisotropy_enabled(&self) -> bool {
        self.max_anisotropy > 1.0
    }

    pub fn min_lod(&self) -> f32 {
        self.min_lod
    }

    pub fn max_lod(&self) -> f32 {
        self.max_lod
    }

    pub fn external_format(&self) -> u64 {
        self.external_format
    }
}

#[cfg(test)]
#[path = "sampler_desc_tests.rs"]
mod tests;
