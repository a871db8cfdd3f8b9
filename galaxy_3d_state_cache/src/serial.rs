//! Resource serials
//!
//! Descriptor-set and framebuffer keys identify resources by serial instead of by
//! content. A serial names one live resource (or view) until that resource is destroyed
//! or re-specified; serials are never reused, so a stale serial can never alias a
//! different resource. Value 0 is reserved as "invalid".

use bytemuck::{Pod, Zeroable};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::descriptor::packing::{get_bits, set_bits};

macro_rules! resource_serial {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Pod, Zeroable)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const INVALID: $name = $name(0);

            #[inline]
            pub const fn value(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

resource_serial!(
    /// Serial of an image view or buffer view
    ImageOrBufferViewSerial
);
resource_serial!(
    /// Serial of a buffer
    BufferSerial
);
resource_serial!(
    /// Serial of a sampler object
    SamplerSerial
);

/// Issues resource serials; one counter per serial kind, starting at 1
#[derive(Debug)]
pub struct ResourceSerialFactory {
    view_counter: AtomicU32,
    buffer_counter: AtomicU32,
    sampler_counter: AtomicU32,
}

impl Default for ResourceSerialFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSerialFactory {
    pub fn new() -> Self {
        Self {
            view_counter: AtomicU32::new(1),
            buffer_counter: AtomicU32::new(1),
            sampler_counter: AtomicU32::new(1),
        }
    }

    fn issue(counter: &AtomicU32) -> u32 {
        let serial = counter.fetch_add(1, Ordering::Relaxed);
        // Wrapping would hand out 0 and then alias live resources.
        assert_ne!(serial, u32::MAX, "resource serial space exhausted");
        serial
    }

    pub fn generate_image_or_buffer_view_serial(&self) -> ImageOrBufferViewSerial {
        ImageOrBufferViewSerial(Self::issue(&self.view_counter))
    }

    pub fn generate_buffer_serial(&self) -> BufferSerial {
        BufferSerial(Self::issue(&self.buffer_counter))
    }

    pub fn generate_sampler_serial(&self) -> SamplerSerial {
        SamplerSerial(Self::issue(&self.sampler_counter))
    }
}

// ===== QUEUE SERIALS =====

/// 64-bit serial of a queue submission (0 = never used)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Serial(u64);

impl Serial {
    pub const INVALID: Serial = Serial(0);

    pub const fn new(value: u64) -> Self {
        Serial(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn valid(self) -> bool {
        self.0 != 0
    }
}

/// Monotonic generator of queue serials
#[derive(Debug)]
pub struct SerialFactory {
    next: AtomicU64,
}

impl Default for SerialFactory {
    fn default() -> Self {
        Self { next: AtomicU64::new(1) }
    }
}

impl SerialFactory {
    pub fn generate(&self) -> Serial {
        Serial(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

// ===== SUBRESOURCE RANGES =====

/// Packed image subresource range (32 bits)
///
/// | bits  | field |
/// |-------|-------|
/// | 0-9   | base level (GL max 1000) |
/// | 10-15 | level count (max 63) |
/// | 16-28 | base layer |
/// | 29    | single layer |
/// | 30    | sRGB decode mode |
/// | 31    | sRGB override mode |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct ImageSubresourceRange(u32);

impl ImageSubresourceRange {
    pub const INVALID: ImageSubresourceRange = ImageSubresourceRange(0);

    pub fn new(level: u32, level_count: u32, layer: u32, single_layer: bool) -> Self {
        let mut range = ImageSubresourceRange(0);
        set_bits(&mut range.0, 0, 10, level);
        set_bits(&mut range.0, 10, 6, level_count);
        set_bits(&mut range.0, 16, 13, layer);
        set_bits(&mut range.0, 29, 1, u32::from(single_layer));
        range
    }

    pub fn with_srgb_modes(mut self, srgb_decode: bool, srgb_override: bool) -> Self {
        set_bits(&mut self.0, 30, 1, u32::from(srgb_decode));
        set_bits(&mut self.0, 31, 1, u32::from(srgb_override));
        self
    }

    pub fn level(self) -> u32 {
        get_bits(self.0, 0, 10)
    }

    pub fn level_count(self) -> u32 {
        get_bits(self.0, 10, 6)
    }

    pub fn layer(self) -> u32 {
        get_bits(self.0, 16, 13)
    }

    pub fn single_layer(self) -> bool {
        get_bits(self.0, 29, 1) != 0
    }

    pub fn srgb_decode(self) -> bool {
        get_bits(self.0, 30, 1) != 0
    }

    pub fn srgb_override(self) -> bool {
        get_bits(self.0, 31, 1) != 0
    }
}

/// A view serial together with the subresource range it covers (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(C)]
pub struct ImageOrBufferViewSubresourceSerial {
    pub view: ImageOrBufferViewSerial,
    pub subresource: ImageSubresourceRange,
}

impl ImageOrBufferViewSubresourceSerial {
    pub const INVALID: ImageOrBufferViewSubresourceSerial = ImageOrBufferViewSubresourceSerial {
        view: ImageOrBufferViewSerial::INVALID,
        subresource: ImageSubresourceRange::INVALID,
    };

    pub fn new(view: ImageOrBufferViewSerial, subresource: ImageSubresourceRange) -> Self {
        Self { view, subresource }
    }

    pub fn valid(&self) -> bool {
        self.view.valid()
    }
}

const _: () = assert!(std::mem::size_of::<ImageSubresourceRange>() == 4);
const _: () = assert!(std::mem::size_of::<ImageOrBufferViewSubresourceSerial>() == 8);

#[cfg(test)]
#[path = "serial_tests.rs"]
mod tests;
