//! Crate-internal macros for packed enums and packed descriptors

/// Declare a `#[repr(u8)]` enum whose discriminants are the values stored in packed
/// descriptor bitfields, with `to_raw` / `from_raw` conversions.
///
/// Exactly one variant must carry `#[default]`; `UnpackEnum::from_raw_or_default` falls
/// back to it for bit patterns that no variant produces.
macro_rules! packed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(u8)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value stored in packed descriptors
            #[inline]
            pub const fn to_raw(self) -> u8 {
                self as u8
            }

            pub const fn from_raw(raw: u8) -> Option<Self> {
                match raw {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl crate::descriptor::packing::UnpackEnum for $name {
            const NAME: &'static str = stringify!($name);

            #[inline]
            fn try_from_raw(raw: u8) -> Option<Self> {
                Self::from_raw(raw)
            }
        }
    };
}

/// Implement byte-image equality, hashing and a zeroed `Default` for a `bytemuck::Pod`
/// descriptor.
macro_rules! impl_packed_descriptor {
    ($($name:ty),+ $(,)?) => {
        $(
            impl PartialEq for $name {
                #[inline]
                fn eq(&self, other: &Self) -> bool {
                    bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
                }
            }

            impl Eq for $name {}

            impl std::hash::Hash for $name {
                #[inline]
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    state.write(bytemuck::bytes_of(self));
                }
            }

            impl Default for $name {
                #[inline]
                fn default() -> Self {
                    bytemuck::Zeroable::zeroed()
                }
            }

            impl crate::descriptor::packing::PackedDescriptor for $name {
                #[inline]
                fn byte_image(&self) -> &[u8] {
                    bytemuck::bytes_of(self)
                }
            }
        )+
    };
}
