//! # Internal Macros
//!
//! Boilerplate reduction for the on-disk structs in this crate.
//!
//! ## be_accessors!
//!
//! Generates getter and setter methods for zerocopy struct fields that use
//! big-endian wrapper types (U16, U32). The MathPad file format stores every
//! multi-byte integer most-significant-byte first, so the wrapper types are
//! what make host-order access correct on any machine (and a no-op on
//! big-endian hosts).
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::big_endian::{U16, U32};
//!
//! #[repr(C)]
//! struct Header {
//!     version: U16,
//!     app_info_id: U32,
//! }
//!
//! impl Header {
//!     be_accessors! {
//!         version: u16,
//!         app_info_id: u32,
//!     }
//! }
//!
//! // Generates:
//! // pub fn version(&self) -> u16 { self.version.get() }
//! // pub fn set_version(&mut self, val: u16) { self.version = U16::new(val); }
//! // pub fn app_info_id(&self) -> u32 { self.app_info_id.get() }
//! // pub fn set_app_info_id(&mut self, val: u32) { self.app_info_id = U32::new(val); }
//! ```

/// Generates getter and setter methods for zerocopy big-endian fields.
#[macro_export]
macro_rules! be_accessors {
    (@impl $field:ident, u16) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u16 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u16) {
                self.$field = ::zerocopy::big_endian::U16::new(val);
            }
        }
    };
    (@impl $field:ident, u32) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u32 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u32) {
                self.$field = ::zerocopy::big_endian::U32::new(val);
            }
        }
    };
    ($($field:ident : $ty:tt),* $(,)?) => {
        $(
            $crate::be_accessors!(@impl $field, $ty);
        )*
    };
}
