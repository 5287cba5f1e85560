//! # On-Disk Format
//!
//! This module defines the fixed binary layout of a MathPad database backup
//! file, as HotSync writes it to the desktop. Every multi-byte integer is
//! stored most-significant-byte first; the structs in [`headers`] use
//! `zerocopy::big_endian` field types so that byte-order conversion happens
//! exactly once at each field access and compiles to nothing on a big-endian
//! host.
//!
//! ## File Layout
//!
//! ```text
//! offset 0
//! +-----------------------------+
//! | DatabaseHeader (72 bytes)   |  name, flags, version, dates, offsets,
//! |                             |  type "Data", creator "MthP"
//! +-----------------------------+
//! | RecordListHeader (6 bytes)  |  next-list offset (0 = end), entry count
//! +-----------------------------+
//! | RecordEntry x N (8 each)    |  absolute record offset, attribute byte,
//! |                             |  3-byte unique id
//! +-----------------------------+
//! | CategoryBlock (310 bytes)   |  16 category labels + unique ids, plus
//! |                             |  MathPad's own settings blob
//! +-----------------------------+
//! | Record bodies               |  2-byte item header, then text bytes
//! | ...                         |  terminated by a single 0x00
//! +-----------------------------+
//! ```
//!
//! The record-list header may chain to further list blocks anywhere in the
//! file (next-list offset non-zero). Readers must follow the chain; the
//! writer in this crate always emits a single block with next-list 0.
//!
//! Block positions other than the first record list are not fixed: the
//! database header carries the absolute offset of the category block
//! (`app_info_id`), and each record entry carries the absolute offset of its
//! record body, so blocks can be laid out in any order.
//!
//! ## Module Organization
//!
//! - [`headers`]: zerocopy structs for each fixed-size region

pub mod headers;

pub use headers::{DatabaseHeader, ItemHeader, RecordEntry, RecordListHeader};

/// 4-byte database type tag; anything else is not a MathPad database.
pub const TYPE_TAG: &[u8; 4] = b"Data";
/// 4-byte application creator tag.
pub const CREATOR_TAG: &[u8; 4] = b"MthP";
/// The only on-disk layout version this crate understands.
pub const FORMAT_VERSION: u16 = 1;

pub const DB_NAME_LEN: usize = 32;
pub const NUM_CATEGORIES: usize = 16;
pub const CATEGORY_NAME_LEN: usize = 16;
pub const UNFILED_CATEGORY: u8 = 0;

/// Low 4 bits of a record entry's attribute byte hold the category index.
pub const ATTR_CATEGORY_MASK: u8 = 0x0F;
/// Secrecy flag bit in a record entry's attribute byte.
pub const ATTR_SECRET: u8 = 0x10;

/// Line separator used inside stored record text (and for the title).
pub const LINE_SEPARATOR: u8 = 0x0A;
/// Byte that terminates a record's text run on disk.
pub const TEXT_TERMINATOR: u8 = 0x00;

/// Decimal-places setting used when an imported record does not specify one.
pub const DEFAULT_PLACES: u8 = 14;

pub const HEADER_SIZE: usize = 72;
pub const LIST_HEADER_SIZE: usize = 6;
pub const ENTRY_SIZE: usize = 8;
pub const APP_INFO_SIZE: usize = 310;
pub const ITEM_HEADER_SIZE: usize = 2;

/// The first record-list header always sits directly after the database
/// header.
pub const FIRST_LIST_OFFSET: u64 = HEADER_SIZE as u64;
