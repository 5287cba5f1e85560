//! # Fixed-Size Header Structs
//!
//! Type-safe, zerocopy-based structs for every fixed-size region of a
//! MathPad database file. Each struct is `#[repr(C)]` with the exact on-disk
//! field order and big-endian integer fields, so reading is a bounds check
//! plus a transmute-free copy and writing is `as_bytes()`.
//!
//! ## Zerocopy Safety
//!
//! All structs derive:
//! - `FromBytes`: safe to materialize from arbitrary bytes
//! - `IntoBytes` + `Immutable`: safe to serialize as raw bytes
//! - `KnownLayout` + `Unaligned`: layout checked at compile time, no
//!   alignment requirement (the file offsets are odd in places)
//!
//! Compile-time assertions pin each struct to its on-disk size.

use eyre::{ensure, Result};
use zerocopy::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{
    ATTR_CATEGORY_MASK, ATTR_SECRET, CREATOR_TAG, DB_NAME_LEN, ENTRY_SIZE, FORMAT_VERSION,
    HEADER_SIZE, ITEM_HEADER_SIZE, LIST_HEADER_SIZE, TYPE_TAG,
};
use crate::be_accessors;

/// The 72-byte region at the start of the file, up to (and not including)
/// the first record-list header.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct DatabaseHeader {
    name: [u8; DB_NAME_LEN],
    attributes: U16,
    version: U16,
    creation_date: U32,
    modification_date: U32,
    last_backup_date: U32,
    modification_number: U32,
    app_info_id: U32,
    sort_info_id: U32,
    type_tag: [u8; 4],
    creator_tag: [u8; 4],
    unique_id_seed: U32,
}

const _: () = assert!(std::mem::size_of::<DatabaseHeader>() == HEADER_SIZE);

impl DatabaseHeader {
    /// Builds a fresh header for a new database with the given name
    /// (truncated to 31 bytes, NUL-padded). Dates and offsets are zero until
    /// the writer stamps them.
    pub fn new(name: &str) -> Self {
        let mut name_bytes = [0u8; DB_NAME_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(DB_NAME_LEN - 1);
        name_bytes[..len].copy_from_slice(&bytes[..len]);

        Self {
            name: name_bytes,
            attributes: U16::new(0),
            version: U16::new(FORMAT_VERSION),
            creation_date: U32::new(0),
            modification_date: U32::new(0),
            last_backup_date: U32::new(0),
            modification_number: U32::new(0),
            app_info_id: U32::new(0),
            sort_info_id: U32::new(0),
            type_tag: *TYPE_TAG,
            creator_tag: *CREATOR_TAG,
            unique_id_seed: U32::new(0),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() >= HEADER_SIZE,
            "buffer too small for database header: {} < {}",
            bytes.len(),
            HEADER_SIZE
        );

        let header = Self::read_from_bytes(&bytes[..HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse database header: {:?}", e))?;
        header.validate()?;
        Ok(header)
    }

    /// Rejects anything that is not a version-1 MathPad database. This must
    /// pass before any record is read.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            &self.type_tag == TYPE_TAG && &self.creator_tag == CREATOR_TAG,
            "not a MathPad database file"
        );
        ensure!(
            self.version.get() == FORMAT_VERSION,
            "unsupported MathPad database version: {} (expected {})",
            self.version.get(),
            FORMAT_VERSION
        );
        Ok(())
    }

    /// Database name bytes, up to the first NUL.
    pub fn name(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name.len());
        &self.name[..end]
    }

    be_accessors! {
        attributes: u16,
        version: u16,
        creation_date: u32,
        modification_date: u32,
        last_backup_date: u32,
        modification_number: u32,
        app_info_id: u32,
        sort_info_id: u32,
        unique_id_seed: u32,
    }
}

/// The 6-byte record-list header: a chain link plus an entry count. The
/// entry array begins immediately after these 6 bytes; there is no padding
/// word, even though the Palm OS struct declares a `firstEntry` member at
/// that position.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RecordListHeader {
    next_list: U32,
    record_count: U16,
}

const _: () = assert!(std::mem::size_of::<RecordListHeader>() == LIST_HEADER_SIZE);

impl RecordListHeader {
    pub fn new(next_list: u32, record_count: u16) -> Self {
        Self {
            next_list: U32::new(next_list),
            record_count: U16::new(record_count),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() >= LIST_HEADER_SIZE,
            "buffer too small for record-list header: {} < {}",
            bytes.len(),
            LIST_HEADER_SIZE
        );
        Self::read_from_bytes(&bytes[..LIST_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse record-list header: {:?}", e))
    }

    be_accessors! {
        next_list: u32,
        record_count: u16,
    }
}

/// One 8-byte directory entry: where a record's body lives and how it is
/// tagged. The 3-byte unique id identifies the record on the handheld; this
/// crate zeroes it on write (HotSync regenerates it).
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RecordEntry {
    offset: U32,
    attributes: u8,
    unique_id: [u8; 3],
}

const _: () = assert!(std::mem::size_of::<RecordEntry>() == ENTRY_SIZE);

impl RecordEntry {
    pub fn new(offset: u32, category: u8, secret: bool) -> Self {
        Self {
            offset: U32::new(offset),
            attributes: pack_attributes(category, secret),
            unique_id: [0; 3],
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() >= ENTRY_SIZE,
            "buffer too small for record entry: {} < {}",
            bytes.len(),
            ENTRY_SIZE
        );
        Self::read_from_bytes(&bytes[..ENTRY_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse record entry: {:?}", e))
    }

    pub fn category(&self) -> u8 {
        self.attributes & ATTR_CATEGORY_MASK
    }

    pub fn secret(&self) -> bool {
        self.attributes & ATTR_SECRET != 0
    }

    be_accessors! {
        offset: u32,
    }
}

/// Packs a category index and secrecy flag into an entry attribute byte.
pub fn pack_attributes(category: u8, secret: bool) -> u8 {
    let mut attributes = category & ATTR_CATEGORY_MASK;
    if secret {
        attributes |= ATTR_SECRET;
    }
    attributes
}

/// The 2-byte fixed header at the start of each record body; the text run
/// follows directly.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct ItemHeader {
    pub places: u8,
    pub strip_zeros: u8,
}

const _: () = assert!(std::mem::size_of::<ItemHeader>() == ITEM_HEADER_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_header_size_is_72() {
        assert_eq!(std::mem::size_of::<DatabaseHeader>(), HEADER_SIZE);
    }

    #[test]
    fn record_list_header_size_is_6() {
        assert_eq!(std::mem::size_of::<RecordListHeader>(), LIST_HEADER_SIZE);
    }

    #[test]
    fn record_entry_size_is_8() {
        assert_eq!(std::mem::size_of::<RecordEntry>(), ENTRY_SIZE);
    }

    #[test]
    fn new_header_round_trips() {
        let mut header = DatabaseHeader::new("MathPadDB");
        header.set_app_info_id(1234);
        header.set_modification_number(7);

        let parsed = DatabaseHeader::parse(header.as_bytes()).unwrap();
        assert_eq!(parsed.name(), b"MathPadDB");
        assert_eq!(parsed.version(), FORMAT_VERSION);
        assert_eq!(parsed.app_info_id(), 1234);
        assert_eq!(parsed.modification_number(), 7);
    }

    #[test]
    fn header_fields_are_big_endian_on_disk() {
        let mut header = DatabaseHeader::new("x");
        header.set_app_info_id(0x0102_0304);

        // app_info_id sits at byte offset 52
        let bytes = header.as_bytes();
        assert_eq!(&bytes[52..56], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn parse_rejects_wrong_type_tag() {
        let header = DatabaseHeader::new("x");
        let mut bytes = header.as_bytes().to_vec();
        bytes[60..64].copy_from_slice(b"Text");

        let err = DatabaseHeader::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("not a MathPad database file"));
    }

    #[test]
    fn parse_rejects_wrong_creator_tag() {
        let header = DatabaseHeader::new("x");
        let mut bytes = header.as_bytes().to_vec();
        bytes[64..68].copy_from_slice(b"memo");

        let err = DatabaseHeader::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("not a MathPad database file"));
    }

    #[test]
    fn parse_rejects_unsupported_version() {
        let mut header = DatabaseHeader::new("x");
        header.set_version(2);

        let err = DatabaseHeader::parse(header.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unsupported MathPad database version"));
    }

    #[test]
    fn entry_attributes_pack_and_unpack() {
        let entry = RecordEntry::new(100, 5, true);
        assert_eq!(entry.offset(), 100);
        assert_eq!(entry.category(), 5);
        assert!(entry.secret());

        let entry = RecordEntry::new(0, 15, false);
        assert_eq!(entry.category(), 15);
        assert!(!entry.secret());
    }

    #[test]
    fn pack_attributes_masks_category_to_four_bits() {
        assert_eq!(pack_attributes(0xFF, false), 0x0F);
        assert_eq!(pack_attributes(3, true), 0x13);
    }

    #[test]
    fn long_database_name_is_truncated() {
        let header = DatabaseHeader::new(&"n".repeat(40));
        assert_eq!(header.name().len(), DB_NAME_LEN - 1);
    }
}
