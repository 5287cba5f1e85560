//! # Category Table
//!
//! The app-info block of a MathPad database: 16 fixed category slots shared
//! by every record, each slot an empty-or-occupied 16-byte label plus a
//! 1-byte unique id, and a running last-assigned-id counter used when new
//! slots are claimed.
//!
//! ## On-Disk Layout (310 bytes)
//!
//! ```text
//! +----------------------------+
//! | renamed flags (u16)        |   one bit per slot, set by the handheld
//! | labels   [16][16] bytes    |   NUL-padded names; empty label = free slot
//! | unique_ids [16] bytes      |   distinct per occupied slot
//! | last_unique_id (u8)        |   allocation counter
//! | pad (u8)                   |   C struct alignment in the original tool
//! | app_data [34] bytes        |   MathPad's own settings, carried opaquely
//! +----------------------------+
//! ```
//!
//! The pad byte exists because the desktop conduit this format comes from
//! read and wrote `sizeof(struct)` with 2-byte member alignment; files in
//! the wild contain it, so it is modeled explicitly and preserved verbatim,
//! as is the trailing MathPad settings blob.
//!
//! ## Invariants
//!
//! - Slot 0 ("Unfiled") always exists and is the fallback for any record
//!   whose category cannot be stored.
//! - Every occupied slot's unique id differs from every other slot's id;
//!   [`CategoryBlock::next_unique_id`] maintains this by skipping ids that
//!   are already present.

use eyre::{ensure, Result};
use zerocopy::big_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::format::{APP_INFO_SIZE, CATEGORY_NAME_LEN, NUM_CATEGORIES};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct CategoryBlock {
    renamed: U16,
    labels: [[u8; CATEGORY_NAME_LEN]; NUM_CATEGORIES],
    unique_ids: [u8; NUM_CATEGORIES],
    last_unique_id: u8,
    pad: u8,
    app_data: [u8; 34],
}

const _: () = assert!(std::mem::size_of::<CategoryBlock>() == APP_INFO_SIZE);

impl CategoryBlock {
    /// A fresh table with only the Unfiled slot occupied.
    pub fn new() -> Self {
        let mut block = Self {
            renamed: U16::new(0),
            labels: [[0; CATEGORY_NAME_LEN]; NUM_CATEGORIES],
            unique_ids: [0; NUM_CATEGORIES],
            last_unique_id: 0,
            pad: 0,
            app_data: [0; 34],
        };
        block.labels[0][..7].copy_from_slice(b"Unfiled");
        block
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() >= APP_INFO_SIZE,
            "buffer too small for category block: {} < {}",
            bytes.len(),
            APP_INFO_SIZE
        );
        Self::read_from_bytes(&bytes[..APP_INFO_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse category block: {:?}", e))
    }

    /// Label bytes of a slot, up to the first NUL. Empty for a free slot.
    pub fn label(&self, index: u8) -> &[u8] {
        let bytes = &self.labels[index as usize];
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        &bytes[..end]
    }

    pub fn is_occupied(&self, index: u8) -> bool {
        self.labels[index as usize][0] != 0
    }

    /// Exact-match lookup over all 16 slots.
    pub fn lookup(&self, name: &[u8]) -> Option<u8> {
        (0..NUM_CATEGORIES as u8).find(|&i| self.label(i) == name)
    }

    /// Claims the first free slot for `name` (truncated to 15 bytes) and
    /// assigns it a fresh unique id. Returns `None` when all 16 slots are
    /// occupied; callers fall back to the Unfiled category rather than
    /// inventing a 17th slot.
    pub fn allocate(&mut self, name: &[u8]) -> Option<u8> {
        let slot = (0..NUM_CATEGORIES as u8).find(|&i| !self.is_occupied(i))?;

        let len = name.len().min(CATEGORY_NAME_LEN - 1);
        let label = &mut self.labels[slot as usize];
        label.fill(0);
        label[..len].copy_from_slice(&name[..len]);

        self.unique_ids[slot as usize] = self.next_unique_id();
        Some(slot)
    }

    /// Advances the last-assigned-id counter until it lands on a value not
    /// present anywhere in the id array, and returns it.
    pub fn next_unique_id(&mut self) -> u8 {
        loop {
            self.last_unique_id = self.last_unique_id.wrapping_add(1);
            if !self.unique_ids.contains(&self.last_unique_id) {
                return self.last_unique_id;
            }
        }
    }

    pub fn unique_id(&self, index: u8) -> u8 {
        self.unique_ids[index as usize]
    }
}

impl Default for CategoryBlock {
    fn default() -> Self {
        Self::new()
    }
}
