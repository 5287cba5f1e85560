//! # Database Aggregate
//!
//! One loaded MathPad database: header, category table, and record store,
//! threaded explicitly through the reader, merge engine, and writer. There
//! is no ambient state anywhere in the crate; a run is load → (export |
//! import) → save over this one value.
//!
//! ```text
//! export path:  Database::load ──► export_text
//! import path:  Database::load ──► import_text (merge + category side
//!               effects) ──► save
//! ```

use std::io::{BufRead, Read, Seek, Write};

use eyre::Result;

use crate::category::CategoryBlock;
use crate::format::DatabaseHeader;
use crate::merge::{self, ConflictResolver, MergeStats};
use crate::reader::{read_header, RecordIter};
use crate::store::RecordStore;
use crate::text::export_record;
use crate::writer::write_database;

#[derive(Debug)]
pub struct Database {
    pub header: DatabaseHeader,
    pub categories: CategoryBlock,
    pub store: RecordStore,
}

impl Database {
    /// An empty database with a fresh header and only the Unfiled category.
    pub fn new(name: &str) -> Self {
        Self {
            header: DatabaseHeader::new(name),
            categories: CategoryBlock::new(),
            store: RecordStore::new(),
        }
    }

    /// Reads an entire database into memory. Fails without touching any
    /// record if the file is not a version-1 MathPad database.
    pub fn load<R: Read + Seek>(stream: &mut R) -> Result<Self> {
        let (header, categories) = read_header(stream)?;
        let mut store = RecordStore::new();
        for record in RecordIter::new(stream) {
            store.push(record?);
        }
        Ok(Self {
            header,
            categories,
            store,
        })
    }

    /// Serializes the database, recomputing every offset and refreshing the
    /// header timestamps.
    pub fn save<W: Write + Seek>(&self, stream: &mut W) -> Result<()> {
        write_database(&self.header, &self.categories, &self.store, stream)
    }

    /// Writes every record to `out` in the text interchange format.
    pub fn export_text<W: Write>(&self, out: &mut W) -> Result<()> {
        for record in &self.store {
            export_record(out, record, &self.categories)?;
        }
        Ok(())
    }

    /// Merges a text interchange stream into this database, consulting
    /// `resolver` on conflicting titles.
    pub fn import_text<R: BufRead>(
        &mut self,
        input: R,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<MergeStats> {
        merge::merge_records(&mut self.store, &mut self.categories, input, resolver)
    }
}
