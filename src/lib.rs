//! # mpdb - MathPad Database Converter
//!
//! Converts MathPad handheld database backups (the fixed-layout binary
//! record store HotSync leaves on the desktop) to a human-editable flat
//! text file and back, merging edited text records into an existing
//! database by title.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        Binaries (mpexport / mpimport)       │
//! ├─────────────────────────────────────────────┤
//! │        Database aggregate (database)        │
//! ├──────────────┬───────────────┬──────────────┤
//! │    Reader    │  Merge Engine │    Writer    │
//! │   (reader)   │    (merge)    │   (writer)   │
//! ├──────────────┴───────┬───────┴──────────────┤
//! │  Record Store (store)│ Text format (text)   │
//! ├──────────────────────┴───────────────────── ┤
//! │  Category table (category)                  │
//! │  On-disk layout (format) - zerocopy,        │
//! │    big-endian field types                   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Export path: `Database::load` → `export_text`. Import path:
//! `Database::load` → `import_text` (merge with a caller-supplied conflict
//! resolver) → `save`. The whole file is held in memory between load and
//! save; there is no streaming merge.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mpdb::{Database, MergeChoice};
//!
//! let mut file = std::fs::File::open("MathPadDB.pdb")?;
//! let mut db = Database::load(&mut file)?;
//!
//! let edits = std::io::BufReader::new(std::fs::File::open("edits.txt")?);
//! let mut overwrite = |_: &[u8]| Ok(MergeChoice::Overwrite);
//! db.import_text(edits, &mut overwrite)?;
//!
//! let mut out = std::fs::File::create("MathPadDB.pdb")?;
//! db.save(&mut out)?;
//! ```
//!
//! ## Error Model
//!
//! Every fallible operation returns `eyre::Result`. A wrong type tag,
//! creator tag, or layout version fails before any record is read; short
//! reads and writes carry their I/O context. The one recoverable condition,
//! a full category table, is not an error at all: records whose category
//! cannot be stored fall back to Unfiled. Nothing in the library terminates
//! the process; that is the binaries' job.

mod macros;

pub mod category;
pub mod database;
pub mod format;
pub mod merge;
pub mod reader;
pub mod store;
pub mod text;
pub mod writer;

pub use category::CategoryBlock;
pub use database::Database;
pub use format::{DatabaseHeader, RecordEntry, RecordListHeader};
pub use merge::{ConflictResolver, MergeChoice, MergeStats};
pub use store::{Record, RecordStore};
