//! # Database Writer
//!
//! Serializes a record set and category table back into the on-disk layout.
//! Offsets inside the file depend on how much precedes each block, so the
//! writer works in two passes:
//!
//! ```text
//! pass 1 (forward)                       pass 2 (back-patch)
//! +--------------------------+          +--------------------------+
//! | header (current values)  |  <------ | header: fresh timestamps,|
//! | list header (count, 0)   |          |   category-block offset  |
//! | entry array (zeroed)     |  <------ | entries: real offsets,   |
//! | category block           |          |   packed attributes,     |
//! | record bodies, offsets   |          |   zeroed unique ids      |
//! |   noted as written       |          +--------------------------+
//! +--------------------------+
//! ```
//!
//! The writer always emits a single record-list block (next-list offset 0);
//! chained input collapses to one list on the way through memory. All three
//! header timestamps are set to the current time on write — the handheld's
//! install logic treats stale dates as invalid files.
//!
//! A write failure at any point aborts with the stream in an undefined
//! state; callers wanting atomicity write to a temporary path and rename
//! once this returns Ok.

use std::io::{Seek, SeekFrom, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use eyre::{ensure, Result, WrapErr};
use zerocopy::IntoBytes;

use crate::category::CategoryBlock;
use crate::format::{
    DatabaseHeader, ItemHeader, RecordEntry, RecordListHeader, ENTRY_SIZE, TEXT_TERMINATOR,
};
use crate::store::RecordStore;

/// Seconds since the Unix epoch, truncated to the header's 32-bit field.
fn current_time() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// Writes a complete database file. The caller's header supplies the name,
/// attribute flags, and seed; timestamps and the category-block offset are
/// recomputed here.
pub fn write_database<W: Write + Seek>(
    header: &DatabaseHeader,
    categories: &CategoryBlock,
    store: &RecordStore,
    stream: &mut W,
) -> Result<()> {
    ensure!(
        store.len() <= u16::MAX as usize,
        "too many records for one database: {}",
        store.len()
    );
    let mut header = *header;

    // Pass 1: placeholder header, list header, zeroed entries, categories,
    // then every record body, noting where each lands.
    stream
        .write_all(header.as_bytes())
        .wrap_err("writing database header")?;

    let list = RecordListHeader::new(0, store.len() as u16);
    stream
        .write_all(list.as_bytes())
        .wrap_err("writing record-list header")?;

    let entries_at = stream
        .stream_position()
        .wrap_err("locating record entries")?;
    stream
        .write_all(&vec![0u8; store.len() * ENTRY_SIZE])
        .wrap_err("writing record entry placeholders")?;

    let app_info_at = stream
        .stream_position()
        .wrap_err("locating category block")?;
    ensure!(
        app_info_at <= u32::MAX as u64,
        "category block offset exceeds the format's 32-bit range"
    );
    stream
        .write_all(categories.as_bytes())
        .wrap_err("writing category block")?;

    let mut entries = Vec::with_capacity(store.len());
    for record in store {
        let offset = stream.stream_position().wrap_err("locating record")?;
        ensure!(
            offset <= u32::MAX as u64,
            "record offset exceeds the format's 32-bit range"
        );
        entries.push(RecordEntry::new(
            offset as u32,
            record.category,
            record.secret,
        ));

        let item = ItemHeader {
            places: record.places,
            strip_zeros: record.strip_zeros as u8,
        };
        stream
            .write_all(item.as_bytes())
            .wrap_err("writing record header")?;
        stream
            .write_all(&record.text)
            .wrap_err("writing record text")?;
        stream
            .write_all(&[TEXT_TERMINATOR])
            .wrap_err("writing record text")?;
    }

    // Pass 2: stamp the header and patch the entry array.
    let now = current_time();
    header.set_creation_date(now);
    header.set_modification_date(now);
    header.set_last_backup_date(now);
    header.set_app_info_id(app_info_at as u32);

    stream
        .seek(SeekFrom::Start(0))
        .wrap_err("seeking to database header")?;
    stream
        .write_all(header.as_bytes())
        .wrap_err("rewriting database header")?;

    stream
        .seek(SeekFrom::Start(entries_at))
        .wrap_err("seeking to record entries")?;
    for entry in &entries {
        stream
            .write_all(entry.as_bytes())
            .wrap_err("rewriting record entries")?;
    }

    stream.flush().wrap_err("flushing database file")?;
    Ok(())
}
