//! # Database Reader
//!
//! Parses a MathPad database file: header validation, category block, and a
//! lazy single-pass iterator over the records reachable through the
//! record-list chain.
//!
//! ## Read Path
//!
//! ```text
//! read_header            RecordIter
//! +------------+         +--------------------------------------+
//! | 72-byte    |         | follow next-list chain from offset 72|
//! | header     |  then   |   per block: read entry array        |
//! | validate   | ------> |   per entry: seek to record offset,  |
//! | tags/ver   |         |     read 2-byte item header,         |
//! | seek+read  |         |     read text until 0x00             |
//! | categories |         +--------------------------------------+
//! +------------+
//! ```
//!
//! The iterator is finite and not restartable; reopen the stream to iterate
//! again. A failure while reading any record ends the iteration — record
//! offsets come only from the entry table, so a corrupt table cannot be
//! skipped past safely. Multi-block chains are accepted here even though the
//! writer never produces them.

use std::io::{Read, Seek, SeekFrom};

use eyre::{ensure, Result, WrapErr};

use zerocopy::FromBytes;

use crate::category::CategoryBlock;
use crate::format::{
    DatabaseHeader, ItemHeader, RecordEntry, RecordListHeader, APP_INFO_SIZE, ENTRY_SIZE,
    FIRST_LIST_OFFSET, HEADER_SIZE, ITEM_HEADER_SIZE, LIST_HEADER_SIZE, TEXT_TERMINATOR,
};
use crate::store::Record;

/// Reads and validates the database header, then the category block it
/// points at. Fails before any record is touched if the type tag, creator
/// tag, or version is wrong.
pub fn read_header<R: Read + Seek>(stream: &mut R) -> Result<(DatabaseHeader, CategoryBlock)> {
    let mut buf = [0u8; HEADER_SIZE];
    stream
        .read_exact(&mut buf)
        .wrap_err("reading database header")?;
    let header = DatabaseHeader::parse(&buf)?;

    ensure!(header.app_info_id() != 0, "database has no category block");
    stream
        .seek(SeekFrom::Start(header.app_info_id() as u64))
        .wrap_err("seeking to category block")?;

    let mut buf = [0u8; APP_INFO_SIZE];
    stream
        .read_exact(&mut buf)
        .wrap_err("reading category block")?;
    let categories = CategoryBlock::parse(&buf)?;

    Ok((header, categories))
}

/// Lazy iterator over every record in the file, in record-list order.
///
/// Yields `Result<Record>`; the first error is final (the iterator returns
/// `None` afterwards).
pub struct RecordIter<'a, R: Read + Seek> {
    stream: &'a mut R,
    next_list: u64,
    entries: std::vec::IntoIter<RecordEntry>,
    done: bool,
}

impl<'a, R: Read + Seek> RecordIter<'a, R> {
    pub fn new(stream: &'a mut R) -> Self {
        Self {
            stream,
            next_list: FIRST_LIST_OFFSET,
            entries: Vec::new().into_iter(),
            done: false,
        }
    }

    /// Loads entry arrays along the chain until one is non-empty. Returns
    /// false when the chain is exhausted.
    fn advance_chain(&mut self) -> Result<bool> {
        while self.entries.len() == 0 {
            if self.next_list == 0 {
                return Ok(false);
            }

            self.stream
                .seek(SeekFrom::Start(self.next_list))
                .wrap_err("seeking to record list")?;
            let mut buf = [0u8; LIST_HEADER_SIZE];
            self.stream
                .read_exact(&mut buf)
                .wrap_err("reading record-list header")?;
            let list = RecordListHeader::parse(&buf)?;
            self.next_list = list.next_list() as u64;

            let count = list.record_count() as usize;
            let mut buf = vec![0u8; count * ENTRY_SIZE];
            self.stream
                .read_exact(&mut buf)
                .wrap_err("reading record entries")?;

            let mut entries = Vec::with_capacity(count);
            for chunk in buf.chunks_exact(ENTRY_SIZE) {
                entries.push(RecordEntry::parse(chunk)?);
            }
            self.entries = entries.into_iter();
        }
        Ok(true)
    }

    fn read_record(&mut self, entry: &RecordEntry) -> Result<Record> {
        self.stream
            .seek(SeekFrom::Start(entry.offset() as u64))
            .wrap_err("seeking to record")?;

        let mut buf = [0u8; ITEM_HEADER_SIZE];
        self.stream
            .read_exact(&mut buf)
            .wrap_err("reading record header")?;
        let item = ItemHeader::read_from_bytes(&buf)
            .map_err(|_| eyre::eyre!("malformed record header"))?;

        let mut text = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            self.stream
                .read_exact(&mut byte)
                .wrap_err("reading record text")?;
            if byte[0] == TEXT_TERMINATOR {
                break;
            }
            text.push(byte[0]);
        }

        Ok(Record {
            category: entry.category(),
            secret: entry.secret(),
            places: item.places,
            strip_zeros: item.strip_zeros != 0,
            text,
        })
    }
}

impl<R: Read + Seek> Iterator for RecordIter<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(entry) = self.entries.next() {
                let result = self.read_record(&entry);
                if result.is_err() {
                    self.done = true;
                }
                return Some(result);
            }
            match self.advance_chain() {
                Ok(true) => continue,
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use zerocopy::IntoBytes;

    use crate::format::FORMAT_VERSION;

    /// Hand-assembles a file whose record list chains to a second block, a
    /// shape the writer never produces but the reader must accept.
    fn chained_database() -> Vec<u8> {
        let mut file = Vec::new();

        let mut header = DatabaseHeader::new("Chained");
        // layout: header, list A (1 entry), categories, record 1,
        //         list B (1 entry), record 2
        let list_a_end = HEADER_SIZE + LIST_HEADER_SIZE + ENTRY_SIZE;
        let app_info_at = list_a_end;
        let record1_at = app_info_at + APP_INFO_SIZE;
        let record1_len = ITEM_HEADER_SIZE + b"first\n".len() + 1;
        let list_b_at = record1_at + record1_len;
        let record2_at = list_b_at + LIST_HEADER_SIZE + ENTRY_SIZE;

        header.set_app_info_id(app_info_at as u32);
        file.extend_from_slice(header.as_bytes());

        file.extend_from_slice(RecordListHeader::new(list_b_at as u32, 1).as_bytes());
        file.extend_from_slice(RecordEntry::new(record1_at as u32, 2, false).as_bytes());

        file.extend_from_slice(CategoryBlock::new().as_bytes());

        file.extend_from_slice(&[14, 1]);
        file.extend_from_slice(b"first\n");
        file.push(TEXT_TERMINATOR);

        file.extend_from_slice(RecordListHeader::new(0, 1).as_bytes());
        file.extend_from_slice(RecordEntry::new(record2_at as u32, 0, true).as_bytes());

        file.extend_from_slice(&[2, 0]);
        file.extend_from_slice(b"second");
        file.push(TEXT_TERMINATOR);

        file
    }

    #[test]
    fn reads_records_across_chained_list_blocks() {
        let file = chained_database();
        let mut cursor = Cursor::new(file);

        let (header, _categories) = read_header(&mut cursor).unwrap();
        assert_eq!(header.version(), FORMAT_VERSION);

        let records: Vec<Record> = RecordIter::new(&mut cursor)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, b"first\n");
        assert_eq!(records[0].category, 2);
        assert_eq!(records[0].places, 14);
        assert!(records[0].strip_zeros);
        assert_eq!(records[1].text, b"second");
        assert!(records[1].secret);
        assert_eq!(records[1].places, 2);
        assert!(!records[1].strip_zeros);
    }

    #[test]
    fn truncated_record_text_is_an_error() {
        let mut file = chained_database();
        // drop the final terminator of the last record
        file.pop();
        let mut cursor = Cursor::new(file);

        read_header(&mut cursor).unwrap();
        let results: Vec<Result<Record>> = RecordIter::new(&mut cursor).collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("reading record text"));
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        let mut cursor = Cursor::new(vec![0u8; 10]);
        let err = read_header(&mut cursor).unwrap_err();
        assert!(err.to_string().contains("reading database header"));
    }
}
