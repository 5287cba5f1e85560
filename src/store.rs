//! # Record Store
//!
//! In-memory representation of a MathPad record set: an ordered collection
//! that preserves file order on load and append order on import. Records are
//! exclusively owned by the store once pushed; replacing one drops the old
//! record (and its text buffer) in place, keeping its position.
//!
//! ## Titles
//!
//! A record's title is its text up to the first line separator (0x0A), or
//! the whole text for a single-line record. Title matching for the merge
//! path is a *full-line* comparison, not a prefix match: after walking the
//! common prefix, the byte each side stops on must agree, with end-of-buffer
//! behaving as NUL. So an import titled "Foo" with no further lines does not
//! match a stored multi-line record whose first line is "Foo" — one stops on
//! NUL, the other on 0x0A.

use crate::format::LINE_SEPARATOR;

/// One MathPad worksheet: its category tag, flags, display settings, and
/// text. The text holds 0x0A line separators and no trailing terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub category: u8,
    pub secret: bool,
    pub places: u8,
    pub strip_zeros: bool,
    pub text: Vec<u8>,
}

impl Record {
    /// Text up to the first line separator.
    pub fn title(&self) -> &[u8] {
        let end = self
            .text
            .iter()
            .position(|&b| b == LINE_SEPARATOR)
            .unwrap_or(self.text.len());
        &self.text[..end]
    }
}

/// Ordered, exclusively-owning collection of records.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Index of the first record whose full-line title matches the given
    /// text (typically an import candidate's text).
    pub fn find_by_title(&self, text: &[u8]) -> Option<usize> {
        self.records
            .iter()
            .position(|record| title_matches(text, &record.text))
    }

    /// Swaps in a replacement at `index`, preserving store order. The
    /// superseded record is dropped here.
    pub fn replace(&mut self, index: usize, record: Record) {
        self.records[index] = record;
    }
}

impl std::ops::Index<usize> for RecordStore {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Full-line title comparison. Walks `probe` while its bytes are non-NUL,
/// non-separator and equal to `stored`'s; the match stands iff the bytes at
/// the stop position agree (end-of-buffer reads as NUL on either side).
fn title_matches(probe: &[u8], stored: &[u8]) -> bool {
    let mut i = 0;
    loop {
        let a = probe.get(i).copied().unwrap_or(0);
        let b = stored.get(i).copied().unwrap_or(0);
        if a == 0 || a == LINE_SEPARATOR || a != b {
            return a == b;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &[u8]) -> Record {
        Record {
            category: 0,
            secret: false,
            places: 14,
            strip_zeros: true,
            text: text.to_vec(),
        }
    }

    #[test]
    fn title_is_first_line() {
        assert_eq!(record(b"Foo\nbar\nbaz").title(), b"Foo");
        assert_eq!(record(b"Foo").title(), b"Foo");
        assert_eq!(record(b"").title(), b"");
    }

    #[test]
    fn matching_multi_line_titles() {
        assert!(title_matches(b"Foo\nnew body", b"Foo\nold body"));
        assert!(title_matches(b"Foo\nx", b"Foo\ny"));
    }

    #[test]
    fn matching_single_line_records() {
        assert!(title_matches(b"Foo", b"Foo"));
        assert!(!title_matches(b"Foo", b"Food"));
        assert!(!title_matches(b"Food", b"Foo"));
    }

    #[test]
    fn single_line_does_not_match_multi_line() {
        // one side stops on NUL, the other on the line separator
        assert!(!title_matches(b"Foo", b"Foo\nbody"));
        assert!(!title_matches(b"Foo\nbody", b"Foo"));
    }

    #[test]
    fn find_by_title_returns_first_match() {
        let mut store = RecordStore::new();
        store.push(record(b"Alpha\none"));
        store.push(record(b"Beta\ntwo"));
        store.push(record(b"Beta\nthree"));

        assert_eq!(store.find_by_title(b"Beta\nzzz"), Some(1));
        assert_eq!(store.find_by_title(b"Gamma\nzzz"), None);
    }

    #[test]
    fn replace_preserves_order() {
        let mut store = RecordStore::new();
        store.push(record(b"A\n1"));
        store.push(record(b"B\n2"));
        store.push(record(b"C\n3"));

        store.replace(1, record(b"B\nreplaced"));

        assert_eq!(store.len(), 3);
        assert_eq!(store[0].text, b"A\n1");
        assert_eq!(store[1].text, b"B\nreplaced");
        assert_eq!(store[2].text, b"C\n3");
    }
}
