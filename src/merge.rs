//! # Merge Engine
//!
//! Drives the import parser over a whole text stream and folds each parsed
//! record into an existing record store:
//!
//! ```text
//! parsed record
//!     │
//!     ├─ no title match ──────────────► append as new record
//!     │
//!     ├─ match, every field equal ────► discard import (already current)
//!     │
//!     └─ match, any field differs ────► ask the resolver
//!            Keep ────────────────────► keep old, append import separately
//!            Overwrite ───────────────► replace in place
//!            OverwriteAll ────────────► replace, and stop asking for the
//!                                       rest of this run
//! ```
//!
//! The OverwriteAll latch is engine state for one run only; it never
//! persists across calls to [`merge_records`]. Replacement preserves the
//! record's position in the store and drops the superseded record.

use std::io::BufRead;

use eyre::Result;

use crate::category::CategoryBlock;
use crate::store::RecordStore;
use crate::text::ImportParser;

/// What to do with an import whose title matches an existing record but
/// whose content differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeChoice {
    /// Keep the existing record and add the import as a separate record.
    Keep,
    /// Replace the existing record with the import.
    Overwrite,
    /// Replace, and overwrite every later conflict in this run without
    /// asking again.
    OverwriteAll,
}

/// External collaborator consulted on each conflict. Receives the existing
/// record's title bytes (text up to the first line separator).
pub trait ConflictResolver {
    fn resolve(&mut self, existing_title: &[u8]) -> Result<MergeChoice>;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&[u8]) -> Result<MergeChoice>,
{
    fn resolve(&mut self, existing_title: &[u8]) -> Result<MergeChoice> {
        self(existing_title)
    }
}

/// Outcome counts for one merge run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Imports with no matching title, appended.
    pub added: usize,
    /// Conflicts resolved by overwriting the existing record.
    pub replaced: usize,
    /// Imports identical to an existing record, discarded.
    pub unchanged: usize,
    /// Conflicts resolved by keeping both records.
    pub kept_duplicates: usize,
}

/// Parses every record block in `input` and merges it into `store`,
/// allocating categories into `categories` as needed.
pub fn merge_records<R: BufRead>(
    store: &mut RecordStore,
    categories: &mut CategoryBlock,
    input: R,
    resolver: &mut dyn ConflictResolver,
) -> Result<MergeStats> {
    let mut parser = ImportParser::new(input);
    let mut stats = MergeStats::default();
    let mut overwrite_all = false;

    while let Some(import) = parser.next_record(categories)? {
        let index = match store.find_by_title(&import.text) {
            None => {
                store.push(import);
                stats.added += 1;
                continue;
            }
            Some(index) => index,
        };

        if store[index] == import {
            stats.unchanged += 1;
            continue;
        }

        let choice = if overwrite_all {
            MergeChoice::Overwrite
        } else {
            resolver.resolve(store[index].title())?
        };

        match choice {
            MergeChoice::Keep => {
                store.push(import);
                stats.kept_duplicates += 1;
            }
            MergeChoice::Overwrite => {
                store.replace(index, import);
                stats.replaced += 1;
            }
            MergeChoice::OverwriteAll => {
                overwrite_all = true;
                store.replace(index, import);
                stats.replaced += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::store::Record;

    const SEP: &str = "~~~~~~~~~~~~~~~~~~~~~~~~~~~";

    fn record(text: &[u8]) -> Record {
        Record {
            category: 0,
            secret: false,
            places: 14,
            strip_zeros: true,
            text: text.to_vec(),
        }
    }

    fn merge(
        store: &mut RecordStore,
        input: &str,
        resolver: &mut dyn ConflictResolver,
    ) -> MergeStats {
        let mut categories = CategoryBlock::new();
        merge_records(store, &mut categories, Cursor::new(input.as_bytes().to_vec()), resolver)
            .unwrap()
    }

    fn no_conflicts_expected(title: &[u8]) -> Result<MergeChoice> {
        panic!(
            "resolver invoked unexpectedly for {:?}",
            String::from_utf8_lossy(title)
        );
    }

    #[test]
    fn new_titles_are_appended() {
        let mut store = RecordStore::new();
        store.push(record(b"Existing\nbody"));

        let stats = merge(
            &mut store,
            &format!("Fresh\nbody\n{SEP}\n"),
            &mut no_conflicts_expected,
        );

        assert_eq!(stats.added, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store[1].text, b"Fresh\nbody");
    }

    #[test]
    fn identical_imports_are_discarded() {
        let mut store = RecordStore::new();
        store.push(record(b"Foo\nsame"));

        let stats = merge(
            &mut store,
            &format!("Foo\nsame\n{SEP}\n"),
            &mut no_conflicts_expected,
        );

        assert_eq!(stats.unchanged, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn conflict_overwrite_replaces_in_place() {
        let mut store = RecordStore::new();
        store.push(record(b"Foo\nversion A"));
        store.push(record(b"Bar\nuntouched"));

        let mut calls = 0;
        let mut resolver = |title: &[u8]| -> Result<MergeChoice> {
            calls += 1;
            assert_eq!(title, b"Foo");
            Ok(MergeChoice::Overwrite)
        };
        let stats = merge(&mut store, &format!("Foo\nversion B\n{SEP}\n"), &mut resolver);

        assert_eq!(calls, 1);
        assert_eq!(stats.replaced, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store[0].text, b"Foo\nversion B");
        assert_eq!(store[1].text, b"Bar\nuntouched");
    }

    #[test]
    fn conflict_keep_adds_a_second_record() {
        let mut store = RecordStore::new();
        store.push(record(b"Foo\nversion A"));

        let mut resolver = |_: &[u8]| -> Result<MergeChoice> { Ok(MergeChoice::Keep) };
        let stats = merge(&mut store, &format!("Foo\nversion B\n{SEP}\n"), &mut resolver);

        assert_eq!(stats.kept_duplicates, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store[0].text, b"Foo\nversion A");
        assert_eq!(store[1].text, b"Foo\nversion B");
    }

    #[test]
    fn overwrite_all_latches_for_the_rest_of_the_run() {
        let mut store = RecordStore::new();
        store.push(record(b"Foo\nold"));
        store.push(record(b"Bar\nold"));

        let mut calls = 0;
        let mut resolver = |_: &[u8]| -> Result<MergeChoice> {
            calls += 1;
            Ok(MergeChoice::OverwriteAll)
        };
        let input = format!("Foo\nnew\n{SEP}\nBar\nnew\n{SEP}\n");
        let stats = merge(&mut store, &input, &mut resolver);

        assert_eq!(calls, 1);
        assert_eq!(stats.replaced, 2);
        assert_eq!(store[0].text, b"Foo\nnew");
        assert_eq!(store[1].text, b"Bar\nnew");
    }

    #[test]
    fn metadata_difference_alone_is_a_conflict() {
        let mut store = RecordStore::new();
        store.push(record(b"Foo\nsame"));

        let mut calls = 0;
        let mut resolver = |_: &[u8]| -> Result<MergeChoice> {
            calls += 1;
            Ok(MergeChoice::Overwrite)
        };
        // same text, different places setting
        let input = format!("Places = 2; StripZeros = 1\nFoo\nsame\n{SEP}\n");
        merge(&mut store, &input, &mut resolver);

        assert_eq!(calls, 1);
        assert_eq!(store[0].places, 2);
    }

    #[test]
    fn empty_input_changes_nothing() {
        let mut store = RecordStore::new();
        store.push(record(b"Foo\nbody"));

        let stats = merge(
            &mut store,
            &format!("\n\n{SEP}\n\n"),
            &mut no_conflicts_expected,
        );

        assert_eq!(stats, MergeStats::default());
        assert_eq!(store.len(), 1);
    }
}
