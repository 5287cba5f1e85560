//! # Text Interchange Format
//!
//! The human-editable flat-file form of a database, one block per record:
//!
//! ```text
//! Category = "Work"; Secret = 0
//! Places = 14; StripZeros = 1
//! budget
//! 12 + 30
//! ~~~~~~~~~~~~~~~~~~~~~~~~~~~
//! ```
//!
//! The export side always writes both settings lines. The import parser
//! accepts hand-written files where either line is missing (Unfiled /
//! not-secret, places 14 / strip-zeros on), skips blank lines between
//! records, and normalizes CR, LF, or CRLF line endings to the single 0x0A
//! the binary format stores. Numbers parse with atoi semantics: optional
//! whitespace and sign, then digits, with anything unparsable reading as 0.
//!
//! Parsing stops — returning `None` rather than an error — at end of input,
//! or when a separator appears where a record should begin. A settings line
//! followed directly by EOF or a separator also ends the run; the partial
//! record is discarded, though any category it already allocated stays
//! allocated.

use std::io::BufRead;

use eyre::{Result, WrapErr};

use crate::category::CategoryBlock;
use crate::format::{
    CATEGORY_NAME_LEN, DEFAULT_PLACES, LINE_SEPARATOR, UNFILED_CATEGORY,
};
use crate::store::Record;

/// Record separator: a line of exactly 27 tildes. Any line *starting* with
/// 27 tildes counts, matching the original tool's prefix test.
pub const SEPARATOR: &[u8] = b"~~~~~~~~~~~~~~~~~~~~~~~~~~~";

const CATEGORY_PREFIX: &[u8] = b"Category = \"";
const PLACES_PREFIX: &[u8] = b"Places = ";

/// Writes one record as a text block, settings lines included, ending with
/// the separator line.
pub fn export_record<W: std::io::Write>(
    out: &mut W,
    record: &Record,
    categories: &CategoryBlock,
) -> Result<()> {
    out.write_all(CATEGORY_PREFIX)
        .wrap_err("writing export text")?;
    out.write_all(categories.label(record.category))
        .wrap_err("writing export text")?;
    writeln!(out, "\"; Secret = {}", record.secret as u8).wrap_err("writing export text")?;

    writeln!(
        out,
        "Places = {}; StripZeros = {}",
        record.places, record.strip_zeros as u8
    )
    .wrap_err("writing export text")?;

    out.write_all(&record.text).wrap_err("writing export text")?;
    out.write_all(&[LINE_SEPARATOR])
        .wrap_err("writing export text")?;
    out.write_all(SEPARATOR).wrap_err("writing export text")?;
    out.write_all(&[LINE_SEPARATOR])
        .wrap_err("writing export text")?;
    Ok(())
}

enum Line {
    Eof,
    Separator,
    /// Line content normalized to end with a single 0x0A.
    Text(Vec<u8>),
}

/// Pulls records out of a text stream one at a time. Category names that
/// are not yet in the table are allocated as a side effect of parsing; a
/// full table silently files the record under Unfiled.
pub struct ImportParser<R> {
    input: R,
}

impl<R: BufRead> ImportParser<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_line(&mut self) -> Result<Line> {
        let mut raw = Vec::new();
        let n = self
            .input
            .read_until(b'\n', &mut raw)
            .wrap_err("reading import text")?;
        if n == 0 {
            return Ok(Line::Eof);
        }
        if raw.starts_with(SEPARATOR) {
            return Ok(Line::Separator);
        }

        let end = raw
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .unwrap_or(raw.len());
        raw.truncate(end);
        raw.push(LINE_SEPARATOR);
        Ok(Line::Text(raw))
    }

    /// Parses the next record block, or `None` at end of input.
    pub fn next_record(&mut self, categories: &mut CategoryBlock) -> Result<Option<Record>> {
        // Skip blank lines so trailing blanks after the last record don't
        // become a spurious empty record.
        let mut line = loop {
            match self.read_line()? {
                Line::Text(content) if content == [LINE_SEPARATOR] => continue,
                Line::Text(content) => break content,
                Line::Eof | Line::Separator => return Ok(None),
            }
        };

        let mut category = UNFILED_CATEGORY;
        let mut secret = false;
        if line.starts_with(CATEGORY_PREFIX) {
            (category, secret) = parse_category_line(&line, categories);
            line = match self.read_line()? {
                Line::Text(content) => content,
                Line::Eof | Line::Separator => return Ok(None),
            };
        }

        let mut places = DEFAULT_PLACES;
        let mut strip_zeros = true;
        if line.starts_with(PLACES_PREFIX) {
            (places, strip_zeros) = parse_places_line(&line);
            line = match self.read_line()? {
                Line::Text(content) => content,
                Line::Eof | Line::Separator => return Ok(None),
            };
        }

        let mut text = line;
        loop {
            match self.read_line()? {
                Line::Text(mut content) => text.append(&mut content),
                Line::Eof | Line::Separator => break,
            }
        }
        // Every accumulated line ends with the separator byte; the stored
        // form drops the final one.
        text.pop();

        Ok(Some(Record {
            category,
            secret,
            places,
            strip_zeros,
            text,
        }))
    }
}

/// Resolves `Category = "<name>"; Secret = <n>` to a slot index and flag,
/// allocating the name if needed and falling back to Unfiled when the table
/// is full.
fn parse_category_line(line: &[u8], categories: &mut CategoryBlock) -> (u8, bool) {
    let rest = &line[CATEGORY_PREFIX.len()..];
    let name_end = rest
        .iter()
        .position(|&b| b == b'"')
        .unwrap_or(rest.len().saturating_sub(1));
    let mut name = &rest[..name_end];
    if name.len() > CATEGORY_NAME_LEN - 1 {
        name = &name[..CATEGORY_NAME_LEN - 1];
    }

    let category = categories
        .lookup(name)
        .or_else(|| categories.allocate(name))
        .unwrap_or(UNFILED_CATEGORY);

    let after_name = &rest[name_end..];
    let secret = match after_name.iter().position(|&b| b == b'=') {
        Some(eq) => parse_int(&after_name[eq + 1..]) != 0,
        None => false,
    };

    (category, secret)
}

/// Resolves `Places = <n>; StripZeros = <n>`.
fn parse_places_line(line: &[u8]) -> (u8, bool) {
    let first_eq = match line.iter().position(|&b| b == b'=') {
        Some(eq) => eq,
        None => return (DEFAULT_PLACES, true),
    };
    let after = &line[first_eq + 1..];
    let places = parse_int(after) as u8;

    let strip_zeros = match after.iter().position(|&b| b == b'=') {
        Some(eq) => parse_int(&after[eq + 1..]) != 0,
        None => false,
    };

    (places, strip_zeros)
}

/// atoi: skip leading ASCII whitespace, take an optional sign and digits,
/// 0 when there are none.
fn parse_int(bytes: &[u8]) -> i32 {
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };
    let mut value: i64 = 0;
    while let Some(digit) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
        value = value * 10 + (digit - b'0') as i64;
        if value > i64::from(i32::MAX) {
            break;
        }
        i += 1;
    }
    let value = if negative { -value } else { value };
    value as i32
}
