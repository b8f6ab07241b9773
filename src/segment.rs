//! Schema segmentation of semicolon-separated input.
//!
//! Consecutive records with the same number of fields form a [`Part`]: the
//! first record of a run is its header, the rest are body rows. A record with
//! a different field count closes the current part and becomes the header of
//! the next one. The split is greedy and never looks back.

use crate::error::{Error, IoContext, Result};
use std::io::Read;
use std::iter::Peekable;
use std::str::Chars;

/// Field delimiter of the input.
pub const DELIMITER: u8 = b';';

/// One run of records sharing a column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Record number of the header (1-based)
    pub first_line: usize,
    /// Record number of the last record in the part (inclusive)
    pub last_line: usize,
    /// Column names
    pub head: Vec<String>,
    /// Widest body field per column, in characters
    pub widths: Vec<usize>,
    /// Body records, header excluded
    pub rows: Vec<Vec<String>>,
}

impl Part {
    fn new(line: usize, head: Vec<String>) -> Self {
        let widths = vec![0; head.len()];
        Self {
            first_line: line,
            last_line: line,
            head,
            widths,
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, line: usize, row: Vec<String>) {
        for (width, field) in self.widths.iter_mut().zip(&row) {
            *width = (*width).max(field.chars().count());
        }
        self.rows.push(row);
        self.last_line = line;
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.head.len()
    }

    /// Number of body rows, `last_line - first_line`.
    pub fn body_rows(&self) -> usize {
        self.last_line - self.first_line
    }

    /// Per-column width with the header label taken into account.
    pub fn display_widths(&self) -> Vec<usize> {
        self.head
            .iter()
            .zip(&self.widths)
            .map(|(h, &w)| h.chars().count().max(w))
            .collect()
    }

    /// Sum of [`Part::display_widths`].
    pub fn total_width(&self) -> usize {
        self.display_widths().iter().sum()
    }
}

/// Incremental segmenter fed one record at a time.
#[derive(Debug, Default)]
pub struct Segmenter {
    parts: Vec<Part>,
    current: Option<Part>,
    line: usize,
}

impl Segmenter {
    /// Create an empty segmenter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next record.
    pub fn push_record(&mut self, record: Vec<String>) {
        self.line += 1;
        let line = self.line;

        match self.current.as_mut() {
            Some(part) if part.column_count() == record.len() => {
                part.push_row(line, record);
            },
            Some(part) => {
                log::info!(
                    "new part with {} cols (previous part had {})",
                    record.len(),
                    part.column_count()
                );
                let done = std::mem::replace(part, Part::new(line, record));
                self.parts.push(done);
            },
            None => {
                self.current = Some(Part::new(line, record));
            },
        }
    }

    /// Number of records fed so far.
    pub fn records_seen(&self) -> usize {
        self.line
    }

    /// Close the last part and return all parts in input order.
    pub fn finish(mut self) -> Result<Vec<Part>> {
        let last = self.current.take().ok_or(Error::EmptyInput)?;
        self.parts.push(last);
        Ok(self.parts)
    }
}

/// CSV reader for strict, fully quoted input.
///
/// Semicolon delimited, doubled quotes as escapes, ragged records allowed,
/// no header handling. [`segment_str`] feeds it the output of [`requote`].
pub fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(b'"')
        .double_quote(true)
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
}

const DELIMITER_CHAR: char = DELIMITER as char;

enum FieldEnd {
    Delimiter,
    Line,
    Eof,
}

/// Rewrite loosely quoted input as strict CSV with every field quoted.
///
/// Leading whitespace of a field is dropped before the quote check, so
/// `1; "x;y"` keeps its quoted delimiter. Inside a quoted field, a quote
/// that is not doubled and not followed by a delimiter or line end is kept
/// as data and the field goes on. Quotes inside unquoted fields are data.
/// An unterminated quoted field ends at the end of input. Empty lines are
/// passed through so the reader skips them.
pub fn requote(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut chars = text.chars().peekable();

    while chars.peek().is_some() {
        if chars.next_if_eq(&'\n').is_some() {
            out.push('\n');
            continue;
        }

        loop {
            while chars.next_if(|c| c.is_whitespace() && *c != '\n').is_some() {}

            out.push('"');
            let end = if chars.next_if_eq(&'"').is_some() {
                quoted_field(&mut chars, &mut out)
            } else {
                bare_field(&mut chars, &mut out)
            };
            out.push('"');

            match end {
                FieldEnd::Delimiter => out.push(DELIMITER_CHAR),
                FieldEnd::Line => {
                    out.push('\n');
                    break;
                },
                FieldEnd::Eof => break,
            }
        }
    }
    out
}

fn bare_field(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> FieldEnd {
    for c in chars.by_ref() {
        match c {
            DELIMITER_CHAR => return FieldEnd::Delimiter,
            '\n' => return FieldEnd::Line,
            '"' => out.push_str("\"\""),
            _ => out.push(c),
        }
    }
    FieldEnd::Eof
}

fn quoted_field(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> FieldEnd {
    while let Some(c) = chars.next() {
        if c != '"' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some(&'"') => {
                chars.next();
                out.push_str("\"\"");
            },
            Some(&DELIMITER_CHAR) => {
                chars.next();
                return FieldEnd::Delimiter;
            },
            Some(&'\n') => {
                chars.next();
                return FieldEnd::Line;
            },
            None => return FieldEnd::Eof,
            // bare quote
            Some(_) => out.push_str("\"\""),
        }
    }
    FieldEnd::Eof
}

/// Split the records of `input` into parts.
pub fn segment<R: Read>(mut input: R) -> Result<Vec<Part>> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .context(|| "error reading CSV input")?;
    segment_str(&text)
}

/// Split already decoded text into parts.
pub fn segment_str(text: &str) -> Result<Vec<Part>> {
    let strict = requote(text);
    let mut reader = csv_reader(strict.as_bytes());
    let mut segmenter = Segmenter::new();

    for result in reader.records() {
        let record = result?;
        segmenter.push_record(record.iter().map(str::to_string).collect());
    }

    log::debug!("read {} records", segmenter.records_seen());
    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_part() {
        let parts = segment_str("a;b\n1;22\n333;4\n").unwrap();
        assert_eq!(parts.len(), 1);
        let p = &parts[0];
        assert_eq!(p.head, rec(&["a", "b"]));
        assert_eq!(p.widths, vec![3, 2]);
        assert_eq!((p.first_line, p.last_line), (1, 3));
        assert_eq!(p.body_rows(), 2);
        assert_eq!(p.rows.len(), 2);
    }

    #[test]
    fn test_header_only() {
        let parts = segment_str("name;value\n").unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].widths, vec![0, 0]);
        assert_eq!((parts[0].first_line, parts[0].last_line), (1, 1));
        assert_eq!(parts[0].body_rows(), 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(segment_str(""), Err(Error::EmptyInput)));
        assert!(matches!(segment_str("\n\n"), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_leading_space_trimmed_only() {
        let parts = segment_str("h1; h2\n  x ;   yy\n").unwrap();
        assert_eq!(parts[0].head, rec(&["h1", "h2"]));
        assert_eq!(parts[0].rows[0], rec(&["x ", "yy"]));
        assert_eq!(parts[0].widths, vec![2, 2]);
    }

    #[test]
    fn test_width_counts_characters() {
        let parts = segment_str("név\nárvíztűrő\n").unwrap();
        assert_eq!(parts[0].widths, vec![9]);
    }

    #[test]
    fn test_quoted_delimiter_and_stray_quote() {
        let parts = segment_str("a;b\n\"x;y\";z\nab\"c;d\n").unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].rows[0], rec(&["x;y", "z"]));
        assert_eq!(parts[0].rows[1], rec(&["ab\"c", "d"]));
    }

    #[test]
    fn test_requote_trims_before_quote_check() {
        assert_eq!(requote("1; \"x;y\"\n"), "\"1\";\"x;y\"\n");
        assert_eq!(requote("a;\n\n  \n"), "\"a\";\"\"\n\n\"\"\n");
    }

    #[test]
    fn test_requote_keeps_bare_quotes() {
        assert_eq!(requote("\"ab\"c\";d"), "\"ab\"\"c\";\"d\"");
        assert_eq!(requote("ab\"c"), "\"ab\"\"c\"");
        // unterminated quoted field runs to the end of input
        assert_eq!(requote("\"open;x\n"), "\"open;x\n\"");
    }

    #[test]
    fn test_quoted_field_keeps_inner_space() {
        let parts = segment_str("a;b\n \"  x\"; \"\"\"y\"\"\"\r\n").unwrap();
        assert_eq!(parts[0].rows[0], rec(&["  x", "\"y\""]));
    }

    #[test]
    fn test_whitespace_only_line_is_a_record() {
        let parts = segment_str("a\n   \nb\n").unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].rows, vec![rec(&[""]), rec(&["b"])]);
    }

    #[test]
    fn test_segmenter_break_starts_new_part() {
        let mut s = Segmenter::new();
        s.push_record(rec(&["a", "b"]));
        s.push_record(rec(&["1", "2"]));
        s.push_record(rec(&["x", "y", "z"]));
        s.push_record(rec(&["1", "2", "3"]));
        let parts = s.finish().unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!((parts[0].first_line, parts[0].last_line), (1, 2));
        assert_eq!((parts[1].first_line, parts[1].last_line), (3, 4));
        assert_eq!(parts[1].head, rec(&["x", "y", "z"]));
    }

    #[test]
    fn test_display_widths_include_header() {
        let parts = segment_str("long header;b\n1;12345\n").unwrap();
        assert_eq!(parts[0].display_widths(), vec![11, 5]);
        assert_eq!(parts[0].total_width(), 16);
    }
}
