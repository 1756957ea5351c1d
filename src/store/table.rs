//! CSV encoding of feedback tables.
//!
//! Tables are UTF-8 with a byte-order mark so spreadsheet tools keep non-ASCII
//! text intact, followed by a `timestamp,feedback` header and one row per
//! submission.

use csv::{Terminator, Trim, Writer, WriterBuilder};

use super::models::FeedbackEntry;
use super::StoreError;

pub const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
pub const HEADER: [&str; 2] = ["timestamp", "feedback"];

fn writer(buf: Vec<u8>) -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, StoreError> {
    writer
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))
}

/// BOM plus header row: the content of a table with no submissions.
pub fn header() -> Result<Vec<u8>, StoreError> {
    let mut w = writer(BOM.to_vec());
    w.write_record(HEADER)?;
    finish(w)
}

/// A single data row, newline-terminated.
pub fn encode_row(entry: &FeedbackEntry) -> Result<Vec<u8>, StoreError> {
    let mut w = writer(Vec::new());
    w.serialize(entry)?;
    finish(w)
}

/// A complete table.
pub fn render(entries: &[FeedbackEntry]) -> Result<Vec<u8>, StoreError> {
    let mut w = writer(BOM.to_vec());
    w.write_record(HEADER)?;
    for entry in entries {
        w.serialize(entry)?;
    }
    finish(w)
}

/// Result of reading a table: the rows that decoded, and the ones that didn't.
#[derive(Debug, Default)]
pub struct ParsedTable {
    pub entries: Vec<FeedbackEntry>,
    pub skipped: Vec<csv::Error>,
}

/// Parse a complete table row by row. The BOM is optional. A row that fails
/// to decode is set aside in `skipped` and the rows around it are kept.
pub fn parse(bytes: &[u8]) -> ParsedTable {
    let body = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(body);

    let mut parsed = ParsedTable::default();
    for row in reader.deserialize::<FeedbackEntry>() {
        match row {
            Ok(entry) => parsed.entries.push(entry),
            Err(e) => parsed.skipped.push(e),
        }
    }
    parsed
}

/// Line number of a row error, when the reader knows it.
pub fn error_line(e: &csv::Error) -> Option<u64> {
    e.position().map(|p| p.line())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn entry(ts: &str, text: &str) -> FeedbackEntry {
        FeedbackEntry {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            feedback: text.to_string(),
        }
    }

    #[test]
    fn test_header_has_bom() {
        let bytes = header().unwrap();
        assert!(bytes.starts_with(BOM));
        assert_eq!(&bytes[BOM.len()..], b"timestamp,feedback\n");
    }

    #[test]
    fn test_encode_row_quotes_commas() {
        let bytes = encode_row(&entry("2025-03-04 09:15:00", "slow, but clear")).unwrap();
        assert_eq!(bytes, b"2025-03-04 09:15:00,\"slow, but clear\"\n");
    }

    #[test]
    fn test_header_then_rows_matches_render() {
        let entries = vec![
            entry("2025-03-04 09:15:00", "Great explanation!"),
            entry("2025-03-04 09:16:30", "설명이 좋았어요"),
        ];
        let mut appended = header().unwrap();
        for e in &entries {
            appended.extend(encode_row(e).unwrap());
        }
        assert_eq!(appended, render(&entries).unwrap());
    }

    #[test]
    fn test_parse_reads_rendered_table() {
        let entries = vec![
            entry("2025-03-04 09:15:00", "Great explanation!"),
            entry("2025-03-04 09:16:30", "said \"wow\", twice"),
        ];
        let parsed = parse(&render(&entries).unwrap());
        assert_eq!(parsed.entries, entries);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_parse_accepts_missing_bom_and_spaced_header() {
        let raw = b"timestamp, feedback\n2025-03-04 09:15:00,ok\n";
        let parsed = parse(raw);
        assert_eq!(parsed.entries, vec![entry("2025-03-04 09:15:00", "ok")]);
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        let parsed = parse(&header().unwrap());
        assert!(parsed.entries.is_empty());
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_parse_skips_bad_rows_and_keeps_the_rest() {
        let raw = b"timestamp,feedback\n\
            2025-03-04 09:15:00,first\n\
            yesterday,bad stamp\n\
            2025-03-04 09:16:00,second\n\
            2025-03-04 09:1\n";
        let parsed = parse(raw);
        assert_eq!(
            parsed.entries,
            vec![
                entry("2025-03-04 09:15:00", "first"),
                entry("2025-03-04 09:16:00", "second"),
            ]
        );
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(error_line(&parsed.skipped[0]), Some(3));
        assert_eq!(error_line(&parsed.skipped[1]), Some(5));
    }
}
