//! Streaming writers for lookup tables and event books
//!
//! Records are appended as they are produced; nothing is buffered beyond the
//! underlying `BufWriter`. Both writers can hash what they write so the
//! manifest digest costs no second pass over the file.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{self, Write};

use crate::event::BookEvent;

/// Row terminator of the lookup table (RFC 4180)
pub const TABLE_LINE_TERMINATOR: &str = "\r\n";

/// Separator between event-book records (no trailing separator)
pub const BOOK_RECORD_SEPARATOR: &[u8] = b"\n";

/// One lookup table row: `id,weight,payout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: u64,
    pub weight: u64,
    /// Fixed-point payout multiplier (0 for losses)
    pub payout: u64,
}

/// One event-book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u64,
    pub events: Vec<BookEvent>,
    #[serde(rename = "payoutMultiplier")]
    pub payout_multiplier: u64,
}

/// Writer that feeds every byte it forwards into a SHA-256 digest
pub struct DigestWriter<W: Write> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Flush and return the inner writer with the hex digest
    pub fn finish(mut self) -> io::Result<(W, String)> {
        self.inner.flush()?;
        let digest = hex::encode(self.hasher.finalize());
        Ok((self.inner, digest))
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Totals accumulated while writing a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableTotals {
    pub rows: u64,
    pub total_weight: u128,
    pub win_rows: u64,
    pub win_weight: u128,
}

/// Streaming lookup table writer
pub struct TableWriter<W: Write> {
    inner: W,
    totals: TableTotals,
}

impl<W: Write> TableWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            totals: TableTotals::default(),
        }
    }

    /// Append one row
    pub fn write_row(&mut self, row: &TableRow) -> io::Result<()> {
        write!(
            self.inner,
            "{},{},{}{}",
            row.id, row.weight, row.payout, TABLE_LINE_TERMINATOR
        )?;
        self.totals.rows += 1;
        self.totals.total_weight += row.weight as u128;
        if row.payout > 0 {
            self.totals.win_rows += 1;
            self.totals.win_weight += row.weight as u128;
        }
        Ok(())
    }

    /// Flush and hand back the writer
    pub fn finish(mut self) -> io::Result<(W, TableTotals)> {
        self.inner.flush()?;
        Ok((self.inner, self.totals))
    }
}

/// Streaming event-book writer (one compact JSON object per line)
pub struct BookWriter<W: Write> {
    inner: W,
    records: u64,
}

impl<W: Write> BookWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Append one record
    pub fn write_record(&mut self, record: &BookRecord) -> io::Result<()> {
        if self.records > 0 {
            self.inner.write_all(BOOK_RECORD_SEPARATOR)?;
        }
        serde_json::to_writer(&mut self.inner, record).map_err(io::Error::from)?;
        self.records += 1;
        Ok(())
    }

    /// Flush and hand back the writer
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        self.inner.flush()?;
        Ok((self.inner, self.records))
    }
}

/// Hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::narrate;
    use rv_math::BucketKind;

    #[test]
    fn test_table_rows() {
        let mut writer = TableWriter::new(Vec::new());
        writer
            .write_row(&TableRow { id: 1, weight: 10, payout: 117 })
            .unwrap();
        writer
            .write_row(&TableRow { id: 2, weight: 9, payout: 0 })
            .unwrap();
        let (bytes, totals) = writer.finish().unwrap();

        assert_eq!(String::from_utf8(bytes).unwrap(), "1,10,117\r\n2,9,0\r\n");
        assert_eq!(totals.rows, 2);
        assert_eq!(totals.total_weight, 19);
        assert_eq!(totals.win_rows, 1);
        assert_eq!(totals.win_weight, 10);
    }

    #[test]
    fn test_book_records_have_no_trailing_newline() {
        let mut writer = BookWriter::new(Vec::new());
        for id in 1..=2 {
            writer
                .write_record(&BookRecord {
                    id,
                    events: narrate(BucketKind::Win, 1, id, 6),
                    payout_multiplier: 117,
                })
                .unwrap();
        }
        let (bytes, records) = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(records, 2);
        assert_eq!(text.lines().count(), 2);
        assert!(!text.ends_with('\n'));
        assert!(text.starts_with(r#"{"id":1,"events":[{"type":"spin","chamber":2,"#));
        assert!(text.contains(r#""payoutMultiplier":117}"#));

        let first: BookRecord = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first.id, 1);
    }

    #[test]
    fn test_digest_writer_matches_one_shot_hash() {
        let mut writer = DigestWriter::new(Vec::new());
        writer.write_all(b"1,10,117\r\n").unwrap();
        writer.write_all(b"2,9,0\r\n").unwrap();

        let (bytes, digest) = writer.finish().unwrap();
        assert_eq!(bytes.len(), 17);
        assert_eq!(digest, sha256_hex(&bytes));
        assert_eq!(digest.len(), 64);
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_book_write_failure_carries_path() {
        let mut writer = BookWriter::new(FullDisk);
        let record = BookRecord {
            id: 1,
            events: narrate(BucketKind::Loss, 5, 1, 6),
            payout_multiplier: 0,
        };

        let path = std::path::Path::new("books/books_mode_5_bullet.jsonl");
        let err = writer
            .write_record(&record)
            .map_err(crate::error::BookError::at(path))
            .unwrap_err();

        assert!(err.to_string().contains("books_mode_5_bullet.jsonl"));
        assert!(matches!(err, crate::error::BookError::File { .. }));
    }
}
