//! Line records
//!
//! The WAL and SSTable files share one self-describing format: a JSON object
//! per line.
//!
//! ```text
//! {"key":"apple","value":"red"}
//! {"key":"banana","value":null}      ← tombstone
//! ```
//!
//! `null` is the tombstone. No legal value can collide with it because every
//! live value is a JSON string.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, StrataError};
use crate::memtable::MemTableEntry;

/// One `{key, value}` record; `value == None` marks a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: Option<String>,
}

impl Record {
    /// Build a record from a memtable entry
    pub fn new(key: impl Into<String>, entry: &MemTableEntry) -> Self {
        let value = match entry {
            MemTableEntry::Value(v) => Some(v.clone()),
            MemTableEntry::Tombstone => None,
        };
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }

    /// Split into key and memtable entry
    pub fn into_entry(self) -> (String, MemTableEntry) {
        let entry = match self.value {
            Some(v) => MemTableEntry::Value(v),
            None => MemTableEntry::Tombstone,
        };
        (self.key, entry)
    }

    /// Encode as a single line (no trailing newline)
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one raw line; bytes that are not UTF-8 count as corruption
    pub fn decode_bytes(path: &Path, line: usize, bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| StrataError::CorruptRecord {
            path: path.to_path_buf(),
            line,
            reason: e.to_string(),
        })?;
        Self::decode(path, line, text)
    }

    /// Decode one line, reporting where a corrupt line came from
    pub fn decode(path: &Path, line: usize, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| StrataError::CorruptRecord {
            path: path.to_path_buf(),
            line,
            reason: e.to_string(),
        })
    }
}

/// Iterator over the records of a line-record file.
///
/// Corrupt lines (bad JSON or bad UTF-8, including a line torn by a crash
/// mid-append) are logged and skipped; only I/O failures are yielded as
/// errors. Blank lines are ignored.
pub struct RecordIterator {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    line_no: usize,
    corrupted: usize,
}

impl RecordIterator {
    /// Open `path` for sequential reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            buf: Vec::new(),
            line_no: 0,
            corrupted: 0,
        })
    }

    /// Number of corrupt lines skipped so far
    pub fn corrupted(&self) -> usize {
        self.corrupted
    }
}

impl Iterator for RecordIterator {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(StrataError::Io(e))),
            }
            self.line_no += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match Record::decode_bytes(&self.path, self.line_no, &self.buf) {
                Ok(record) => return Some(Ok(record)),
                Err(e) => {
                    warn!(error = %e, "skipping corrupt record");
                    self.corrupted += 1;
                }
            }
        }
    }
}
