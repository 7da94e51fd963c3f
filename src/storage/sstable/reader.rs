//! SSTable Readers
//!
//! How records are fetched from a table file. The engine only talks to the
//! [`TableReader`] trait, so an index-assisted reader can replace the scanning
//! one without touching the read path.

use crate::error::Result;
use crate::memtable::MemTableEntry;
use crate::record::RecordIterator;

use super::SSTable;

/// Reads records out of sealed SSTables
pub trait TableReader: Send + Sync {
    /// Entry stored for `key`, or `None` if the table has no record for it.
    /// A tombstone comes back as `Some(MemTableEntry::Tombstone)`.
    fn get(&self, table: &SSTable, key: &str) -> Result<Option<MemTableEntry>>;

    /// Every entry of the table in key order
    fn scan(&self, table: &SSTable) -> Result<Vec<(String, MemTableEntry)>>;
}

/// Reopens the file on every call and reads it line by line.
///
/// Lookups stop early once they pass the key, since tables are sorted.
/// Corrupt lines are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanReader;

impl TableReader for ScanReader {
    fn get(&self, table: &SSTable, key: &str) -> Result<Option<MemTableEntry>> {
        for record in RecordIterator::open(table.path())? {
            let record = record?;
            if record.key.as_str() == key {
                return Ok(Some(record.into_entry().1));
            }
            if record.key.as_str() > key {
                break;
            }
        }
        Ok(None)
    }

    fn scan(&self, table: &SSTable) -> Result<Vec<(String, MemTableEntry)>> {
        RecordIterator::open(table.path())?
            .map(|record| record.map(|r| r.into_entry()))
            .collect()
    }
}
