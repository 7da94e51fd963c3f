//! MemTable implementation
//!
//! BTreeMap-based memtable that owns the WAL of its generation.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::record::Record;
use crate::wal::WalWriter;

use super::MemTableEntry;

/// In-memory table for recent writes
pub struct MemTable {
    /// Sorted key → latest entry
    data: BTreeMap<String, MemTableEntry>,
    /// Entry count at which the table must be flushed
    threshold: usize,
    /// Log for this generation; every key in `data` has a record here
    wal: WalWriter,
}

impl MemTable {
    /// Create an empty MemTable that logs to `wal`
    pub fn new(threshold: usize, wal: WalWriter) -> Self {
        Self {
            data: BTreeMap::new(),
            threshold,
            wal,
        }
    }

    /// Log and apply a write.
    ///
    /// The WAL append completes before the map is touched; if it fails the
    /// error is returned and the map is left as it was. Returns `true` once
    /// the table holds `threshold` or more keys.
    pub fn set(&mut self, key: String, entry: MemTableEntry) -> Result<bool> {
        self.wal.append(&Record::new(key.as_str(), &entry))?;
        self.data.insert(key, entry);
        Ok(self.is_full())
    }

    /// Latest entry for `key` in this generation, tombstones included
    pub fn get(&self, key: &str) -> Option<&MemTableEntry> {
        self.data.get(key)
    }

    /// Forget all entries and start a new WAL generation.
    ///
    /// Only call this once the entries are durable in an SSTable.
    pub fn clear(&mut self) -> Result<()> {
        self.wal.reset()?;
        self.data.clear();
        Ok(())
    }

    /// Entries in sorted key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, MemTableEntry> {
        self.data.iter()
    }

    /// Number of distinct keys (tombstones count)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() >= self.threshold
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The WAL of the current generation
    pub fn wal(&self) -> &WalWriter {
        &self.wal
    }

    /// Sync any buffered WAL records
    pub fn sync_wal(&mut self) -> Result<()> {
        self.wal.sync()
    }
}
