//! Compaction
//!
//! Merges a batch of SSTables into one.
//!
//! ## Merge Rules
//! - Tables are replayed oldest → newest into one sorted map, so for a key
//!   present in several tables the newest write wins.
//! - Keys whose winning entry is a tombstone are dropped. This is the only
//!   place deletes are physically reclaimed.
//! - Survivors are written, sorted, into one new table with a fresh bloom
//!   filter. If nothing survives, no table is written.
//!
//! The compactor never deletes anything; the caller removes the sources once
//! the merged table is sealed.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, StrataError};
use crate::memtable::MemTableEntry;

use super::sstable::{SSTable, SSTableBuilder, TableId, TableReader};

/// Counters describing one compaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Source tables absorbed
    pub tables_merged: usize,
    /// Records read across all sources
    pub entries_read: u64,
    /// Records in the merged table
    pub entries_written: u64,
    /// Keys removed because their newest entry was a tombstone
    pub tombstones_dropped: u64,
}

/// Merges SSTables through a [`TableReader`]
pub struct Compactor<'a> {
    reader: &'a dyn TableReader,
    dir: &'a Path,
    bits_per_key: usize,
}

impl<'a> Compactor<'a> {
    pub fn new(reader: &'a dyn TableReader, dir: &'a Path, bits_per_key: usize) -> Self {
        Self {
            reader,
            dir,
            bits_per_key,
        }
    }

    /// Merge `batch`, which must be ordered oldest → newest.
    ///
    /// Returns the sealed merged table (or `None` if every key was deleted)
    /// together with the compaction counters.
    pub fn merge(&self, batch: &[SSTable]) -> Result<(Option<SSTable>, CompactionStats)> {
        let newest = batch
            .iter()
            .map(SSTable::id)
            .max()
            .ok_or_else(|| StrataError::Storage("Cannot compact an empty batch".to_string()))?;

        let mut stats = CompactionStats {
            tables_merged: batch.len(),
            ..Default::default()
        };

        let mut merged: BTreeMap<String, MemTableEntry> = BTreeMap::new();
        for table in batch {
            for (key, entry) in self.reader.scan(table)? {
                stats.entries_read += 1;
                merged.insert(key, entry);
            }
        }

        let before = merged.len();
        merged.retain(|_, entry| !entry.is_tombstone());
        stats.tombstones_dropped = (before - merged.len()) as u64;

        if merged.is_empty() {
            return Ok((None, stats));
        }

        let id = TableId::compacted_from(newest);
        let mut builder = SSTableBuilder::new(self.dir, id, merged.len(), self.bits_per_key)?;
        for (key, entry) in &merged {
            builder.add(key, entry)?;
        }
        let table = builder.finish()?;
        stats.entries_written = table.entry_count();

        Ok((Some(table), stats))
    }
}
