//! Storage Manager
//!
//! Manages the set of SSTables and coordinates reads, flushes and compaction.
//!
//! ## Responsibilities
//! - Discover existing SSTables on startup
//! - Search SSTables newest → oldest for reads, bloom filter first
//! - Create new SSTables from MemTable flushes
//! - Replace compacted batches and remove their files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, StrataError};
use crate::memtable::{MemTable, MemTableEntry};

use super::compaction::{CompactionStats, Compactor};
use super::sstable::{
    SSTable, SSTableBuilder, ScanReader, TableId, TableReader, BLOOM_EXT, TABLE_EXT, TMP_EXT,
};

/// Manages the storage layer
///
/// Not internally synchronized: the engine holds it behind its own lock
/// together with the memtable, so a flush or compaction is published in one
/// step.
pub struct StorageManager {
    /// Directory where SSTables are stored
    data_dir: PathBuf,

    /// Sealed tables, ordered oldest → newest
    sstables: Vec<SSTable>,

    /// Sequence number for the next flushed table
    next_seq: u64,

    /// Bloom filter density for new tables
    bits_per_key: usize,

    /// How table files are read
    reader: Box<dyn TableReader>,
}

impl StorageManager {
    /// Open or create storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Remove temp files and orphaned filters left by interrupted writes
    /// 3. Discover existing SSTable files
    /// 4. Open each (bloom filters load into memory), ordered by id
    pub fn open(path: &Path, bits_per_key: usize) -> Result<Self> {
        Self::open_with_reader(path, bits_per_key, Box::new(ScanReader))
    }

    /// Like [`StorageManager::open`], reading tables through `reader`
    pub fn open_with_reader(
        path: &Path,
        bits_per_key: usize,
        reader: Box<dyn TableReader>,
    ) -> Result<Self> {
        fs::create_dir_all(path)?;

        let mut ids: Vec<TableId> = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if !file_path.is_file() {
                continue;
            }

            match file_path.extension().and_then(|e| e.to_str()) {
                Some(TMP_EXT) => {
                    warn!(path = %file_path.display(), "removing unfinished table");
                    fs::remove_file(&file_path)?;
                }
                Some(TABLE_EXT) => {
                    if let Some(id) = Self::parse_table_id(&file_path) {
                        ids.push(id);
                    }
                }
                Some(BLOOM_EXT) if !file_path.with_extension(TABLE_EXT).exists() => {
                    warn!(path = %file_path.display(), "removing orphaned bloom filter");
                    fs::remove_file(&file_path)?;
                }
                _ => {}
            }
        }

        ids.sort();

        let mut sstables = Vec::with_capacity(ids.len());
        for id in &ids {
            sstables.push(SSTable::open(path, *id, bits_per_key)?);
        }

        let next_seq = ids.iter().map(|id| id.seq).max().map_or(1, |seq| seq + 1);

        if !sstables.is_empty() {
            info!(tables = sstables.len(), next_seq, "discovered existing SSTables");
        }

        Ok(Self {
            data_dir: path.to_path_buf(),
            sstables,
            next_seq,
            bits_per_key,
            reader,
        })
    }

    /// Get the newest entry for `key` across all SSTables
    ///
    /// Returns:
    /// - `Ok(Some(Value))` — key found with value
    /// - `Ok(Some(Tombstone))` — newest record is a delete
    /// - `Ok(None)` — no table holds the key
    pub fn get(&self, key: &str) -> Result<Option<MemTableEntry>> {
        for table in self.sstables.iter().rev() {
            if !table.might_contain(key) {
                continue;
            }

            if let Some(entry) = self.reader.get(table, key)? {
                return Ok(Some(entry));
            }
            debug!(table = %table.id(), key, "bloom filter false positive");
        }

        Ok(None)
    }

    /// Flush a MemTable to a new SSTable
    ///
    /// The table is appended to the list only after its file and bloom
    /// filter are sealed. The memtable itself is left untouched.
    pub fn flush(&mut self, memtable: &MemTable) -> Result<TableId> {
        if memtable.is_empty() {
            return Err(StrataError::Storage(
                "Cannot flush empty MemTable".to_string(),
            ));
        }

        let id = TableId::flushed(self.next_seq);
        let mut builder = SSTableBuilder::new(&self.data_dir, id, memtable.len(), self.bits_per_key)?;
        for (key, entry) in memtable.iter() {
            builder.add(key, entry)?;
        }
        let table = builder.finish()?;

        // Only consume the sequence number once the table exists
        self.next_seq += 1;
        info!(
            table = %id,
            entries = table.entry_count(),
            bytes = table.file_size(),
            "flushed memtable"
        );
        self.sstables.push(table);

        Ok(id)
    }

    /// Merge the oldest `batch_size` tables (or all, if fewer) into one.
    ///
    /// Returns `None` when there are fewer than two tables to merge.
    pub fn compact(&mut self, batch_size: usize) -> Result<Option<CompactionStats>> {
        let n = batch_size.min(self.sstables.len());
        if n < 2 {
            return Ok(None);
        }

        let (merged, stats) = Compactor::new(self.reader.as_ref(), &self.data_dir, self.bits_per_key)
            .merge(&self.sstables[..n])?;

        // The merged table is sealed; swap it in where the batch was, ahead
        // of the newer tables, then reclaim the sources.
        let merged_id = merged.as_ref().map(SSTable::id);
        let sources: Vec<SSTable> = self.sstables.splice(..n, merged).collect();

        let mut first_err = None;
        for table in &sources {
            if let Err(e) = table.remove_files() {
                warn!(table = %table.id(), error = %e, "failed to remove compacted table");
                first_err.get_or_insert(e);
            }
        }

        info!(
            merged = stats.tables_merged,
            into = ?merged_id,
            entries_read = stats.entries_read,
            entries_written = stats.entries_written,
            tombstones_dropped = stats.tombstones_dropped,
            "compacted SSTables"
        );

        match first_err {
            Some(e) => Err(e),
            None => Ok(Some(stats)),
        }
    }

    /// Remove every table from disk and forget it, newest first, so a
    /// failure leaves a consistent oldest prefix behind
    pub fn clear(&mut self) -> Result<()> {
        while let Some(table) = self.sstables.last() {
            table.remove_files()?;
            self.sstables.pop();
        }
        Ok(())
    }

    /// Every entry of `table`, in key order
    pub fn scan(&self, table: &SSTable) -> Result<Vec<(String, MemTableEntry)>> {
        self.reader.scan(table)
    }

    /// Tables ordered oldest → newest
    pub fn tables(&self) -> &[SSTable] {
        &self.sstables
    }

    /// Ids ordered oldest → newest
    pub fn table_ids(&self) -> Vec<TableId> {
        self.sstables.iter().map(SSTable::id).collect()
    }

    /// Get the number of SSTables
    pub fn sstable_count(&self) -> usize {
        self.sstables.len()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the next flush sequence number (for testing/debugging)
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// "sstable_000042_00.sst" → Some(TableId { seq: 42, generation: 0 })
    fn parse_table_id(path: &Path) -> Option<TableId> {
        let stem = path.file_stem()?.to_str()?;
        TableId::parse(stem)
    }
}
