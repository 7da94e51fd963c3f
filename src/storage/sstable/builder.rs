//! SSTable Builder
//!
//! Writes sorted entries to a new SSTable file and builds its bloom filter
//! along the way.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::bloom::BloomFilter;
use crate::error::{Result, StrataError};
use crate::memtable::MemTableEntry;
use crate::record::Record;

use super::{SSTable, TableId};

/// Builder for creating new SSTables from sorted entries
pub struct SSTableBuilder {
    id: TableId,
    /// Directory the finished table lands in
    dir: PathBuf,
    /// Where records go until the table is sealed
    tmp_path: PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
    /// Filter over every key written
    bloom: BloomFilter,
    /// Number of entries written
    entry_count: u64,
    /// Enforces strictly increasing keys
    last_key: Option<String>,
    /// Set once the table is in place; otherwise Drop removes the temp file
    sealed: bool,
}

impl SSTableBuilder {
    /// Create a new SSTable builder
    ///
    /// `expected_keys` sizes the bloom filter. Call `add()` in sorted order,
    /// then `finish()` to seal the table.
    pub fn new(dir: &Path, id: TableId, expected_keys: usize, bits_per_key: usize) -> Result<Self> {
        let tmp_path = id.tmp_path(dir);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        Ok(Self {
            id,
            dir: dir.to_path_buf(),
            tmp_path,
            writer: BufWriter::new(file),
            bloom: BloomFilter::with_expected_keys(expected_keys, bits_per_key),
            entry_count: 0,
            last_key: None,
            sealed: false,
        })
    }

    /// Add an entry (keys must be strictly increasing)
    pub fn add(&mut self, key: &str, entry: &MemTableEntry) -> Result<()> {
        if let Some(last) = &self.last_key {
            if key <= last.as_str() {
                return Err(StrataError::Storage(format!(
                    "SSTable keys out of order: {:?} after {:?}",
                    key, last
                )));
            }
        }

        let mut line = Record::new(key, entry).encode()?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;

        self.bloom.add(key);
        self.entry_count += 1;
        self.last_key = Some(key.to_string());

        Ok(())
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Sync the records, persist the filter, then move the table into place
    pub fn finish(mut self) -> Result<SSTable> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;

        let bloom_path = self.id.bloom_path(&self.dir);
        self.bloom.save(&bloom_path)?;

        let path = self.id.table_path(&self.dir);
        fs::rename(&self.tmp_path, &path)?;
        self.sealed = true;

        let file_size = fs::metadata(&path)?.len();

        Ok(SSTable {
            id: self.id,
            path,
            bloom_path,
            entry_count: self.entry_count,
            file_size,
            bloom: self.bloom.clone(),
        })
    }
}

impl Drop for SSTableBuilder {
    fn drop(&mut self) {
        if !self.sealed {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}
