//! SSTable Module
//!
//! Sorted String Table - immutable on-disk sorted key-value storage.
//!
//! ## Files
//! ```text
//! sstables/
//!   sstable_000007_00.sst     ← records, one JSON object per line, sorted by key
//!   sstable_000007_00.bloom   ← bincode-encoded BloomFilter over the same keys
//! ```
//! The two numbers form the [`TableId`]: the flush sequence number and the
//! compaction generation. Ids order tables by recency.
//!
//! A table is written to `<stem>.sst.tmp` and renamed into place only after
//! its data and filter are synced, so a `.sst` file on disk is always complete
//! and always has its filter next to it.

mod builder;
mod reader;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::bloom::BloomFilter;
use crate::error::Result;
use crate::record::RecordIterator;

pub use builder::SSTableBuilder;
pub use reader::{ScanReader, TableReader};

// =============================================================================
// Shared Constants
// =============================================================================

pub(crate) const TABLE_PREFIX: &str = "sstable_";
pub(crate) const TABLE_EXT: &str = "sst";
pub(crate) const BLOOM_EXT: &str = "bloom";
pub(crate) const TMP_EXT: &str = "tmp";

// =============================================================================
// Table Identity
// =============================================================================

/// Recency marker of an SSTable.
///
/// Flushes get `(next_seq, 0)`. A compacted table takes the newest source's
/// `seq` with the generation bumped, so it sorts after every table it absorbed
/// and before every table flushed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableId {
    pub seq: u64,
    pub generation: u32,
}

impl TableId {
    /// Id for a table produced by flush number `seq`
    pub fn flushed(seq: u64) -> Self {
        Self { seq, generation: 0 }
    }

    /// Id for the table that replaces a batch whose newest member is `newest`
    pub fn compacted_from(newest: TableId) -> Self {
        Self {
            seq: newest.seq,
            generation: newest.generation + 1,
        }
    }

    /// "sstable_000042_01"
    pub fn file_stem(&self) -> String {
        format!("{}{:06}_{:02}", TABLE_PREFIX, self.seq, self.generation)
    }

    /// Parse an id from a file stem produced by [`TableId::file_stem`]
    pub fn parse(stem: &str) -> Option<Self> {
        let rest = stem.strip_prefix(TABLE_PREFIX)?;
        let (seq, generation) = rest.split_once('_')?;
        Some(Self {
            seq: seq.parse().ok()?,
            generation: generation.parse().ok()?,
        })
    }

    pub fn table_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}", self.file_stem(), TABLE_EXT))
    }

    pub fn bloom_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}", self.file_stem(), BLOOM_EXT))
    }

    pub(crate) fn tmp_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}.{}", self.file_stem(), TABLE_EXT, TMP_EXT))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.seq, self.generation)
    }
}

// =============================================================================
// SSTable Handle
// =============================================================================

/// Handle to a sealed SSTable: identity, file locations and its bloom filter.
///
/// The filter stays in memory; the records stay on disk and are read through
/// a [`TableReader`].
#[derive(Debug, Clone)]
pub struct SSTable {
    pub(crate) id: TableId,
    pub(crate) path: PathBuf,
    pub(crate) bloom_path: PathBuf,
    pub(crate) entry_count: u64,
    pub(crate) file_size: u64,
    pub(crate) bloom: BloomFilter,
}

impl SSTable {
    /// Open an existing table in `dir`.
    ///
    /// Counts its records and loads its bloom filter. A missing or unreadable
    /// filter is rebuilt from the keys and written back.
    pub fn open(dir: &Path, id: TableId, bits_per_key: usize) -> Result<Self> {
        let path = id.table_path(dir);
        let bloom_path = id.bloom_path(dir);
        let file_size = fs::metadata(&path)?.len();

        let mut keys = Vec::new();
        for record in RecordIterator::open(&path)? {
            keys.push(record?.key);
        }

        let bloom = match BloomFilter::load(&bloom_path) {
            Ok(bloom) => bloom,
            Err(e) => {
                warn!(table = %id, error = %e, "rebuilding bloom filter");
                let mut bloom = BloomFilter::with_expected_keys(keys.len(), bits_per_key);
                for key in &keys {
                    bloom.add(key);
                }
                bloom.save(&bloom_path)?;
                bloom
            }
        };

        Ok(Self {
            id,
            path,
            bloom_path,
            entry_count: keys.len() as u64,
            file_size,
            bloom,
        })
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bloom_path(&self) -> &Path {
        &self.bloom_path
    }

    /// Get the number of entries (tombstones included)
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn bloom(&self) -> &BloomFilter {
        &self.bloom
    }

    /// Bloom check: `false` means the key is certainly not in this table
    pub fn might_contain(&self, key: &str) -> bool {
        self.bloom.check(key)
    }

    /// Delete the table and its filter from disk
    pub(crate) fn remove_files(&self) -> Result<()> {
        fs::remove_file(&self.path)?;
        match fs::remove_file(&self.bloom_path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
