//! Configuration for StrataKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, StrataError};

/// Main configuration for a StrataKV engine
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files (WAL, SSTables, bloom filters)
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log          (write-ahead log)
    ///     └── sstables/        (SSTable + bloom filter files)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Number of distinct keys in the memtable that forces a flush
    pub memtable_threshold: usize,

    // -------------------------------------------------------------------------
    // Compaction Configuration
    // -------------------------------------------------------------------------
    /// SSTable count that triggers compaction; also the batch size merged
    pub compaction_threshold: usize,

    // -------------------------------------------------------------------------
    // Bloom Filter Configuration
    // -------------------------------------------------------------------------
    /// Bits allocated per key when sizing an SSTable's bloom filter
    pub bloom_bits_per_key: usize,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (trades the per-write durability
    /// guarantee for throughput)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./stratakv_data"),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            memtable_threshold: 5,
            compaction_threshold: 4,
            bloom_bits_per_key: 10,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that thresholds describe a usable engine
    pub fn validate(&self) -> Result<()> {
        if self.memtable_threshold == 0 {
            return Err(StrataError::Config(
                "memtable_threshold must be at least 1".to_string(),
            ));
        }
        if self.compaction_threshold < 2 {
            return Err(StrataError::Config(format!(
                "compaction_threshold must be at least 2, got {}",
                self.compaction_threshold
            )));
        }
        if self.bloom_bits_per_key == 0 {
            return Err(StrataError::Config(
                "bloom_bits_per_key must be at least 1".to_string(),
            ));
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(StrataError::Config(
                "WAL sync interval must be at least 1 entry".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the memtable flush threshold (entry count)
    pub fn memtable_threshold(mut self, entries: usize) -> Self {
        self.config.memtable_threshold = entries;
        self
    }

    /// Set the SSTable count that triggers compaction
    pub fn compaction_threshold(mut self, tables: usize) -> Self {
        self.config.compaction_threshold = tables;
        self
    }

    /// Set the bloom filter density
    pub fn bloom_bits_per_key(mut self, bits: usize) -> Self {
        self.config.bloom_bits_per_key = bits;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
