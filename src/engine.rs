//! Engine Module
//!
//! The LSM engine facade that coordinates all components.
//!
//! ## Responsibilities
//! - Route writes through the WAL into the MemTable
//! - Flush the MemTable to an SSTable when it reaches its threshold
//! - Compact the oldest SSTables when their count reaches its threshold
//! - Answer reads from the MemTable, then SSTables newest → oldest

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::memtable::{MemTable, MemTableEntry};
use crate::record::Record;
use crate::storage::{CompactionStats, StorageManager, TableId};
use crate::wal::{WalReader, WalWriter};

/// Read-only view of everything the engine holds
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// MemTable contents in key order; `value: null` is a tombstone
    pub memtable: Vec<Record>,
    /// SSTables oldest → newest
    pub sstables: Vec<TableView>,
}

/// Contents of one SSTable
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub id: TableId,
    pub entries: Vec<Record>,
}

/// State replaced together on flush and compaction
struct EngineState {
    memtable: MemTable,
    storage: StorageManager,
}

/// The main storage engine
///
/// ## Concurrency Model
///
/// Every operation runs to completion before the next one is admitted.
/// Writes (set/delete/flush/compact/reset) hold the state write lock for
/// their whole duration, including any flush or compaction they trigger.
/// Reads (get/inspect) hold the read lock, so they see the table list
/// either before or after a flush/compaction, never halfway.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Directory for SSTable and bloom filter files
    storage_dir: PathBuf,

    /// MemTable + SSTables
    state: RwLock<EngineState>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const SSTABLE_DIR: &'static str = "sstables";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate config, create data and SSTable directories
    /// 2. Load existing SSTables
    /// 3. Start a new WAL generation. A leftover log is not replayed; its
    ///    record count is reported and it is discarded.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        let storage_dir = config.data_dir.join(Self::SSTABLE_DIR);
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let storage = StorageManager::open(&storage_dir, config.bloom_bits_per_key)?;

        if wal_path.exists() {
            match WalReader::open(&wal_path).and_then(|reader| reader.read_all()) {
                Ok(records) if !records.is_empty() => warn!(
                    records = records.len(),
                    path = %wal_path.display(),
                    "discarding unflushed WAL records (replay is not supported)"
                ),
                Ok(_) => {}
                Err(e) => warn!(
                    error = %e,
                    path = %wal_path.display(),
                    "discarding unreadable WAL"
                ),
            }
        }
        let wal = WalWriter::create(&wal_path, config.wal_sync_strategy)?;
        let memtable = MemTable::new(config.memtable_threshold, wal);

        info!(
            data_dir = %config.data_dir.display(),
            sstables = storage.sstable_count(),
            memtable_threshold = config.memtable_threshold,
            compaction_threshold = config.compaction_threshold,
            "engine opened"
        );

        Ok(Self {
            config,
            storage_dir,
            state: RwLock::new(EngineState { memtable, storage }),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. SSTables (newest to oldest), skipping any whose bloom filter
    ///    rules the key out
    ///
    /// The first entry found decides: a tombstone means absent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.read();

        if let Some(entry) = state.memtable.get(key) {
            return Ok(entry.clone().into_value());
        }

        Ok(state.storage.get(key)?.and_then(MemTableEntry::into_value))
    }

    /// Set a key-value pair
    ///
    /// Steps:
    /// 1. Append to WAL (durable before anything else changes)
    /// 2. Write to MemTable
    /// 3. Flush if the MemTable reached its threshold
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, MemTableEntry::Value(value.to_string()))
    }

    /// Delete a key by writing a tombstone
    pub fn delete(&self, key: &str) -> Result<()> {
        self.write(key, MemTableEntry::Tombstone)
    }

    /// Flush memtable to disk (public API)
    ///
    /// Forces a flush regardless of memtable size; no-op when empty.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.write();
        self.flush_locked(&mut state)
    }

    /// Merge the oldest `compaction_threshold` SSTables (or all of them, if
    /// fewer) into one. No-op with fewer than two tables.
    pub fn compact(&self) -> Result<Option<CompactionStats>> {
        let mut state = self.state.write();
        state.storage.compact(self.config.compaction_threshold)
    }

    /// Discard every SSTable and the memtable with its WAL, returning the
    /// engine to its empty initial state
    pub fn reset(&self) -> Result<()> {
        let mut state = self.state.write();
        state.storage.clear()?;
        state.memtable.clear()?;
        info!("engine reset");
        Ok(())
    }

    /// Diagnostic view of the memtable and every SSTable
    pub fn inspect(&self) -> Result<Snapshot> {
        let state = self.state.read();

        let memtable = state
            .memtable
            .iter()
            .map(|(key, entry)| Record::new(key.as_str(), entry))
            .collect();

        let mut sstables = Vec::with_capacity(state.storage.sstable_count());
        for table in state.storage.tables() {
            let entries = state
                .storage
                .scan(table)?
                .into_iter()
                .map(|(key, entry)| Record::new(key, &entry))
                .collect();
            sstables.push(TableView {
                id: table.id(),
                entries,
            });
        }

        Ok(Snapshot { memtable, sstables })
    }

    /// Close the engine gracefully
    ///
    /// Flushes any pending data so it survives without WAL replay
    pub fn close(self) -> Result<()> {
        let mut state = self.state.write();
        self.flush_locked(&mut state)?;
        state.memtable.sync_wal()?;
        info!("engine closed");
        Ok(())
    }

    // =========================================================================
    // Write Path (called with the write lock held)
    // =========================================================================

    fn write(&self, key: &str, entry: MemTableEntry) -> Result<()> {
        let mut state = self.state.write();

        let tombstone = entry.is_tombstone();
        let full = state.memtable.set(key.to_string(), entry)?;
        debug!(key, tombstone, memtable_len = state.memtable.len(), "write applied");

        if full {
            self.flush_locked(&mut state)?;
        }
        Ok(())
    }

    fn flush_locked(&self, state: &mut EngineState) -> Result<()> {
        if state.memtable.is_empty() {
            return Ok(());
        }

        // Step 1: Seal the SSTable; a failure here leaves the memtable intact
        state.storage.flush(&state.memtable)?;

        // Step 2: Entries are durable in the SSTable, start a new generation
        state.memtable.clear()?;

        // Step 3: Compact once enough tables have piled up
        if state.storage.sstable_count() >= self.config.compaction_threshold {
            state.storage.compact(self.config.compaction_threshold)?;
        }

        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the storage directory path (where SSTables are stored)
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Get the memtable entry count
    pub fn memtable_len(&self) -> usize {
        self.state.read().memtable.len()
    }

    /// Get the number of SSTables
    pub fn sstable_count(&self) -> usize {
        self.state.read().storage.sstable_count()
    }

    /// SSTable ids, oldest → newest
    pub fn table_ids(&self) -> Vec<TableId> {
        self.state.read().storage.table_ids()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
