//! Storage Module
//!
//! Persistent storage layer: immutable SSTables, each guarded by a bloom
//! filter, plus compaction.
//!
//! ## Responsibilities
//! - Persist flushed memtables to disk in sorted order
//! - Point lookups that skip tables whose bloom filter rules the key out
//! - Merge the oldest tables to bound read fan-out and reclaim deletes
//!
//! ## Layout
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ StorageManager   tables oldest → newest, next flush seq    │
//! ├───────────────┬──────────────────┬─────────────────────────┤
//! │ SSTableBuilder│ TableReader      │ Compactor               │
//! │ (flush/merge) │ (ScanReader)     │ (oldest-N merge)        │
//! └───────────────┴──────────────────┴─────────────────────────┘
//! ```

mod compaction;
mod manager;
mod sstable;

pub use compaction::{CompactionStats, Compactor};
pub use manager::StorageManager;
pub use sstable::{ScanReader, SSTable, SSTableBuilder, TableId, TableReader};
