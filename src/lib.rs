//! # StrataKV
//!
//! An embedded, single-node LSM-tree key-value engine with:
//! - Write-Ahead Logging (WAL) before every memtable mutation
//! - Sorted memtable flushed to immutable SSTables at an entry threshold
//! - A bloom filter per SSTable so lookups skip tables that cannot match
//! - Compaction of the oldest SSTables, reclaiming deleted keys
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Engine (facade)                          │
//! │          set / delete / get / reset / inspect                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │ ◄─────── │  MemTable   │
//!   │  (Append)   │          │ (BTreeMap)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ flush
//!                                   ▼
//!                           ┌───────────────┐
//!                           │ StorageManager│
//!                           │ SSTable+Bloom │──► Compactor
//!                           └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod bloom;
pub mod record;
pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StrataError, Result};
pub use config::Config;
pub use engine::{Engine, Snapshot};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StrataKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
