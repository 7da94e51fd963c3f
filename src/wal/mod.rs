//! Write-Ahead Log (WAL) Module
//!
//! Provides durability for the active memtable through append-only logging.
//!
//! ## Responsibilities
//! - Append a record before any memtable mutation
//! - fsync according to the configured [`WalSyncStrategy`](crate::config::WalSyncStrategy)
//! - Start a new generation whenever the memtable is flushed
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ {"key":"a","value":"1"}\n                │
//! │ {"key":"b","value":"2"}\n                │
//! │ {"key":"a","value":null}\n   (tombstone) │
//! └──────────────────────────────────────────┘
//! ```
//! One [`Record`](crate::record::Record) per line, in write order. Later lines
//! for a key supersede earlier ones.

mod reader;
mod writer;

pub use reader::WalReader;
pub use writer::WalWriter;
