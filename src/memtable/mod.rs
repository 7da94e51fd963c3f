//! MemTable Module
//!
//! In-memory buffer for writes that have not been flushed yet.
//!
//! ## Responsibilities
//! - Log every write to the WAL before applying it
//! - Ordered iteration for SSTable creation
//! - Report when the entry-count threshold is reached
//! - Start a new WAL generation when cleared after a flush
//!
//! ## Data Structure Choice
//! A `BTreeMap` keeps keys sorted, so a flush writes them out in order without
//! an extra sort.

mod table;

pub use table::MemTable;

/// Entry stored in the MemTable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemTableEntry {
    /// A live value
    Value(String),

    /// A tombstone (deleted key)
    Tombstone,
}

impl MemTableEntry {
    /// The live value, or `None` for a tombstone
    pub fn into_value(self) -> Option<String> {
        match self {
            MemTableEntry::Value(v) => Some(v),
            MemTableEntry::Tombstone => None,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, MemTableEntry::Tombstone)
    }
}
