//! WAL Reader
//!
//! Reads records back from a WAL file. The engine does not replay the log at
//! startup; the reader exists so the on-disk format can be inspected and so a
//! leftover log can be reported before it is discarded.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::record::{Record, RecordIterator};

/// Reads records from the WAL file
pub struct WalReader {
    path: PathBuf,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        // Fail early on a missing file rather than on first iteration
        std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Iterate over all valid records, skipping corrupt lines
    pub fn records(&self) -> Result<RecordIterator> {
        RecordIterator::open(&self.path)
    }

    /// Collect every valid record in write order
    pub fn read_all(&self) -> Result<Vec<Record>> {
        self.records()?.collect()
    }
}
