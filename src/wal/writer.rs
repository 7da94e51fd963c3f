//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::WalSyncStrategy;
use crate::error::{Result, StrataError};
use crate::record::Record;

/// Writes records to the WAL file
///
/// Each writer owns one log generation. [`WalWriter::reset`] closes the
/// current handle and starts a new, empty generation at the same path.
pub struct WalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    sync_strategy: WalSyncStrategy,
    /// Records appended in this generation
    record_count: u64,
    /// Records written since the last fsync
    unsynced: usize,
}

impl WalWriter {
    /// Create a fresh WAL at `path`, truncating anything already there
    pub fn create(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            sync_strategy,
            record_count: 0,
            unsynced: 0,
        })
    }

    /// Append a record; under `EveryWrite` it is on stable storage when this
    /// returns. Returns the record's position in this generation.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        let mut line = record.encode()?;
        line.push('\n');

        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| StrataError::WalWrite(format!("append to {}: {}", self.path.display(), e)))?;

        self.unsynced += 1;
        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if due {
            self.sync()?;
        }

        self.record_count += 1;
        Ok(self.record_count)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .and_then(|_| self.writer.get_ref().sync_data())
            .map_err(|e| StrataError::WalWrite(format!("sync {}: {}", self.path.display(), e)))?;
        self.unsynced = 0;
        Ok(())
    }

    /// Drop this generation and start an empty one at the same path
    pub fn reset(&mut self) -> Result<()> {
        let fresh = Self::create(&self.path, self.sync_strategy)?;
        *self = fresh;
        debug!(path = %self.path.display(), "started new WAL generation");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended since this generation started
    pub fn record_count(&self) -> u64 {
        self.record_count
    }
}
