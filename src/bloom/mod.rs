//! Bloom Filter Module
//!
//! Probabilistic data structure: "is this key in the set?"
//!
//! - If any bit is 0 → key is DEFINITELY NOT in the set
//! - If all bits are 1 → key is PROBABLY in the set (false positive possible)
//!
//! Every SSTable carries one filter over exactly its keys, so a point lookup
//! can skip any table whose filter answers "no" without opening the file.
//!
//! ## Positions
//! Each item maps to `HASH_COUNT` positions, `hash_i(item) mod size`, one per
//! hash function in [`hashes`]. Bits are only ever set, never cleared.
//!
//! ## File Format
//! The filter is persisted next to its SSTable as a bincode-encoded struct:
//! `size` (u64) | `hash_count` (u32) | packed `u64` words.

mod hashes;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};

pub use hashes::HASH_COUNT;

/// Smallest filter built for an SSTable, regardless of key count
pub const MIN_BITS: usize = 64;

/// Fixed-size bit vector with `HASH_COUNT` independent hash functions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomFilter {
    /// Number of addressable bits
    size: usize,
    /// Hash functions applied per item
    hash_count: u32,
    /// Bit vector packed into u64 words
    words: Vec<u64>,
}

impl BloomFilter {
    /// Create an empty filter with `size` bits.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "bloom filter size must be > 0");

        Self {
            size,
            hash_count: HASH_COUNT as u32,
            words: vec![0u64; size.div_ceil(64)],
        }
    }

    /// Create a filter sized for `expected_keys` at `bits_per_key` density
    pub fn with_expected_keys(expected_keys: usize, bits_per_key: usize) -> Self {
        Self::new(expected_keys.saturating_mul(bits_per_key).max(MIN_BITS))
    }

    /// Add an item, returning the positions that were set
    pub fn add(&mut self, item: impl AsRef<[u8]>) -> [usize; HASH_COUNT] {
        let positions = self.positions(item);
        for &pos in &positions {
            self.set_bit(pos);
        }
        positions
    }

    /// Check if an item MIGHT be in the set.
    /// false → definitely not here. true → probably here.
    pub fn check(&self, item: impl AsRef<[u8]>) -> bool {
        self.positions(item).iter().all(|&pos| self.bit(pos))
    }

    /// Positions an item maps to, without touching the filter
    pub fn positions(&self, item: impl AsRef<[u8]>) -> [usize; HASH_COUNT] {
        let size = self.size as u64;
        hashes::hash_all(item.as_ref()).map(|h| (h % size) as usize)
    }

    /// Number of addressable bits
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of hash functions
    pub fn hash_count(&self) -> usize {
        self.hash_count as usize
    }

    /// Number of bits currently set
    pub fn bits_set(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Theoretical false-positive rate after `items` distinct adds:
    /// `(1 - e^(-k*n/m))^k`
    pub fn estimated_false_positive_rate(&self, items: usize) -> f64 {
        let k = self.hash_count as f64;
        let exponent = -k * items as f64 / self.size as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Encode the filter
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a filter, rejecting shapes this build cannot have written
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let filter: BloomFilter = bincode::deserialize(data)?;

        if filter.size == 0 || filter.words.len() != filter.size.div_ceil(64) {
            return Err(StrataError::Serialization(format!(
                "bloom filter of {} bits cannot hold {} words",
                filter.size,
                filter.words.len()
            )));
        }
        if filter.hash_count as usize != HASH_COUNT {
            return Err(StrataError::Serialization(format!(
                "unsupported bloom hash count: {}",
                filter.hash_count
            )));
        }

        Ok(filter)
    }

    /// Write the filter to `path` and fsync it
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        Ok(())
    }

    /// Read a filter previously written by [`BloomFilter::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    // =========================================================================
    // Bit Helpers
    // =========================================================================

    fn set_bit(&mut self, pos: usize) {
        self.words[pos / 64] |= 1 << (pos % 64);
    }

    fn bit(&self, pos: usize) -> bool {
        (self.words[pos / 64] >> (pos % 64)) & 1 == 1
    }
}
