//! The four hash functions behind every bloom filter position.
//!
//! One cryptographic hash, two seeded fast hashes and one checksum. They share
//! no internal state, so the positions they produce are close to independent
//! even when the filter is only a few hundred bits wide.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh32::xxh32;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Number of hash functions a filter applies per item
pub const HASH_COUNT: usize = 4;

const XXH3_SEED: u64 = 0;
const XXH32_SEED: u32 = 1;

/// Raw 64-bit hashes of `item`, in a fixed order
pub(crate) fn hash_all(item: &[u8]) -> [u64; HASH_COUNT] {
    [
        sha256_prefix(item),
        xxh3_64_with_seed(item, XXH3_SEED),
        xxh32(item, XXH32_SEED) as u64,
        crc32fast::hash(item) as u64,
    ]
}

/// First 8 bytes of the SHA-256 digest, big-endian
fn sha256_prefix(item: &[u8]) -> u64 {
    let digest = Sha256::digest(item);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}
