//! Tests for BloomFilter
//!
//! These tests verify:
//! - No false negatives, regardless of insertion order
//! - False-positive rate stays near the theoretical estimate
//! - Filters survive a save/load cycle unchanged
//! - Sizing helpers

use std::collections::HashSet;

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use stratakv::bloom::{BloomFilter, HASH_COUNT, MIN_BITS};
use stratakv::StrataError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn random_key(rng: &mut StdRng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// `count` distinct random keys that are not in `exclude`
fn distinct_keys(rng: &mut StdRng, count: usize, exclude: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::with_capacity(count);
    while keys.len() < count {
        let key = random_key(rng);
        if !exclude.contains(&key) && seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    keys
}

// =============================================================================
// Membership Tests
// =============================================================================

#[test]
fn test_empty_filter_returns_false() {
    let bf = BloomFilter::new(100);

    assert!(!bf.check("any_key"));
    assert!(!bf.check("hello"));
    assert!(!bf.check(""));
    assert_eq!(bf.bits_set(), 0);
}

#[test]
fn test_inserted_key_found() {
    let mut bf = BloomFilter::new(100);

    bf.add("hello");

    assert!(bf.check("hello"));
}

#[test]
fn test_add_sets_every_returned_position() {
    let mut bf = BloomFilter::new(100);

    let positions = bf.add("apple");

    assert_eq!(positions.len(), HASH_COUNT);
    let distinct: HashSet<_> = positions.iter().collect();
    assert_eq!(bf.bits_set(), distinct.len());
}

#[test]
fn test_duplicate_add_changes_nothing() {
    let mut bf = BloomFilter::new(100);

    bf.add("key");
    let snapshot = bf.clone();
    bf.add("key");
    bf.add("key");

    assert_eq!(bf, snapshot);
    assert!(bf.check("key"));
}

#[test]
fn test_no_false_negatives_in_any_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut keys = distinct_keys(&mut rng, 500, &HashSet::new());

    for _ in 0..3 {
        keys.shuffle(&mut rng);

        let mut bf = BloomFilter::new(2048);
        for key in &keys {
            bf.add(key);
        }

        for key in &keys {
            assert!(bf.check(key), "false negative for {}", key);
        }
    }
}

#[test]
fn test_no_false_negatives_when_saturated() {
    // Far more keys than bits: everything is set, nothing may be missed
    let mut bf = BloomFilter::new(16);
    let keys: Vec<String> = (0..200).map(|i| format!("key{}", i)).collect();

    for key in &keys {
        bf.add(key);
    }

    for key in &keys {
        assert!(bf.check(key));
    }
}

// =============================================================================
// False Positive Rate Tests
// =============================================================================

#[test]
fn test_false_positive_rate_near_theoretical() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut bf = BloomFilter::new(100);

    let added = distinct_keys(&mut rng, 10, &HashSet::new());
    for key in &added {
        bf.add(key);
    }

    let exclude: HashSet<String> = added.iter().cloned().collect();
    let probes = distinct_keys(&mut rng, 490, &exclude);
    let false_positives = probes.iter().filter(|k| bf.check(k)).count();
    let rate = false_positives as f64 / probes.len() as f64;

    let expected = bf.estimated_false_positive_rate(added.len());

    assert!(rate < 0.5, "false positive rate {} is not well under 50%", rate);
    assert!(
        rate <= expected * 10.0,
        "false positive rate {} is more than 10x the estimate {}",
        rate,
        expected
    );
}

#[test]
fn test_estimated_rate_grows_with_items() {
    let bf = BloomFilter::new(100);

    let empty = bf.estimated_false_positive_rate(0);
    let few = bf.estimated_false_positive_rate(10);
    let many = bf.estimated_false_positive_rate(100);

    assert_eq!(empty, 0.0);
    assert!(few > empty);
    assert!(many > few);
    assert!(many < 1.0);
}

// =============================================================================
// Sizing Tests
// =============================================================================

#[test]
fn test_with_expected_keys_sizing() {
    assert_eq!(BloomFilter::with_expected_keys(100, 10).size(), 1000);
    assert_eq!(BloomFilter::with_expected_keys(0, 10).size(), MIN_BITS);
    assert_eq!(BloomFilter::with_expected_keys(2, 10).size(), MIN_BITS);
}

#[test]
#[should_panic]
fn test_zero_size_panics() {
    BloomFilter::new(0);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_save_and_load_preserves_answers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filter.bloom");

    let mut bf = BloomFilter::new(300);
    for i in 0..20 {
        bf.add(format!("key{}", i));
    }
    bf.save(&path).unwrap();

    let loaded = BloomFilter::load(&path).unwrap();

    assert_eq!(loaded, bf);
    for i in 0..20 {
        assert!(loaded.check(format!("key{}", i)));
    }
}

#[test]
fn test_load_garbage_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filter.bloom");
    std::fs::write(&path, b"not a filter").unwrap();

    let result = BloomFilter::load(&path);

    assert!(matches!(result, Err(StrataError::Serialization(_))));
}
