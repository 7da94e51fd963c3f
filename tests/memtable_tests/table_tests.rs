//! Tests for MemTable
//!
//! These tests verify:
//! - Basic get/set operations and tombstones
//! - Threshold reporting
//! - Sorted iteration
//! - WAL is written before the map and replaced on clear
//! - A failed WAL write leaves the map untouched

use std::fs;

use stratakv::config::WalSyncStrategy;
use stratakv::memtable::{MemTable, MemTableEntry};
use stratakv::record::Record;
use stratakv::wal::{WalReader, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_memtable(threshold: usize) -> (TempDir, MemTable) {
    let temp_dir = TempDir::new().unwrap();
    let wal = WalWriter::create(&temp_dir.path().join("wal.log"), WalSyncStrategy::EveryWrite)
        .unwrap();
    (temp_dir, MemTable::new(threshold, wal))
}

fn value(v: &str) -> MemTableEntry {
    MemTableEntry::Value(v.to_string())
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let (_temp, memtable) = setup_memtable(5);

    assert!(memtable.is_empty());
    assert_eq!(memtable.len(), 0);
    assert_eq!(memtable.threshold(), 5);
    assert!(memtable.get("anything").is_none());
}

#[test]
fn test_set_get() {
    let (_temp, mut memtable) = setup_memtable(5);

    memtable.set("hello".to_string(), value("world")).unwrap();

    assert_eq!(memtable.get("hello"), Some(&value("world")));
}

#[test]
fn test_overwrite_keeps_single_entry() {
    let (_temp, mut memtable) = setup_memtable(5);

    memtable.set("key".to_string(), value("v1")).unwrap();
    memtable.set("key".to_string(), value("v2")).unwrap();

    assert_eq!(memtable.len(), 1);
    assert_eq!(memtable.get("key"), Some(&value("v2")));
}

#[test]
fn test_tombstone_is_stored() {
    let (_temp, mut memtable) = setup_memtable(5);

    memtable.set("key".to_string(), value("v")).unwrap();
    memtable.set("key".to_string(), MemTableEntry::Tombstone).unwrap();

    assert_eq!(memtable.get("key"), Some(&MemTableEntry::Tombstone));
    assert_eq!(memtable.len(), 1);
}

// =============================================================================
// Threshold Tests
// =============================================================================

#[test]
fn test_set_reports_threshold_reached() {
    let (_temp, mut memtable) = setup_memtable(3);

    assert!(!memtable.set("a".to_string(), value("1")).unwrap());
    assert!(!memtable.set("b".to_string(), value("2")).unwrap());
    // Overwrites do not grow the table
    assert!(!memtable.set("a".to_string(), value("3")).unwrap());
    assert!(memtable.set("c".to_string(), value("4")).unwrap());
    assert!(memtable.is_full());
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_iter_is_sorted_by_key() {
    let (_temp, mut memtable) = setup_memtable(100);
    for key in ["pear", "apple", "fig", "Zebra", "banana"] {
        memtable.set(key.to_string(), value(key)).unwrap();
    }

    let keys: Vec<&str> = memtable.iter().map(|(k, _)| k.as_str()).collect();

    // Byte-wise ordering: uppercase sorts before lowercase
    assert_eq!(keys, vec!["Zebra", "apple", "banana", "fig", "pear"]);
}

// =============================================================================
// WAL Interaction Tests
// =============================================================================

#[test]
fn test_every_set_is_logged() {
    let (temp, mut memtable) = setup_memtable(100);

    memtable.set("a".to_string(), value("1")).unwrap();
    memtable.set("a".to_string(), MemTableEntry::Tombstone).unwrap();

    let records = WalReader::open(&temp.path().join("wal.log"))
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(
        records,
        vec![
            Record::new("a", &value("1")),
            Record::new("a", &MemTableEntry::Tombstone),
        ]
    );
    assert_eq!(memtable.wal().record_count(), 2);
}

#[test]
fn test_clear_empties_table_and_wal() {
    let (temp, mut memtable) = setup_memtable(100);
    memtable.set("a".to_string(), value("1")).unwrap();
    memtable.set("b".to_string(), value("2")).unwrap();

    memtable.clear().unwrap();

    let wal_path = temp.path().join("wal.log");
    assert!(memtable.is_empty());
    assert!(memtable.get("a").is_none());
    assert!(wal_path.exists());
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);
    assert_eq!(memtable.wal().record_count(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_wal_write_leaves_table_unchanged() {
    // Every write to /dev/full fails with ENOSPC
    let dev_full = std::path::Path::new("/dev/full");
    if !dev_full.exists() {
        return;
    }
    let wal = WalWriter::create(dev_full, WalSyncStrategy::EveryWrite).unwrap();
    let mut memtable = MemTable::new(5, wal);

    let result = memtable.set("key".to_string(), value("v"));

    assert!(result.is_err());
    assert!(memtable.is_empty());
    assert!(memtable.get("key").is_none());
}
