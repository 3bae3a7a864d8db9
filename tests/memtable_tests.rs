// MemTable API with tombstones, holding encoded sub doc keys.

use docdb_keys::iterator::StorageIterator;
use docdb_keys::memtable::MemTable;
use docdb_keys::{DocHybridTime, DocKey, HybridTime, Options, PrimitiveValue, SubDocKey};

fn cell(user: &str, column: &str, micros: u64) -> Vec<u8> {
    SubDocKey::with_hybrid_time(
        DocKey::from_range(vec![user.into()]),
        vec![column.into()],
        DocHybridTime::new(HybridTime::from_micros(micros), 0),
    )
    .encode()
    .into_vec()
}

// =============================================================================
// Test 1: Basic put and get
// =============================================================================
#[test]
fn test_put_then_get_returns_value() {
    let mut mt = MemTable::new(1024 * 1024);
    mt.put(cell("alice", "email", 1), b"a@x".to_vec());

    assert_eq!(mt.get(&cell("alice", "email", 1)), Some(b"a@x".as_slice()));
    assert_eq!(mt.get(&cell("alice", "email", 2)), None);
}

// =============================================================================
// Test 2: Delete returns None on get
// =============================================================================
#[test]
fn test_delete_then_get_returns_none() {
    let mut mt = MemTable::new(1024 * 1024);
    mt.put(cell("bob", "name", 1), b"Bob".to_vec());
    mt.delete(cell("bob", "name", 1));
    assert_eq!(mt.get(&cell("bob", "name", 1)), None);

    mt.put(cell("bob", "name", 1), b"Robert".to_vec());
    assert_eq!(mt.get(&cell("bob", "name", 1)), Some(b"Robert".as_slice()));
}

// =============================================================================
// Test 3: is_full against the configured limit
// =============================================================================
#[test]
fn test_is_full_true_when_over_limit() {
    let mut mt = MemTable::with_options(&Options::default().with_memtable_size_limit(100));
    assert!(!mt.is_full());

    mt.put(cell("k1", "c", 1), b"a value that is pretty long".to_vec());
    mt.put(cell("k2", "c", 1), b"another long value here".to_vec());
    mt.put(cell("k3", "c", 1), b"and yet another one".to_vec());

    assert!(mt.is_full());
}

// =============================================================================
// Test 4: Iterator includes tombstones, newest version first
// =============================================================================
#[test]
fn test_iterator_orders_versions_newest_first() {
    let mut mt = MemTable::new(1024 * 1024);
    mt.put(cell("a", "c", 1), b"v1".to_vec());
    mt.put(cell("a", "c", 3), b"v3".to_vec());
    mt.delete(cell("a", "c", 2));

    let mut iter = mt.iter();
    let mut seen = Vec::new();
    while iter.is_valid() {
        seen.push((iter.key().to_vec(), iter.value().to_vec()));
        iter.next().unwrap();
    }
    assert_eq!(
        seen,
        vec![
            (cell("a", "c", 3), b"v3".to_vec()),
            (cell("a", "c", 2), Vec::new()),
            (cell("a", "c", 1), b"v1".to_vec()),
        ]
    );
    assert_eq!(mt.len(), 3);
}

// =============================================================================
// Test 5: Seek to a doc key lands on its first entry
// =============================================================================
#[test]
fn test_seek_to_doc_key() {
    let mut mt = MemTable::new(1024 * 1024);
    mt.put(cell("a", "c", 1), Vec::from(&b"x"[..]));
    mt.put(cell("b", "c", 1), Vec::from(&b"y"[..]));

    let doc_key = DocKey::from_range(vec![PrimitiveValue::from("b")]).encode();
    let iter = mt.seek(&doc_key).unwrap();
    assert!(iter.is_valid());
    assert_eq!(iter.key(), cell("b", "c", 1).as_slice());
}

// =============================================================================
// Test 6: size returns current memory usage
// =============================================================================
#[test]
fn test_size_tracks_memory_usage() {
    let mut mt = MemTable::new(1024 * 1024);
    assert_eq!(mt.size(), 0);
    assert!(mt.is_empty());

    mt.put(b"key".to_vec(), b"value".to_vec());
    assert_eq!(mt.size(), 8);
}
