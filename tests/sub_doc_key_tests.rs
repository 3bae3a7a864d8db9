// SubDocKey encoding, version ordering, prefixes and seek keys.

use docdb_keys::sub_doc_key::best_effort_doc_db_key_to_str;
use docdb_keys::types::PrefixLengths;
use docdb_keys::{
    DocHybridTime, DocKey, DocPath, HybridTime, HybridTimeRequired, PrimitiveValue, SubDocKey,
};

fn ht(micros: u64, write_id: u32) -> DocHybridTime {
    DocHybridTime::new(HybridTime::from_micros(micros), write_id)
}

fn doc_key() -> DocKey {
    DocKey::hashed(0x00AA, vec!["user".into()], vec![PrimitiveValue::Int64(42)])
}

fn path(subkeys: &[&str]) -> SubDocKey {
    SubDocKey::with_subkeys(doc_key(), subkeys.iter().map(|s| PrimitiveValue::from(*s)).collect())
}

// =============================================================================
// Test 1: Round trip with a hybrid time
// =============================================================================
#[test]
fn test_round_trip_with_hybrid_time() {
    let key = SubDocKey::with_hybrid_time(doc_key(), vec!["a".into(), PrimitiveValue::ArrayIndex(3)], ht(100, 2));
    let encoded = key.encode();
    let decoded = SubDocKey::fully_decode(&encoded, HybridTimeRequired::Yes).unwrap();
    assert_eq!(decoded, key);
    assert_eq!(decoded.doc_hybrid_time(), Some(ht(100, 2)));
}

// =============================================================================
// Test 2: Missing hybrid time only fails when required
// =============================================================================
#[test]
fn test_missing_hybrid_time() {
    let encoded = path(&["a"]).encode();
    let err = SubDocKey::fully_decode(&encoded, HybridTimeRequired::Yes).unwrap_err();
    assert!(err.is_corruption());

    let decoded = SubDocKey::fully_decode(&encoded, HybridTimeRequired::No).unwrap();
    assert_eq!(decoded, path(&["a"]));
}

// =============================================================================
// Test 3: Trailing bytes after the hybrid time
// =============================================================================
#[test]
fn test_trailing_bytes_are_invalid_argument() {
    let mut encoded = SubDocKey::with_hybrid_time(doc_key(), vec![], ht(1, 0))
        .encode()
        .into_vec();
    encoded.push(b'!');
    let err = SubDocKey::fully_decode(&encoded, HybridTimeRequired::Yes).unwrap_err();
    assert!(err.is_invalid_argument(), "{err}");
}

// =============================================================================
// Test 4: Versions of one path come out newest first
// =============================================================================
#[test]
fn test_versions_sort_newest_first() {
    let mut keys: Vec<SubDocKey> = [ht(1, 0), ht(3, 0), ht(2, 5), ht(2, 1)]
        .into_iter()
        .map(|t| SubDocKey::with_hybrid_time(doc_key(), vec!["c".into()], t))
        .collect();
    keys.push(path(&["c"]));
    keys.push(path(&["c", "d"]));

    let mut by_struct = keys.clone();
    by_struct.sort();
    let mut by_bytes = keys.clone();
    by_bytes.sort_by_key(|k| k.encode());
    assert_eq!(by_struct, by_bytes);

    let times: Vec<_> = by_struct.iter().map(|k| k.doc_hybrid_time()).collect();
    assert_eq!(
        times,
        vec![None, Some(ht(3, 0)), Some(ht(2, 5)), Some(ht(2, 1)), Some(ht(1, 0)), None]
    );
}

// =============================================================================
// Test 5: Prefix semantics
// =============================================================================
#[test]
fn test_starts_with() {
    let full = path(&["s1", "s2", "s3"]);
    let prefix = path(&["s1", "s2"]);
    assert!(full.starts_with(&prefix));
    assert!(full.starts_with(&full));
    assert!(!prefix.starts_with(&full));
    assert!(!full.starts_with(&path(&["s1", "x"])));

    let mut timed_prefix = prefix.clone();
    timed_prefix.set_doc_hybrid_time(ht(5, 0));
    assert!(!full.starts_with(&timed_prefix));

    let mut timed_full = full.clone();
    timed_full.set_doc_hybrid_time(ht(5, 0));
    assert!(timed_full.starts_with(&prefix));
    assert!(timed_full.starts_with(&timed_full.clone()));

    let mut other_time = full.clone();
    other_time.set_doc_hybrid_time(ht(6, 0));
    assert!(!timed_full.starts_with(&other_time));
}

// =============================================================================
// Test 6: Advancing out of a sub document
// =============================================================================
#[test]
fn test_advance_out_of_sub_doc() {
    let key = path(&["a"]);
    let seek = key.advance_out_of_sub_doc();

    let newest = SubDocKey::with_hybrid_time(doc_key(), vec!["a".into()], DocHybridTime::MAX);
    let oldest = SubDocKey::with_hybrid_time(doc_key(), vec!["a".into()], DocHybridTime::MIN);
    let deeper = path(&["a", "zzz"]);
    let next_sibling = path(&["b"]);

    assert!(seek > key.encode());
    assert!(seek > newest.encode());
    assert!(seek > oldest.encode());
    assert!(seek > deeper.encode());
    assert!(seek < next_sibling.encode());
}

// =============================================================================
// Test 7: Prefix offsets
// =============================================================================
#[test]
fn test_prefix_lengths_for_range_only_key() {
    let key = SubDocKey::with_hybrid_time(
        DocKey::from_range(vec!["r1".into(), "r2".into()]),
        vec!["s".into()],
        ht(9, 0),
    );
    let encoded = key.encode();
    let mut lengths = PrefixLengths::new();
    SubDocKey::decode_prefix_lengths(&encoded, &mut lengths).unwrap();

    // r1 = "Sr1\0\0" (5), r2 plus group end (6), subkey "Ss\0\0" (4).
    assert_eq!(lengths.as_slice(), &[5, 11, 15]);
}

#[test]
fn test_prefix_lengths_missing_range_group_end() {
    // Range values followed directly by a hybrid time.
    let mut bytes = b"Sr1\x00\x00".to_vec();
    bytes.push(b'#');
    bytes.extend_from_slice(&[0u8; 12]);
    let mut lengths = PrefixLengths::new();
    assert!(SubDocKey::decode_prefix_lengths(&bytes, &mut lengths).unwrap_err().is_corruption());
}

#[test]
fn test_doc_key_and_subkey_ends_resume() {
    let key = path(&["a", "b"]);
    let encoded = key.encode();
    let doc_key_len = doc_key().encode().len();

    let mut ends = PrefixLengths::new();
    SubDocKey::decode_doc_key_and_subkey_ends(&encoded, &mut ends).unwrap();
    assert_eq!(ends.as_slice(), &[doc_key_len, doc_key_len + 4, doc_key_len + 8]);

    let mut resumed = PrefixLengths::new();
    resumed.push(doc_key_len + 4);
    SubDocKey::decode_doc_key_and_subkey_ends(&encoded, &mut resumed).unwrap();
    assert_eq!(resumed.as_slice(), &[doc_key_len + 4, doc_key_len + 8]);
}

// =============================================================================
// Test 8: Doc paths
// =============================================================================
#[test]
fn test_from_doc_path_and_back() {
    let doc_path = DocPath::from_doc_key(&doc_key(), vec!["x".into(), "y".into()]);
    let key = SubDocKey::from_doc_path(&doc_path).unwrap();
    assert_eq!(key, path(&["x", "y"]));
    assert_eq!(DocPath::from(&key), doc_path);
}

// =============================================================================
// Test 9: Subkey editing
// =============================================================================
#[test]
fn test_subkey_editing() {
    let mut key = path(&["a"]);
    key.append_subkeys([PrimitiveValue::from("b"), PrimitiveValue::from("c")]);
    assert_eq!(key.num_subkeys(), 3);
    assert_eq!(key.remove_last_subkey(), Some(PrimitiveValue::from("c")));
    assert_eq!(key.last_subkey(), Some(&PrimitiveValue::from("b")));
    key.set_doc_hybrid_time(ht(1, 0));
    key.remove_hybrid_time();
    assert_eq!(key, path(&["a", "b"]));
}

// =============================================================================
// Test 10: Rendering
// =============================================================================
#[test]
fn test_rendering() {
    let key = SubDocKey::with_hybrid_time(DocKey::from_range(vec![PrimitiveValue::Int64(1)]), vec!["a".into()], ht(7, 0));
    let rendered = key.to_string();
    assert_eq!(SubDocKey::debug_slice_to_string(&key.encode()), rendered);
    assert_eq!(best_effort_doc_db_key_to_str(&key.encode()), rendered);

    let mut with_garbage = key.encode_without_ht().into_vec();
    with_garbage.push(b'#');
    let best_effort = best_effort_doc_db_key_to_str(&with_garbage);
    assert!(best_effort.starts_with("Corruption") || best_effort.starts_with('"'), "{best_effort}");
}
