// Property tests for the key codec: round trip, order preservation,
// reverse hybrid time order, partial decode size and clearing.

use docdb_keys::hybrid_time::append_doc_hybrid_time;
use docdb_keys::types::KeySpans;
use docdb_keys::{
    AllowSpecial, DocHybridTime, DocKey, DocKeyPart, HybridTime, KeyBytes, PrimitiveValue,
    SubDocKey,
};
use proptest::prelude::*;
use uuid::Uuid;

fn arb_primitive() -> impl Strategy<Value = PrimitiveValue> {
    prop_oneof![
        Just(PrimitiveValue::Null),
        any::<bool>().prop_map(PrimitiveValue::Bool),
        any::<i32>().prop_map(PrimitiveValue::Int32),
        any::<i64>().prop_map(PrimitiveValue::Int64),
        any::<u32>().prop_map(PrimitiveValue::UInt32),
        any::<f64>()
            .prop_filter("not NaN", |f| !f.is_nan())
            .prop_map(PrimitiveValue::Double),
        prop::collection::vec(any::<u8>(), 0..12).prop_map(PrimitiveValue::String),
        any::<i64>().prop_map(PrimitiveValue::Timestamp),
        any::<u128>().prop_map(|v| PrimitiveValue::Uuid(Uuid::from_u128(v))),
        any::<u32>().prop_map(PrimitiveValue::ColumnId),
        any::<u32>().prop_map(PrimitiveValue::SystemColumnId),
        any::<i64>().prop_map(PrimitiveValue::ArrayIndex),
    ]
}

fn arb_doc_key() -> impl Strategy<Value = DocKey> {
    (
        prop_oneof![Just(Uuid::nil()), (1u128..4).prop_map(Uuid::from_u128)],
        prop::option::of(any::<u16>()),
        prop::collection::vec(arb_primitive(), 0..3),
        prop::collection::vec(arb_primitive(), 0..3),
    )
        .prop_map(|(cotable_id, hash, hashed, range)| {
            let key = match hash {
                Some(hash) => DocKey::hashed(hash, hashed, range),
                None => DocKey::from_range(range),
            };
            key.with_cotable_id(cotable_id)
        })
}

fn arb_doc_ht() -> impl Strategy<Value = DocHybridTime> {
    (any::<u64>(), any::<u32>())
        .prop_map(|(ht, write_id)| DocHybridTime::new(HybridTime::from_u64(ht), write_id))
}

proptest! {
    #[test]
    fn test_doc_key_round_trip(key in arb_doc_key()) {
        let encoded = key.encode();
        let mut decoded = DocKey::new();
        let consumed = decoded
            .decode_from_slice(&encoded, DocKeyPart::WholeDocKey, AllowSpecial::No)
            .unwrap();
        prop_assert_eq!(consumed, encoded.len());
        prop_assert_eq!(decoded, key);
    }

    #[test]
    fn test_doc_key_order_matches_bytes(a in arb_doc_key(), b in arb_doc_key()) {
        prop_assert_eq!(a.cmp(&b), a.encode().cmp(&b.encode()));
    }

    #[test]
    fn test_primitive_order_matches_bytes(a in arb_primitive(), b in arb_primitive()) {
        prop_assert_eq!(a.cmp(&b), a.to_key_bytes().cmp(&b.to_key_bytes()));
    }

    #[test]
    fn test_hybrid_time_encodes_in_reverse(t1 in arb_doc_ht(), t2 in arb_doc_ht()) {
        let encode = |t: &DocHybridTime| {
            let mut out = KeyBytes::new();
            append_doc_hybrid_time(t, &mut out);
            out
        };
        prop_assert_eq!(t1.cmp(&t2), encode(&t2).cmp(&encode(&t1)));
    }

    #[test]
    fn test_sub_doc_key_order_matches_bytes(
        a in (arb_doc_key(), prop::collection::vec(arb_primitive(), 0..3), prop::option::of(arb_doc_ht())),
        b in (arb_doc_key(), prop::collection::vec(arb_primitive(), 0..3), prop::option::of(arb_doc_ht())),
    ) {
        let build = |(doc_key, subkeys, doc_ht): (DocKey, Vec<PrimitiveValue>, Option<DocHybridTime>)| {
            let mut key = SubDocKey::with_subkeys(doc_key, subkeys);
            if let Some(doc_ht) = doc_ht {
                key.set_doc_hybrid_time(doc_ht);
            }
            key
        };
        let (a, b) = (build(a), build(b));
        prop_assert_eq!(a.cmp(&b), a.encode().cmp(&b.encode()));
    }

    #[test]
    fn test_hashed_part_size_matches_partial_decode(key in arb_doc_key(), tail in prop::collection::vec(any::<u8>(), 0..8)) {
        let mut encoded = key.encode().into_vec();
        encoded.extend_from_slice(&tail);

        let size = DocKey::encoded_size(&encoded, DocKeyPart::HashedPartOnly, AllowSpecial::No).unwrap();
        let mut input = encoded.as_slice();
        let mut spans = KeySpans::new();
        DocKey::partially_decode(&mut input, DocKeyPart::HashedPartOnly, &mut spans).unwrap();
        prop_assert_eq!(encoded.len() - input.len(), size);
        prop_assert_eq!(spans.len(), key.hashed_group().len());
    }

    #[test]
    fn test_clear_leaves_no_residue(old in arb_doc_key(), new in arb_doc_key()) {
        let mut reused = old;
        reused.clear();
        prop_assert_eq!(&reused, &DocKey::new());
        let cleared = reused.encode();
        prop_assert_eq!(cleared.as_slice(), b"!".as_slice());

        // A decode into a cleared key matches a decode into a fresh one.
        reused.fully_decode_from(&new.encode()).unwrap();
        prop_assert_eq!(&reused, &new);

        reused.clear_range_components();
        for component in new.range_group() {
            reused.add_range_component(component.clone());
        }
        prop_assert_eq!(reused.encode(), new.encode());
    }
}
