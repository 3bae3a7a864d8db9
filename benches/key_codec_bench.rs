use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use docdb_keys::types::KeySpans;
use docdb_keys::{
    AllowSpecial, DocHybridTime, DocKey, DocKeyPart, HybridTime, HybridTimeRequired, KeyBytes,
    PrimitiveValue, SubDocKey,
};

fn sample_key(range_components: usize) -> DocKey {
    let range = (0..range_components)
        .map(|i| {
            if i % 2 == 0 {
                PrimitiveValue::Int64(i as i64 * 7919)
            } else {
                PrimitiveValue::string(format!("range_{i}"))
            }
        })
        .collect();
    DocKey::hashed(
        0xBEEF,
        vec![PrimitiveValue::string("user_42"), PrimitiveValue::Int32(-3)],
        range,
    )
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("DocKey");
    for n in [0usize, 2, 8] {
        let key = sample_key(n);
        let encoded = key.encode();

        group.bench_with_input(BenchmarkId::new("encode", n), &key, |b, key| {
            b.iter(|| black_box(key.encode()));
        });
        group.bench_with_input(BenchmarkId::new("encode_with_buffer", n), &key, |b, key| {
            let mut buffer = KeyBytes::with_capacity(64);
            b.iter(|| black_box(key.encode_with_buffer(&mut buffer).len()));
        });
        group.bench_with_input(BenchmarkId::new("decode", n), &encoded, |b, encoded| {
            let mut decoded = DocKey::new();
            b.iter(|| {
                decoded
                    .decode_from_slice(encoded, DocKeyPart::WholeDocKey, AllowSpecial::No)
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("partially_decode", n), &encoded, |b, encoded| {
            b.iter(|| {
                let mut input = encoded.as_slice();
                let mut spans = KeySpans::new();
                DocKey::partially_decode(&mut input, DocKeyPart::WholeDocKey, &mut spans).unwrap();
                black_box(spans.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("encoded_size_hashed", n), &encoded, |b, encoded| {
            b.iter(|| {
                DocKey::encoded_size(encoded, DocKeyPart::HashedPartOnly, AllowSpecial::No).unwrap()
            });
        });
    }
    group.finish();

    let sub_key = SubDocKey::with_hybrid_time(
        sample_key(2),
        vec![PrimitiveValue::ColumnId(11), PrimitiveValue::string("field")],
        DocHybridTime::new(HybridTime::from_micros(1_700_000_000_000_000), 3),
    );
    let encoded = sub_key.encode();
    c.bench_function("SubDocKey/encode", |b| b.iter(|| black_box(sub_key.encode())));
    c.bench_function("SubDocKey/fully_decode", |b| {
        b.iter(|| SubDocKey::fully_decode(&encoded, HybridTimeRequired::Yes).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
