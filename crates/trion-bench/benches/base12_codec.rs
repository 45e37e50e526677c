//! Throughput benchmarks for the base-12 ("dodecagram") codec — the
//! algorithmically richest piece of the runtime core.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trion_core::{base12_to_bytes_with_scale, bytes_to_base12, from_base12_u64, to_base12_u64};

fn encode_by_magnitude_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("bytes_to_base12");
    for len in [4usize, 32, 256, 2048] {
        let bytes: Vec<u8> = (0..len).map(|i| (i * 7 + 1) as u8).collect();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| bytes_to_base12(bytes));
        });
    }
    group.finish();
}

fn decode_by_text_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("base12_to_bytes_with_scale");
    for len in [4usize, 32, 256, 2048] {
        let bytes: Vec<u8> = (0..len).map(|i| (i * 7 + 1) as u8).collect();
        let text = bytes_to_base12(&bytes);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| base12_to_bytes_with_scale(text).unwrap());
        });
    }
    group.finish();
}

fn u64_fast_path_round_trip(c: &mut Criterion) {
    c.bench_function("u64_fast_path_round_trip", |b| {
        b.iter(|| {
            let encoded = to_base12_u64(u64::MAX / 3);
            from_base12_u64(&encoded).unwrap()
        });
    });
}

criterion_group!(
    benches,
    encode_by_magnitude_size,
    decode_by_text_length,
    u64_fast_path_round_trip
);
criterion_main!(benches);
