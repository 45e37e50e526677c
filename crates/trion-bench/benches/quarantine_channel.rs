//! Throughput benchmarks for the quarantine allocator and the bounded
//! MPMC channel — the two leaf primitives everything else in the runtime
//! is built on.

use std::sync::Arc;
use std::thread;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trion_membrane::{Channel, Quarantine, Wait};

fn quarantine_alloc_free(c: &mut Criterion) {
    let mut group = c.benchmark_group("quarantine_alloc_free");
    for size in [8usize, 64, 512, 4096] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let q = Quarantine::create(64);
            b.iter(|| {
                let ptr = q.alloc(size).unwrap();
                q.free(ptr).unwrap();
            });
        });
    }
    group.finish();
}

fn quarantine_alloc_churn(c: &mut Criterion) {
    c.bench_function("quarantine_alloc_churn_1k_outstanding", |b| {
        b.iter_batched(
            || Quarantine::create(1024),
            |q| {
                let ptrs: Vec<_> = (0..1024).map(|_| q.alloc(16).unwrap()).collect();
                for ptr in ptrs {
                    q.free(ptr).unwrap();
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn channel_single_thread_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_single_thread_roundtrip");
    for capacity in [1usize, 16, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let channel: Channel<u64> = Channel::create(capacity).unwrap();
                b.iter(|| {
                    channel.send(1, Wait::Indefinite).unwrap();
                    channel.recv(Wait::Indefinite).unwrap();
                });
            },
        );
    }
    group.finish();
}

fn channel_producer_consumer(c: &mut Criterion) {
    c.bench_function("channel_producer_consumer_10k", |b| {
        b.iter(|| {
            let channel = Arc::new(Channel::<u64>::create(64).unwrap());
            let producer_channel = Arc::clone(&channel);
            let producer = thread::spawn(move || {
                for i in 0..10_000u64 {
                    producer_channel.send(i, Wait::Indefinite).unwrap();
                }
                producer_channel.close();
            });
            let mut received = 0u64;
            while channel.recv(Wait::Indefinite).is_ok() {
                received += 1;
            }
            producer.join().unwrap();
            assert_eq!(received, 10_000);
        });
    });
}

criterion_group!(
    benches,
    quarantine_alloc_free,
    quarantine_alloc_churn,
    channel_single_thread_roundtrip,
    channel_producer_consumer
);
criterion_main!(benches);
