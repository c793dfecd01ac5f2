//! Hash function throughput across key lengths.
//!
//! Run with: `cargo bench --bench hashing`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use retirekit::hash::{HashFunction, MetroHash64, Polynomial31};

const LENGTHS: [usize; 6] = [4, 8, 16, 32, 64, 256];

fn key_of_len(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'A' + (i % 26) as u8).collect()
}

fn bench_hash<H: HashFunction>(c: &mut Criterion, name: &str, hasher: H) {
    let mut group = c.benchmark_group(name);
    for len in LENGTHS {
        let key = key_of_len(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &key, |b, key| {
            b.iter(|| hasher.hash(black_box(key)))
        });
    }
    group.finish();
}

fn bench_polynomial(c: &mut Criterion) {
    bench_hash(c, "polynomial31", Polynomial31);
}

fn bench_metro(c: &mut Criterion) {
    bench_hash(c, "metrohash64", MetroHash64);
}

criterion_group!(benches, bench_polynomial, bench_metro);
criterion_main!(benches);
