//! Criterion benchmarks for the WAD codec.
//!
//! Run with:
//!   cargo bench --bench codec
//!
//! Compression is timed on the prose and mixed profiles at several worker
//! counts. Decompression is timed on all three profiles; the noise input is
//! compressed once outside the timing loop, since the exhaustive window
//! scan makes compressing incompressible data far too slow to repeat per
//! iteration.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod corpus {
    include!("corpus.rs");
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("wad_compress");
    group.sample_size(10);

    for &size in &[65_536usize, 262_144] {
        for (name, data) in [("prose", corpus::prose(size)), ("mixed", corpus::mixed(size))] {
            group.throughput(Throughput::Bytes(size as u64));
            for &threads in &[1usize, 2, 4] {
                group.bench_with_input(
                    BenchmarkId::new(format!("{name}_t{threads}"), size),
                    &data,
                    |b, data| b.iter(|| wad::compress(data, threads).unwrap()),
                );
            }
        }
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("wad_decompress");

    for &size in &[65_536usize, 262_144] {
        for (name, data) in [
            ("prose", corpus::prose(size)),
            ("mixed", corpus::mixed(size)),
            ("noise", corpus::noise(size, 0x5EED_0001)),
        ] {
            let packed = wad::compress(&data, 4).unwrap();

            // Throughput measured in *decompressed* bytes (the meaningful
            // quantity).
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::new(name, size), &packed, |b, packed| {
                b.iter(|| wad::decompress(packed).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
