//! Benchmarks for the GF(2^16) multiply-accumulate hot loop.
//!
//! `mac` is called once per `(row, column)` pair during both encode and
//! decode, so its throughput across realistic block sizes drives the whole
//! codec's performance.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use crs_gf::GaloisField;
use std::hint::black_box;

fn bench_mac_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("mac_block_sizes");
    let gf = GaloisField::new();

    // Realistic block_bytes values: SIMD-aligned (multiple of 32), the
    // largest legal one being 65536 (avail_bytes cap from the spec).
    for size in [32usize, 256, 4096, 65536] {
        let src = vec![0x5Au8; size];
        let mut dst = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                gf.mac(black_box(&mut dst), black_box(&src), black_box(0x1234), size);
            });
        });
    }

    group.finish();
}

fn bench_mac_encode_row(c: &mut Criterion) {
    // Simulates one encode row: K multiply-accumulate passes folding K data
    // blocks into one code block, for a handful of representative K values.
    let mut group = c.benchmark_group("mac_encode_row");
    let gf = GaloisField::new();
    let block_bytes = 4096usize;

    for k in [4usize, 32, 256] {
        let data = vec![0x33u8; k * block_bytes];
        let mut output = vec![0u8; block_bytes];

        group.throughput(Throughput::Bytes((k * block_bytes) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| {
                output.iter_mut().for_each(|byte| *byte = 0);
                for c in 0..k {
                    let coeff = gf.inv((1000 + c as u16) ^ c as u16);
                    gf.mac(
                        black_box(&mut output),
                        black_box(&data[c * block_bytes..(c + 1) * block_bytes]),
                        coeff,
                        block_bytes,
                    );
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mac_block_sizes, bench_mac_encode_row);
criterion_main!(benches);
