//! Criterion benchmarks for directory compression.
//!
//! Run with:
//!   cargo bench --bench pipeline
//!
//! Builds one temporary directory of synthetic `.txt` files and compresses it
//! with several worker counts.

use std::fs;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;
use tzip::{compress_directory, Config};

const NB_FILES: usize = 64;
const FILE_SIZE: usize = 64 * 1024;

fn synthetic_text(seed: usize) -> Vec<u8> {
    let words = [
        "lorem ", "ipsum ", "dolor ", "sit ", "amet ", "consectetur ", "adipiscing ", "elit\n",
    ];
    let mut out = Vec::with_capacity(FILE_SIZE);
    let mut state = seed as u64 | 1;
    while out.len() < FILE_SIZE {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.extend_from_slice(words[(state % words.len() as u64) as usize].as_bytes());
    }
    out.truncate(FILE_SIZE);
    out
}

fn populate(dir: &Path) {
    for i in 0..NB_FILES {
        fs::write(dir.join(format!("{i:04}.txt")), synthetic_text(i)).expect("write bench input");
    }
}

fn bench_compress_directory(c: &mut Criterion) {
    let input = TempDir::new().expect("TempDir::new");
    populate(input.path());
    let out = TempDir::new().expect("TempDir::new");
    let archive = out.path().join("bench.tzip");

    let mut group = c.benchmark_group("compress_directory");
    group.throughput(Throughput::Bytes((NB_FILES * FILE_SIZE) as u64));
    group.sample_size(10);

    for &nb_workers in &[1usize, 2, 4, 8] {
        let config = Config::default().with_nb_workers(nb_workers);
        group.bench_with_input(
            BenchmarkId::new("workers", nb_workers),
            &config,
            |b, config| {
                b.iter(|| compress_directory(input.path(), &archive, config).unwrap())
            },
        );
    }

    // ── fast level, to see how much of the time is the codec ────────────────
    let config = Config::default().with_nb_workers(4).with_level(1);
    group.bench_with_input(BenchmarkId::new("level1_workers", 4), &config, |b, config| {
        b.iter(|| compress_directory(input.path(), &archive, config).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_compress_directory);
criterion_main!(benches);
