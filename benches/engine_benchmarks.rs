use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use std::io;
use std::path::PathBuf;
use tempfile::TempDir;

use dupfind::config::CompareConfig;
use dupfind::digest::{DigestContext, DigestKind};
use dupfind::engine::{
    CandidatePool, Cluster, ClusterBuilder, Comparator, FileRecord, FileId,
};
use dupfind::report::Reporter;
use dupfind::scanner::{Walker, WalkerConfig};

/// Reporter that discards everything.
struct NullReporter;

impl Reporter for NullReporter {
    fn report_cluster(&mut self, _cluster: &mut Cluster) -> io::Result<()> {
        Ok(())
    }

    fn report_unique(&mut self, _record: &FileRecord) -> io::Result<()> {
        Ok(())
    }
}

// Helper to create a directory of small files, half of them duplicated
fn setup_test_dir(pairs: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..pairs {
        let contents = format!("contents of pair number {i}, padded to a realistic size");
        fs::write(temp_dir.path().join(format!("a_{i}.txt")), &contents).unwrap();
        fs::write(temp_dir.path().join(format!("b_{i}.txt")), &contents).unwrap();
    }
    temp_dir
}

// 1. Pool insertion benchmarks
fn bench_pool_insert(c: &mut Criterion) {
    c.bench_function("pool_insert_10k_records", |b| {
        b.iter(|| {
            let mut pool = CandidatePool::new();
            for i in 0..10_000u64 {
                pool.insert(FileRecord::new(
                    PathBuf::from(format!("/virtual/file_{i}")),
                    i * 37,
                    None,
                ));
            }
            black_box(pool.len());
        })
    });
}

// 2. Cluster scan benchmarks (identity matches, no file I/O)
fn bench_cluster_scan_identity(c: &mut Criterion) {
    c.bench_function("cluster_scan_hardlink_groups", |b| {
        b.iter(|| {
            let mut pool = CandidatePool::new();
            for group in 0..500u64 {
                let id = FileId {
                    device: 1,
                    inode: group,
                };
                for member in 0..4 {
                    pool.insert(FileRecord::new(
                        PathBuf::from(format!("/virtual/{group}_{member}")),
                        group * 4096,
                        Some(id),
                    ));
                }
            }
            let mut reporter = NullReporter;
            let stats =
                ClusterBuilder::new(Comparator::new(CompareConfig::default()), &mut reporter)
                    .find_clusters(&mut pool)
                    .unwrap();
            black_box(stats);
        })
    });
}

// 3. Full scan over real files
fn bench_full_scan(c: &mut Criterion) {
    let temp_dir = setup_test_dir(100);

    c.bench_function("full_scan_100_pairs", |b| {
        b.iter(|| {
            let mut pool = CandidatePool::new();
            let config = WalkerConfig {
                recursive: true,
                ..Default::default()
            };
            let mut walker = Walker::new(&mut pool, config);
            walker.process_path(temp_dir.path());
            drop(walker);

            let mut reporter = NullReporter;
            let stats =
                ClusterBuilder::new(Comparator::new(CompareConfig::default()), &mut reporter)
                    .find_clusters(&mut pool)
                    .unwrap();
            black_box(stats);
        })
    });
}

// 4. Digest throughput
fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    let buffer = vec![0xa5u8; 1024 * 1024];

    for kind in [DigestKind::Sha1, DigestKind::Sha256, DigestKind::Sha512] {
        group.bench_function(kind.name(), |b| {
            b.iter(|| {
                let mut ctx: DigestContext = kind.context();
                ctx.update(&buffer);
                black_box(ctx.finish());
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_pool_insert,
    bench_cluster_scan_identity,
    bench_full_scan,
    bench_digest
);
criterion_main!(benches);
