use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dirsync_fs::{ScanOptions, Snapshot, io};
use std::fs;
use tempfile::tempdir;

fn write_atomic_benchmark(c: &mut Criterion) {
    c.bench_function("io::write_atomic", |b| {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let content = "hello world".as_bytes();

        b.iter(|| {
            io::write_atomic(black_box(&path), black_box(content)).unwrap();
        })
    });
}

fn snapshot_scan_benchmark(c: &mut Criterion) {
    c.bench_function("snapshot::Snapshot::scan (500 files)", |b| {
        let dir = tempdir().unwrap();
        for i in 0..500 {
            let sub = dir.path().join(format!("dir{}", i % 10));
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join(format!("file{i}.txt")), "x").unwrap();
        }
        let options = ScanOptions::default();

        b.iter(|| {
            let snapshot = Snapshot::scan(black_box(dir.path()), &options).unwrap();
            assert_eq!(snapshot.len(), 500);
        })
    });
}

criterion_group!(benches, write_atomic_benchmark, snapshot_scan_benchmark);
criterion_main!(benches);
