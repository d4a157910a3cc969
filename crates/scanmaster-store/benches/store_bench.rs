// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for checksumming and blob round trips in the
// scanmaster-store crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use scanmaster_store::{BlobStore, SqliteBlobStore, hash_bytes};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark SHA-256 checksumming at various blob sizes.
///
/// Sizes: 1 KiB, 100 KiB, 1 MiB, 8 MiB -- from usage counters up to a
/// library holding a handful of multi-page scans.
fn bench_checksum(c: &mut Criterion) {
    let sizes: &[(&str, usize)] = &[
        ("1 KiB", 1024),
        ("100 KiB", 100 * 1024),
        ("1 MiB", 1024 * 1024),
        ("8 MiB", 8 * 1024 * 1024),
    ];

    let mut group = c.benchmark_group("checksum_sha256");
    for &(label, size) in sizes {
        let data = vec![0xABu8; size];
        group.bench_function(label, |b| {
            b.iter(|| black_box(hash_bytes(black_box(&data))));
        });
    }
    group.finish();
}

/// Benchmark a put-then-verified-get of a 1 MiB blob in an in-memory database.
fn bench_sqlite_round_trip(c: &mut Criterion) {
    let store = SqliteBlobStore::open_in_memory().expect("open store");
    let value = vec![0x42u8; 1024 * 1024];

    c.bench_function("sqlite put+get (1 MiB)", |b| {
        b.iter(|| {
            store.put("scanmaster.docs", black_box(&value)).expect("put");
            black_box(store.get("scanmaster.docs").expect("get"));
        });
    });
}

criterion_group!(benches, bench_checksum, bench_sqlite_round_trip);
criterion_main!(benches);
