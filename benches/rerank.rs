//! Rerank stage benchmarks.
//!
//! Run with: cargo bench

#![allow(clippy::cast_precision_loss)]

use std::hint::black_box;

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rummage::core::{Listing, ListingKind};
use rummage::rerank::{cosine_similarity, rerank};

/// Deterministic non-trivial vector of the given dimension.
fn vector(dim: usize, phase: f32) -> Vec<f32> {
    (0..dim).map(|i| (phase + i as f32 * 0.1).sin()).collect()
}

fn candidate_pool(size: usize, dim: usize) -> Vec<Listing> {
    (0..size)
        .map(|i| {
            let mut listing = Listing::new(
                "Owner",
                ListingKind::Lost,
                format!("Item {i}"),
                "Benchmark listing",
                "Misc",
                "Campus",
                Utc::now(),
            );
            listing.embedding = Some(vector(dim, i as f32 * 0.01));
            listing
        })
        .collect()
}

fn bench_cosine(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosine_similarity");
    for dim in [256usize, 1536] {
        let a = vector(dim, 0.0);
        let b_vec = vector(dim, 0.5);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, _| {
            b.iter(|| cosine_similarity(black_box(&a), black_box(&b_vec)));
        });
    }
    group.finish();
}

fn bench_rerank_pool(c: &mut Criterion) {
    let query = vector(1536, 0.25);
    let candidates = candidate_pool(100, 1536);

    c.bench_function("rerank_100_to_8", |b| {
        b.iter(|| rerank(black_box(&query), black_box(&candidates), 8));
    });
}

criterion_group!(benches, bench_cosine, bench_rerank_pool);
criterion_main!(benches);
