//! Benchmark suite for the RemitGuard scoring hot path.
//!
//! Run with: `cargo bench --package remitguard`

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use remitguard::prelude::*;
use std::sync::Arc;

fn attempt(amount: i64, tx_id: &str) -> TransactionAttempt {
    TransactionAttempt::new(
        "user-1",
        amount,
        "EUR",
        tx_id,
        Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap(),
    )
}

fn scorer_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("tokio runtime");

    let scorer = FraudScorer::new(Arc::new(MemoryCounterStore::new()), FraudConfig::default());
    let tx = attempt(15_000, "bench-tx");

    c.bench_function("fraud/evaluate", |b| {
        b.iter(|| {
            rt.block_on(scorer.evaluate(black_box(&tx)))
                .expect("evaluation")
        })
    });
}

fn level_mapping_benchmark(c: &mut Criterion) {
    c.bench_function("fraud/risk_level_from_score", |b| {
        b.iter(|| {
            for score in 0u32..=100 {
                black_box(RiskLevel::from_score(black_box(score)));
            }
        })
    });
}

criterion_group!(benches, scorer_benchmark, level_mapping_benchmark);
criterion_main!(benches);
