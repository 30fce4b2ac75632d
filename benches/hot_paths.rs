//! Hot-path benchmarks — the per-code costs of a run.
//!
//! Routing, normalization, ring rotation, and counter updates run once per
//! code (or more, with requeues); the queue cycle bounds how fast a fleet
//! can drain work when lookups are instant.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use promo_checker::client::PromotionInfo;
use promo_checker::{
    input, route, CheckerConfig, CodeQueue, GiftCodeLookup, Outcome, Proxy, ProxyRing,
    RunCounters, Verdict,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn promo_verdict(uses: u64, max_uses: u64, header: &str) -> Verdict {
    Verdict::Response(GiftCodeLookup {
        uses: Some(uses),
        max_uses: Some(max_uses),
        promotion: Some(PromotionInfo {
            inbound_header_text: Some(header.to_string()),
        }),
        ..GiftCodeLookup::default()
    })
}

fn make_ring(size: usize) -> ProxyRing {
    let config = CheckerConfig::default();
    let proxies = (0..size)
        .map(|i| Proxy::parse(&format!("127.0.0.1:{}", 8000 + i), &config).expect("proxy"))
        .collect();
    ProxyRing::new(proxies).expect("ring")
}

// ---------------------------------------------------------------------------
// Bench: route — one verdict of each shape
// ---------------------------------------------------------------------------

fn bench_route_verdicts(c: &mut Criterion) {
    let verdicts = [
        promo_verdict(0, 5, "3 months of premium"),
        promo_verdict(1, 5, "1 month of premium"),
        Verdict::Response(GiftCodeLookup {
            message: Some("Unknown Gift Code".to_string()),
            ..GiftCodeLookup::default()
        }),
        Verdict::Response(GiftCodeLookup {
            uses: Some(5),
            max_uses: Some(5),
            ..GiftCodeLookup::default()
        }),
        Verdict::Failed("all 3 attempts failed: attempt 1: timeout".to_string()),
    ];

    c.bench_function("route_verdicts", |b| {
        b.iter(|| {
            for verdict in &verdicts {
                let _ = black_box(route(black_box(verdict)));
            }
        })
    });
}

// ---------------------------------------------------------------------------
// Bench: normalize_code — pasted URL vs bare code
// ---------------------------------------------------------------------------

fn bench_normalize_code(c: &mut Criterion) {
    c.bench_function("normalize_code_url", |b| {
        b.iter(|| {
            black_box(input::normalize_code(black_box(
                "https://discord.gg/promos/AbCd1234EfGh5678",
            )))
        })
    });

    c.bench_function("normalize_code_bare", |b| {
        b.iter(|| black_box(input::normalize_code(black_box("AbCd1234EfGh5678"))))
    });
}

// ---------------------------------------------------------------------------
// Bench: ring rotation — lock-free proxy handout
// ---------------------------------------------------------------------------

fn bench_ring_next(c: &mut Criterion) {
    let ring = make_ring(10);

    c.bench_function("ring_next", |b| {
        b.iter(|| {
            black_box(ring.next().endpoint());
        })
    });
}

// ---------------------------------------------------------------------------
// Bench: counters — one record per classified code
// ---------------------------------------------------------------------------

fn bench_counters_record(c: &mut Criterion) {
    let counters = RunCounters::new();

    c.bench_function("counters_record", |b| {
        b.iter(|| {
            black_box(counters.record(black_box(Outcome::Used)));
        })
    });
}

// ---------------------------------------------------------------------------
// Bench: queue drain — take/complete across a fleet-sized workload
// ---------------------------------------------------------------------------

fn bench_queue_drain(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("queue_drain");
    group.sample_size(20);

    for count in [100usize, 1000] {
        group.bench_with_input(BenchmarkId::new("codes", count), &count, |b, &count| {
            b.to_async(&rt).iter(|| async move {
                let codes: Vec<String> = (0..count).map(|i| format!("code-{i}")).collect();
                let queue = Arc::new(CodeQueue::new(codes));

                while let Some(code) = queue.take().await {
                    black_box(code);
                    queue.complete().await;
                }
                black_box(queue.is_drained().await);
            })
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Bench: queue requeue — the rate-limit revisit cycle
// ---------------------------------------------------------------------------

fn bench_queue_requeue_cycle(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    c.bench_function("queue_requeue_cycle", |b| {
        b.to_async(&rt).iter(|| async {
            let queue = CodeQueue::new(vec!["bouncy".to_string()]);
            // One deferred pass, then the terminal one.
            if let Some(code) = queue.take().await {
                queue.requeue(code).await;
            }
            if let Some(code) = queue.take().await {
                black_box(&code);
                queue.complete().await;
            }
            black_box(queue.is_drained().await);
        })
    });
}

criterion_group!(
    hot_paths,
    bench_route_verdicts,
    bench_normalize_code,
    bench_ring_next,
    bench_counters_record,
    bench_queue_drain,
    bench_queue_requeue_cycle,
);

criterion_main!(hot_paths);
