//! Benchmarks for canary probing and the already-present fast path.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use libcrypto_loader::{
    CanarySymbol, LoadOrchestrator, LoaderConfig, SymbolProbe, SystemLinker,
};

fn bench_probe(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe");
    let probe = SymbolProbe::new(SystemLinker::new());

    if let Ok(present) = CanarySymbol::new("malloc") {
        group.bench_function("resolved", |b| b.iter(|| probe.probe(black_box(&present))));
    }
    if let Ok(absent) = CanarySymbol::new("libcrypto_loader_bench_absent") {
        group.bench_function("unresolved", |b| b.iter(|| probe.probe(black_box(&absent))));
    }

    group.finish();
}

fn bench_already_present(c: &mut Criterion) {
    let Ok(canary) = CanarySymbol::new("malloc") else {
        return;
    };
    let config = LoaderConfig::with_canary(canary);
    let orchestrator = LoadOrchestrator::new(SystemLinker::new(), &config);

    c.bench_function("try_load_already_present", |b| {
        b.iter(|| orchestrator.try_load(black_box(None)))
    });
}

criterion_group!(benches, bench_probe, bench_already_present);
criterion_main!(benches);
