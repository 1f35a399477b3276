use criterion::{Criterion, black_box, criterion_group, criterion_main};
use keybench_core::provider::openssl::OpensslProvider;
use keybench_core::{BenchmarkHarness, MockProvider, NoOpSink, SignatureProvider, descriptor};
use std::sync::Arc;

fn bench_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime for benchmarks")
}

fn bench_descriptor_lookup(c: &mut Criterion) {
    c.bench_function("descriptor_find_exact", |b| {
        b.iter(|| descriptor::find(black_box("rsa2048")))
    });

    c.bench_function("descriptor_find_normalized", |b| {
        b.iter(|| descriptor::find(black_box("RSA-2048")))
    });
}

fn bench_harness_overhead(c: &mut Criterion) {
    let rt = bench_runtime();
    let harness = BenchmarkHarness::new(Arc::new(MockProvider::new()));
    let desc = descriptor::find("p256").unwrap();

    // Mock latencies are zero, so this measures pure harness overhead:
    // sampling, averaging, and sink dispatch for 60 repetitions.
    c.bench_function("harness_single_run_mock", |b| {
        b.iter(|| {
            rt.block_on(async { harness.run_single(black_box(desc), &NoOpSink).await })
                .unwrap()
        })
    });
}

fn bench_p256_operations(c: &mut Criterion) {
    let rt = bench_runtime();
    let provider = OpensslProvider::new().expect("openssl backend unavailable");
    let desc = descriptor::find("p256").unwrap();

    let keypair = rt
        .block_on(provider.generate_keypair(&desc))
        .expect("p256 keygen failed");
    let signature = rt
        .block_on(provider.sign(&desc, &keypair, b"benchmark"))
        .expect("p256 sign failed");

    c.bench_function("p256_keygen", |b| {
        b.iter(|| rt.block_on(provider.generate_keypair(black_box(&desc))).unwrap())
    });

    c.bench_function("p256_sign", |b| {
        b.iter(|| {
            rt.block_on(provider.sign(black_box(&desc), &keypair, b"benchmark"))
                .unwrap()
        })
    });

    c.bench_function("p256_verify", |b| {
        b.iter(|| {
            rt.block_on(provider.verify(black_box(&desc), &keypair, &signature, b"benchmark"))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_descriptor_lookup,
    bench_harness_overhead,
    bench_p256_operations
);
criterion_main!(benches);
