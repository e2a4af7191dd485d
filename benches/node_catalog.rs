//! Benchmarks for node-type validation
//!
//! A realistic n8n instance exposes several hundred node types; a miss scans
//! all of them for the closest suggestion.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use n8n_workflow_builder::catalog::{best_match, similarity, StaticCatalogSource};
use n8n_workflow_builder::{CatalogConfig, NodeCatalog, NodeDescriptor, SystemClock};
use std::sync::Arc;

fn node_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("n8n-nodes-base.integration{:04}", i))
        .collect()
}

fn catalog(count: usize) -> NodeCatalog {
    let nodes = node_names(count)
        .into_iter()
        .map(|name| NodeDescriptor::new(name.clone(), name))
        .collect();
    NodeCatalog::new(
        Arc::new(StaticCatalogSource::new(nodes)),
        Arc::new(SystemClock),
        CatalogConfig::default(),
    )
}

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");
    group.throughput(Throughput::Elements(1));

    group.bench_function("score_pair", |b| {
        b.iter(|| {
            similarity(
                black_box("n8n-nodes-base.httpRequest"),
                black_box("n8n-nodes-base.HttpRequst"),
            )
        });
    });

    let names = node_names(500);
    group.throughput(Throughput::Elements(names.len() as u64));
    group.bench_function("best_match_500", |b| {
        b.iter(|| {
            best_match(
                black_box("n8n-nodes-base.integraton0420"),
                names.iter().map(String::as_str),
            )
        });
    });

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_catalog");
    group.throughput(Throughput::Elements(1));

    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog = catalog(500);
    rt.block_on(catalog.ensure_loaded());

    group.bench_function("validate_hit", |b| {
        b.to_async(&rt).iter(|| async {
            catalog
                .validate(black_box("n8n-nodes-base.integration0250"))
                .await
        });
    });

    group.bench_function("validate_miss_with_suggestion", |b| {
        b.to_async(&rt).iter(|| async {
            catalog
                .validate(black_box("n8n-nodes-base.integraton0250"))
                .await
        });
    });

    group.finish();
}

criterion_group!(benches, bench_similarity, bench_validate);
criterion_main!(benches);
