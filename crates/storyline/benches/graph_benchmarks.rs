//! Dependency graph build and ordering benchmarks.
//!
//! Schemas are generated as layered star schemas: each layer references
//! a few tables of the layer before it.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use storyline::story::generate_default_steps;
use storyline::{topological_sort_tables, DependencyGraph, TableInfo};

/// Generate `tables` tables spread over layers of `width`.
fn generate_schema(tables: usize, width: usize) -> Vec<TableInfo> {
    (0..tables)
        .map(|i| {
            let layer = i / width;
            let mut table = TableInfo::new(format!("table_{:04}", i));
            if layer > 0 {
                let previous = (layer - 1) * width;
                for k in 0..3 {
                    let target = previous + (i * 7 + k * 3) % width;
                    table = table.references(&format!("table_{:04}", target), &format!("ref_{}", k));
                }
            }
            table
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for tables in [10, 100, 1_000].iter() {
        let schema = generate_schema(*tables, 10);
        group.throughput(Throughput::Elements(*tables as u64));
        group.bench_with_input(BenchmarkId::new("tables", tables), &schema, |b, schema| {
            b.iter(|| black_box(DependencyGraph::build(schema)))
        });
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("topological_sort");

    for tables in [10, 100, 1_000].iter() {
        let graph = DependencyGraph::build(&generate_schema(*tables, 10));
        group.throughput(Throughput::Elements(*tables as u64));
        group.bench_with_input(BenchmarkId::new("tables", tables), &graph, |b, graph| {
            b.iter(|| black_box(topological_sort_tables(graph)))
        });
    }

    group.finish();
}

fn bench_generate_steps(c: &mut Criterion) {
    let graph = DependencyGraph::build(&generate_schema(100, 10));

    c.bench_function("generate_default_steps_100", |b| {
        b.iter(|| black_box(generate_default_steps(&graph, 1)))
    });
}

criterion_group!(benches, bench_build, bench_sort, bench_generate_steps);
criterion_main!(benches);
