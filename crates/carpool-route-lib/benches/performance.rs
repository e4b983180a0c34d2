//! Performance benchmarks for carpool-route-lib
//!
//! Run with: cargo bench --package carpool-route-lib

use carpool_route_lib::{
    DEFAULT_BUFFER_DEG, LatLon, Planner, Segment, analyze_overlap, build_graph, filter_segments,
    route,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const STEP_DEG: f64 = 0.002;

/// Street grid of `size` x `size` intersections: one segment per row and per
/// column, so every intersection is a shared vertex.
fn generate_grid(size: usize, base_lat: f64, base_lon: f64) -> Vec<Segment> {
    let point = |r: usize, c: usize| {
        LatLon::new(
            base_lat + r as f64 * STEP_DEG,
            base_lon + c as f64 * STEP_DEG,
        )
    };

    let rows = (0..size).map(|r| (0..size).map(|c| point(r, c)).collect::<Vec<_>>());
    let cols = (0..size).map(|c| (0..size).map(|r| point(r, c)).collect::<Vec<_>>());

    rows.chain(cols)
        .enumerate()
        .filter_map(|(id, nodes)| Segment::new(nodes).ok().map(|s| s.with_id(id as i64)))
        .collect()
}

/// Grid around the query plus many far away grids the filter has to skip
fn generate_dataset(size: usize, far_grids: usize) -> Vec<Segment> {
    let mut segments = generate_grid(size, 47.5, 6.8);
    for i in 0..far_grids {
        segments.extend(generate_grid(size / 4, 40.0 + i as f64, -3.0));
    }
    segments
}

fn corners(size: usize) -> (Vec<LatLon>, Vec<LatLon>) {
    let span = (size - 1) as f64 * STEP_DEG;
    let starts = vec![
        LatLon::new(47.5, 6.8),
        LatLon::new(47.5 + span, 6.8),
        LatLon::new(47.5, 6.8 + span),
    ];
    let ends = vec![
        LatLon::new(47.5 + span, 6.8 + span),
        LatLon::new(47.5 + span / 2.0, 6.8 + span / 2.0),
        LatLon::new(47.5 + span / 3.0, 6.8 + span),
    ];
    (starts, ends)
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    let segments = generate_dataset(100, 20);
    let (starts, ends) = corners(100);
    let query: Vec<LatLon> = starts.iter().chain(&ends).copied().collect();
    let vertices: usize = segments.iter().map(Segment::len).sum();

    group.throughput(Throughput::Elements(vertices as u64));
    group.bench_function("grid_100_far_20", |b| {
        b.iter(|| filter_segments(black_box(&segments), &query, DEFAULT_BUFFER_DEG));
    });

    group.finish();
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");
    group.sample_size(20);

    for size in [50, 200] {
        let segments = generate_grid(size, 47.5, 6.8);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &segments, |b, segments| {
            b.iter(|| build_graph(black_box(segments)));
        });
    }

    group.finish();
}

fn bench_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    group.sample_size(20);

    for size in [50, 200] {
        let graph = build_graph(&generate_grid(size, 47.5, 6.8));
        let (starts, ends) = corners(size);
        group.throughput(Throughput::Elements(graph.node_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| route(black_box(graph), &starts, &ends).unwrap());
        });
    }

    group.finish();
}

fn bench_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap");

    let graph = build_graph(&generate_grid(200, 47.5, 6.8));
    let (starts, ends) = corners(200);
    let result = route(&graph, &starts, &ends).unwrap();

    group.bench_function("three_paths_grid_200", |b| {
        b.iter(|| analyze_overlap(black_box(&result.paths)));
    });

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    group.sample_size(10);

    let segments = generate_dataset(100, 20);
    let (starts, ends) = corners(100);
    let planner = Planner::default();

    group.bench_function("grid_100_far_20", |b| {
        b.iter(|| planner.plan(black_box(&segments), &starts, &ends).unwrap());
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_filter,
    bench_build_graph,
    bench_route,
    bench_overlap,
    bench_plan,
);

criterion_main!(benches);
