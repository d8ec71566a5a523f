//! Route matching benchmarks
//!
//! Covers the hot paths hit on every navigation:
//! - single template matching
//! - first-match lookup over a realistic table
//! - full target resolution with query filtering
//!
//! Run with: `cargo bench --bench matching`

#![allow(missing_docs)] // Benchmarks don't need extensive docs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use waypoint_router::matcher::match_route;
use waypoint_router::parser::resolve;
use waypoint_router::{RouteConfig, RouteTable, RouteTarget};

fn client_routes() -> RouteTable {
    RouteTable::new()
        .route("/", RouteConfig::new())
        .route("/login", RouteConfig::new().with_query_params(["redirect"]))
        .route("/clients", RouteConfig::new().with_query_params(["search", "page"]))
        .route("/clients/new", RouteConfig::new())
        .route("/clients/:id", RouteConfig::new())
        .route(
            "/clients/:id/cars/:carId",
            RouteConfig::new().with_query_params(["action", "modal"]),
        )
        .route("/admin", RouteConfig::new().requires_authentication())
}

/// Table of `size` parameterized routes; only the last one matches `/r{size-1}/...`.
fn wide_table(size: usize) -> RouteTable {
    (0..size)
        .map(|index| (format!("/r{index}/:id/items/:item"), RouteConfig::new()))
        .collect()
}

fn bench_match_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_route");
    group.throughput(Throughput::Elements(1));

    group.bench_function("literal_hit", |b| {
        b.iter(|| match_route(black_box("/clients/new"), black_box("/clients/new")));
    });

    group.bench_function("params_hit", |b| {
        b.iter(|| {
            match_route(
                black_box("/clients/:id/cars/:carId"),
                black_box("/clients/123/cars/456"),
            )
        });
    });

    group.bench_function("segment_count_miss", |b| {
        b.iter(|| match_route(black_box("/clients/:id"), black_box("/clients/123/cars/456")));
    });

    group.finish();
}

fn bench_find_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_match");

    for size in [8, 64, 512] {
        let table = wide_table(size);
        let path = format!("/r{}/42/items/7", size - 1);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &path, |b, path| {
            b.iter(|| table.find_match(black_box(path)));
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let routes = client_routes();

    let targets = [
        ("plain_path", RouteTarget::from("/clients/123")),
        (
            "path_with_query",
            RouteTarget::from("/clients/123/cars/456?action=edit&modal=true&utm_source=mail"),
        ),
        (
            "descriptor",
            RouteTarget::template("/clients/:id/cars/:carId")
                .with_route_param("id", "123")
                .with_route_param("carId", "456")
                .with_query_param("action", "edit"),
        ),
        ("unmatched", RouteTarget::from("/settings/profile")),
    ];

    for (name, target) in &targets {
        group.bench_with_input(BenchmarkId::from_parameter(name), target, |b, target| {
            b.iter(|| resolve(black_box(target), &routes));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_match_route, bench_find_match, bench_resolve);
criterion_main!(benches);
