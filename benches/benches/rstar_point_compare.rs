// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_quadtree::{Item, QuadTree};

use rstar::{AABB, RTree};

fn gen_grid_points(n: usize, cell: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Point::new((x as f64 + 0.5) * cell, (y as f64 + 0.5) * cell));
        }
    }
    out
}

fn bench_point_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_point_compare");
    for &n in &[64usize, 128] {
        let points = gen_grid_points(n, 10.0);
        let domain = Rect::new(0.0, 0.0, n as f64 * 10.0, n as f64 * 10.0);
        let query = Rect::new(100.0, 100.0, 500.0, 500.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("quadtree_build_query_n{}", n), |b| {
            b.iter_batched(
                || QuadTree::<()>::new(domain),
                |mut tree| {
                    for &p in &points {
                        let _ = tree.insert(Item::at(p));
                    }
                    black_box(tree.find(query).len());
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("rstar_build_query_n{}", n), |b| {
            b.iter(|| {
                let tree = RTree::bulk_load(points.iter().map(|p| [p.x, p.y]).collect());
                let env = AABB::from_corners([query.x0, query.y0], [query.x1, query.y1]);
                black_box(tree.locate_in_envelope(&env).count());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_point_compare);
criterion_main!(benches);
