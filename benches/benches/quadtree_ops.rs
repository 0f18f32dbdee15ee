// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Vec2};
use understory_quadtree::{Item, Prune, QuadTree};

const WORLD: f64 = 2048.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn world() -> Rect {
    Rect::new(-WORLD / 2.0, -WORLD / 2.0, WORLD / 2.0, WORLD / 2.0)
}

fn gen_uniform_points(count: usize) -> Vec<Item<Vec2>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x = (rng.next_f64() - 0.5) * WORLD;
        let y = (rng.next_f64() - 0.5) * WORLD;
        let v = Vec2::new(rng.next_f64() - 0.5, rng.next_f64() - 0.5) * 64.0;
        out.push(Item::new(Point::new(x, y), v));
    }
    out
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Item<Vec2>> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push(Point::new(
            (rng.next_f64() - 0.5) * WORLD * 0.8,
            (rng.next_f64() - 0.5) * WORLD * 0.8,
        ));
    }
    for c in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Item::new(c + Vec2::new(dx, dy), Vec2::ZERO));
        }
    }
    out
}

fn build(items: &[Item<Vec2>]) -> QuadTree<Vec2> {
    let mut tree = QuadTree::new(world());
    for item in items.iter().cloned() {
        let _ = tree.insert(item);
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[1_000usize, 10_000, 50_000] {
        let items = gen_uniform_points(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("uniform_n{}", n), |b| {
            b.iter(|| black_box(build(&items).len()));
        });
    }
    let items = gen_clustered_points(32, 256, 4.0);
    group.throughput(Throughput::Elements(items.len() as u64));
    group.bench_function("clustered", |b| {
        b.iter(|| black_box(build(&items).node_count()));
    });
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    let tree = build(&gen_uniform_points(50_000));
    for &half in &[8.0, 64.0, 256.0] {
        group.bench_function(format!("window_{}", half), |b| {
            b.iter(|| {
                let query = Rect::from_center_size(Point::new(100.0, -50.0), (half * 2.0, half * 2.0));
                black_box(tree.find(black_box(query)).len())
            });
        });
    }
    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for &n in &[1_000usize, 10_000] {
        let tree = build(&gen_uniform_points(n));
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("uniform_n{}", n), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| black_box(tree.step(1.0 / 60.0).len()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_within");
    let tree = build(&gen_uniform_points(20_000));
    let brush = Rect::from_center_size(Point::ZERO, (256.0, 256.0));
    for prune in [Prune::Up, Prune::Down] {
        group.bench_function(format!("{:?}", prune), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| black_box(tree.remove_within(brush, prune).len()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find, bench_step, bench_prune);
criterion_main!(benches);
