// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving particles.
//!
//! Spawn a ring of particles, run the per-tick update/reinsert/prune cycle, and
//! periodically erase everything under a brush.
//!
//! Run:
//! - `cargo run -p understory_examples --example quadtree_simulation`

use kurbo::{Point, Rect, Vec2};
use understory_quadtree::{Item, NodeKind, NodeKinds, Prune, QuadTree};

const TICKS: usize = 120;
const DT: f64 = 1.0 / 60.0;

fn main() {
    let domain = Rect::new(-1.0, -1.0, 1.0, 1.0);
    let mut tree: QuadTree<Vec2> = QuadTree::new(domain);

    let count = 400_u32;
    for i in 0..count {
        let a = f64::from(i) / f64::from(count) * core::f64::consts::TAU;
        let r = 0.2 + 0.6 * f64::from(i % 7) / 7.0;
        let p = Point::new(r * a.cos(), r * a.sin());
        // Swirl outward.
        let v = Vec2::new(-a.sin(), a.cos()) * 0.4 + p.to_vec2() * 0.3;
        tree.insert(Item::new(p, v));
    }
    println!("spawned {} particles in {} nodes", tree.len(), tree.node_count());

    let brush = Rect::from_center_size(Point::new(0.5, 0.0), (0.2, 0.2));
    let mut lost = 0;
    for tick in 0..TICKS {
        lost += tree.step(DT).len();
        if tick % 30 == 29 {
            let erased = tree.remove_within(brush, Prune::Up);
            println!("tick {tick}: brush erased {}", erased.len());
        }
    }

    // Overlay report: split crosses and particle markers.
    let mut splits = 0;
    let mut leaves = 0;
    let mut max_depth = 0;
    tree.visit(NodeKinds::OCCUPIED, |node| {
        match node.kind() {
            NodeKind::Split => splits += 1,
            NodeKind::Leaf => leaves += 1,
            NodeKind::Empty => {}
        }
        max_depth = max_depth.max(node.depth);
    });
    println!(
        "after {TICKS} ticks: {} particles, {lost} left the domain, {splits} splits, {leaves} leaves, depth {max_depth}",
        tree.len()
    );
    assert_eq!(leaves, tree.len());
}
