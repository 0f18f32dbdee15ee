// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree basics.
//!
//! Insert a few points, query a window, and remove a region.
//!
//! Run:
//! - `cargo run -p understory_examples --example quadtree_basics`

use kurbo::{Point, Rect};
use understory_quadtree::{InsertError, Item, NodeKind, Prune, QuadTree, QueryStats};

fn main() {
    let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));

    for (i, (x, y)) in [(10.0, 10.0), (12.0, 11.0), (80.0, 20.0), (55.0, 70.0), (90.0, 90.0)]
        .into_iter()
        .enumerate()
    {
        let id = tree
            .try_insert(Item::new(Point::new(x, y), i))
            .expect("distinct points inside the domain");
        println!("inserted #{i} at ({x}, {y}) into leaf {id:?}");
    }

    // Refusals carry the item back.
    let rejected = tree.try_insert(Item::new(Point::new(150.0, 10.0), 99)).unwrap_err();
    assert_eq!(rejected.reason, InsertError::OutOfBounds);
    let rejected = tree.try_insert(Item::new(Point::new(10.0, 10.0), 100)).unwrap_err();
    assert_eq!(rejected.reason, InsertError::Duplicate);
    println!("refused payload {} ({})", rejected.item.payload, rejected.reason);

    // Window query, with traversal counters.
    let mut stats = QueryStats::default();
    let window = Rect::new(0.0, 0.0, 60.0, 75.0);
    let hits = tree.find_with_stats(window, &mut stats);
    let mut payloads: Vec<usize> = hits.iter().filter_map(|&id| tree.get(id)).map(|it| it.payload).collect();
    payloads.sort_unstable();
    println!("window {window:?} -> {payloads:?} ({stats:?})");
    assert_eq!(payloads, [0, 1, 3]);

    // Clear the lower-left quarter and prune in one pass.
    let removed = tree.remove_within(Rect::new(0.0, 0.0, 50.0, 50.0), Prune::Down);
    println!("removed {} items, {} remain, {} nodes", removed.len(), tree.len(), tree.node_count());
    assert_eq!(removed.len(), 2);

    let root = tree.root();
    assert_eq!(tree.kind(root), Some(NodeKind::Split));
    for (q, child) in tree.children(root).into_iter().flatten().enumerate() {
        println!("quadrant {q}: {:?} {:?}", tree.kind(child), tree.rect(child));
    }
}
