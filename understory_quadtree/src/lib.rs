// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_quadtree --heading-base-level=0

//! Understory Quadtree: an adaptive point quadtree for moving points.
//!
//! Understory Quadtree indexes points inside a fixed rectangular domain and is meant to be
//! mutated once per simulation tick.
//!
//! - Insert points with a user payload; nodes split on demand, one point per leaf.
//! - Query by rectangle (boundary included), accepting whole subtrees when the query
//!   covers them.
//! - Move points with [`QuadTree::update`] and reinsert the ones that left their leaf.
//! - Prune empty branches eagerly per removal ([`QuadTree::erase`]) or lazily in one
//!   pass ([`QuadTree::erase_down`]).
//!
//! Geometry is Kurbo-native: positions are [`kurbo::Point`], node and query boxes are
//! [`kurbo::Rect`]. The tree has no rendering dependency; use [`QuadTree::visit`] to draw
//! or report nodes.
//!
//! ## Node states
//!
//! Every node is exactly one of:
//! - [`NodeKind::Empty`]: holds nothing.
//! - [`NodeKind::Leaf`]: holds one [`Item`].
//! - [`NodeKind::Split`]: owns four children that quadrisect its rect (see [`region::divide`]).
//!
//! Transitions: `Empty → Leaf` on insert, `Leaf → Split` when a second distinct point arrives,
//! `Leaf → Empty` on erase or eviction, and `Split → Empty` when pruning finds all four
//! children empty. The root is never freed.
//!
//! ## Policies
//!
//! Nothing here fails in the exceptional sense. [`QuadTree::try_insert`] reports why an
//! insert was refused with [`InsertError`]:
//! - points outside the domain are ignored, since the root never grows;
//! - points within [`QuadTreeConfig::duplicate_epsilon`] of an existing point are
//!   duplicates (or coalesced, see [`DuplicatePolicy`]);
//! - points that could only be separated below [`QuadTreeConfig::min_node_size`] are
//!   refused, which bounds the depth of the tree.
//!
//! ## Moving points
//!
//! [`QuadTree::update`] advances each item by its payload's [`Motion::velocity`]. Items
//! that leave their leaf are evicted and returned; the tree never reinserts during the
//! traversal. [`QuadTree::step`] bundles the whole tick: update, reinsert from the root,
//! then prune.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect, Vec2};
//! use understory_quadtree::{Item, QuadTree};
//!
//! // A tree over the square centered at the origin with half-extent 1.
//! let mut tree: QuadTree<Vec2> = QuadTree::new(Rect::new(-1.0, -1.0, 1.0, 1.0));
//!
//! assert!(tree.insert(Item::new(Point::new(0.5, 0.5), Vec2::new(0.0, 0.0))));
//! assert!(tree.insert(Item::new(Point::new(0.5, 0.51), Vec2::new(0.0, 0.0))));
//! // Coincident points are refused.
//! assert!(!tree.insert(Item::new(Point::new(0.5, 0.5), Vec2::new(0.0, 0.0))));
//!
//! // A mover that leaves the domain is reported after the tick.
//! assert!(tree.insert(Item::new(Point::new(-0.75, 0.0), Vec2::new(-1.0, 0.0))));
//! let lost = tree.step(0.5);
//! assert_eq!(lost.len(), 1);
//!
//! // Range query.
//! let hits = tree.find_items(Rect::new(0.0, 0.0, 1.0, 1.0));
//! assert_eq!(hits.len(), 2);
//! ```
//!
//! ## Batch removal
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_quadtree::{Item, NodeKind, Prune, QuadTree};
//!
//! let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
//! for i in 0..10 {
//!     let x = 5.0 + 10.0 * f64::from(i);
//!     tree.insert(Item::at(Point::new(x, x)));
//! }
//!
//! // Clear a brush-sized region, then collapse what it left empty in one pass.
//! let removed = tree.remove_within(Rect::new(0.0, 0.0, 50.0, 50.0), Prune::Down);
//! assert_eq!(removed.len(), 5);
//! assert_eq!(tree.len(), 5);
//!
//! // Queries include their boundary, so the domain itself covers every point.
//! let removed = tree.remove_within(tree.domain(), Prune::Up);
//! assert_eq!(removed.len(), 5);
//! assert_eq!(tree.kind(tree.root()), Some(NodeKind::Empty));
//! ```
//!
//! ## Drawing
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_quadtree::{Item, NodeKinds, QuadTree};
//!
//! let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 8.0, 8.0));
//! tree.insert(Item::at(Point::new(1.0, 1.0)));
//! tree.insert(Item::at(Point::new(7.0, 7.0)));
//!
//! let mut crosses = Vec::new();
//! let mut markers = Vec::new();
//! tree.visit(NodeKinds::OCCUPIED, |node| match node.item() {
//!     Some(item) => markers.push(item.position),
//!     None => crosses.push(node.rect.center()),
//! });
//! assert_eq!(crosses, [Point::new(4.0, 4.0)]);
//! assert_eq!(markers.len(), 2);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod region;
pub mod tree;
pub mod types;

pub use config::{DuplicatePolicy, QuadTreeConfig};
pub use error::{ConfigError, InsertError, Rejected};
pub use tree::QuadTree;
pub use types::{Item, Motion, NodeId, NodeKind, NodeKinds, NodeView, Prune, QueryStats};

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect, Vec2};

    #[test]
    fn moving_swarm_stays_consistent() {
        let mut tree: QuadTree<Vec2> = QuadTree::new(Rect::new(0.0, 0.0, 64.0, 64.0));
        for i in 0..16_u32 {
            for j in 0..16_u32 {
                let p = Point::new(2.0 + 4.0 * f64::from(i), 2.0 + 4.0 * f64::from(j));
                let v = Vec2::new(f64::from(j) - 7.5, f64::from(i) - 7.5);
                assert!(tree.insert(Item::new(p, v)));
            }
        }
        let mut lost = 0;
        for _ in 0..20 {
            lost += tree.step(0.1).len();
        }
        assert_eq!(tree.len() + lost, 256);
        assert_eq!(tree.iter().count(), tree.len());
        let found = tree.find(tree.domain());
        assert_eq!(found.len(), tree.len());
    }

    #[test]
    fn static_and_moving_payloads_share_one_tree_type() {
        let mut still: QuadTree<()> = QuadTree::new(Rect::new(-1.0, -1.0, 1.0, 1.0));
        assert!(still.insert(Item::at(Point::new(0.25, 0.25))));
        assert!(still.update(10.0).is_empty(), "static points never move");
        assert_eq!(still.len(), 1);
    }
}
