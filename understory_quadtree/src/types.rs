// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the quadtree: node identifiers, items, node kinds, and views.

use kurbo::{Point, Rect, Vec2};

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle consisting of a slot index and a generation counter.
/// Nodes are freed when a split collapses, and their slots are reused by later splits.
///
/// ## Semantics
///
/// - A fresh slot is allocated with generation `1`.
/// - When a split collapses, its descendants' slots are freed; existing `NodeId`s for
///   them become stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Stale `NodeId`s never alias a different live node, and every operation given one
/// is a no-op. Use [`QuadTree::is_alive`](crate::QuadTree::is_alive) to check.
///
/// A leaf's `NodeId` is only meaningful until the next structural change to that
/// leaf: an insert that splits it turns it into a split node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A point stored in the tree: a position plus a user payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Item<T> {
    /// Position in the tree's coordinate space.
    pub position: Point,
    /// User payload (for moving points, typically carries a velocity).
    pub payload: T,
}

impl<T> Item<T> {
    /// Create an item at `position` carrying `payload`.
    pub const fn new(position: Point, payload: T) -> Self {
        Self { position, payload }
    }
}

impl Item<()> {
    /// A payload-free item.
    pub const fn at(position: Point) -> Self {
        Self::new(position, ())
    }
}

/// Payloads that drive [`QuadTree::update`](crate::QuadTree::update).
///
/// The tree only relocates or evicts; integration beyond `position += velocity * dt`
/// is the caller's concern (see [`QuadTree::update_with`](crate::QuadTree::update_with)).
pub trait Motion {
    /// Current velocity in units per second.
    fn velocity(&self) -> Vec2;
}

impl Motion for Vec2 {
    fn velocity(&self) -> Vec2 {
        *self
    }
}

/// Static points never move.
impl Motion for () {
    fn velocity(&self) -> Vec2 {
        Vec2::ZERO
    }
}

/// State of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Holds nothing.
    Empty,
    /// Holds exactly one item.
    Leaf,
    /// Holds four children that tile its rect.
    Split,
}

bitflags::bitflags! {
    /// Which node kinds a [`QuadTree::visit`](crate::QuadTree::visit) reports.
    ///
    /// Filtering never stops the traversal from descending through a split node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeKinds: u8 {
        /// Report empty nodes.
        const EMPTY = 0b0000_0001;
        /// Report leaf nodes.
        const LEAF  = 0b0000_0010;
        /// Report split nodes.
        const SPLIT = 0b0000_0100;
        /// What a debug overlay draws: split crosses and leaf markers.
        const OCCUPIED = Self::LEAF.bits() | Self::SPLIT.bits();
    }
}

impl Default for NodeKinds {
    fn default() -> Self {
        Self::OCCUPIED
    }
}

impl From<NodeKind> for NodeKinds {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Empty => Self::EMPTY,
            NodeKind::Leaf => Self::LEAF,
            NodeKind::Split => Self::SPLIT,
        }
    }
}

/// Read-only view of a node handed to visitors.
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a, T> {
    /// The node.
    pub id: NodeId,
    /// The node's rect.
    pub rect: Rect,
    /// Distance from the root (the root is `0`).
    pub depth: u32,
    pub(crate) item: Option<&'a Item<T>>,
    pub(crate) split: bool,
}

impl<'a, T> NodeView<'a, T> {
    /// The node's state.
    pub fn kind(&self) -> NodeKind {
        match (self.split, self.item) {
            (true, _) => NodeKind::Split,
            (false, Some(_)) => NodeKind::Leaf,
            (false, None) => NodeKind::Empty,
        }
    }

    /// True for split nodes.
    pub fn is_split(&self) -> bool {
        self.split
    }

    /// The stored item for leaves.
    pub fn item(&self) -> Option<&'a Item<T>> {
        self.item
    }
}

/// Counters collected by [`QuadTree::find_with_stats`](crate::QuadTree::find_with_stats).
///
/// Purely observational; stats never influence results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Nodes entered by the descent (including empty ones).
    pub visited: usize,
    /// Subtrees accepted whole because the query strictly contained them.
    pub accepted_whole: usize,
}

/// Pruning discipline for batch removal.
///
/// Both converge to the same shape for a tree without dangling splits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Prune {
    /// Walk ancestors after every removal ([`QuadTree::erase_up`](crate::QuadTree::erase_up)).
    Up,
    /// Clear leaves lazily, then run one [`QuadTree::erase_down`](crate::QuadTree::erase_down).
    #[default]
    Down,
}
