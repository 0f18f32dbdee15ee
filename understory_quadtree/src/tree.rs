// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: node arena, insertion, queries, pruning, and motion.

use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use kurbo::{Point, Rect};
use tracing::{debug, trace};

use crate::config::{DuplicatePolicy, QuadTreeConfig};
use crate::error::{ConfigError, InsertError, Rejected};
use crate::region;
use crate::types::{Item, Motion, NodeId, NodeKind, NodeKinds, NodeView, Prune, QueryStats};

/// Adaptive point quadtree over a fixed rectangular domain.
///
/// Every node is [`Empty`](NodeKind::Empty), a [`Leaf`](NodeKind::Leaf) holding one
/// [`Item`], or a [`Split`](NodeKind::Split) owning four children that quadrisect its
/// rect. The root covers the domain for the lifetime of the tree.
#[derive(Clone)]
pub struct QuadTree<T> {
    nodes: Vec<Option<Node<T>>>, // slots
    generations: Vec<u32>,       // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: NodeId,
    domain: Rect,
    config: QuadTreeConfig,
    len: usize,
}

impl<T> core::fmt::Debug for QuadTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.node_count();
        f.debug_struct("QuadTree")
            .field("domain", &self.domain)
            .field("len", &self.len)
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
enum Cell<T> {
    Empty,
    Leaf(Item<T>),
    Split([NodeId; 4]),
}

#[derive(Clone, Debug)]
struct Node<T> {
    generation: u32,
    parent: Option<NodeId>,
    rect: Rect,
    depth: u32,
    cell: Cell<T>,
}

impl<T> Node<T> {
    fn new(generation: u32, parent: Option<NodeId>, rect: Rect, depth: u32) -> Self {
        Self {
            generation,
            parent,
            rect,
            depth,
            cell: Cell::Empty,
        }
    }

    fn kind(&self) -> NodeKind {
        match self.cell {
            Cell::Empty => NodeKind::Empty,
            Cell::Leaf(_) => NodeKind::Leaf,
            Cell::Split(_) => NodeKind::Split,
        }
    }
}

impl<T> QuadTree<T> {
    /// Create an empty tree over `domain` with the default configuration.
    ///
    /// # Panics
    ///
    /// If `domain` has non-finite coordinates or a non-positive width or height.
    /// Use [`QuadTree::with_config`] to handle that case.
    pub fn new(domain: Rect) -> Self {
        match Self::with_config(domain, QuadTreeConfig::default()) {
            Ok(tree) => tree,
            Err(err) => panic!("invalid quadtree domain: {err}"),
        }
    }

    /// Create an empty tree over `domain` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDomain`] for a degenerate domain, or whatever
    /// [`QuadTreeConfig::validate`] reports.
    pub fn with_config(domain: Rect, config: QuadTreeConfig) -> Result<Self, ConfigError> {
        if !region::is_valid(domain) {
            return Err(ConfigError::InvalidDomain(domain));
        }
        config.validate()?;
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            domain,
            config,
            len: 0,
        };
        tree.root = tree.alloc(None, domain, 0);
        Ok(tree)
    }

    /// The root node. It is never freed.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The rect covered by the root.
    pub fn domain(&self) -> Rect {
        self.domain
    }

    /// The active configuration.
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes, including the root and empty nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Drop every item and reset the root to empty.
    pub fn clear(&mut self) {
        let root = self.root;
        if let Cell::Split(children) = mem::replace(&mut self.node_mut(root).cell, Cell::Empty) {
            for child in children {
                self.free_subtree(child);
            }
        }
        self.len = 0;
    }

    /// Insert `item`, returning whether it was stored.
    ///
    /// Items outside the domain, duplicates (under [`DuplicatePolicy::Reject`]), and
    /// items that cannot be separated from a neighbour above the minimum node size
    /// are dropped. Use [`QuadTree::try_insert`] to learn why or to get the item back.
    pub fn insert(&mut self, item: Item<T>) -> bool {
        self.try_insert(item).is_ok()
    }

    /// Insert `item`, returning the leaf that holds its position.
    ///
    /// Under [`DuplicatePolicy::Coalesce`] a duplicate is dropped and the existing
    /// leaf is returned.
    ///
    /// # Errors
    ///
    /// A [`Rejected`] carrying the item and an [`InsertError`]. A rejected insert
    /// leaves the tree unchanged.
    pub fn try_insert(&mut self, item: Item<T>) -> Result<NodeId, Rejected<T>> {
        enum Step {
            Descend(NodeId),
            Fill,
            Collide(Point, Rect),
        }

        let pos = item.position;
        if !region::contains_point(self.domain, pos) {
            return Err(Self::reject(item, InsertError::OutOfBounds));
        }

        let mut id = self.root;
        loop {
            let step = {
                let node = self.node(id);
                match &node.cell {
                    Cell::Split(children) => {
                        Step::Descend(children[region::quadrant(node.rect.center(), pos)])
                    }
                    Cell::Empty => Step::Fill,
                    Cell::Leaf(existing) => Step::Collide(existing.position, node.rect),
                }
            };
            match step {
                Step::Descend(child) => id = child,
                Step::Fill => {
                    self.node_mut(id).cell = Cell::Leaf(item);
                    self.len += 1;
                    return Ok(id);
                }
                Step::Collide(other, rect) => {
                    let eps = self.config.duplicate_epsilon;
                    if (other - pos).hypot2() < eps * eps {
                        return match self.config.duplicates {
                            DuplicatePolicy::Reject => {
                                Err(Self::reject(item, InsertError::Duplicate))
                            }
                            DuplicatePolicy::Coalesce => {
                                trace!(x = pos.x, y = pos.y, "coalesced duplicate point");
                                Ok(id)
                            }
                        };
                    }
                    if !separable(rect, other, pos, self.config.min_node_size) {
                        return Err(Self::reject(item, InsertError::BelowMinSize));
                    }
                    let Cell::Leaf(existing) = mem::replace(&mut self.node_mut(id).cell, Cell::Empty)
                    else {
                        unreachable!("collision on a node that is not a leaf");
                    };
                    let leaf = self.split_leaf(id, existing, item);
                    self.len += 1;
                    return Ok(leaf);
                }
            }
        }
    }

    /// Leaves holding points inside `query`, boundary included.
    ///
    /// The result is duplicate-free; order is unspecified.
    pub fn find(&self, query: Rect) -> Vec<NodeId> {
        let mut stats = QueryStats::default();
        self.find_with_stats(query, &mut stats)
    }

    /// [`QuadTree::find`], also accumulating traversal counters into `stats`.
    ///
    /// The descent prunes in this order: empty nodes contribute nothing; nodes strictly
    /// inside `query` contribute their whole subtree untested; nodes sharing no point
    /// with `query` are skipped; remaining leaves are tested point-wise.
    pub fn find_with_stats(&self, query: Rect, stats: &mut QueryStats) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.find_recursive(self.root, query, stats, &mut out);
        out
    }

    /// Items inside `query`, boundary included.
    pub fn find_items(&self, query: Rect) -> Vec<&Item<T>> {
        self.find(query)
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Every leaf, depth-first in quadrant order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        self.collect_leaves(self.root, &mut out);
        out
    }

    /// Iterate all stored items in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &Item<T>> + '_ {
        self.nodes.iter().flatten().filter_map(|n| match &n.cell {
            Cell::Leaf(item) => Some(item),
            _ => None,
        })
    }

    /// Clear a leaf to empty without pruning its ancestors.
    ///
    /// Use this for batch removal and follow up with [`QuadTree::erase_down`].
    pub fn take(&mut self, id: NodeId) -> Option<Item<T>> {
        let node = self.node_opt_mut(id)?;
        if !matches!(node.cell, Cell::Leaf(_)) {
            return None;
        }
        let Cell::Leaf(item) = mem::replace(&mut node.cell, Cell::Empty) else {
            return None;
        };
        self.len -= 1;
        Some(item)
    }

    /// Clear a leaf to empty and collapse the ancestors it leaves empty.
    pub fn erase(&mut self, id: NodeId) -> Option<Item<T>> {
        let item = self.take(id)?;
        self.erase_up(id);
        Some(item)
    }

    /// Walk from `from` toward the root, collapsing splits whose children are all empty.
    ///
    /// Stops at the first leaf or occupied split, since nothing above it can be
    /// collapsed. Splits elsewhere in the tree are not visited.
    pub fn erase_up(&mut self, from: NodeId) {
        if !self.is_alive(from) {
            return;
        }
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let (split, parent) = {
                let node = self.node(id);
                let split = match &node.cell {
                    Cell::Leaf(_) => return,
                    Cell::Empty => None,
                    Cell::Split(children) => Some(*children),
                };
                (split, node.parent)
            };
            if let Some(children) = split {
                if children.iter().any(|&c| !self.is_empty_node(c)) {
                    return;
                }
                self.collapse(id, children);
            }
            cursor = parent;
        }
    }

    /// Collapse every split in the tree whose children are all empty, bottom-up.
    pub fn erase_down(&mut self) {
        let _ = self.erase_down_recursive(self.root);
    }

    /// Remove every item inside `query` (boundary included), pruning with `prune`.
    pub fn remove_within(&mut self, query: Rect, prune: Prune) -> Vec<Item<T>> {
        let ids = self.find(query);
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            let item = match prune {
                Prune::Up => self.erase(id),
                Prune::Down => self.take(id),
            };
            removed.extend(item);
        }
        if prune == Prune::Down {
            self.erase_down();
        }
        removed
    }

    /// Apply `f` to every item, evicting those that leave their leaf.
    ///
    /// An item stays only while quadrant routing from the root would still reach its
    /// leaf, so an item moved onto a split's center line is evicted from the min-side
    /// child. Evicted leaves become empty and their items are returned for reinsertion from
    /// the root. The tree's shape never changes during the traversal, and no pruning
    /// happens here.
    pub fn update_with(&mut self, mut f: impl FnMut(&mut Item<T>)) -> Vec<Item<T>> {
        let domain = self.domain;
        let mut evicted = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node_mut(id);
            let rect = node.rect;
            let escaped = match &mut node.cell {
                Cell::Empty => false,
                Cell::Split(children) => {
                    stack.extend(children.iter().rev().copied());
                    false
                }
                Cell::Leaf(item) => {
                    f(item);
                    !region::owns_point(rect, domain, item.position)
                }
            };
            if escaped {
                if let Cell::Leaf(item) = mem::replace(&mut node.cell, Cell::Empty) {
                    evicted.push(item);
                }
            }
        }
        self.len -= evicted.len();
        evicted
    }

    /// One simulation tick driven by `f`: update, reinsert evicted items, prune.
    ///
    /// Returns the items that could not be reinserted.
    pub fn step_with(&mut self, f: impl FnMut(&mut Item<T>)) -> Vec<Rejected<T>> {
        let evicted = self.update_with(f);
        let moved = evicted.len();
        let mut lost = Vec::new();
        for item in evicted {
            if let Err(rejected) = self.try_insert(item) {
                lost.push(rejected);
            }
        }
        self.erase_down();
        debug!(
            moved,
            lost = lost.len(),
            len = self.len,
            nodes = self.node_count(),
            "quadtree step"
        );
        lost
    }

    /// Visit nodes depth-first, parents before children, in quadrant order.
    ///
    /// Only nodes whose kind is in `filter` are reported.
    pub fn visit<'a>(&'a self, filter: NodeKinds, mut f: impl FnMut(NodeView<'a, T>)) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            let (item, split) = match &node.cell {
                Cell::Empty => (None, false),
                Cell::Leaf(item) => (Some(item), false),
                Cell::Split(children) => {
                    stack.extend(children.iter().rev().copied());
                    (None, true)
                }
            };
            if filter.contains(node.kind().into()) {
                f(NodeView {
                    id,
                    rect: node.rect,
                    depth: node.depth,
                    item,
                    split,
                });
            }
        }
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// The item stored at a leaf.
    pub fn get(&self, id: NodeId) -> Option<&Item<T>> {
        match &self.node_opt(id)?.cell {
            Cell::Leaf(item) => Some(item),
            _ => None,
        }
    }

    /// Mutable access to a leaf's payload. Positions change only through updates.
    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match &mut self.node_opt_mut(id)?.cell {
            Cell::Leaf(item) => Some(&mut item.payload),
            _ => None,
        }
    }

    /// The state of a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node_opt(id).map(Node::kind)
    }

    /// The rect of a live node.
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.rect)
    }

    /// The parent of a live node; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// The children of a split node, in quadrant order.
    pub fn children(&self, id: NodeId) -> Option<[NodeId; 4]> {
        match self.node_opt(id)?.cell {
            Cell::Split(children) => Some(children),
            _ => None,
        }
    }

    /// Distance of a live node from the root.
    pub fn depth(&self, id: NodeId) -> Option<u32> {
        self.node_opt(id).map(|n| n.depth)
    }

    // --- internals ---

    fn reject(item: Item<T>, reason: InsertError) -> Rejected<T> {
        trace!(
            x = item.position.x,
            y = item.position.y,
            %reason,
            "insert rejected"
        );
        Rejected { item, reason }
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node<T> {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node<T>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn is_empty_node(&self, id: NodeId) -> bool {
        matches!(self.node(id).cell, Cell::Empty)
    }

    fn alloc(&mut self, parent: Option<NodeId>, rect: Rect, depth: u32) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, parent, rect, depth));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, parent, rect, depth)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        NodeId::new(idx as u32, generation)
    }

    /// Release `id` and all of its descendants back to the free list.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes[id.idx()].take() else {
                continue;
            };
            match node.cell {
                Cell::Split(children) => stack.extend(children),
                Cell::Leaf(_) => self.len -= 1,
                Cell::Empty => {}
            }
            self.free_list.push(id.idx());
        }
    }

    fn collapse(&mut self, id: NodeId, children: [NodeId; 4]) {
        for child in children {
            self.free_subtree(child);
        }
        let node = self.node_mut(id);
        node.cell = Cell::Empty;
        trace!(depth = node.depth, "collapsed empty split");
    }

    /// Turn `id` into a split with four empty children.
    fn split_node(&mut self, id: NodeId) -> [NodeId; 4] {
        let (rect, depth) = {
            let node = self.node(id);
            (node.rect, node.depth)
        };
        let children = region::divide(rect).map(|r| self.alloc(Some(id), r, depth + 1));
        self.node_mut(id).cell = Cell::Split(children);
        children
    }

    /// Split the (now empty) node `id` until `existing` and `item` land in different
    /// children, and store both. Returns the new item's leaf.
    ///
    /// Callers check [`separable`] first, so the loop terminates.
    fn split_leaf(&mut self, mut id: NodeId, existing: Item<T>, item: Item<T>) -> NodeId {
        loop {
            let children = self.split_node(id);
            let center = self.node(id).rect.center();
            let qa = region::quadrant(center, existing.position);
            let qb = region::quadrant(center, item.position);
            if qa != qb {
                self.node_mut(children[qa]).cell = Cell::Leaf(existing);
                self.node_mut(children[qb]).cell = Cell::Leaf(item);
                return children[qb];
            }
            id = children[qa];
        }
    }

    fn find_recursive(&self, id: NodeId, query: Rect, stats: &mut QueryStats, out: &mut Vec<NodeId>) {
        stats.visited += 1;
        let node = self.node(id);
        if matches!(node.cell, Cell::Empty) {
            return;
        }
        if region::contains(query, node.rect) {
            stats.accepted_whole += 1;
            self.collect_leaves(id, out);
            return;
        }
        if !region::intersects(query, node.rect) {
            return;
        }
        match &node.cell {
            Cell::Empty => {}
            Cell::Leaf(item) => {
                if region::contains_point(query, item.position) {
                    out.push(id);
                }
            }
            Cell::Split(children) => {
                for &child in children {
                    self.find_recursive(child, query, stats, out);
                }
            }
        }
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.node(id).cell {
            Cell::Empty => {}
            Cell::Leaf(_) => out.push(id),
            Cell::Split(children) => {
                for &child in children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    /// Returns true if `id` is empty once its subtree has been pruned.
    fn erase_down_recursive(&mut self, id: NodeId) -> bool {
        let children = match &self.node(id).cell {
            Cell::Empty => return true,
            Cell::Leaf(_) => return false,
            Cell::Split(children) => *children,
        };
        let mut all_empty = true;
        for child in children {
            all_empty &= self.erase_down_recursive(child);
        }
        if all_empty {
            self.collapse(id, children);
        }
        all_empty
    }
}

impl<T: Motion> QuadTree<T> {
    /// Advance every item by its payload's velocity over `dt` seconds.
    ///
    /// Items that leave their leaf are evicted and returned; see
    /// [`QuadTree::update_with`].
    pub fn update(&mut self, dt: f64) -> Vec<Item<T>> {
        self.update_with(|item| item.position += item.payload.velocity() * dt)
    }

    /// One simulation tick: [`QuadTree::update`], reinsert from the root, then
    /// [`QuadTree::erase_down`].
    ///
    /// Returns the items that could not be reinserted, typically because they left
    /// the domain.
    pub fn step(&mut self, dt: f64) -> Vec<Rejected<T>> {
        self.step_with(|item| item.position += item.payload.velocity() * dt)
    }
}

/// True if `a` and `b` fall into different quadrants of some descendant of `rect`
/// that is still above `min_size`.
fn separable(mut rect: Rect, a: Point, b: Point, min_size: f64) -> bool {
    loop {
        if region::at_min_size(rect, min_size) {
            return false;
        }
        let center = rect.center();
        let qa = region::quadrant(center, a);
        if qa != region::quadrant(center, b) {
            return true;
        }
        rect = region::divide(rect)[qa];
    }
}
