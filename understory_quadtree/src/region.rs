// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric predicates over node rectangles.
//!
//! Everything here is pure and allocation-free. The tree calls into this module for
//! every spatial decision, so the conventions below are load-bearing:
//!
//! - The domain is **closed**: a point on its boundary can be stored.
//! - Node membership follows [`quadrant`] routing ([`owns_point`]): a point on a split's
//!   center line belongs to the max-side child, so every stored point has exactly one
//!   owning leaf.
//! - Query matching is **closed**: a query box matches points on its boundary. The fast
//!   accept ([`contains`]) is a subset of that and the fast reject ([`intersects`]) is its
//!   complement, so both agree exactly with the per-point test.
//! - [`quadrant`] is the inverse of [`divide`]: a point closed-contained in a rect is
//!   closed-contained in `divide(rect)[quadrant(rect.center(), p)]`.

use kurbo::{Point, Rect};

/// Quadrant index of points with `x >= center.x` and `y >= center.y`.
pub const MAX_X_MAX_Y: usize = 0;
/// Quadrant index of points with `x < center.x` and `y >= center.y`.
pub const MIN_X_MAX_Y: usize = 1;
/// Quadrant index of points with `x < center.x` and `y < center.y`.
pub const MIN_X_MIN_Y: usize = 2;
/// Quadrant index of points with `x >= center.x` and `y < center.y`.
pub const MAX_X_MIN_Y: usize = 3;

/// True if `inner` lies strictly inside `outer` on all four sides.
#[inline]
pub fn contains(outer: Rect, inner: Rect) -> bool {
    outer.x0 < inner.x0 && outer.y0 < inner.y0 && outer.x1 > inner.x1 && outer.y1 > inner.y1
}

/// True if the open interiors of `a` and `b` intersect on both axes.
///
/// Rectangles that only touch along an edge or at a corner do not overlap.
#[inline]
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// True if the closed rectangles `a` and `b` share at least one point.
///
/// Unlike [`overlaps`], edge and corner contact count.
#[inline]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Closed containment: points on the boundary are inside.
#[inline]
pub fn contains_point(rect: Rect, p: Point) -> bool {
    rect.x0 <= p.x && p.x <= rect.x1 && rect.y0 <= p.y && p.y <= rect.y1
}

/// Open containment: points on the boundary are outside.
#[inline]
pub fn strictly_contains_point(rect: Rect, p: Point) -> bool {
    rect.x0 < p.x && p.x < rect.x1 && rect.y0 < p.y && p.y < rect.y1
}

/// True if quadrant routing from the root of a tree over `domain` ends in `rect`.
///
/// `rect` must be `domain` or one of its descendants. Min edges are closed. Max edges are
/// open, since a point on them routes to the neighbouring sibling, unless the edge is
/// also the domain's.
#[inline]
pub fn owns_point(rect: Rect, domain: Rect, p: Point) -> bool {
    rect.x0 <= p.x
        && (p.x < rect.x1 || (p.x == rect.x1 && rect.x1 == domain.x1))
        && rect.y0 <= p.y
        && (p.y < rect.y1 || (p.y == rect.y1 && rect.y1 == domain.y1))
}

/// Quadrant of `p` relative to `center`.
///
/// With `x = p.x < center.x` and `y = p.y < center.y` the index is
/// `(x ^ y) + 2 * y`, matching the order produced by [`divide`].
#[inline]
pub fn quadrant(center: Point, p: Point) -> usize {
    let x = usize::from(p.x < center.x);
    let y = usize::from(p.y < center.y);
    let q = (x ^ y) + 2 * y;
    debug_assert!(q < 4, "quadrant index {q} out of range");
    q
}

/// Split `rect` into four children in quadrant order.
///
/// The children share the parent's midpoint coordinates exactly, so their union is
/// `rect` and their interiors are disjoint.
#[inline]
pub fn divide(rect: Rect) -> [Rect; 4] {
    let c = rect.center();
    [
        Rect::new(c.x, c.y, rect.x1, rect.y1),
        Rect::new(rect.x0, c.y, c.x, rect.y1),
        Rect::new(rect.x0, rect.y0, c.x, c.y),
        Rect::new(c.x, rect.y0, rect.x1, c.y),
    ]
}

/// Finite coordinates with strictly positive width and height.
#[inline]
pub fn is_valid(rect: Rect) -> bool {
    rect.is_finite() && rect.x1 > rect.x0 && rect.y1 > rect.y0
}

/// True once `rect` is too small to split further.
#[inline]
pub(crate) fn at_min_size(rect: Rect, min_size: f64) -> bool {
    rect.width() <= min_size || rect.height() <= min_size
}
