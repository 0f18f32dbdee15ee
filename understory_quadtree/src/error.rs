// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! None of these are failures of the tree: they report policy decisions so callers
//! can tell why a point was not indexed.

use kurbo::Rect;

use crate::types::Item;

/// Why an insert was refused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum InsertError {
    /// The position lies outside the tree's domain.
    #[error("position is outside the tree's domain")]
    OutOfBounds,
    /// The position coincides with an existing point.
    #[error("position coincides with an existing point")]
    Duplicate,
    /// Separating the position from its neighbour would need a node below the minimum size.
    #[error("position cannot be separated from its neighbour above the minimum node size")]
    BelowMinSize,
}

/// An item the tree refused, handed back to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejected<T> {
    /// The refused item.
    pub item: Item<T>,
    /// Why it was refused.
    pub reason: InsertError,
}

impl<T> Rejected<T> {
    /// Take back the refused item.
    pub fn into_item(self) -> Item<T> {
        self.item
    }
}

/// Invalid construction parameters.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The domain has non-finite coordinates or a non-positive extent.
    #[error("domain {0:?} must be finite with positive width and height")]
    InvalidDomain(Rect),
    /// The duplicate epsilon is negative or non-finite.
    #[error("duplicate epsilon {0} must be finite and non-negative")]
    InvalidEpsilon(f64),
    /// The minimum node size is non-positive or non-finite.
    #[error("minimum node size {0} must be finite and positive")]
    InvalidMinNodeSize(f64),
}
