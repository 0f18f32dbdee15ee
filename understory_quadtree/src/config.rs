// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning constants for splitting and duplicate handling.

use crate::error::ConfigError;

/// What to do when an inserted point coincides with an existing leaf.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplicatePolicy {
    /// Refuse the new point with [`InsertError::Duplicate`](crate::InsertError::Duplicate).
    #[default]
    Reject,
    /// Keep the existing point, drop the new one, and report success.
    Coalesce,
}

/// Split and duplicate policy for a [`QuadTree`](crate::QuadTree).
///
/// Both thresholds are absolute distances in the tree's coordinate space, so scale
/// them with the domain.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuadTreeConfig {
    /// Points closer than this are the same point.
    pub duplicate_epsilon: f64,
    /// Nodes whose width or height is at or below this never split.
    ///
    /// This is a precision limit: two distinct points that would only separate below
    /// it are refused with [`InsertError::BelowMinSize`](crate::InsertError::BelowMinSize).
    pub min_node_size: f64,
    /// Handling of coincident points.
    pub duplicates: DuplicatePolicy,
}

impl QuadTreeConfig {
    /// Default duplicate distance.
    pub const DEFAULT_DUPLICATE_EPSILON: f64 = 1e-5;
    /// Default minimum node size (`2^-16`).
    pub const DEFAULT_MIN_NODE_SIZE: f64 = 1.0 / 65536.0;

    /// Set the duplicate distance.
    #[must_use]
    pub const fn with_duplicate_epsilon(mut self, epsilon: f64) -> Self {
        self.duplicate_epsilon = epsilon;
        self
    }

    /// Set the minimum node size.
    #[must_use]
    pub const fn with_min_node_size(mut self, size: f64) -> Self {
        self.min_node_size = size;
        self
    }

    /// Set the duplicate policy.
    #[must_use]
    pub const fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Check that both thresholds are finite and usable.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEpsilon`] for a negative or non-finite epsilon, and
    /// [`ConfigError::InvalidMinNodeSize`] for a non-positive or non-finite size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duplicate_epsilon.is_finite() || self.duplicate_epsilon < 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.duplicate_epsilon));
        }
        if !self.min_node_size.is_finite() || self.min_node_size <= 0.0 {
            return Err(ConfigError::InvalidMinNodeSize(self.min_node_size));
        }
        Ok(())
    }
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            duplicate_epsilon: Self::DEFAULT_DUPLICATE_EPSILON,
            min_node_size: Self::DEFAULT_MIN_NODE_SIZE,
            duplicates: DuplicatePolicy::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(QuadTreeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_thresholds() {
        let c = QuadTreeConfig::default().with_duplicate_epsilon(-1.0);
        assert_eq!(c.validate(), Err(ConfigError::InvalidEpsilon(-1.0)));
        let c = QuadTreeConfig::default().with_min_node_size(0.0);
        assert_eq!(c.validate(), Err(ConfigError::InvalidMinNodeSize(0.0)));
        let c = QuadTreeConfig::default().with_min_node_size(f64::INFINITY);
        assert!(c.validate().is_err(), "infinite min size must be rejected");
        // Zero epsilon means only exact coincidence is a duplicate.
        let c = QuadTreeConfig::default().with_duplicate_epsilon(0.0);
        assert_eq!(c.validate(), Ok(()));
    }
}
