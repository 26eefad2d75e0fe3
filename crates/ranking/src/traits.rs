//! Core traits for the ranking pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to ranking candidates.

use crate::candidate::RankedMovie;

/// Core trait for filtering ranking candidates.
///
/// ## Design Note
/// - `Send + Sync` keeps filters usable behind a shared store lock
/// - Filters take ownership of the Vec and return a filtered Vec, so no
///   candidate is cloned along the way
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    fn apply(&self, candidates: Vec<RankedMovie>) -> Vec<RankedMovie>;
}
