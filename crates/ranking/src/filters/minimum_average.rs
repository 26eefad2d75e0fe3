//! Filter on the average score.
//!
//! Keeps movies whose average rating is at least the threshold. Candidates
//! only exist for rated movies, so no average here is a division by zero.

use crate::candidate::RankedMovie;
use crate::traits::Filter;
use movie_store::{Result, StoreError};

/// Removes candidates whose average is below `threshold`.
pub struct MinimumAverageFilter {
    threshold: f64,
}

impl MinimumAverageFilter {
    /// Create a new MinimumAverageFilter.
    ///
    /// A NaN threshold would match nothing and is rejected instead.
    pub fn new(threshold: f64) -> Result<Self> {
        if threshold.is_nan() {
            return Err(StoreError::InvalidArgument {
                field: "threshold".to_string(),
                reason: "must be a number".to_string(),
            });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Filter for MinimumAverageFilter {
    fn name(&self) -> &str {
        "MinimumAverageFilter"
    }

    fn apply(&self, candidates: Vec<RankedMovie>) -> Vec<RankedMovie> {
        candidates
            .into_iter()
            .filter(|candidate| candidate.average >= self.threshold)
            .collect()
    }
}
