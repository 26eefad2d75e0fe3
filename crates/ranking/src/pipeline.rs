//! The RankingPipeline orchestrates candidate selection and sorting.
//!
//! Candidates are gathered from the catalog, passed through every filter in
//! the order they were added, then heap-sorted by average score, highest
//! first.

use crate::candidate::{gather_candidates, RankedMovie};
use crate::heap_sort::heap_sort_by;
use crate::traits::Filter;
use movie_store::Catalog;
use tracing::{debug, instrument};

/// Chains filters into a ranking query (builder pattern).
///
/// ## Usage
/// ```ignore
/// let pipeline = RankingPipeline::new()
///     .add_filter(MinimumAverageFilter::new(8.0)?)
///     .add_filter(CategoryFilter::new([Category::Drama]))
///     .with_limit(10);
///
/// let ranked = pipeline.rank(store.catalog());
/// ```
pub struct RankingPipeline {
    filters: Vec<Box<dyn Filter>>,
    limit: Option<usize>,
}

impl RankingPipeline {
    /// Create a new pipeline with no filters and no limit.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Keep only the first `limit` movies of the sorted result.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Run the query against `catalog`.
    #[instrument(skip_all, fields(filters = self.filters.len()))]
    pub fn rank(&self, catalog: &Catalog) -> Vec<RankedMovie> {
        let mut current = gather_candidates(catalog);
        debug!("Gathered {} rated candidates", current.len());

        for filter in &self.filters {
            debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }

        heap_sort_by(&mut current, |a, b| b.average.total_cmp(&a.average));
        if let Some(limit) = self.limit {
            current.truncate(limit);
        }
        current
    }
}

impl Default for RankingPipeline {
    fn default() -> Self {
        Self::new()
    }
}
