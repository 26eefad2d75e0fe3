//! Ranking queries over the movie catalog.
//!
//! This crate provides:
//! - `heap_sort_by`, the in-place heap sort used to order results
//! - the Filter trait and filter implementations
//! - RankingPipeline for composing filters into a query
//! - `filter_by_minimum_average`, the top-rated query used by the driver
//!
//! ## Architecture
//! A query is processed in stages:
//! 1. Every rated catalog movie becomes a candidate (unrated movies have no
//!    average and are skipped here, before any comparison)
//! 2. Filters remove unwanted candidates
//! 3. The rest is heap-sorted by average, highest first
//!
//! ## Example Usage
//! ```
//! use movie_store::{Category, MovieStore, StoreConfig};
//!
//! let mut store = MovieStore::new(StoreConfig::new(8, 100))?;
//! store.register_user(1)?;
//! store.announce_movie(10, Category::Drama, 2000)?;
//! store.publish_movies()?;
//! store.watch_movie(1, Category::Drama, 10, 9)?;
//!
//! let top = ranking::filter_by_minimum_average(store.catalog(), 8.0)?;
//! assert_eq!(top[0].movie_id, 10);
//! # Ok::<(), movie_store::StoreError>(())
//! ```

pub mod candidate;
pub mod filters;
pub mod heap_sort;
pub mod pipeline;
pub mod traits;

// Re-export main types
pub use candidate::{gather_candidates, RankedMovie};
pub use filters::{CategoryFilter, MinimumAverageFilter, MinimumWatchCountFilter};
pub use heap_sort::heap_sort_by;
pub use pipeline::RankingPipeline;
pub use traits::Filter;

use movie_store::{Catalog, Result};

/// Rated movies with an average of at least `threshold`, best first.
///
/// Fails with `InvalidArgument` for a NaN threshold.
pub fn filter_by_minimum_average(catalog: &Catalog, threshold: f64) -> Result<Vec<RankedMovie>> {
    let pipeline = RankingPipeline::new().add_filter(MinimumAverageFilter::new(threshold)?);
    Ok(pipeline.rank(catalog))
}
