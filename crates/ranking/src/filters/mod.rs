//! Filter implementations for the ranking pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a RankingPipeline.

pub mod category;
pub mod minimum_average;
pub mod minimum_watch_count;

// Re-export for convenience
pub use category::CategoryFilter;
pub use minimum_average::MinimumAverageFilter;
pub use minimum_watch_count::MinimumWatchCountFilter;
