//! Filter on how many ratings a movie received.

use crate::candidate::RankedMovie;
use crate::traits::Filter;

/// Removes candidates rated fewer than `min_count` times.
pub struct MinimumWatchCountFilter {
    min_count: u32,
}

impl MinimumWatchCountFilter {
    pub fn new(min_count: u32) -> Self {
        Self { min_count }
    }
}

impl Filter for MinimumWatchCountFilter {
    fn name(&self) -> &str {
        "MinimumWatchCountFilter"
    }

    fn apply(&self, candidates: Vec<RankedMovie>) -> Vec<RankedMovie> {
        candidates
            .into_iter()
            .filter(|candidate| candidate.watched_counter >= self.min_count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_store::Category;

    #[test]
    fn test_minimum_watch_count_filter() {
        let candidates = (1..=4)
            .map(|n| RankedMovie {
                movie_id: n,
                category: Category::Comedy,
                year: 2010,
                average: 5.0,
                watched_counter: n,
            })
            .collect();

        let filtered = MinimumWatchCountFilter::new(3).apply(candidates);
        let ids: Vec<u32> = filtered.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![3, 4]);
    }
}
