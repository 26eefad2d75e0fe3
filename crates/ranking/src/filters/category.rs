//! Filter restricting candidates to a set of categories.

use crate::candidate::RankedMovie;
use crate::traits::Filter;
use movie_store::Category;
use std::collections::HashSet;

/// Keeps only candidates from the given categories.
pub struct CategoryFilter {
    categories: HashSet<Category>,
}

impl CategoryFilter {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
        }
    }
}

impl Filter for CategoryFilter {
    fn name(&self) -> &str {
        "CategoryFilter"
    }

    fn apply(&self, candidates: Vec<RankedMovie>) -> Vec<RankedMovie> {
        candidates
            .into_iter()
            .filter(|candidate| self.categories.contains(&candidate.category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_filter() {
        let candidates = Category::ALL
            .into_iter()
            .enumerate()
            .map(|(i, category)| RankedMovie {
                movie_id: i as u32,
                category,
                year: 2000,
                average: 6.0,
                watched_counter: 1,
            })
            .collect();

        let filter = CategoryFilter::new([Category::Horror, Category::Comedy]);
        let filtered = filter.apply(candidates);
        let kept: Vec<Category> = filtered.iter().map(|c| c.category).collect();
        assert_eq!(kept, vec![Category::Horror, Category::Comedy]);
    }
}
