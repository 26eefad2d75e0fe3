//! Ranking candidates gathered from the catalog.

use movie_store::{Catalog, Category, Movie, MovieId};
use serde::Serialize;

/// A rated catalog movie together with its average score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMovie {
    pub movie_id: MovieId,
    pub category: Category,
    pub year: u16,
    pub average: f64,
    pub watched_counter: u32,
}

impl RankedMovie {
    /// `None` for a movie nobody rated: there is no average to rank by.
    pub fn from_movie(category: Category, movie: &Movie) -> Option<Self> {
        let average = movie.average()?;
        Some(Self {
            movie_id: movie.id,
            category,
            year: movie.year,
            average,
            watched_counter: movie.watched_counter,
        })
    }
}

/// Every rated movie, categories in index order, ids ascending within each
pub fn gather_candidates(catalog: &Catalog) -> Vec<RankedMovie> {
    catalog
        .iter_all()
        .filter_map(|(category, movie)| RankedMovie::from_movie(category, movie))
        .collect()
}
