//! Core domain types shared by every structure in the store.
//!
//! - Type aliases for domain clarity (UserId, MovieId, Score)
//! - The closed set of six movie categories
//! - The plain records handed out by lookups and traversals

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a registered user
pub type UserId = u32;

/// Unique identifier for a movie, across staging and every category
pub type MovieId = u32;

/// A single rating value, 1 to 10
pub type Score = u8;

/// Lowest accepted rating
pub const MIN_SCORE: Score = 1;

/// Highest accepted rating
pub const MAX_SCORE: Score = 10;

/// Reject scores outside `MIN_SCORE..=MAX_SCORE`.
pub fn validate_score(score: Score) -> Result<Score> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(StoreError::invalid(
            "score",
            format!("{score} is outside {MIN_SCORE}..={MAX_SCORE}"),
        ))
    }
}

// =============================================================================
// Categories
// =============================================================================

/// The six catalog categories.
///
/// The discriminant is the category's index, which is also what event files
/// use to name a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Horror = 0,
    SciFi = 1,
    Drama = 2,
    Romance = 3,
    Documentary = 4,
    Comedy = 5,
}

impl Category {
    /// Number of categories
    pub const COUNT: usize = 6;

    /// All categories in index order
    pub const ALL: [Category; Category::COUNT] = [
        Category::Horror,
        Category::SciFi,
        Category::Drama,
        Category::Romance,
        Category::Documentary,
        Category::Comedy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Category::ALL.get(index).copied().ok_or_else(|| {
            StoreError::invalid(
                "category",
                format!("index {index} is outside 0..{}", Category::COUNT),
            )
        })
    }

    /// Upper-case report label
    pub fn label(self) -> &'static str {
        match self {
            Category::Horror => "HORROR",
            Category::SciFi => "SCIENCE-FICTION",
            Category::Drama => "DRAMA",
            Category::Romance => "ROMANCE",
            Category::Documentary => "DOCUMENTARY",
            Category::Comedy => "COMEDY",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the numeric index or the report label (case-insensitive).
impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(index) = s.parse::<usize>() {
            return Category::from_index(index);
        }
        Category::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| StoreError::invalid("category", format!("unknown category {s:?}")))
    }
}

// =============================================================================
// Records
// =============================================================================

/// A published movie as stored in its category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub year: u16,
    /// How many ratings the movie received
    pub watched_counter: u32,
    /// Sum of all ratings the movie received
    pub sum_score: u64,
}

impl Movie {
    pub fn new(id: MovieId, year: u16) -> Self {
        Self {
            id,
            year,
            watched_counter: 0,
            sum_score: 0,
        }
    }

    /// Average rating, or `None` when nobody rated the movie yet
    pub fn average(&self) -> Option<f64> {
        if self.watched_counter == 0 {
            None
        } else {
            Some(self.sum_score as f64 / self.watched_counter as f64)
        }
    }
}

/// A movie waiting in the staging tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: MovieId,
    pub category: Category,
    pub year: u16,
}

/// One user's rating of one movie, as kept in the history tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub movie_id: MovieId,
    pub category: Category,
    pub score: Score,
}
