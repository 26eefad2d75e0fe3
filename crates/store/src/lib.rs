//! # Movie Store Crate
//!
//! In-memory catalog-and-rating store: registered users, a catalog of movies
//! grouped into six categories, and per-user rating histories.
//!
//! ## Main Components
//!
//! - **hash_index**: users in a chained hash table (universal hashing)
//! - **catalog**: one search tree per category, with a shared sentinel
//! - **staging**: announced movies waiting for publication
//! - **history**: per-user rating tree grown by leaf splitting
//! - **store**: `MovieStore`, which owns all of the above
//! - **config** / **error** / **types**: construction parameters, errors, records
//!
//! Ranking queries live in the `ranking` crate and read the catalog through
//! [`MovieStore::catalog`].
//!
//! ## Example Usage
//!
//! ```
//! use movie_store::{Category, MovieStore, StoreConfig};
//!
//! let mut store = MovieStore::new(StoreConfig::new(8, 100))?;
//! store.register_user(1)?;
//! store.announce_movie(10, Category::Drama, 2000)?;
//! store.publish_movies()?;
//! store.watch_movie(1, Category::Drama, 10, 9)?;
//!
//! assert_eq!(store.search_movie(10, Category::Drama)?.year, 2000);
//! assert_eq!(store.user_stats(1)?.mean_score, 9.0);
//! # Ok::<(), movie_store::StoreError>(())
//! ```

// Public modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod hash_index;
pub mod history;
pub mod staging;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use catalog::{Catalog, CategoryIter};
pub use config::{HashParams, StoreConfig};
pub use error::{Entity, ErrorKind, Result, StoreError};
pub use hash_index::{User, UserIndex};
pub use history::{History, Recorded};
pub use staging::{Publication, Staging};
pub use store::{MovieStore, UserStats};
pub use types::{
    // Type aliases
    MovieId,
    Score,
    UserId,
    // Records
    Announcement,
    Movie,
    Rating,
    // Enums
    Category,
    // Score bounds
    MAX_SCORE,
    MIN_SCORE,
};
