//! `MovieStore`: the one object that owns every structure.
//!
//! Each operation touches the structures in a fixed order and runs to
//! completion before the next one starts. The store is a plain owned value;
//! a multi-client wrapper would put a single lock around the whole thing.

use crate::catalog::Catalog;
use crate::config::StoreConfig;
use crate::error::{Entity, Result, StoreError};
use crate::hash_index::{User, UserIndex};
use crate::history::Recorded;
use crate::staging::{Publication, Staging};
use crate::types::{validate_score, Announcement, Category, Movie, MovieId, Rating, Score, UserId};
use serde::Serialize;
use tracing::debug;

/// Result of [`MovieStore::user_stats`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserStats {
    pub user_id: UserId,
    /// Number of movies the user rated
    pub rated: usize,
    pub mean_score: f64,
}

/// In-memory catalog-and-rating store
#[derive(Debug)]
pub struct MovieStore {
    config: StoreConfig,
    users: UserIndex,
    catalog: Catalog,
    staging: Staging,
}

impl MovieStore {
    /// Build an empty store; fails with `InvalidArgument` on a bad config.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Creating store: {} buckets, max user id {}, hash {:?}",
            config.buckets, config.max_user_id, config.hash
        );
        Ok(Self {
            users: UserIndex::new(&config),
            catalog: Catalog::new().with_node_budget(config.node_budget),
            staging: Staging::new(),
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // Read access for drivers, listings and the ranking engine

    pub fn users(&self) -> &UserIndex {
        &self.users
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn staging(&self) -> &Staging {
        &self.staging
    }

    /// Register a user; returns the bucket its record landed in.
    pub fn register_user(&mut self, user_id: UserId) -> Result<usize> {
        self.users.register(user_id)
    }

    /// Remove a user together with its whole history.
    pub fn unregister_user(&mut self, user_id: UserId) -> Result<()> {
        self.users.unregister(user_id)
    }

    /// Stage a new movie for the next publication.
    pub fn announce_movie(&mut self, movie_id: MovieId, category: Category, year: u16) -> Result<()> {
        let movie = Announcement {
            id: movie_id,
            category,
            year,
        };
        self.staging.announce(movie, &self.catalog)?;
        debug!("Announced movie {} ({}, {})", movie_id, category, year);
        Ok(())
    }

    /// Publish every staged movie into the catalog.
    ///
    /// On `OutOfMemory` staging is left partially consumed; see [`Staging::publish`].
    pub fn publish_movies(&mut self) -> Result<Publication> {
        self.staging.publish(&mut self.catalog)
    }

    /// A user watches and rates a published movie.
    ///
    /// Order: score check, user lookup, catalog check, history insert, and
    /// only then the catalog totals, so a failed history insert leaves the
    /// catalog untouched.
    pub fn watch_movie(
        &mut self,
        user_id: UserId,
        category: Category,
        movie_id: MovieId,
        score: Score,
    ) -> Result<Recorded> {
        let score = validate_score(score)?;
        let user = self.users.find_mut(user_id)?;
        if !self.catalog.exists(movie_id, category) {
            return Err(StoreError::NotFound {
                entity: Entity::Movie,
                id: movie_id,
            });
        }

        let recorded = user.history.record(Rating {
            movie_id,
            category,
            score,
        })?;
        self.catalog.record_rating(movie_id, category, score)?;
        debug!(
            "User {} rated movie {} with {} ({:?})",
            user_id, movie_id, score, recorded
        );
        Ok(recorded)
    }

    /// Mean of the user's own ratings.
    ///
    /// Fails with `NotFound` for an unknown user and with
    /// `NotFound { entity: Ratings }` for a user who rated nothing.
    pub fn user_stats(&self, user_id: UserId) -> Result<UserStats> {
        let user = self.users.find(user_id)?;
        let mean_score = user.history.mean_score().ok_or(StoreError::NotFound {
            entity: Entity::Ratings,
            id: user_id,
        })?;
        Ok(UserStats {
            user_id,
            rated: user.history.len(),
            mean_score,
        })
    }

    /// Point lookup of a published movie
    pub fn search_movie(&self, movie_id: MovieId, category: Category) -> Result<&Movie> {
        self.catalog
            .find(movie_id, category)
            .ok_or(StoreError::NotFound {
                entity: Entity::Movie,
                id: movie_id,
            })
    }

    /// A user's ratings in ascending movie id order
    pub fn user_ratings(&self, user_id: UserId) -> Result<impl Iterator<Item = &Rating> + '_> {
        Ok(self.users.find(user_id)?.history.leaves())
    }

    pub fn user(&self, user_id: UserId) -> Result<&User> {
        self.users.find(user_id)
    }
}
