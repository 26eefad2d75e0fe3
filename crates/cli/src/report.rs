//! What the driver prints for each event.
//!
//! Every event produces exactly one [`Report`]. Text output is a block
//! ending in `DONE`; JSON output is one object per line, tagged by `event`.

use movie_store::{Catalog, Category, MovieId, Rating, Score, UserId, UserIndex};
use ranking::RankedMovie;
use serde::Serialize;
use std::fmt;

/// Movie ids of one category tree, in id order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub movies: Vec<MovieId>,
}

/// One user record inside a bucket chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListing {
    pub user_id: UserId,
    pub history: Vec<Rating>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainListing {
    pub bucket: usize,
    pub users: Vec<UserListing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Report {
    Registered {
        user_id: UserId,
        bucket: usize,
        chain: Vec<UserId>,
    },
    Unregistered {
        user_id: UserId,
        bucket: usize,
        chain: Vec<UserId>,
    },
    Announced {
        movie_id: MovieId,
        category: Category,
        year: u16,
        staged: Vec<MovieId>,
    },
    Published {
        count: usize,
        categories: Vec<CategoryListing>,
    },
    NothingToPublish,
    Watched {
        user_id: UserId,
        category: Category,
        movie_id: MovieId,
        score: Score,
        previous: Option<Score>,
        history: Vec<Rating>,
    },
    Filtered {
        user_id: UserId,
        threshold: f64,
        movies: Vec<RankedMovie>,
    },
    Stats {
        user_id: UserId,
        rated: usize,
        mean_score: f64,
    },
    Found {
        movie_id: MovieId,
        category: Category,
        year: u16,
        watched_counter: u32,
        sum_score: u64,
    },
    Movies {
        categories: Vec<CategoryListing>,
    },
    Users {
        chains: Vec<ChainListing>,
    },
    UserMovies {
        user_id: UserId,
        ratings: Vec<Rating>,
    },
    /// The event was well-formed but the store refused it
    Ignored {
        line: usize,
        input: String,
        code: i32,
        error: String,
    },
}

/// Every category with the ids it holds
pub fn list_categories(catalog: &Catalog) -> Vec<CategoryListing> {
    Category::ALL
        .into_iter()
        .map(|category| CategoryListing {
            category,
            movies: catalog.iter(category).map(|movie| movie.id).collect(),
        })
        .collect()
}

/// All non-empty bucket chains with each user's rated movies
pub fn list_chains(users: &UserIndex) -> Vec<ChainListing> {
    users
        .buckets()
        .filter(|(_, chain)| !chain.is_empty())
        .map(|(bucket, chain)| ChainListing {
            bucket,
            users: chain
                .iter()
                .map(|user| UserListing {
                    user_id: user.id,
                    history: user.history.leaves().copied().collect(),
                })
                .collect(),
        })
        .collect()
}

/// Ids of one chain, head first
pub fn chain_ids(users: &UserIndex, bucket: usize) -> Vec<UserId> {
    users.chain(bucket).iter().map(|user| user.id).collect()
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_categories(f: &mut fmt::Formatter<'_>, categories: &[CategoryListing]) -> fmt::Result {
    writeln!(f, "Movie Category Array:")?;
    for listing in categories {
        writeln!(f, "   {}: {}", listing.category, join(&listing.movies))?;
    }
    Ok(())
}

fn write_history(f: &mut fmt::Formatter<'_>, ratings: &[Rating], indent: &str) -> fmt::Result {
    for rating in ratings {
        writeln!(f, "{indent}{}, {}", rating.movie_id, rating.score)?;
    }
    Ok(())
}

fn write_chain(f: &mut fmt::Formatter<'_>, bucket: usize, chain: &[UserId]) -> fmt::Result {
    writeln!(f, "Chain {bucket} of Users:")?;
    for id in chain {
        writeln!(f, "   {id}")?;
    }
    Ok(())
}

impl Report {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Report::Ignored { .. })
    }
}

/// Human-readable block, without colors, ending in `DONE`.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Registered {
                user_id,
                bucket,
                chain,
            } => {
                writeln!(f, "R {user_id}")?;
                write_chain(f, *bucket, chain)?;
            }
            Report::Unregistered {
                user_id,
                bucket,
                chain,
            } => {
                writeln!(f, "U {user_id}")?;
                write_chain(f, *bucket, chain)?;
            }
            Report::Announced {
                movie_id,
                category,
                year,
                staged,
            } => {
                writeln!(f, "A {movie_id} {} {year}", category.index())?;
                writeln!(f, "New releases Tree:")?;
                writeln!(f, "   new releases: {}", join(staged))?;
            }
            Report::Published { count, categories } => {
                writeln!(f, "D {count}")?;
                write_categories(f, categories)?;
            }
            Report::NothingToPublish => {
                writeln!(f, "D\nThere are no movies to distribute")?;
            }
            Report::Watched {
                user_id,
                category,
                movie_id,
                score,
                previous,
                history,
            } => {
                writeln!(f, "W {user_id} {category} {movie_id} {score}")?;
                if let Some(previous) = previous {
                    writeln!(f, "   replaced score {previous}")?;
                }
                writeln!(f, "History Tree of User {user_id}:")?;
                write_history(f, history, "   ")?;
            }
            Report::Filtered {
                user_id,
                threshold,
                movies,
            } => {
                writeln!(f, "F {user_id} {threshold:.6}")?;
                if movies.is_empty() {
                    writeln!(f, "   EMPTY")?;
                } else {
                    let entries =
                        join(movies.iter().map(|m| format!("{{{} {:.6}}}", m.movie_id, m.average)));
                    writeln!(f, "   {entries}")?;
                }
            }
            Report::Stats {
                user_id,
                mean_score,
                ..
            } => {
                writeln!(f, "Q {user_id} {mean_score:.6}")?;
            }
            Report::Found {
                movie_id,
                category,
                year,
                ..
            } => {
                writeln!(f, "I {movie_id} {category} {year}")?;
            }
            Report::Movies { categories } => {
                writeln!(f, "M")?;
                write_categories(f, categories)?;
            }
            Report::Users { chains } => {
                writeln!(f, "P")?;
                for chain in chains {
                    writeln!(f, "Chain {} of Users:", chain.bucket)?;
                    for user in &chain.users {
                        writeln!(f, "   {}\n   History Tree:", user.user_id)?;
                        write_history(f, &user.history, "      ")?;
                    }
                }
            }
            Report::UserMovies { user_id, ratings } => {
                writeln!(f, "H {user_id}")?;
                writeln!(f, "History Tree of User {user_id}:")?;
                write_history(f, ratings, "   ")?;
            }
            Report::Ignored {
                line, input, error, ..
            } => {
                writeln!(f, "IGNORED {input} (line {line}): {error}")?;
            }
        }
        writeln!(f, "DONE")
    }
}
