//! Applies parsed events to a `MovieStore` and turns outcomes into reports.

use crate::events::{parse_line, Event};
use crate::report::{chain_ids, list_categories, list_chains, Report};
use anyhow::{Context, Result};
use movie_store::{Category, MovieStore, Publication, Recorded, Score, StoreError};
use tracing::{debug, warn};

pub struct Driver {
    store: MovieStore,
}

fn parse_category(raw: &str) -> movie_store::Result<Category> {
    raw.parse()
}

fn parse_score(raw: i64) -> movie_store::Result<Score> {
    Score::try_from(raw).map_err(|_| StoreError::InvalidArgument {
        field: "score".to_string(),
        reason: format!("{raw} is not a valid score"),
    })
}

impl Driver {
    pub fn new(store: MovieStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    /// Run one event against the store.
    pub fn apply(&mut self, event: &Event) -> movie_store::Result<Report> {
        let report = match event {
            Event::Register { user_id } => {
                let bucket = self.store.register_user(*user_id)?;
                Report::Registered {
                    user_id: *user_id,
                    bucket,
                    chain: chain_ids(self.store.users(), bucket),
                }
            }
            Event::Unregister { user_id } => {
                self.store.unregister_user(*user_id)?;
                let bucket = self.store.users().bucket_of(*user_id);
                Report::Unregistered {
                    user_id: *user_id,
                    bucket,
                    chain: chain_ids(self.store.users(), bucket),
                }
            }
            Event::Announce {
                movie_id,
                category,
                year,
            } => {
                let category = parse_category(category)?;
                self.store.announce_movie(*movie_id, category, *year)?;
                Report::Announced {
                    movie_id: *movie_id,
                    category,
                    year: *year,
                    staged: self.store.staging().ids(),
                }
            }
            Event::Publish => match self.store.publish_movies()? {
                Publication::NothingToDo => Report::NothingToPublish,
                Publication::Published { count } => Report::Published {
                    count,
                    categories: list_categories(self.store.catalog()),
                },
            },
            Event::Watch {
                user_id,
                category,
                movie_id,
                score,
            } => {
                let category = parse_category(category)?;
                let score = parse_score(*score)?;
                let recorded = self
                    .store
                    .watch_movie(*user_id, category, *movie_id, score)?;
                let previous = match recorded {
                    Recorded::New => None,
                    Recorded::Rerated { previous } => Some(previous),
                };
                Report::Watched {
                    user_id: *user_id,
                    category,
                    movie_id: *movie_id,
                    score,
                    previous,
                    history: self.store.user_ratings(*user_id)?.copied().collect(),
                }
            }
            Event::Filter { user_id, threshold } => Report::Filtered {
                user_id: *user_id,
                threshold: *threshold,
                movies: ranking::filter_by_minimum_average(self.store.catalog(), *threshold)?,
            },
            Event::Stats { user_id } => {
                let stats = self.store.user_stats(*user_id)?;
                Report::Stats {
                    user_id: stats.user_id,
                    rated: stats.rated,
                    mean_score: stats.mean_score,
                }
            }
            Event::Search { movie_id, category } => {
                let category = parse_category(category)?;
                let movie = self.store.search_movie(*movie_id, category)?;
                Report::Found {
                    movie_id: movie.id,
                    category,
                    year: movie.year,
                    watched_counter: movie.watched_counter,
                    sum_score: movie.sum_score,
                }
            }
            Event::PrintMovies => Report::Movies {
                categories: list_categories(self.store.catalog()),
            },
            Event::PrintUsers => Report::Users {
                chains: list_chains(self.store.users()),
            },
            Event::PrintUserMovies { user_id } => Report::UserMovies {
                user_id: *user_id,
                ratings: self.store.user_ratings(*user_id)?.copied().collect(),
            },
        };
        Ok(report)
    }

    /// Parse and run a whole event file.
    ///
    /// A malformed line stops the run; a refused event becomes an
    /// `Ignored` report and the run goes on.
    pub fn run<F>(&mut self, input: &str, mut emit: F) -> Result<RunSummary>
    where
        F: FnMut(&Report) -> Result<()>,
    {
        let mut summary = RunSummary::default();
        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let Some(event) = parse_line(raw, line).context("Failed to parse event file")? else {
                continue;
            };
            debug!("Line {}: {:?}", line, event);

            let report = match self.apply(&event) {
                Ok(report) => report,
                Err(err) => {
                    warn!("Ignoring line {} ({}): {}", line, raw.trim(), err);
                    summary.ignored += 1;
                    Report::Ignored {
                        line,
                        input: raw.trim().to_string(),
                        code: err.code(),
                        error: err.to_string(),
                    }
                }
            };
            summary.events += 1;
            emit(&report)?;
        }
        Ok(summary)
    }
}

/// Event counts of one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub events: usize,
    pub ignored: usize,
}
