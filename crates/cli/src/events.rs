//! Parser for event files.
//!
//! One event per line, fields separated by whitespace:
//!
//! ```text
//! R <uid>                         register user
//! U <uid>                         unregister user
//! A <mid> <category> <year>       announce movie
//! D                               publish staged movies
//! W <uid> <category> <mid> <score>  rate movie
//! F <uid> <threshold>             movies with average >= threshold
//! Q <uid>                         mean score of a user
//! I <mid> <category>              search movie
//! M                               print catalog
//! P                               print users
//! H <uid>                         print the movies a user rated
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Categories and
//! scores are kept as written; the store decides whether they are valid, so
//! a bad category is an ignored event and not a broken file.

use movie_store::{MovieId, UserId};
use std::str::{FromStr, SplitWhitespace};
use thiserror::Error;

/// Errors that make an event line unreadable
#[derive(Error, Debug, PartialEq)]
pub enum EventError {
    #[error("Unknown command {command:?} at line {line}")]
    UnknownCommand { line: usize, command: String },

    #[error("Missing {field} at line {line}")]
    MissingField { line: usize, field: &'static str },

    #[error("Invalid value for {field} at line {line}: {value:?}")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Unexpected trailing input at line {line}: {rest:?}")]
    TrailingInput { line: usize, rest: String },
}

/// One parsed event line
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Register { user_id: UserId },
    Unregister { user_id: UserId },
    Announce { movie_id: MovieId, category: String, year: u16 },
    Publish,
    Watch { user_id: UserId, category: String, movie_id: MovieId, score: i64 },
    Filter { user_id: UserId, threshold: f64 },
    Stats { user_id: UserId },
    Search { movie_id: MovieId, category: String },
    PrintMovies,
    PrintUsers,
    PrintUserMovies { user_id: UserId },
}

/// Cursor over the fields of one line
struct Fields<'a> {
    parts: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Fields<'a> {
    fn next_str(&mut self, field: &'static str) -> Result<&'a str, EventError> {
        self.parts.next().ok_or(EventError::MissingField {
            line: self.line,
            field,
        })
    }

    fn next<T: FromStr>(&mut self, field: &'static str) -> Result<T, EventError> {
        let value = self.next_str(field)?;
        value.parse().map_err(|_| EventError::InvalidValue {
            line: self.line,
            field,
            value: value.to_string(),
        })
    }

    fn finish(mut self) -> Result<(), EventError> {
        match self.parts.next() {
            None => Ok(()),
            Some(rest) => Err(EventError::TrailingInput {
                line: self.line,
                rest: rest.to_string(),
            }),
        }
    }
}

/// Parse one line; `Ok(None)` for blank lines and comments.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<Event>, EventError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut fields = Fields {
        parts: trimmed.split_whitespace(),
        line,
    };
    let command = fields.next_str("command")?;

    let event = match command {
        "R" => Event::Register {
            user_id: fields.next("user id")?,
        },
        "U" => Event::Unregister {
            user_id: fields.next("user id")?,
        },
        "A" => Event::Announce {
            movie_id: fields.next("movie id")?,
            category: fields.next("category")?,
            year: fields.next("year")?,
        },
        "D" => Event::Publish,
        "W" => Event::Watch {
            user_id: fields.next("user id")?,
            category: fields.next("category")?,
            movie_id: fields.next("movie id")?,
            score: fields.next("score")?,
        },
        "F" => Event::Filter {
            user_id: fields.next("user id")?,
            threshold: fields.next("threshold")?,
        },
        "Q" => Event::Stats {
            user_id: fields.next("user id")?,
        },
        "I" => Event::Search {
            movie_id: fields.next("movie id")?,
            category: fields.next("category")?,
        },
        "M" => Event::PrintMovies,
        "P" => Event::PrintUsers,
        "H" => Event::PrintUserMovies {
            user_id: fields.next("user id")?,
        },
        other => {
            return Err(EventError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };
    fields.finish()?;
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_command() {
        let cases = [
            ("R 1", Event::Register { user_id: 1 }),
            ("U 2", Event::Unregister { user_id: 2 }),
            (
                "A 10 2 2000",
                Event::Announce {
                    movie_id: 10,
                    category: "2".to_string(),
                    year: 2000,
                },
            ),
            ("D", Event::Publish),
            (
                "W 1 2 10 9",
                Event::Watch {
                    user_id: 1,
                    category: "2".to_string(),
                    movie_id: 10,
                    score: 9,
                },
            ),
            (
                "F 1 7.5",
                Event::Filter {
                    user_id: 1,
                    threshold: 7.5,
                },
            ),
            ("Q 3", Event::Stats { user_id: 3 }),
            (
                "I 10 DRAMA",
                Event::Search {
                    movie_id: 10,
                    category: "DRAMA".to_string(),
                },
            ),
            ("M", Event::PrintMovies),
            ("P", Event::PrintUsers),
            ("H 4", Event::PrintUserMovies { user_id: 4 }),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_line(line, 1).unwrap(), Some(expected), "line {line:?}");
        }
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        assert_eq!(parse_line("", 1).unwrap(), None);
        assert_eq!(parse_line("   \t", 2).unwrap(), None);
        assert_eq!(parse_line("# setup", 3).unwrap(), None);
    }

    #[test]
    fn test_tolerates_extra_whitespace() {
        assert_eq!(
            parse_line("  R   12  ", 1).unwrap(),
            Some(Event::Register { user_id: 12 })
        );
    }

    #[test]
    fn test_out_of_range_score_still_parses() {
        // Range checks belong to the store
        let event = parse_line("W 1 0 10 42", 1).unwrap().unwrap();
        assert!(matches!(event, Event::Watch { score: 42, .. }));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse_line("X 1", 4).unwrap_err(),
            EventError::UnknownCommand {
                line: 4,
                command: "X".to_string()
            }
        );
        assert_eq!(
            parse_line("A 10 2", 5).unwrap_err(),
            EventError::MissingField {
                line: 5,
                field: "year"
            }
        );
        assert_eq!(
            parse_line("R -1", 6).unwrap_err(),
            EventError::InvalidValue {
                line: 6,
                field: "user id",
                value: "-1".to_string()
            }
        );
        assert_eq!(
            parse_line("D now", 7).unwrap_err(),
            EventError::TrailingInput {
                line: 7,
                rest: "now".to_string()
            }
        );
    }
}
