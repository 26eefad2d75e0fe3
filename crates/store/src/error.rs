//! Error types for the movie-store crate.
//!
//! Every store operation reports exactly one of five failure kinds. The
//! variants carry enough context for the driver to print a useful line,
//! while `kind()` and `code()` give it something small to match on.

use std::fmt;
use thiserror::Error;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Movie,
    /// A user exists but has no ratings yet
    Ratings,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "user",
            Entity::Movie => "movie",
            Entity::Ratings => "ratings of user",
        };
        f.write_str(name)
    }
}

/// Errors returned by store operations
///
/// Rust concept: one enum per crate keeps `?` working across modules,
/// since every module returns the same `Result<T>` alias.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Identifier is larger than the configured maximum
    #[error("{entity} id {id} exceeds the maximum of {max}")]
    OutOfRange { entity: Entity, id: u32, max: u32 },

    /// Duplicate user, or a movie id already used in staging or the catalog
    #[error("{entity} with id {id} already exists")]
    AlreadyExists { entity: Entity, id: u32 },

    /// User, movie or rating lookup miss
    #[error("{entity} with id {id} not found")]
    NotFound { entity: Entity, id: u32 },

    /// A node could not be allocated
    #[error("out of memory while allocating {what}")]
    OutOfMemory { what: String },

    /// Score outside 1-10, unknown category, or a bad configuration value
    #[error("invalid argument for {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

/// Fieldless view of [`StoreError`], for matching on the failure kind only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfRange,
    AlreadyExists,
    NotFound,
    OutOfMemory,
    InvalidArgument,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::OutOfRange { .. } => ErrorKind::OutOfRange,
            StoreError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            StoreError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// Small negative status code for drivers that report numeric results.
    ///
    /// Success is `1` on the driver side, so every failure is `<= 0`.
    pub fn code(&self) -> i32 {
        match self.kind() {
            ErrorKind::OutOfRange => 0,
            ErrorKind::AlreadyExists => -1,
            ErrorKind::NotFound => -2,
            ErrorKind::OutOfMemory => -3,
            ErrorKind::InvalidArgument => -4,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        StoreError::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_memory(what: impl Into<String>) -> Self {
        StoreError::OutOfMemory { what: what.into() }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
