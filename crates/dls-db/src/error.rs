//! Store error taxonomy.
//!
//! Three buckets, mapped to HTTP codes at the daemon layer:
//! `NotFound` -> 404, `Conflict` -> 400, `Internal` -> 500.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A referenced entity id is absent.
    #[error("{0}")]
    NotFound(String),

    /// Business-rule violation: wrong status for a transition, duplicate
    /// unique field, or deletion blocked by dependents.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected store failure.
    #[error("erro interno: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Internal(e.to_string())
    }
}
