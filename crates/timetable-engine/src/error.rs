//! Error types for timetable-engine operations.
//!
//! Only the feed boundary can fail. Resolvers, the filter and the nearest
//! lesson search always return a well-formed (possibly empty) result.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Invalid feed: {0}")]
    InvalidFeed(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),
}

impl From<serde_json::Error> for TimetableError {
    fn from(err: serde_json::Error) -> Self {
        TimetableError::InvalidFeed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TimetableError>;
