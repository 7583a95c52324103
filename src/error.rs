//! Error taxonomy for the tutor core
//!
//! Every variant is recovered at the command-loop boundary: it produces a
//! user-visible message and control returns to the prompt.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorError {
    /// A lookup/delete/update targeted a key absent from the store.
    #[error("\"{0}\" not found")]
    NotFound(String),

    /// Malformed manual entry or a missing required argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Generation or speech backend call failed (network, non-2xx,
    /// malformed stream). Not retried; the current step is aborted
    /// without committing any partial mastery change.
    #[error("backend unavailable: {0}")]
    Backend(String),

    /// The underlying store raised on a read/write.
    #[error("store failure: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl From<reqwest::Error> for TutorError {
    fn from(err: reqwest::Error) -> Self {
        TutorError::Backend(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TutorError>;
