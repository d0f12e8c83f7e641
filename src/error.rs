#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Error taxonomy shared by every analysis in the crate.
//!
//! Hitting the sampling configuration limit is deliberately absent here: it is a
//! terminal but incomplete success, reported through
//! [`SampleStatus::LimitReached`](crate::sampling::SampleStatus::LimitReached).

use std::time::Duration;
use thiserror::Error;

/// Errors raised by model construction, the SAT oracle and the analyses built on it.
#[derive(Debug, Error)]
pub enum Error {
    /// Structural integrity violation in the input feature tree. Fatal for the whole analysis.
    #[error("malformed feature model: {0}")]
    MalformedModel(String),

    /// An engine was invoked without its required setup (caller bug).
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),

    /// The oracle exceeded its budget. The caller may retry with a larger one.
    #[error("SAT oracle timed out after {elapsed:?}")]
    Timeout {
        /// Time spent before the query was abandoned.
        elapsed: Duration,
    },

    /// The underlying solver does not provide the requested capability.
    #[error("unsupported oracle capability: {0}")]
    Unsupported(&'static str),

    /// Cooperative cancellation was requested through the monitor.
    #[error("analysis cancelled")]
    Cancelled,

    /// Malformed DIMACS input.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// I/O failure while reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
