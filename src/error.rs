//! Error types.

use thiserror::Error;

/// Errors raised while building a logger backend.
///
/// Only construction can fail. Writing a log line never returns an error to
/// the caller, and unknown level names are not errors at all.
#[derive(Debug, Error)]
pub enum LogError {
    /// The configured output could not be opened.
    #[error("failed to open log output {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured output is blank.
    #[error("log output is empty")]
    EmptyOutput,
}

/// Result type for logger construction.
pub type LogResult<T> = Result<T, LogError>;
