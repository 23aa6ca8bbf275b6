//! Telemetry error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A log format name was not recognised.
    #[error("unknown log format '{0}'; expected one of: pretty, compact, json, full")]
    UnknownFormat(String),

    /// A level or directive could not be parsed as a filter.
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// The offending level or directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// The log directory could not be created.
    #[error("failed to create log directory {}: {source}", path.display())]
    LogDirectory {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
