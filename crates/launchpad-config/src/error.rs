use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or reading the boot configuration.
///
/// Every variant is fatal to the bootstrap and is raised before any dynamic
/// loading takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key is not present in the store.
    #[error("required configuration key '{key}' is not set")]
    MissingKey {
        /// The missing key.
        key: String,
    },

    /// A key holds a value that cannot be used.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A key references a path that does not exist or has the wrong kind.
    #[error("'{key}' points to {}: {message}", path.display())]
    InvalidPath {
        /// The key the path was read from.
        key: String,
        /// The path as configured.
        path: PathBuf,
        /// Why the path was rejected.
        message: String,
    },

    /// Failed to read a properties file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// Path that could not be read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A properties file line could not be parsed.
    #[error("failed to parse {path} at line {line}: {message}")]
    ParseError {
        /// Path of the file being parsed.
        path: String,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// A loaded file violated a structural limit.
    #[error("validation failed for {field}: {message}")]
    ValidationError {
        /// The field or file that failed.
        field: String,
        /// Why validation failed.
        message: String,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
