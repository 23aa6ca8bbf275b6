use std::path::PathBuf;

use launchpad_config::ConfigError;
use thiserror::Error;

use crate::shape::EntryShape;

/// Fatal errors of the bootstrap sequence.
///
/// Every variant aborts startup; there is no retry. Non-fatal outcomes of a
/// started entry point are reported through
/// [`DispatchOutcome`](crate::dispatcher::DispatchOutcome) instead.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A required key is missing or references an invalid path.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Archive enumeration or loading-context construction failed.
    #[error("search path error at {}: {message}", path.display())]
    SearchPath {
        /// The directory or archive involved.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The named entry type is not on the search path or any parent context.
    #[error("entry type '{name}' not found on the search path")]
    EntryNotFound {
        /// The fully-qualified name that was requested.
        name: String,
    },

    /// The init key names an archive whose embedded entry point would have to
    /// be discovered; that resolution mode is not supported.
    #[error("embedded entry archives are not supported: '{archive}'")]
    EmbeddedEntryUnsupported {
        /// The archive path given as the init value.
        archive: String,
    },

    /// Constructing, instantiating, starting or invoking the entry failed.
    #[error("failed to start '{entry}' as {shape}: {message}")]
    Instantiation {
        /// The entry type name.
        entry: String,
        /// The start strategy that was attempted.
        shape: EntryShape,
        /// What went wrong.
        message: String,
    },
}

impl LoaderError {
    /// Shorthand for [`LoaderError::Instantiation`].
    pub fn instantiation(
        entry: impl Into<String>,
        shape: EntryShape,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Instantiation {
            entry: entry.into(),
            shape,
            message: message.to_string(),
        }
    }

    /// Shorthand for [`LoaderError::SearchPath`].
    pub fn search_path(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::SearchPath {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// A specialized Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
