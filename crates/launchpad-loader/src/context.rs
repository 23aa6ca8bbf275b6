//! Loading contexts: name-to-entry resolution scopes chained to a parent.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::entry::EntryType;
use crate::error::{LoaderError, LoaderResult};

/// Shared handle to a loading context, threaded explicitly through the
/// stages that need it.
pub type LoaderHandle = Arc<dyn LoadingContext>;

/// A scope that resolves entry names, consulting its own locations first and
/// then its parent.
pub trait LoadingContext: Send + Sync + fmt::Debug {
    /// Short description used in logs (e.g. `archives[3]`).
    fn describe(&self) -> String;

    /// The fallback context, if any.
    fn parent(&self) -> Option<&LoaderHandle>;

    /// Resolve `name` in this context only, without consulting the parent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lookup itself fails; an unknown name is
    /// `Ok(None)`.
    fn find_local(&self, name: &str) -> LoaderResult<Option<Arc<dyn EntryType>>>;

    /// Resolve `name` locally, then through the parent chain.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::EntryNotFound`] if no context in the chain
    /// knows the name.
    fn load_entry(&self, name: &str) -> LoaderResult<Arc<dyn EntryType>> {
        if let Some(entry) = self.find_local(name)? {
            debug!(entry = name, context = %self.describe(), "Resolved entry type");
            return Ok(entry);
        }
        match self.parent() {
            Some(parent) => parent.load_entry(name),
            None => Err(LoaderError::EntryNotFound {
                name: name.to_owned(),
            }),
        }
    }
}
