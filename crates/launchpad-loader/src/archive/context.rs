//! Loading context over the archives of one search path.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::ArchiveLoaderConfig;
use super::entry::WasmEntryType;
use super::index::index_exports;
use crate::context::{LoaderHandle, LoadingContext};
use crate::entry::EntryType;
use crate::error::{LoaderError, LoaderResult};
use crate::search_path::SearchPath;

/// Resolves entry types declared by the archives on a [`SearchPath`],
/// falling back to the search path's parent.
///
/// Archives are read and indexed once, when the context is opened. If two
/// archives declare the same type, the one whose canonical path sorts first
/// wins and the other is reported as shadowed.
pub struct ArchiveContext {
    archives: Vec<PathBuf>,
    entries: HashMap<String, Arc<WasmEntryType>>,
    parent: LoaderHandle,
}

impl ArchiveContext {
    /// Read and index every archive on `search_path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::SearchPath`] if an archive cannot be read or is
    /// not a valid module.
    pub fn open(search_path: &SearchPath, config: ArchiveLoaderConfig) -> LoaderResult<Self> {
        let config = Arc::new(config);
        let mut archives: Vec<PathBuf> = search_path.locations().map(Path::to_path_buf).collect();
        archives.sort();

        let mut entries: HashMap<String, Arc<WasmEntryType>> = HashMap::new();
        for archive in &archives {
            let wasm_bytes: Arc<[u8]> = std::fs::read(archive)
                .map_err(|e| {
                    LoaderError::search_path(archive, format!("failed to read archive: {e}"))
                })?
                .into();
            let types = index_exports(&wasm_bytes)
                .map_err(|message| LoaderError::search_path(archive, message))?;
            debug!(archive = %archive.display(), types = types.len(), "Indexed archive");

            for (name, capabilities) in types {
                if let Some(existing) = entries.get(&name) {
                    warn!(
                        entry = %name,
                        used = %existing.archive().display(),
                        shadowed = %archive.display(),
                        "Entry type declared by more than one archive"
                    );
                    continue;
                }
                let entry = WasmEntryType::new(
                    name.clone(),
                    archive.clone(),
                    Arc::clone(&wasm_bytes),
                    capabilities,
                    Arc::clone(&config),
                );
                entries.insert(name, Arc::new(entry));
            }
        }

        info!(
            archives = archives.len(),
            entry_types = entries.len(),
            "Created archive loading context"
        );

        Ok(Self {
            archives,
            entries,
            parent: Arc::clone(search_path.parent()),
        })
    }

    /// Indexed archives, sorted.
    #[must_use]
    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    /// Entry type names declared by the archives, sorted.
    #[must_use]
    pub fn entry_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Freeze into a shareable handle.
    #[must_use]
    pub fn into_handle(self) -> LoaderHandle {
        Arc::new(self)
    }
}

impl fmt::Debug for ArchiveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveContext")
            .field("archives", &self.archives)
            .field("entries", &self.entry_names())
            .field("parent", &self.parent.describe())
            .finish()
    }
}

impl LoadingContext for ArchiveContext {
    fn describe(&self) -> String {
        format!("archives[{}]", self.archives.len())
    }

    fn parent(&self) -> Option<&LoaderHandle> {
        Some(&self.parent)
    }

    fn find_local(&self, name: &str) -> LoaderResult<Option<Arc<dyn EntryType>>> {
        Ok(self
            .entries
            .get(name)
            .map(|e| Arc::clone(e) as Arc<dyn EntryType>))
    }
}
