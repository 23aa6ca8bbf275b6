//! Archive discovery for the dynamic search path.
//!
//! Scans a directory for `.wasm` archives and collapses them into a set of
//! canonical locations. Path order is unspecified and must not be relied on.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::context::LoaderHandle;
use crate::error::{LoaderError, LoaderResult};

/// File extension identifying a loadable archive.
pub const ARCHIVE_EXTENSION: &str = "wasm";

/// A deduplicated set of archive locations rooted at a parent context.
#[derive(Clone)]
pub struct SearchPath {
    locations: HashSet<PathBuf>,
    parent: LoaderHandle,
}

impl SearchPath {
    /// Build a search path from explicit archive paths.
    ///
    /// Each path is canonicalised; paths that resolve to the same file are
    /// collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::SearchPath`] for the first path that cannot be
    /// canonicalised. No partial search path is produced.
    pub fn from_locations<I, P>(paths: I, parent: LoaderHandle) -> LoaderResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut locations = HashSet::new();
        for path in paths {
            let path = path.as_ref();
            let canonical = std::fs::canonicalize(path).map_err(|e| {
                LoaderError::search_path(path, format!("cannot resolve archive location: {e}"))
            })?;
            if !locations.insert(canonical) {
                debug!(path = %path.display(), "Skipping duplicate archive location");
            }
        }
        Ok(Self { locations, parent })
    }

    /// Canonical archive locations, in no particular order.
    pub fn locations(&self) -> impl Iterator<Item = &Path> {
        self.locations.iter().map(PathBuf::as_path)
    }

    /// Whether `path` (already canonical) is on the search path.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.locations.contains(path)
    }

    /// Number of distinct archives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether there are no archives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The context consulted for names not found in these archives.
    #[must_use]
    pub fn parent(&self) -> &LoaderHandle {
        &self.parent
    }
}

impl fmt::Debug for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchPath")
            .field("locations", &self.locations)
            .field("parent", &self.parent.describe())
            .finish()
    }
}

/// Scan `dir` for archives and build a search path rooted at `parent`.
///
/// Every non-directory entry with the [`ARCHIVE_EXTENSION`] suffix (any case)
/// is included, symlinks unresolved. An empty directory yields an empty search path. The caller is
/// responsible for `dir` existing.
///
/// # Errors
///
/// Returns [`LoaderError::SearchPath`] if the directory cannot be read or any
/// archive location, including a dangling symlink, cannot be canonicalised.
pub fn build_search_path(dir: &Path, parent: LoaderHandle) -> LoaderResult<SearchPath> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| LoaderError::search_path(dir, format!("failed to read directory: {e}")))?;

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| LoaderError::search_path(dir, format!("failed to read entry: {e}")))?;
        let path = entry.path();
        if !has_archive_extension(&path) {
            continue;
        }
        // Symlinks are kept unresolved so a dangling link fails canonicalisation.
        let file_type = entry
            .file_type()
            .map_err(|e| LoaderError::search_path(&path, format!("failed to stat entry: {e}")))?;
        if file_type.is_dir() {
            debug!(path = %path.display(), "Skipping directory with archive suffix");
            continue;
        }
        archives.push(path);
    }

    let search_path = SearchPath::from_locations(archives, parent)?;
    info!(
        dir = %dir.display(),
        archives = search_path.len(),
        "Built search path"
    );
    Ok(search_path)
}

/// Whether `path` carries the archive suffix.
#[must_use]
pub fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}
