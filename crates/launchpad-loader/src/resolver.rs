//! Entry-point resolution from the boot configuration.

use std::path::Path;

use launchpad_config::{BootPrefix, ConfigStore, HomeLayout};
use tracing::{debug, info};

use crate::archive::{ArchiveContext, ArchiveLoaderConfig};
use crate::context::LoaderHandle;
use crate::entry::EntryDescriptor;
use crate::error::{LoaderError, LoaderResult};
use crate::search_path::{ARCHIVE_EXTENSION, SearchPath, build_search_path};

/// The outcome of resolution: the loading context created for this run and
/// the entry type to start.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    /// Context for all further loads in this run.
    pub loader: LoaderHandle,
    /// The resolved type and its selected shape.
    pub descriptor: EntryDescriptor,
}

/// Turns `<prefix>.init` into an [`EntryDescriptor`].
#[derive(Debug, Clone)]
pub struct EntryResolver {
    parent: LoaderHandle,
}

impl EntryResolver {
    /// A resolver whose search paths fall back to `parent`.
    #[must_use]
    pub fn new(parent: LoaderHandle) -> Self {
        Self { parent }
    }

    /// The root context every search path is chained to.
    #[must_use]
    pub fn parent(&self) -> &LoaderHandle {
        &self.parent
    }

    /// Validate `<prefix>.home` and its `lib` directory, build the search
    /// path from `lib`, then [`resolve`](Self::resolve).
    ///
    /// # Errors
    ///
    /// Configuration errors for a missing or invalid home layout, plus every
    /// error of [`build_search_path`] and [`resolve`](Self::resolve).
    pub fn resolve_home(
        &self,
        store: &ConfigStore,
        prefix: &BootPrefix,
    ) -> LoaderResult<ResolvedEntry> {
        let layout = HomeLayout::from_config(store, prefix)?;
        info!(home = %layout.home().display(), "Using application home");
        let search_path = build_search_path(layout.lib(), self.parent.clone())?;
        self.resolve(store, prefix, &search_path)
    }

    /// Create the archive context for `search_path` and load the type named
    /// by `<prefix>.init`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingKey`](launchpad_config::ConfigError::MissingKey) if `<prefix>.init` is unset
    /// - [`LoaderError::SearchPath`] if an archive cannot be indexed
    /// - [`LoaderError::EmbeddedEntryUnsupported`] if the init value names an archive
    /// - [`LoaderError::EntryNotFound`] if no context knows the name
    pub fn resolve(
        &self,
        store: &ConfigStore,
        prefix: &BootPrefix,
        search_path: &SearchPath,
    ) -> LoaderResult<ResolvedEntry> {
        let init = store.require(&prefix.init_key())?.trim().to_owned();

        let config = ArchiveLoaderConfig::from_store(store, prefix)?;
        let loader = ArchiveContext::open(search_path, config)?.into_handle();

        if names_archive(&init) {
            return Err(LoaderError::EmbeddedEntryUnsupported { archive: init });
        }

        let entry = loader.load_entry(&init)?;
        let descriptor = EntryDescriptor::new(entry);
        debug!(
            entry = %descriptor.name(),
            shape = %descriptor.shape(),
            context = %loader.describe(),
            "Resolved entry point"
        );

        Ok(ResolvedEntry { loader, descriptor })
    }
}

/// Whether an init value refers to an archive rather than a type name.
fn names_archive(init: &str) -> bool {
    Path::new(init)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{NativeEntry, NativeRegistry};
    use crate::shape::EntryShape;
    use launchpad_config::ConfigError;

    fn prefix() -> BootPrefix {
        BootPrefix::new("shop").unwrap()
    }

    fn resolver() -> EntryResolver {
        let mut registry = NativeRegistry::new();
        registry.register(NativeEntry::new("shop.Main").with_runnable(|| Ok(|| {})));
        EntryResolver::new(registry.into_handle())
    }

    fn home_with_lib() -> tempfile::TempDir {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("lib")).unwrap();
        home
    }

    fn store(home: &Path, init: Option<&str>) -> ConfigStore {
        let mut store = ConfigStore::new();
        store.set("shop.home", home.display().to_string());
        if let Some(init) = init {
            store.set("shop.init", init);
        }
        store
    }

    #[test]
    fn empty_lib_resolves_through_parent() {
        let home = home_with_lib();
        let resolved = resolver()
            .resolve_home(&store(home.path(), Some("shop.Main")), &prefix())
            .unwrap();
        assert_eq!(resolved.descriptor.name(), "shop.Main");
        assert_eq!(resolved.descriptor.shape(), EntryShape::FireAndForget);
        assert_eq!(resolved.loader.describe(), "archives[0]");
    }

    #[test]
    fn missing_init_is_configuration_error() {
        let home = home_with_lib();
        let result = resolver().resolve_home(&store(home.path(), None), &prefix());
        assert!(matches!(
            result,
            Err(LoaderError::Configuration(ConfigError::MissingKey { key })) if key == "shop.init"
        ));
    }

    #[test]
    fn unknown_type_is_not_found() {
        let home = home_with_lib();
        let result = resolver().resolve_home(&store(home.path(), Some("shop.Nope")), &prefix());
        assert!(matches!(
            result,
            Err(LoaderError::EntryNotFound { name }) if name == "shop.Nope"
        ));
    }

    #[test]
    fn archive_init_is_unsupported() {
        let home = home_with_lib();
        let result = resolver().resolve_home(&store(home.path(), Some("app/Shop.WASM")), &prefix());
        assert!(matches!(
            result,
            Err(LoaderError::EmbeddedEntryUnsupported { archive }) if archive == "app/Shop.WASM"
        ));
    }

    #[test]
    fn missing_lib_is_rejected_before_scanning() {
        let home = tempfile::tempdir().unwrap();
        let result = resolver().resolve_home(&store(home.path(), Some("shop.Main")), &prefix());
        assert!(matches!(
            result,
            Err(LoaderError::Configuration(ConfigError::InvalidPath { .. }))
        ));
    }

    #[test]
    fn init_value_is_trimmed() {
        let home = home_with_lib();
        let resolved = resolver()
            .resolve_home(&store(home.path(), Some("  shop.Main ")), &prefix())
            .unwrap();
        assert_eq!(resolved.descriptor.name(), "shop.Main");
    }
}
