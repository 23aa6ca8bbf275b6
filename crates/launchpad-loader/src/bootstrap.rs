//! The bootstrap sequence: configuration, resolution, dispatch.

use launchpad_config::ConfigStore;
use tracing::{debug, info};

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::LoaderResult;
use crate::resolver::EntryResolver;

/// One bootstrap run over an owned configuration store.
///
/// Every stage is a hard gate: the first fatal error aborts the run.
#[derive(Debug)]
pub struct Bootstrap {
    store: ConfigStore,
    resolver: EntryResolver,
    dispatcher: Dispatcher,
}

impl Bootstrap {
    /// Assemble a run from its stages.
    #[must_use]
    pub fn new(store: ConfigStore, resolver: EntryResolver, dispatcher: Dispatcher) -> Self {
        Self {
            store,
            resolver,
            dispatcher,
        }
    }

    /// The configuration store, including any arguments published by
    /// [`run`](Self::run).
    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Read the boot prefix, publish `args` as `<prefix>.init.arg<N>`, resolve
    /// the entry point under `<prefix>.home` and start it.
    ///
    /// The prefix is checked before anything touches the filesystem.
    ///
    /// # Errors
    ///
    /// Any configuration, search path, resolution or instantiation error.
    /// Non-fatal endings of the started unit are returned as a
    /// [`DispatchOutcome`].
    pub async fn run(&mut self, args: &[String]) -> LoaderResult<DispatchOutcome> {
        let prefix = self.store.boot_prefix()?;
        info!(prefix = %prefix, "Bootstrapping");

        self.store.publish_args(&prefix, args);

        let resolved = self.resolver.resolve_home(&self.store, &prefix)?;
        debug!(context = %resolved.loader.describe(), "Loading context ready");

        let outcome = self
            .dispatcher
            .dispatch(&prefix, &resolved.descriptor, args)
            .await?;
        info!(entry = %resolved.descriptor.name(), outcome = ?outcome, "Entry point returned");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use crate::native::{NativeEntry, NativeRegistry};
    use launchpad_config::ConfigError;

    fn bootstrap(store: ConfigStore) -> Bootstrap {
        let mut registry = NativeRegistry::new();
        registry.register(NativeEntry::new("demo.Main").with_main(|_| Ok(())));
        Bootstrap::new(
            store,
            EntryResolver::new(registry.into_handle()),
            Dispatcher::default(),
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_prefix_fails_first() {
        let store: ConfigStore = [("demo.home", "/definitely/not/here")].into_iter().collect();
        let mut run = bootstrap(store);

        let result = run.run(&["x".to_owned()]).await;
        assert!(matches!(
            result,
            Err(LoaderError::Configuration(ConfigError::MissingKey { key })) if key == "boot.prefix"
        ));
        assert!(!run.store().contains_key("demo.init.arg0"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn args_are_published_before_resolution() {
        let store: ConfigStore = [("boot.prefix", "demo")].into_iter().collect();
        let mut run = bootstrap(store);

        let result = run.run(&["a".to_owned(), "b".to_owned()]).await;
        assert!(matches!(
            result,
            Err(LoaderError::Configuration(ConfigError::MissingKey { key })) if key == "demo.home"
        ));
        assert_eq!(run.store().get("demo.init.arg0"), Some("a"));
        assert_eq!(run.store().get("demo.init.arg1"), Some("b"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn full_run_reaches_the_entry_point() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("lib")).unwrap();
        let store: ConfigStore = [
            ("boot.prefix".to_owned(), "demo".to_owned()),
            ("demo.home".to_owned(), home.path().display().to_string()),
            ("demo.init".to_owned(), "demo.Main".to_owned()),
        ]
        .into_iter()
        .collect();

        let outcome = bootstrap(store).run(&[]).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed);
    }
}
