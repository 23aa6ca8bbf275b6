//! Per-run limits and guest configuration for archive instances.

use std::collections::BTreeMap;
use std::time::Duration;

use launchpad_config::{BootPrefix, ConfigResult, ConfigStore};

/// Bytes per WASM linear memory page.
const WASM_PAGE_BYTES: u64 = 64 * 1024;

/// Settings applied to every guest instance built from an archive.
///
/// Unlike long-running plugin hosts there are no default caps: the started
/// unit is the application, and it runs unbounded unless the store says
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveLoaderConfig {
    max_memory_bytes: Option<u64>,
    max_execution_time: Option<Duration>,
    guest_config: BTreeMap<String, String>,
}

impl ArchiveLoaderConfig {
    /// No limits and no guest configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `<prefix>.wasm.*` limits and snapshot the whole store as guest
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`](launchpad_config::ConfigError::InvalidValue)
    /// if a limit is not a non-negative integer.
    pub fn from_store(store: &ConfigStore, prefix: &BootPrefix) -> ConfigResult<Self> {
        let max_memory_bytes = store.get_u64(&prefix.max_memory_key())?;
        let max_execution_time = store
            .get_u64(&prefix.timeout_key())?
            .map(Duration::from_millis);
        let guest_config = store
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Ok(Self {
            max_memory_bytes,
            max_execution_time,
            guest_config,
        })
    }

    /// Cap guest linear memory.
    #[must_use]
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Cap the duration of each guest call.
    #[must_use]
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.max_execution_time = Some(duration);
        self
    }

    /// Add one guest configuration entry.
    #[must_use]
    pub fn with_guest_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.guest_config.insert(key.into(), value.into());
        self
    }

    /// Configured memory cap in bytes.
    #[must_use]
    pub fn max_memory_bytes(&self) -> Option<u64> {
        self.max_memory_bytes
    }

    /// Memory cap in WASM pages, saturating at `u32::MAX`.
    #[must_use]
    pub fn max_memory_pages(&self) -> Option<u32> {
        self.max_memory_bytes
            .map(|bytes| u32::try_from(bytes / WASM_PAGE_BYTES).unwrap_or(u32::MAX))
    }

    /// Configured per-call timeout.
    #[must_use]
    pub fn max_execution_time(&self) -> Option<Duration> {
        self.max_execution_time
    }

    /// Configuration visible to guests through `config::get`.
    #[must_use]
    pub fn guest_config(&self) -> &BTreeMap<String, String> {
        &self.guest_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_config::ConfigError;

    fn prefix() -> BootPrefix {
        BootPrefix::new("shop").unwrap()
    }

    #[test]
    fn empty_store_has_no_limits() {
        let config = ArchiveLoaderConfig::from_store(&ConfigStore::new(), &prefix()).unwrap();
        assert_eq!(config.max_memory_bytes(), None);
        assert_eq!(config.max_execution_time(), None);
        assert!(config.guest_config().is_empty());
    }

    #[test]
    fn limits_come_from_prefixed_keys() {
        let store: ConfigStore = [
            ("shop.wasm.max_memory_bytes", "1048576"),
            ("shop.wasm.timeout_ms", "250"),
            ("shop.init", "demo.Main"),
        ]
        .into_iter()
        .collect();

        let config = ArchiveLoaderConfig::from_store(&store, &prefix()).unwrap();
        assert_eq!(config.max_memory_pages(), Some(16));
        assert_eq!(config.max_execution_time(), Some(Duration::from_millis(250)));
        assert_eq!(
            config.guest_config().get("shop.init").map(String::as_str),
            Some("demo.Main")
        );
    }

    #[test]
    fn malformed_limit_is_rejected() {
        let store: ConfigStore = [("shop.wasm.timeout_ms", "soon")].into_iter().collect();
        let result = ArchiveLoaderConfig::from_store(&store, &prefix());
        assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "shop.wasm.timeout_ms"));
    }

    #[test]
    fn huge_memory_limit_saturates_pages() {
        let config = ArchiveLoaderConfig::new().with_memory_limit(u64::MAX);
        assert_eq!(config.max_memory_pages(), Some(u32::MAX));
    }
}
