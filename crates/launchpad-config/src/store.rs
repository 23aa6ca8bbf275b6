use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::keys::{BootPrefix, PREFIX_KEY};

/// Flat string key/value configuration for one bootstrap run.
///
/// Built once at startup and passed explicitly to every stage. Later writes
/// to an existing key replace the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    entries: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a key that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if the key is not set.
    pub fn require(&self, key: &str) -> ConfigResult<&str> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_owned(),
        })
    }

    /// Set a key, returning the value it replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Whether the key is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read and validate `boot.prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if `boot.prefix` is unset, or
    /// [`ConfigError::InvalidValue`] if it is not a usable prefix.
    pub fn boot_prefix(&self) -> ConfigResult<BootPrefix> {
        BootPrefix::new(self.require(PREFIX_KEY)?)
    }

    /// Parse an optional unsigned integer value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the key is set but is not a
    /// non-negative integer.
    pub fn get_u64(&self, key: &str) -> ConfigResult<Option<u64>> {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: key.to_owned(),
                        message: format!("expected a non-negative integer, got '{raw}': {e}"),
                    })
            })
            .transpose()
    }

    /// Publish positional arguments as `<prefix>.init.arg<N>`, zero-indexed.
    pub fn publish_args(&mut self, prefix: &BootPrefix, args: &[String]) {
        for (index, arg) in args.iter().enumerate() {
            self.set(prefix.arg_key(index), arg.clone());
        }
        debug!(prefix = %prefix, count = args.len(), "published init arguments");
    }

    /// Read back the published `<prefix>.init.arg<N>` values in order.
    ///
    /// Stops at the first missing index.
    #[must_use]
    pub fn init_args(&self, prefix: &BootPrefix) -> Vec<String> {
        (0..)
            .map_while(|index| self.get(&prefix.arg_key(index)).map(str::to_owned))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<K, V> Extend<(K, V)> for ConfigStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prefix_is_a_missing_key() {
        let store = ConfigStore::new();
        match store.boot_prefix() {
            Err(ConfigError::MissingKey { key }) => assert_eq!(key, "boot.prefix"),
            other => panic!("expected MissingKey, got: {other:?}"),
        }
    }

    #[test]
    fn later_writes_replace_earlier_ones() {
        let mut store = ConfigStore::from_iter([("a", "1")]);
        assert_eq!(store.set("a", "2"), Some("1".to_owned()));
        assert_eq!(store.get("a"), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn args_are_published_in_order() {
        let mut store = ConfigStore::new();
        let prefix = BootPrefix::new("app").unwrap();
        store.publish_args(&prefix, &["a".to_owned(), "b".to_owned()]);

        assert_eq!(store.get("app.init.arg0"), Some("a"));
        assert_eq!(store.get("app.init.arg1"), Some("b"));
        assert!(!store.contains_key("app.init.arg2"));
        assert_eq!(store.init_args(&prefix), vec!["a", "b"]);
    }

    #[test]
    fn no_args_publishes_nothing() {
        let mut store = ConfigStore::new();
        let prefix = BootPrefix::new("app").unwrap();
        store.publish_args(&prefix, &[]);
        assert!(store.is_empty());
        assert!(store.init_args(&prefix).is_empty());
    }

    #[test]
    fn get_u64_parses_and_rejects() {
        let store = ConfigStore::from_iter([("n", " 42 "), ("bad", "-1")]);
        assert_eq!(store.get_u64("n").unwrap(), Some(42));
        assert_eq!(store.get_u64("absent").unwrap(), None);
        assert!(matches!(
            store.get_u64("bad"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
