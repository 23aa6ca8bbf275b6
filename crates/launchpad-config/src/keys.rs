use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// Key naming the properties file used to seed the store.
pub const PROPERTIES_FILE_KEY: &str = "boot.properties.file";

/// Properties file consulted when [`PROPERTIES_FILE_KEY`] is unset.
pub const DEFAULT_PROPERTIES_FILE: &str = "boot.properties";

/// Key selecting the namespace for every other boot key.
pub const PREFIX_KEY: &str = "boot.prefix";

/// Log level / `EnvFilter` directive for the launcher itself.
pub const LOG_LEVEL_KEY: &str = "boot.log.level";

/// Log output format (`pretty`, `compact`, `json`, `full`).
pub const LOG_FORMAT_KEY: &str = "boot.log.format";

/// Directory for rotated log files; logs go to stderr when unset.
pub const LOG_DIRECTORY_KEY: &str = "boot.log.directory";

/// The configuration namespace that scopes the application keys.
///
/// All application keys are derived from it, e.g. `<prefix>.home`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BootPrefix(String);

impl BootPrefix {
    /// Validate and wrap a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the prefix is empty or contains
    /// whitespace, a property separator (`=` or `:`) or control characters.
    pub fn new(prefix: impl Into<String>) -> ConfigResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: PREFIX_KEY.to_owned(),
                message: "boot prefix must not be empty".to_owned(),
            });
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                key: PREFIX_KEY.to_owned(),
                message: format!("boot prefix must not contain whitespace, got: '{prefix}'"),
            });
        }
        if let Some(sep) = prefix.chars().find(|c| matches!(c, '=' | ':')) {
            return Err(ConfigError::InvalidValue {
                key: PREFIX_KEY.to_owned(),
                message: format!("boot prefix must not contain '{sep}', got: '{prefix}'"),
            });
        }
        if prefix.chars().any(char::is_control) {
            return Err(ConfigError::InvalidValue {
                key: PREFIX_KEY.to_owned(),
                message: "boot prefix must not contain control characters".to_owned(),
            });
        }
        Ok(Self(prefix))
    }

    /// The prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<prefix>.home`
    #[must_use]
    pub fn home_key(&self) -> String {
        format!("{}.home", self.0)
    }

    /// `<prefix>.init`
    #[must_use]
    pub fn init_key(&self) -> String {
        format!("{}.init", self.0)
    }

    /// `<prefix>.init.arg<index>`
    #[must_use]
    pub fn arg_key(&self, index: usize) -> String {
        format!("{}.init.arg{index}", self.0)
    }

    /// `<prefix>.wasm.max_memory_bytes`
    #[must_use]
    pub fn max_memory_key(&self) -> String {
        format!("{}.wasm.max_memory_bytes", self.0)
    }

    /// `<prefix>.wasm.timeout_ms`
    #[must_use]
    pub fn timeout_key(&self) -> String {
        format!("{}.wasm.timeout_ms", self.0)
    }
}

impl fmt::Display for BootPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BootPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
