//! Layered store loading.
//!
//! Implements the `ConfigStore::load()` algorithm:
//! 1. Seed from environment fallbacks (`BOOT_PREFIX`, `BOOT_PROPERTIES_FILE`)
//! 2. Locate the properties file (definitions → environment → default)
//! 3. Merge the properties file, if it exists
//! 4. Merge command-line definitions

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::env::{collect_env_vars, env_fallbacks};
use crate::error::ConfigResult;
use crate::keys::{DEFAULT_PROPERTIES_FILE, PROPERTIES_FILE_KEY};
use crate::properties::load_properties_file;
use crate::store::ConfigStore;

impl ConfigStore {
    /// Load the store with full precedence, reading the process environment.
    ///
    /// See [`load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) if the properties file
    /// exists but cannot be read or parsed.
    pub fn load<I>(definitions: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        load(definitions, &collect_env_vars())
    }
}

/// Load the store from definitions, a properties file and an environment
/// snapshot.
///
/// A missing properties file is not an error; it is logged as a warning.
///
/// # Errors
///
/// Returns a [`ConfigError`](crate::ConfigError) if the properties file
/// exists but cannot be read, is oversized, or fails to parse.
pub fn load<I>(definitions: I, env_vars: &HashMap<String, String>) -> ConfigResult<ConfigStore>
where
    I: IntoIterator<Item = (String, String)>,
{
    let definitions: Vec<(String, String)> = definitions.into_iter().collect();

    // 1. Environment fallbacks.
    let mut store: ConfigStore = env_fallbacks(env_vars).into_iter().collect();
    if !store.is_empty() {
        debug!(count = store.len(), "applied environment variable fallbacks");
    }

    // 2. Properties file location.
    let properties_path = definitions
        .iter()
        .rev()
        .find(|(key, _)| key == PROPERTIES_FILE_KEY)
        .map(|(_, value)| value.as_str())
        .or_else(|| store.get(PROPERTIES_FILE_KEY))
        .map_or_else(|| PathBuf::from(DEFAULT_PROPERTIES_FILE), PathBuf::from);

    // 3. Properties file.
    match load_properties_file(&properties_path)? {
        Some(pairs) => {
            info!(
                path = %properties_path.display(),
                keys = pairs.len(),
                "loaded boot properties"
            );
            store.extend(pairs);
        },
        None => {
            warn!(
                path = %properties_path.display(),
                "boot properties file not found; continuing without it"
            );
        },
    }

    // 4. Definitions win.
    store.extend(definitions);

    Ok(store)
}
