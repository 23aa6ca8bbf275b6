#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Boot configuration for the Launchpad bootstrapper.
//!
//! The bootstrapper is driven by a flat set of string keys, all namespaced
//! under a *boot prefix* that is itself read from `boot.prefix`. This crate
//! provides the [`ConfigStore`] that holds those keys, the layered loader
//! that seeds it, and the validation of the home directory layout.
//!
//! # Usage
//!
//! ```rust,no_run
//! use launchpad_config::ConfigStore;
//!
//! let definitions = vec![("boot.prefix".to_owned(), "demo".to_owned())];
//! let store = ConfigStore::load(definitions).unwrap();
//! let prefix = store.boot_prefix().unwrap();
//! println!("entry point: {:?}", store.get(&prefix.init_key()));
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Definitions** (`-D key=value` on the command line)
//! 2. **Properties file** (`boot.properties.file`, default `boot.properties`)
//! 3. **Environment variables** (`BOOT_PREFIX`, `BOOT_PROPERTIES_FILE`) (fallback only)

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Well-known configuration keys and the boot prefix.
pub mod keys;
/// Home directory layout validation.
pub mod layout;
/// Layered store loading.
pub mod loader;
/// Properties file parsing.
pub mod properties;
/// The configuration store.
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use keys::BootPrefix;
pub use layout::HomeLayout;
pub use store::ConfigStore;
