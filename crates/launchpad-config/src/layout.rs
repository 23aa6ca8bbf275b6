use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::keys::BootPrefix;
use crate::store::ConfigStore;

/// Name of the archive directory under the application home.
pub const LIB_DIR_NAME: &str = "lib";

/// A validated application home and its `lib` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeLayout {
    home: PathBuf,
    lib: PathBuf,
}

impl HomeLayout {
    /// Read `<prefix>.home` and check that it and its `lib` subdirectory are
    /// existing directories. `lib` may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if `<prefix>.home` is unset, or
    /// [`ConfigError::InvalidPath`] if either directory is missing or is not
    /// a directory.
    pub fn from_config(store: &ConfigStore, prefix: &BootPrefix) -> ConfigResult<Self> {
        let key = prefix.home_key();
        let home = PathBuf::from(store.require(&key)?);
        require_dir(&key, &home, "home directory")?;

        let lib = home.join(LIB_DIR_NAME);
        require_dir(&key, &lib, "lib directory")?;

        Ok(Self { home, lib })
    }

    /// The application home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The `lib` directory holding the archives.
    #[must_use]
    pub fn lib(&self) -> &Path {
        &self.lib
    }
}

fn require_dir(key: &str, path: &Path, what: &str) -> ConfigResult<()> {
    let message = match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => format!("{what} is not a directory"),
        Err(e) => format!("{what} is not accessible: {e}"),
    };
    Err(ConfigError::InvalidPath {
        key: key.to_owned(),
        path: path.to_path_buf(),
        message,
    })
}
