//! Launcher version reporting.

use std::fmt;

use tracing::info;

/// Package version compiled into the launcher.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identifier, if `LAUNCHPAD_BUILD_ID` was set at compile time.
pub const BUILD_ID: Option<&str> = option_env!("LAUNCHPAD_BUILD_ID");

/// The launcher version as reported at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LauncherVersion {
    /// Semantic package version.
    pub package: &'static str,
    /// Optional build identifier.
    pub build: Option<&'static str>,
}

impl fmt::Display for LauncherVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.build {
            Some(build) if !build.is_empty() => write!(f, "{} (build {build})", self.package),
            _ => f.write_str(self.package),
        }
    }
}

/// The version of this launcher build.
#[must_use]
pub fn version() -> LauncherVersion {
    LauncherVersion {
        package: PACKAGE_VERSION,
        build: BUILD_ID,
    }
}

/// Log the launcher version.
pub fn report_version() {
    let version = version();
    info!(version = %version, "Launchpad");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_version_matches_manifest() {
        assert_eq!(version().package, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn build_id_is_appended_when_present() {
        let v = LauncherVersion {
            package: "1.2.3",
            build: Some("abc123"),
        };
        assert_eq!(v.to_string(), "1.2.3 (build abc123)");
    }

    #[test]
    fn empty_build_id_is_ignored() {
        let v = LauncherVersion {
            package: "1.2.3",
            build: Some(""),
        };
        assert_eq!(v.to_string(), "1.2.3");
        let v = LauncherVersion {
            package: "1.2.3",
            build: None,
        };
        assert_eq!(v.to_string(), "1.2.3");
    }
}
