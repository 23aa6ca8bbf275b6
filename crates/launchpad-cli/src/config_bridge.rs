//! Bridge from the boot configuration store to logging settings.

use std::str::FromStr;

use launchpad_config::keys::{LOG_DIRECTORY_KEY, LOG_FORMAT_KEY, LOG_LEVEL_KEY};
use launchpad_config::{ConfigError, ConfigResult, ConfigStore};
use launchpad_telemetry::{LogConfig, LogFormat};

/// Level used when `boot.log.level` is unset.
const DEFAULT_LEVEL: &str = "info";

/// Guest runtime crates are noisy at `info`.
const QUIET_DIRECTIVES: &[&str] = &["extism=warn", "wasmtime=warn", "cranelift=warn"];

/// Build the [`LogConfig`] from `boot.log.*` keys.
///
/// `verbose` forces the `debug` level; `format` overrides `boot.log.format`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `boot.log.format` is not a known
/// format.
pub fn to_log_config(
    store: &ConfigStore,
    verbose: bool,
    format: Option<LogFormat>,
) -> ConfigResult<LogConfig> {
    let level = if verbose {
        "debug"
    } else {
        store.get(LOG_LEVEL_KEY).unwrap_or(DEFAULT_LEVEL)
    };

    let format = match format {
        Some(format) => format,
        None => store
            .get(LOG_FORMAT_KEY)
            .map(LogFormat::from_str)
            .transpose()
            .map_err(|e| ConfigError::InvalidValue {
                key: LOG_FORMAT_KEY.to_owned(),
                message: e.to_string(),
            })?
            .unwrap_or_default(),
    };

    let mut config = LogConfig::new(level).with_format(format);
    for directive in QUIET_DIRECTIVES {
        config = config.with_directive(*directive);
    }
    if let Some(dir) = store.get(LOG_DIRECTORY_KEY) {
        config = config.with_file_logging(dir);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use launchpad_telemetry::LogTarget;

    use super::*;

    #[test]
    fn defaults_without_keys() {
        let config = to_log_config(&ConfigStore::new(), false, None).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.target, LogTarget::Stderr);
        assert!(config.thread_names);
    }

    #[test]
    fn keys_drive_level_format_and_target() {
        let store: ConfigStore = [
            ("boot.log.level", "launchpad_loader=trace"),
            ("boot.log.format", "json"),
            ("boot.log.directory", "/var/log/launchpad"),
        ]
        .into_iter()
        .collect();

        let config = to_log_config(&store, false, None).unwrap();
        assert_eq!(config.level, "launchpad_loader=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(
            config.target,
            LogTarget::File(PathBuf::from("/var/log/launchpad"))
        );
    }

    #[test]
    fn flags_override_keys() {
        let store: ConfigStore = [("boot.log.level", "warn"), ("boot.log.format", "json")]
            .into_iter()
            .collect();

        let config = to_log_config(&store, true, Some(LogFormat::Pretty)).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_format_is_invalid_value() {
        let store: ConfigStore = [("boot.log.format", "xml")].into_iter().collect();
        assert!(matches!(
            to_log_config(&store, false, None),
            Err(ConfigError::InvalidValue { key, .. }) if key == "boot.log.format"
        ));
    }

    #[test]
    fn runtime_crates_are_quieted() {
        let config = to_log_config(&ConfigStore::new(), false, None).unwrap();
        assert!(config.directives.iter().any(|d| d == "extism=warn"));
    }
}
