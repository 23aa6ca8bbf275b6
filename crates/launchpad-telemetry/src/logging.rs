//! Subscriber construction for the launcher.
//!
//! One `fmt` layer, chosen by [`LogFormat`], writes to the configured
//! [`LogTarget`] behind an [`EnvFilter`] built from the level plus any extra
//! directives. Thread names are on by default so output from the entry
//! thread carries the boot prefix.

use std::path::PathBuf;
use std::str::FromStr;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::error::{TelemetryError, TelemetryResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Prefix of rotated log file names when none is configured.
const DEFAULT_FILE_PREFIX: &str = "launchpad";

/// Output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human oriented.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
    /// The `fmt` default layout.
    Full,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        [
            ("pretty", Self::Pretty),
            ("compact", Self::Compact),
            ("json", Self::Json),
            ("full", Self::Full),
        ]
        .into_iter()
        .find_map(|(known, format)| name.eq_ignore_ascii_case(known).then_some(format))
        .ok_or_else(|| TelemetryError::UnknownFormat(name.to_owned()))
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error.
    #[default]
    Stderr,
    /// Daily-rotated files in this directory.
    File(PathBuf),
}

/// Settings for [`setup_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base level or filter expression, e.g. `info` or `launchpad_loader=debug`.
    pub level: String,
    /// Output layout.
    pub format: LogFormat,
    /// Output destination.
    pub target: LogTarget,
    /// File name prefix for [`LogTarget::File`].
    pub file_prefix: String,
    /// Include the emitting thread's name.
    pub thread_names: bool,
    /// Colour output. Always off for files.
    pub ansi: bool,
    /// Extra filter directives layered on top of `level`.
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

impl LogConfig {
    /// Compact output to stderr at `level`.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
            thread_names: true,
            ansi: true,
            directives: Vec::new(),
        }
    }

    /// Choose the output layout.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Choose the output destination.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.ansi = self.ansi && !matches!(target, LogTarget::File(_));
        self.target = target;
        self
    }

    /// Write daily-rotated files into `directory`.
    #[must_use]
    pub fn with_file_logging(self, directory: impl Into<PathBuf>) -> Self {
        self.with_target(LogTarget::File(directory.into()))
    }

    /// Append a filter directive such as `extism=warn`.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Parse the level and directives into one filter.
    fn build_filter(&self) -> TelemetryResult<EnvFilter> {
        let invalid = |directive: &str, e: &dyn std::fmt::Display| TelemetryError::InvalidFilter {
            directive: directive.to_owned(),
            message: e.to_string(),
        };

        let base = EnvFilter::try_new(&self.level).map_err(|e| invalid(self.level.as_str(), &e))?;
        self.directives.iter().try_fold(base, |filter, directive| {
            let parsed = directive.parse().map_err(
                |e: tracing_subscriber::filter::ParseError| invalid(directive.as_str(), &e),
            )?;
            Ok(filter.add_directive(parsed))
        })
    }

    /// The formatting layer for `writer`.
    fn build_layer<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let base = fmt::layer()
            .with_writer(writer)
            .with_ansi(self.ansi)
            .with_thread_names(self.thread_names);

        match self.format {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Compact => base.compact().boxed(),
            LogFormat::Json => base.json().boxed(),
            LogFormat::Full => base.boxed(),
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if the filter does not parse, the log directory cannot
/// be created, or a subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.build_filter()?;

    let layer = match &config.target {
        LogTarget::Stdout => config.build_layer(std::io::stdout),
        LogTarget::Stderr => config.build_layer(std::io::stderr),
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| TelemetryError::LogDirectory {
                path: dir.clone(),
                source,
            })?;
            config.build_layer(RollingFileAppender::new(
                Rotation::DAILY,
                dir,
                &config.file_prefix,
            ))
        },
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("FULL".parse::<LogFormat>().unwrap(), LogFormat::Full);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(TelemetryError::UnknownFormat(name)) if name == "xml"
        ));
    }

    #[test]
    fn defaults_suit_a_terminal() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.target, LogTarget::Stderr);
        assert!(config.thread_names);
        assert!(config.ansi);
    }

    #[test]
    fn file_target_turns_colour_off() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig::default().with_file_logging(dir.path());
        assert_eq!(config.target, LogTarget::File(dir.path().to_path_buf()));
        assert!(!config.ansi);

        let back = config.with_target(LogTarget::Stdout);
        assert!(!back.ansi);
    }

    #[test]
    fn bad_directive_names_the_culprit() {
        let config = LogConfig::new("info").with_directive("launchpad=notalevel");
        match config.build_filter() {
            Err(TelemetryError::InvalidFilter { directive, .. }) => {
                assert_eq!(directive, "launchpad=notalevel");
            },
            other => panic!("expected InvalidFilter, got: {other:?}"),
        }
    }

    #[test]
    fn level_and_directives_combine() {
        let config = LogConfig::new("warn")
            .with_directive("launchpad_loader=debug")
            .with_directive("extism=error");
        assert!(config.build_filter().is_ok());
    }
}
