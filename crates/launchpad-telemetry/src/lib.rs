//! Log subscriber setup for the Launchpad bootstrapper.
//!
//! [`LogConfig`] picks a [`LogFormat`] and a [`LogTarget`] (stdout, stderr
//! or a daily-rotated directory); [`setup_logging`] installs it as the
//! global `tracing` subscriber.
//!
//! # Example
//!
//! ```rust,no_run
//! use launchpad_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), launchpad_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("extism=warn");
//!
//! setup_logging(&config)?;
//! tracing::info!("Bootstrapping");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
