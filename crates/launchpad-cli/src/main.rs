//! Launchpad - generic application bootstrapper.
//!
//! Reads the boot configuration, builds the search path from
//! `<home>/lib`, resolves `<prefix>.init` and starts it. Arguments after
//! `--` are forwarded to the entry point.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use anyhow::{Context, Result};
use clap::Parser;
use launchpad_config::ConfigStore;
use launchpad_config::properties::parse_definition;
use launchpad_loader::{Bootstrap, DispatchOutcome, Dispatcher, EntryResolver, NativeRegistry};
use launchpad_telemetry::LogFormat;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod config_bridge;

/// Exit status after a second Ctrl-C, matching a shell's SIGINT report.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Launchpad - start an application from its home directory
#[derive(Parser)]
#[command(name = "launchpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set a configuration key, e.g. `-D boot.prefix=shop` (repeatable)
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_definition)]
    definitions: Vec<(String, String)>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log format: pretty, compact, json or full (overrides `boot.log.format`)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Arguments forwarded to the entry point
    #[arg(last = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = ConfigStore::load(cli.definitions).context("failed to load boot configuration")?;

    let log_config = config_bridge::to_log_config(&store, cli.verbose, cli.log_format)
        .context("invalid logging configuration")?;
    if let Err(e) = launchpad_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    launchpad_loader::report_version();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&interrupt) {
                Interrupt::CancelWait => {
                    warn!("Interrupt received; press Ctrl-C again to exit immediately");
                },
                Interrupt::Exit => std::process::exit(INTERRUPTED_EXIT_CODE),
            }
        }
    });

    let resolver = EntryResolver::new(NativeRegistry::new().into_handle());
    let mut bootstrap = Bootstrap::new(store, resolver, Dispatcher::new(cancel));

    match bootstrap.run(&cli.args).await? {
        DispatchOutcome::Completed => info!("Entry point completed"),
        DispatchOutcome::EntryFailed(message) => {
            warn!(error = %message, "Entry point reported a failure");
        },
        DispatchOutcome::Interrupted => warn!("Interrupted; leaving the entry thread behind"),
        DispatchOutcome::Abandoned => warn!("Entry thread terminated abnormally"),
    }

    Ok(())
}

/// Response to one Ctrl-C.
#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// First interrupt: stop waiting on a threaded entry point.
    CancelWait,
    /// Repeated interrupt: an inline entry point ignores the token, so leave.
    Exit,
}

fn on_interrupt(cancel: &CancellationToken) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::Exit
    } else {
        cancel.cancel();
        Interrupt::CancelWait
    }
}
