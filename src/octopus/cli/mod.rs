//! # CLI Behavior
//!
//! The CLI is the only place that knows about terminal I/O, exit codes and
//! output formatting. For the overall architecture, see the crate-level
//! documentation of the `octopus` library.
//!
//! ## Settings precedence
//!
//! Connection settings come from three places, later ones winning:
//!
//! 1. `cli_config.json` in the config directory (`octopus config <key> <value>`)
//! 2. `OCTOPUS_*` environment variables
//! 3. Command-line flags (`--space`, `--no-prompt`)
//!
//! ## Prompting
//!
//! When no space is given, commands that need one ask for it, but only if
//! stdin and stdout are terminals and `--no-prompt` is not in effect.
//! Otherwise they fail straight away, before any space is listed.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. The default level is `warn`;
//! `--verbose` turns on `debug` for this crate and `RUST_LOG` overrides both.
//!
//! ## Module Structure
//!
//! - `commands`: Context setup and per-command handlers
//! - `print`: Output formatting (lists, colors, messages)
//! - `setup`: Argument parsing via clap

mod commands;
mod print;
pub mod setup;

pub use commands::run;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. Safe to call more than once.
pub(crate) fn init_logging(verbose: bool) {
    let default_directive = if verbose { "warn,octopus=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
