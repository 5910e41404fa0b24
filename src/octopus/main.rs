//! # Octopus CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/octopus/cli/`, and
//! this file only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/octopus/cli/)                               │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Config loading + factory wiring + dispatch (commands.rs) │
//! │  - Terminal rendering (print.rs)                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Library (src/octopus/lib.rs)                               │
//! │  - ClientFactory, RemoteClient, spaces, targets             │
//! │  - No knowledge of stdout/stderr or process exits           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors bubble up to `main` as [`octopus::error::OctoError`] and are printed
//! once, prefixed with `Error:`, before exiting with status 1.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
