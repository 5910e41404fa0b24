//! # Octopus CLI Architecture
//!
//! The library is where the server access lives. The `octopus` binary is a
//! thin client of it: it parses flags, builds a [`factory::ClientFactory`],
//! asks it for a client and prints what comes back.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, loads config, renders output           │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Factory (factory.rs)                                       │
//! │  - Lazily builds and caches the system and spaced clients   │
//! │  - Resolves the space selector, prompting if allowed        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (client.rs, spaces.rs, targets.rs)                  │
//! │  - Authenticated requests against one server/space          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Transport (transport.rs)                                   │
//! │  - Abstract Transport trait                                 │
//! │  - HttpTransport (production), MockTransport (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Strategy
//!
//! Everything above the transport is tested against `test_utils::MockTransport`,
//! which replays scripted responses and records every request. Interactive
//! selection is tested through `test_utils::ScriptedAsker`, so no test needs a
//! terminal. The binary is exercised end to end in `tests/` against a small
//! in-process HTTP stub.
//!
//! ## Module Overview
//!
//! - [`factory`]: Lazy, coalescing construction of the two cached clients
//! - [`single_flight`]: The once-only initializer backing each cache slot
//! - [`client`]: The authenticated client and the server root document
//! - [`spaces`]: Space listing and selector resolution
//! - [`targets`]: Deployment target listing
//! - [`credential`]: API key and access token credentials
//! - [`prompt`]: Interactive space selection
//! - [`requester`]: Identifies the invocation asking for a client
//! - [`transport`]: HTTP abstraction
//! - [`config`]: Configuration file and environment overlay
//! - [`error`]: Error types

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod factory;
pub mod prompt;
pub mod requester;
pub mod single_flight;
pub mod spaces;
pub mod targets;
pub mod transport;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
