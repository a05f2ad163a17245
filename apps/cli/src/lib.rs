//! # Cave Fire CLI
//!
//! Offline pricing, export and parity checks against the proposals API.
//!
//! ## Modules
//! - [`args`]: clap definitions
//! - [`commands`]: `totals`, `compose`, `export`, `compare`
//! - [`remote`]: client for `POST /api/compose`

pub mod args;
pub mod commands;
pub mod remote;

pub use args::{Cli, Command};
pub use commands::{Artifact, Pricing};
pub use remote::{Comparison, FieldDiff, RemoteComposer, RemoteError};

/// Exit code when `export` produced a missing or empty artifact.
pub const EXIT_ARTIFACT_MISSING: u8 = 2;

/// Exit code when `compare` found differing totals.
pub const EXIT_MISMATCH: u8 = 1;
