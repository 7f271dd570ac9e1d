//! CLI command handlers.
//!
//! Each subcommand is an `*Args` struct whose `execute()` returns a
//! [`CliResult`]; `main` maps failures to exit codes.

pub mod common;
pub mod config;
pub mod convert;
pub mod inspect;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use convert::ConvertArgs;
pub use inspect::InspectArgs;
