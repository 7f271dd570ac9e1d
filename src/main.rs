//! Oryx to OLKB Converter - command-line entry point.
//!
//! Converts a ZSA Oryx Planck `keymap.c` into OLKB Planck rev6 (Vial)
//! firmware sources.

use clap::{Parser, Subcommand};
use oryx2olkb::cli::{CliError, ConfigArgs, ConvertArgs, InspectArgs};
use oryx2olkb::constants::APP_NAME;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Convert ZSA Oryx Planck keymaps into OLKB Planck rev6 firmware sources
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a keymap and write keymap.c, config.h and rules.mk
    Convert(ConvertArgs),
    /// Show extracted blocks and remapped layers without writing anything
    Inspect(InspectArgs),
    /// Manage the configuration file
    Config(ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "oryx2olkb=debug" } else { "oryx2olkb=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        Command::Convert(args) => args.execute(),
        Command::Inspect(args) => args.execute(),
        Command::Config(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError { kind, message }) => {
            eprintln!("Error: {message}");
            kind.into()
        }
    }
}
