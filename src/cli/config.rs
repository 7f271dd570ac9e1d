//! Configuration management CLI commands.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::config::Config;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Print the config file location
    Path,
    /// Write a config file with default values
    Init(ConfigInitArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Config file to show instead of the default one
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Write a default config file
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Path => {
                let path = config_path()?;
                println!("{}", path.display());
                Ok(())
            }
            ConfigCommand::Init(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config(self.config.as_deref())?;

        if self.json {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| CliError::io(format!("Failed to serialize configuration to JSON: {e}")))?;
            println!("{json}");
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigInitArgs {
    /// Execute init command
    pub fn execute(&self) -> CliResult<()> {
        let path = config_path()?;
        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        let written = Config::new()
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;
        println!("Wrote default configuration to {}", written.display());
        Ok(())
    }
}

fn config_path() -> CliResult<PathBuf> {
    Config::config_file_path().map_err(|e| CliError::io(format!("{e:#}")))
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    let uid: Vec<String> = config
        .vial
        .keyboard_uid
        .iter()
        .map(|byte| format!("0x{byte:02X}"))
        .collect();

    println!("Paths:");
    println!("  Input:          {}", config.paths.input.display());
    println!("  Output dir:     {}", config.paths.output_dir.display());
    println!();
    println!("Convert:");
    println!("  Profile:        {}", config.convert.profile);
    println!("  Short layers:   {}", config.convert.short_layers);
    println!("  Oryx fixes:     {}", config.convert.oryx_fixes);
    println!("  Timestamp:      {}", config.convert.timestamp);
    println!();
    println!("Vial:");
    println!("  Keyboard UID:   {}", uid.join(", "));
    match config.unlock_override() {
        Some(combo) => println!("  Unlock combo:   rows {:?}, cols {:?}", combo.rows(), combo.cols()),
        None => println!("  Unlock combo:   default (top corners)"),
    }
    println!();
    println!("Features:");
    println!("  Bootloader:     {}", config.features.bootloader);
    println!("  Audio:          {}", config.features.audio);
    println!("  Music:          {}", config.features.music);
    println!("  LTO:            {}", config.features.lto);
    println!("  Combo:          {}", config.features.combo);
    println!("  Key override:   {}", config.features.key_override);
}
