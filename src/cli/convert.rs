//! Convert command: Oryx `keymap.c` in, `keymap.c` / `config.h` / `rules.mk` out.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::firmware::{AppliedEdit, ConversionReport, ConversionWarning};
use crate::models::Profile;
use crate::parser::ShortLayers;
use crate::services::{ConvertOptions, Converter};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Convert an Oryx Planck keymap for the OLKB Planck rev6
#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Oryx keymap.c to convert (default from config)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Directory to write the generated files into (default from config)
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Output profile: vial or plain
    #[arg(long, value_name = "PROFILE")]
    pub profile: Option<Profile>,

    /// Handling of 47-key layers: reject or duplicate-spacebar
    #[arg(long, value_name = "POLICY")]
    pub short_layers: Option<ShortLayers>,

    /// Apply the Oryx compatibility fixes
    #[arg(long)]
    pub oryx_fixes: bool,

    /// Stamp the generated files with the conversion time
    #[arg(long)]
    pub timestamp: bool,

    /// Config file to use instead of the default one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero, write nothing)
    #[arg(long)]
    pub strict: bool,
}

/// JSON response for a conversion
#[derive(Debug, Serialize)]
struct ConvertResponse {
    success: bool,
    input: String,
    output_dir: String,
    profile: Profile,
    layers: Vec<String>,
    files: Vec<String>,
    warnings: Vec<ConversionWarning>,
    edits: Vec<AppliedEdit>,
}

impl ConvertArgs {
    /// Execute the convert command
    pub fn execute(&self) -> CliResult<()> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(profile) = self.profile {
            config.convert.profile = profile;
        }
        if let Some(policy) = self.short_layers {
            config.convert.short_layers = policy;
        }
        config.convert.oryx_fixes |= self.oryx_fixes;
        config.convert.timestamp |= self.timestamp;

        let input = self.input.clone().unwrap_or_else(|| config.paths.input.clone());
        let out_dir = self.out_dir.clone().unwrap_or_else(|| config.paths.output_dir.clone());

        let source = fs::read_to_string(&input)
            .map_err(|e| CliError::io(format!("Failed to read {}: {e}", input.display())))?;

        let mut options = ConvertOptions::from_config(&config);
        if config.convert.timestamp {
            options.timestamp = Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        }

        let conversion = Converter::new(options)
            .convert(&source)
            .map_err(|e| CliError::validation(format!("Conversion failed: {e}")))?;

        let layers: Vec<String> = conversion.layers.iter().map(|layer| layer.name.clone()).collect();

        if self.strict && !conversion.report.is_clean() {
            if self.json {
                print_json(&ConvertResponse {
                    success: false,
                    input: input.display().to_string(),
                    output_dir: out_dir.display().to_string(),
                    profile: config.convert.profile,
                    layers,
                    files: Vec::new(),
                    warnings: conversion.report.warnings.clone(),
                    edits: conversion.report.edits.clone(),
                })?;
            } else {
                eprint!("{}", conversion.report.format_message());
            }
            return Err(CliError::validation(format!(
                "{} warnings with --strict; no files written",
                conversion.report.warnings.len()
            )));
        }

        let written = conversion
            .bundle()
            .write_all(&out_dir)
            .map_err(|e| CliError::io(format!("Failed to write output: {e:#}")))?;

        if self.json {
            print_json(&ConvertResponse {
                success: true,
                input: input.display().to_string(),
                output_dir: out_dir.display().to_string(),
                profile: config.convert.profile,
                layers,
                files: written.iter().map(|path| path.display().to_string()).collect(),
                warnings: conversion.report.warnings,
                edits: conversion.report.edits,
            })?;
        } else {
            print_summary(&conversion.report, &layers, &written);
        }

        Ok(())
    }
}

fn print_json(response: &ConvertResponse) -> CliResult<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

fn print_summary(report: &ConversionReport, layers: &[String], written: &[PathBuf]) {
    println!("Converted {} layers: {}", layers.len(), layers.join(", "));
    for path in written {
        println!("  wrote {}", path.display());
    }
    let details = report.format_message();
    if !details.is_empty() {
        println!();
        print!("{details}");
    }
}
