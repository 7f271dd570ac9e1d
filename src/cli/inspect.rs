//! Inspect command: show what the extractor and remapper see, writing nothing.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::models::{BlockKind, KeyGrid, Layer, Placement, Profile};
use crate::parser::{self, ShortLayers};
use crate::transform::{self, MatrixTransform};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Show the blocks and layers of a keymap.c without converting it
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// keymap.c to inspect (default from config)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Only show the layer with this name
    #[arg(long, value_name = "NAME")]
    pub layer: Option<String>,

    /// Profile whose remapping to show: vial or plain
    #[arg(long, value_name = "PROFILE")]
    pub profile: Option<Profile>,

    /// Handling of 47-key layers: reject or duplicate-spacebar
    #[arg(long, value_name = "POLICY")]
    pub short_layers: Option<ShortLayers>,

    /// Config file to use instead of the default one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for inspect
#[derive(Debug, Serialize)]
struct InspectResponse {
    keymap_line: usize,
    blocks: Vec<BlockData>,
    layers: Vec<LayerData>,
}

#[derive(Debug, Serialize)]
struct BlockData {
    kind: BlockKind,
    name: String,
    line: usize,
    placement: Placement,
    defines: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LayerData {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout_macro: Option<String>,
    /// Cells holding something other than `KC_NO`
    assigned: usize,
    source: Vec<Vec<String>>,
    target: Vec<Vec<String>>,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config(self.config.as_deref())?;
        let profile = self.profile.unwrap_or(config.convert.profile);
        let short_layers = self.short_layers.unwrap_or(config.convert.short_layers);
        let input = self.input.clone().unwrap_or_else(|| config.paths.input.clone());

        let source = fs::read_to_string(&input)
            .map_err(|e| CliError::io(format!("Failed to read {}: {e}", input.display())))?;

        let document = parser::extract(&source).map_err(|e| CliError::validation(e.to_string()))?;
        let transform = transform::for_profile(profile);
        let mut layers = parser::parse_layers(&document.keymap, transform.source_shape(), short_layers)
            .map_err(|e| CliError::validation(e.to_string()))?;

        if let Some(wanted) = &self.layer {
            layers.retain(|layer| &layer.name == wanted);
            if layers.is_empty() {
                return Err(CliError::validation(format!("Layer '{wanted}' not found")));
            }
        }

        transform::remap_layers(transform.as_ref(), &mut layers)
            .map_err(|e| CliError::validation(e.to_string()))?;

        if self.json {
            let response = InspectResponse {
                keymap_line: document.keymap.line,
                blocks: document
                    .blocks
                    .iter()
                    .map(|block| BlockData {
                        kind: block.kind,
                        name: block.name.clone(),
                        line: block.line,
                        placement: block.placement,
                        defines: block.defines.clone(),
                    })
                    .collect(),
                layers: layers.iter().map(layer_data).collect(),
            };
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
            println!("{json}");
            return Ok(());
        }

        println!("Blocks ({}):", document.blocks.len());
        for block in &document.blocks {
            println!("  {:>5}  {:<12} {}", block.line, block.kind.to_string(), block.name);
        }
        println!();
        println!("Keymap array at line {}", document.keymap.line);

        for layer in &layers {
            println!();
            print_layer(layer, transform.as_ref());
        }

        Ok(())
    }
}

fn grid_strings(grid: &KeyGrid) -> Vec<Vec<String>> {
    grid.rows()
        .iter()
        .map(|row| row.iter().map(|key| key.as_str().to_string()).collect())
        .collect()
}

fn assigned_keys(grid: &KeyGrid) -> usize {
    grid.cells().filter(|(_, key)| !key.is_placeholder()).count()
}

fn layer_data(layer: &Layer) -> LayerData {
    LayerData {
        name: layer.name.clone(),
        layout_macro: layer.layout_macro.clone(),
        assigned: assigned_keys(&layer.source),
        source: grid_strings(&layer.source),
        target: layer.target.as_ref().map(grid_strings).unwrap_or_default(),
    }
}

fn print_layer(layer: &Layer, transform: &dyn MatrixTransform) {
    println!("Layer {} ({} keys assigned)", layer.name, assigned_keys(&layer.source));
    println!("  Source ({}):", transform.source_shape());
    for row in layer.source.rows() {
        let keys: Vec<&str> = row.iter().map(|key| key.as_str()).collect();
        println!("    {}", keys.join(", "));
    }
    if let Some(target) = &layer.target {
        println!("  Target ({}, {}):", transform.target_shape(), transform.name());
        for (idx, row) in target.rows().iter().enumerate() {
            let keys: Vec<&str> = row.iter().map(|key| key.as_str()).collect();
            println!("    {:<4} {}", transform.row_label(idx), keys.join(", "));
        }
    }
}
