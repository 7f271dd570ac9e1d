//! Parsing of the `keymaps` array literal into layers.
//!
//! Accepted layer forms:
//!
//! - `[NAME] = LAYOUT_xxx(k, k, ...)` (Oryx export)
//! - `[NAME] = { {k, ...}, {k, ...} }` (explicit rows)
//! - `[NAME] = { k, k, ... }` (flat braces)
//! - any of the above without a `[NAME] =` designator (named by position)
//!
//! Flat lists are chunked into rows of the source width.

use crate::error::ConvertError;
use crate::models::{KeyGrid, KeymapConstruct, Layer, LogicalKey, Shape};
use crate::parser::scan::{find_top_level, is_ident_char, matching_close, split_top_level, strip_comments};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a flat layer that is exactly one key short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortLayers {
    /// Leave the layer short; the remapper rejects it
    #[default]
    Reject,
    /// Treat the missing key as the right half of a 2u spacebar and repeat
    /// the left half
    DuplicateSpacebar,
}

impl fmt::Display for ShortLayers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::DuplicateSpacebar => f.write_str("duplicate-spacebar"),
        }
    }
}

impl std::str::FromStr for ShortLayers {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "duplicate-spacebar" => Ok(Self::DuplicateSpacebar),
            other => Err(format!(
                "Unknown short-layer policy '{other}' (expected reject or duplicate-spacebar)"
            )),
        }
    }
}

/// Splits the keymap array into layers, in source order.
///
/// `shape` is the source grid shape; flat key lists are chunked by its
/// column count. The grids are not shape-checked here.
pub fn parse_layers(
    keymap: &KeymapConstruct,
    shape: Shape,
    short_layers: ShortLayers,
) -> Result<Vec<Layer>, ConvertError> {
    let malformed = |message: String| ConvertError::malformed(message, Some(keymap.line));

    let code = strip_comments(&keymap.text);
    let eq = find_top_level(&code, b'=')
        .ok_or_else(|| malformed("keymaps definition has no initializer".to_string()))?;
    let open = code[eq..]
        .find('{')
        .map(|off| eq + off)
        .ok_or_else(|| malformed("keymaps initializer is not a brace list".to_string()))?;
    let close = matching_close(&code, open).map_err(|msg| malformed(msg.to_string()))?;

    let mut layers = Vec::new();
    for (index, entry) in split_top_level(&code[open + 1..close], b',').into_iter().enumerate() {
        let (name, value) = split_designator(entry, index).map_err(malformed)?;
        let layer = parse_layer_value(&name, value, shape, short_layers).map_err(malformed)?;
        layers.push(layer);
    }
    if layers.is_empty() {
        return Err(malformed("keymaps array defines no layers".to_string()));
    }

    tracing::debug!(layers = layers.len(), "Parsed keymap layers");
    Ok(layers)
}

fn split_designator(entry: &str, index: usize) -> Result<(String, &str), String> {
    let Some(designated) = entry.strip_prefix('[') else {
        return Ok((index.to_string(), entry));
    };
    let close = designated
        .find(']')
        .ok_or_else(|| format!("layer entry {index} has an unterminated designator"))?;
    let name = designated[..close].trim().to_string();
    let value = designated[close + 1..]
        .trim_start()
        .strip_prefix('=')
        .ok_or_else(|| format!("layer [{name}] is missing '='"))?
        .trim();
    Ok((name, value))
}

fn parse_layer_value(
    name: &str,
    value: &str,
    shape: Shape,
    short_layers: ShortLayers,
) -> Result<Layer, String> {
    if value.starts_with('{') {
        let inner = braced_inner(value).ok_or_else(|| format!("layer [{name}] has unbalanced braces"))?;
        if inner.trim_start().starts_with('{') {
            let rows = split_top_level(inner, b',')
                .into_iter()
                .map(|row| {
                    braced_inner(row)
                        .map(|cells| split_top_level(cells, b',').into_iter().map(LogicalKey::new).collect())
                        .ok_or_else(|| format!("layer [{name}] mixes rows and bare keys"))
                })
                .collect::<Result<Vec<Vec<LogicalKey>>, String>>()?;
            return Ok(Layer::new(name, KeyGrid::from_rows(rows)));
        }
        let keys = flat_keys(inner, shape, short_layers, name);
        return Ok(Layer::new(name, KeyGrid::from_flat(keys, shape.cols)));
    }

    let macro_len = value.bytes().take_while(|b| is_ident_char(*b)).count();
    let macro_name = &value[..macro_len];
    let args = value[macro_len..].trim_start();
    if macro_name.is_empty() || !args.starts_with('(') {
        return Err(format!("layer [{name}] is neither a brace list nor a layout macro call"));
    }
    let close = matching_close(args, 0).map_err(|msg| format!("layer [{name}]: {msg}"))?;
    let keys = flat_keys(&args[1..close], shape, short_layers, name);
    Ok(Layer::new(name, KeyGrid::from_flat(keys, shape.cols)).with_layout_macro(macro_name))
}

fn braced_inner(text: &str) -> Option<&str> {
    let text = text.trim();
    if !text.starts_with('{') {
        return None;
    }
    let close = matching_close(text, 0).ok()?;
    Some(&text[1..close])
}

fn flat_keys(list: &str, shape: Shape, short_layers: ShortLayers, name: &str) -> Vec<LogicalKey> {
    let mut keys: Vec<LogicalKey> = split_top_level(list, b',').into_iter().map(LogicalKey::new).collect();

    if short_layers == ShortLayers::DuplicateSpacebar && shape.rows > 0 && keys.len() + 1 == shape.cells() {
        // Left half of the bottom-row spacebar; the right half is missing.
        let spacebar = (shape.rows - 1) * shape.cols + shape.cols / 2 - 1;
        let key = keys[spacebar].clone();
        tracing::info!(layer = name, key = %key, "Duplicating spacebar key to fill short layer");
        keys.insert(spacebar, key);
    }
    keys
}
