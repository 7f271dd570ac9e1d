//! Configuration management for the converter.
//!
//! This module handles loading, validating, and saving the converter's
//! defaults in TOML format with platform-specific directory resolution.
//! Command-line flags override whatever is loaded here.

use crate::constants::{APP_BINARY_NAME, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};
use crate::firmware::templates::{FeatureFlags, DEFAULT_KEYBOARD_UID};
use crate::models::{MatrixCoord, Profile, Shape, UnlockCombo};
use crate::parser::ShortLayers;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that replaces the platform config directory.
pub const CONFIG_DIR_ENV: &str = "ORYX2OLKB_CONFIG_DIR";

/// Target matrix the unlock overrides are checked against.
const VIAL_MATRIX: Shape = Shape::new(8, 6);

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Oryx `keymap.c` to convert
    pub input: PathBuf,
    /// Directory receiving `keymap.c`, `config.h` and `rules.mk`
    pub output_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Conversion behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Output profile
    pub profile: Profile,
    /// Handling of 47-key layers
    pub short_layers: ShortLayers,
    /// Apply the Oryx compatibility fixes
    pub oryx_fixes: bool,
    /// Stamp generated files with the conversion time
    pub timestamp: bool,
}

/// Vial identity and unlock settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VialConfig {
    /// `VIAL_KEYBOARD_UID`
    pub keyboard_uid: [u8; 8],
    /// Unlock combo rows in matrix coordinates (defaults to the folded corners)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_rows: Option<Vec<u8>>,
    /// Unlock combo columns, paired with `unlock_rows`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_cols: Option<Vec<u8>>,
}

impl Default for VialConfig {
    fn default() -> Self {
        Self {
            keyboard_uid: DEFAULT_KEYBOARD_UID,
            unlock_rows: None,
            unlock_cols: None,
        }
    }
}

/// Converter configuration.
///
/// Validation rules:
/// - `unlock_rows` and `unlock_cols` are set together, with the same
///   non-zero length
/// - every unlock position lies inside the 8×6 matrix
/// - `bootloader` is not empty
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File system paths
    pub paths: PathConfig,
    /// Conversion settings
    pub convert: ConvertConfig,
    /// Vial settings
    pub vial: VialConfig,
    /// `rules.mk` feature switches
    pub features: FeatureFlags,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/oryx2olkb/`
    /// - macOS: `~/Library/Application Support/oryx2olkb/`
    /// - Windows: `%APPDATA%\oryx2olkb\`
    ///
    /// `ORYX2OLKB_CONFIG_DIR` takes precedence when set.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_BINARY_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }
        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .context(format!("Invalid config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        let config_path = Self::config_file_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.features.bootloader.trim().is_empty() {
            anyhow::bail!("features.bootloader must not be empty");
        }

        match (&self.vial.unlock_rows, &self.vial.unlock_cols) {
            (None, None) => {}
            (Some(rows), Some(cols)) => {
                if rows.is_empty() || rows.len() != cols.len() {
                    anyhow::bail!(
                        "vial.unlock_rows and vial.unlock_cols must be non-empty and the same length (got {} and {})",
                        rows.len(),
                        cols.len()
                    );
                }
                for (row, col) in rows.iter().zip(cols) {
                    if usize::from(*row) >= VIAL_MATRIX.rows || usize::from(*col) >= VIAL_MATRIX.cols {
                        anyhow::bail!(
                            "Unlock key ({row}, {col}) is outside the {VIAL_MATRIX} matrix"
                        );
                    }
                }
            }
            _ => anyhow::bail!("vial.unlock_rows and vial.unlock_cols must be set together"),
        }

        Ok(())
    }

    /// The configured unlock combo, when it overrides the default corners.
    #[must_use]
    pub fn unlock_override(&self) -> Option<UnlockCombo> {
        let rows = self.vial.unlock_rows.as_ref()?;
        let cols = self.vial.unlock_cols.as_ref()?;
        Some(UnlockCombo::new(
            rows.iter()
                .zip(cols)
                .map(|(row, col)| MatrixCoord::new(*row, *col))
                .collect(),
        ))
    }
}
