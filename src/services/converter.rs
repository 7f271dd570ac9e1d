//! The conversion pipeline.
//!
//! [`Converter::convert`] runs extract → parse → remap → render →
//! (patch) → reassemble, then fills the templates. It touches neither the
//! file system nor the clock; the CLI supplies the timestamp and writes
//! the resulting [`OutputBundle`].

use crate::config::Config;
use crate::constants::OUTPUT_FILES;
use crate::error::ConvertError;
use crate::firmware::templates::{FeatureFlags, TemplateConfig, TemplateEmitter, DEFAULT_KEYBOARD_UID};
use crate::firmware::{patches, ConversionReport, KeymapRenderer, OutputBundle, Reassembler, RenderStyle};
use crate::models::{Layer, Profile, SourceDocument, UnlockCombo};
use crate::parser::{self, ShortLayers};
use crate::transform;

/// Layout macro used by the plain profile.
pub const PLANCK_GRID_MACRO: &str = "LAYOUT_planck_grid";

/// Everything that influences a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Target profile
    pub profile: Profile,
    /// Handling of one-key-short layers
    pub short_layers: ShortLayers,
    /// Apply the Oryx compatibility fixes
    pub oryx_fixes: bool,
    /// `VIAL_KEYBOARD_UID`
    pub keyboard_uid: [u8; 8],
    /// Unlock combo to use instead of the transform's corners
    pub unlock: Option<UnlockCombo>,
    /// `rules.mk` switches
    pub features: FeatureFlags,
    /// Stamp for the generated banners
    pub timestamp: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            short_layers: ShortLayers::default(),
            oryx_fixes: false,
            keyboard_uid: DEFAULT_KEYBOARD_UID,
            unlock: None,
            features: FeatureFlags::default(),
            timestamp: None,
        }
    }
}

impl ConvertOptions {
    /// Options taken from a loaded config. The timestamp is left unset.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            profile: config.convert.profile,
            short_layers: config.convert.short_layers,
            oryx_fixes: config.convert.oryx_fixes,
            keyboard_uid: config.vial.keyboard_uid,
            unlock: config.unlock_override(),
            features: config.features.clone(),
            timestamp: None,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Generated `keymap.c`
    pub keymap_c: String,
    /// Generated `config.h`
    pub config_h: String,
    /// Generated `rules.mk`
    pub rules_mk: String,
    /// Warnings and edits
    pub report: ConversionReport,
    /// Layers with their source and target grids
    pub layers: Vec<Layer>,
    /// The extracted input
    pub document: SourceDocument,
}

impl Conversion {
    /// The three output files, ready to write.
    #[must_use]
    pub fn bundle(&self) -> OutputBundle {
        let [keymap, config, rules] = OUTPUT_FILES;
        OutputBundle::new()
            .with_file(keymap, self.keymap_c.clone())
            .with_file(config, self.config_h.clone())
            .with_file(rules, self.rules_mk.clone())
    }
}

/// Runs conversions with fixed options.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Creates a converter.
    #[must_use]
    pub const fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Converts one `keymap.c` source.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MalformedInput`] when the source cannot be
    /// split into constructs or has no keymap array, and
    /// [`ConvertError::ShapeMismatch`] when a layer is not 4×12.
    pub fn convert(&self, source: &str) -> Result<Conversion, ConvertError> {
        let options = &self.options;
        let transform = transform::for_profile(options.profile);

        let document = parser::extract(source)?;
        tracing::info!(blocks = document.blocks.len(), "Extracted source constructs");

        let mut layers = parser::parse_layers(&document.keymap, transform.source_shape(), options.short_layers)?;
        transform::remap_layers(transform.as_ref(), &mut layers)?;
        tracing::info!(layers = layers.len(), strategy = transform.name(), "Remapped layers");

        let style = match options.profile {
            Profile::Vial => RenderStyle::Matrix,
            Profile::Plain => RenderStyle::LayoutMacro(PLANCK_GRID_MACRO.to_string()),
        };
        let renderer = KeymapRenderer::new(transform.as_ref(), style);
        let keymap = renderer.render(
            layers
                .iter()
                .filter_map(|layer| layer.target.as_ref().map(|grid| (layer.name.as_str(), grid))),
        );

        let mut report = ConversionReport::new();
        let mut blocks = document.blocks.clone();
        if options.oryx_fixes {
            patches::apply(&mut blocks, options.profile, &mut report);
        }

        let mut reassembler = Reassembler::new(options.profile);
        if let Some(stamp) = &options.timestamp {
            reassembler = reassembler.with_timestamp(stamp.clone());
        }
        let keymap_c = reassembler.assemble(&document, &blocks, &keymap, &layers, &mut report);

        let templates = TemplateConfig {
            profile: options.profile,
            keyboard_uid: options.keyboard_uid,
            unlock: options
                .unlock
                .clone()
                .unwrap_or_else(|| transform::unlock_combo(transform.as_ref())),
            features: options.features.clone(),
            generated_at: options.timestamp.clone(),
        };
        let emitter = TemplateEmitter::new(&templates);

        if !report.is_clean() {
            tracing::warn!(warnings = report.warnings.len(), "Conversion finished with warnings");
        }

        Ok(Conversion {
            keymap_c,
            config_h: emitter.config_h(),
            rules_mk: emitter.rules_mk(),
            report,
            layers,
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firmware::WarningKind;
    use crate::models::Coord;

    fn oryx_source(layers: &[(&str, Vec<String>)]) -> String {
        let mut src = String::from("#include QMK_KEYBOARD_H\n#include \"version.h\"\n\nenum planck_layers {\n");
        for (name, _) in layers {
            src.push_str(&format!("  {name},\n"));
        }
        src.push_str("};\n\nconst uint16_t PROGMEM keymaps[][MATRIX_ROWS][MATRIX_COLS] = {\n");
        for (name, keys) in layers {
            src.push_str(&format!("  [{name}] = LAYOUT_planck_grid(\n    {}\n  ),\n", keys.join(", ")));
        }
        src.push_str("};\n\nuint32_t layer_state_set_user(uint32_t state) {\n  return state;\n}\n");
        src
    }

    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("KC_{i}")).collect()
    }

    #[test]
    fn test_convert_vial() {
        let source = oryx_source(&[("_BASE", numbered(48)), ("_LOWER", numbered(48))]);
        let conversion = Converter::default().convert(&source).unwrap();

        assert_eq!(conversion.layers.len(), 2);
        let target = conversion.layers[0].target.as_ref().unwrap();
        assert_eq!(target.get(Coord::new(5, 2)).unwrap().as_str(), "KC_20");
        assert!(conversion.keymap_c.contains("    [_BASE] = { // Converted from _BASE\n"));
        assert!(conversion.keymap_c.contains("#include \"version.h\""));
        assert!(conversion.config_h.contains("#define VIAL_UNLOCK_COMBO_ROWS { 0, 4 }"));
        assert!(conversion.config_h.contains("#define VIAL_UNLOCK_COMBO_COLS { 0, 5 }"));
        assert!(conversion.rules_mk.contains("VIAL_ENABLE = yes"));
        assert!(conversion.report.edits.is_empty());
    }

    #[test]
    fn test_convert_plain_with_fixes() {
        let source = oryx_source(&[("_BASE", numbered(48))]);
        let converter = Converter::new(ConvertOptions {
            profile: Profile::Plain,
            oryx_fixes: true,
            ..ConvertOptions::default()
        });
        let conversion = converter.convert(&source).unwrap();

        assert!(conversion.keymap_c.contains("    [_BASE] = LAYOUT_planck_grid(\n"));
        assert!(conversion.keymap_c.contains("// #include \"version.h\""));
        assert!(conversion
            .keymap_c
            .contains("layer_state_t layer_state_set_user(layer_state_t state)"));
        assert!(!conversion.config_h.contains("VIAL"));
        assert_eq!(conversion.report.edits.len(), 2);
    }

    #[test]
    fn test_short_layer_policy() {
        let source = oryx_source(&[("_BASE", numbered(47))]);

        let err = Converter::default().convert(&source).unwrap_err();
        assert!(matches!(err, ConvertError::ShapeMismatch { ref layer, .. } if layer == "_BASE"));

        let converter = Converter::new(ConvertOptions {
            short_layers: ShortLayers::DuplicateSpacebar,
            ..ConvertOptions::default()
        });
        let conversion = converter.convert(&source).unwrap();
        let source_grid = &conversion.layers[0].source;
        assert_eq!(source_grid.get(Coord::new(3, 5)).unwrap().as_str(), "KC_41");
        assert_eq!(source_grid.get(Coord::new(3, 6)).unwrap().as_str(), "KC_41");
        assert_eq!(source_grid.get(Coord::new(3, 11)).unwrap().as_str(), "KC_46");
    }

    #[test]
    fn test_unlock_override_and_timestamp() {
        let source = oryx_source(&[("_BASE", numbered(48))]);
        let mut config = Config::new();
        config.vial.unlock_rows = Some(vec![3, 7]);
        config.vial.unlock_cols = Some(vec![0, 5]);
        let mut options = ConvertOptions::from_config(&config);
        options.timestamp = Some("2026-01-01 00:00:00".to_string());

        let conversion = Converter::new(options).convert(&source).unwrap();
        assert!(conversion.config_h.contains("#define VIAL_UNLOCK_COMBO_ROWS { 3, 7 }"));
        assert!(conversion.keymap_c.contains("// Generated at 2026-01-01 00:00:00\n"));
        assert!(conversion.rules_mk.contains("# Generated at 2026-01-01 00:00:00\n"));
    }

    #[test]
    fn test_layer_out_of_range_is_reported() {
        let mut keys = numbered(48);
        keys[0] = "MO(4)".to_string();
        let source = oryx_source(&[("_BASE", keys)]);
        let conversion = Converter::default().convert(&source).unwrap();
        assert_eq!(conversion.report.warnings_of(WarningKind::LayerOutOfRange).count(), 1);
    }

    #[test]
    fn test_bundle_file_names() {
        let source = oryx_source(&[("_BASE", numbered(48))]);
        let conversion = Converter::default().convert(&source).unwrap();
        let bundle = conversion.bundle();
        let names: Vec<&str> = bundle.files.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["keymap.c", "config.h", "rules.mk"]);
        assert_eq!(bundle.get("keymap.c"), Some(conversion.keymap_c.as_str()));
    }
}
