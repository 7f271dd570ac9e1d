//! Name and layer reference checks over a parsed keymap source.
//!
//! These checks never fail a conversion; they produce
//! [`ConversionWarning`]s for the report:
//!
//! - layer keycodes (`MO(n)`, `LT(n, kc)`, ...) that point past the last layer
//! - identifiers in key cells or table initializers that nothing defines
//! - names defined twice with different text

use crate::firmware::report::{ConversionWarning, WarningKind};
use crate::models::{AuxiliaryBlock, BlockKind, Layer};
use crate::parser::scan::{find_top_level, identifiers, strip_comments};
use std::collections::{HashMap, HashSet};

/// How a layer keycode activates its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRefKind {
    /// Momentary layer switch while held - MO(n)
    Momentary,
    /// Layer tap - tap for key, hold for layer - LT(n, key)
    TapHold,
    /// Toggle layer on/off - TG(n)
    Toggle,
    /// One-shot layer (next key only) - OSL(n)
    OneShot,
    /// Switch to layer - TO(n)
    SwitchTo,
    /// Tap toggle - TT(n)
    TapToggle,
    /// Set default layer - DF(n)
    DefaultSet,
    /// Layer with modifier - LM(n, mod)
    LayerMod,
}

impl LayerRefKind {
    /// Keycode macro name.
    #[must_use]
    pub const fn macro_name(self) -> &'static str {
        match self {
            Self::Momentary => "MO",
            Self::TapHold => "LT",
            Self::Toggle => "TG",
            Self::OneShot => "OSL",
            Self::SwitchTo => "TO",
            Self::TapToggle => "TT",
            Self::DefaultSet => "DF",
            Self::LayerMod => "LM",
        }
    }
}

/// Parse a keycode to extract a numeric layer reference.
///
/// Returns `None` for non-layer keycodes, symbolic layer names
/// (`MO(_LOWER)`) and malformed patterns.
///
/// # Examples
/// ```
/// use oryx2olkb::services::references::{parse_layer_keycode, LayerRefKind};
///
/// assert_eq!(parse_layer_keycode("MO(1)"), Some((1, LayerRefKind::Momentary)));
/// assert_eq!(parse_layer_keycode("LT(5, KC_D)"), Some((5, LayerRefKind::TapHold)));
/// assert_eq!(parse_layer_keycode("KC_A"), None);
/// ```
#[must_use]
pub fn parse_layer_keycode(keycode: &str) -> Option<(usize, LayerRefKind)> {
    let (name, args) = keycode.split_once('(')?;
    let args = args.strip_suffix(')')?;
    let kind = match name.trim() {
        "MO" => LayerRefKind::Momentary,
        "TG" => LayerRefKind::Toggle,
        "TO" => LayerRefKind::SwitchTo,
        "TT" => LayerRefKind::TapToggle,
        "OSL" => LayerRefKind::OneShot,
        "DF" => LayerRefKind::DefaultSet,
        "LT" => LayerRefKind::TapHold,
        "LM" => LayerRefKind::LayerMod,
        _ => return None,
    };

    // LT and LM carry a second argument; the rest take only the layer
    let layer_part = match kind {
        LayerRefKind::TapHold | LayerRefKind::LayerMod => args.split_once(',')?.0,
        _ => args,
    };
    let layer = layer_part.trim().parse::<usize>().ok()?;
    Some((layer, kind))
}

/// Layer keycodes in key cells whose index is past the last layer.
#[must_use]
pub fn check_layer_refs(layers: &[Layer]) -> Vec<ConversionWarning> {
    let mut warnings = Vec::new();
    for layer in layers {
        for (coord, key) in layer.source.cells() {
            let Some((target, _)) = parse_layer_keycode(key.as_str()) else {
                continue;
            };
            if target >= layers.len() {
                warnings.push(
                    ConversionWarning::new(
                        WarningKind::LayerOutOfRange,
                        key.as_str(),
                        format!(
                            "{} at {} targets layer {} but only {} layers exist",
                            key,
                            coord,
                            target,
                            layers.len()
                        ),
                    )
                    .in_block(format!("layer {}", layer.name)),
                );
            }
        }
    }
    warnings
}

const BUILTIN_PREFIXES: &[&str] = &[
    "KC_", "QK_", "MOD_", "RGB_", "RM_", "UG_", "AU_", "MU_", "MS_", "BL_", "CK_", "MI_", "DM_",
    "DT_", "SH_", "MAGIC_", "CM_", "AC_", "HF_", "LED_", "ACTION_", "SS_", "X_", "UC_", "QMK_",
    "MATRIX_", "COMBO_", "ko_", "LAYOUT", "TAPPING_", "RGBLIGHT_",
];

const BUILTIN_SUFFIXES: &[&str] = &["_t", "_T", "_SOUND", "_SONG"];

const BUILTIN_NAMES: &[&str] = &[
    // Keycode functions
    "TD", "MO", "TG", "TO", "TT", "OSL", "OSM", "DF", "PDF", "LT", "LM", "MT", "C", "S", "A", "G",
    "LCTL", "LSFT", "LALT", "LGUI", "LCMD", "LWIN", "LOPT", "RCTL", "RSFT", "RALT", "RGUI", "RCMD",
    "RWIN", "ROPT", "LCA", "LSA", "LSG", "LAG", "LCG", "LSAG", "LCAG", "RCS", "RSA", "RSG", "RAG",
    "RCG", "RSAG", "RCAG", "MEH", "HYPR", "SGUI", "UC", "UM", "UP", "X", "XP", "COMBO", "SONG",
    // Placeholders and ranges
    "XXXXXXX", "_______", "SAFE_RANGE", "NULL", "PROGMEM",
    // C
    "true", "false", "sizeof", "const", "static", "void", "int", "char", "unsigned", "signed",
    "long", "short", "float", "double", "bool", "struct", "union", "enum",
];

/// True for identifiers the firmware headers or C itself provide.
#[must_use]
pub fn is_builtin(ident: &str) -> bool {
    BUILTIN_NAMES.contains(&ident)
        || BUILTIN_PREFIXES.iter().any(|prefix| ident.starts_with(prefix))
        || BUILTIN_SUFFIXES.iter().any(|suffix| ident.ends_with(suffix))
}

/// Every name some block makes available.
#[must_use]
pub fn defined_names<'a>(blocks: impl IntoIterator<Item = &'a AuxiliaryBlock>) -> HashSet<String> {
    blocks
        .into_iter()
        .flat_map(|block| block.defines.iter().cloned())
        .collect()
}

/// Identifiers in key cells and table or variable initializers that are
/// neither defined by a block nor built in. Each name is reported once.
#[must_use]
pub fn check_dangling(
    layers: &[Layer],
    blocks: &[&AuxiliaryBlock],
    defined: &HashSet<String>,
) -> Vec<ConversionWarning> {
    let mut reported: HashSet<String> = HashSet::new();
    let mut warnings = Vec::new();
    let mut report = |ident: &str, location: String| {
        if defined.contains(ident) || is_builtin(ident) || !reported.insert(ident.to_string()) {
            return;
        }
        warnings.push(
            ConversionWarning::new(
                WarningKind::DanglingReference,
                ident,
                format!("{ident} is used in {location} but never defined"),
            )
            .in_block(location),
        );
    };

    for layer in layers {
        for (_, key) in layer.source.cells() {
            for ident in identifiers(key.as_str()) {
                report(ident, format!("layer {}", layer.name));
            }
        }
    }

    for block in blocks {
        if !matches!(block.kind, BlockKind::Table | BlockKind::Variable) {
            continue;
        }
        let code = strip_comments(block.body());
        let Some(eq) = find_top_level(&code, b'=') else {
            continue;
        };
        for ident in identifiers(&code[eq + 1..]) {
            report(ident, block.name.clone());
        }
    }

    warnings
}

/// Names defined by two blocks whose text differs. Prototypes and `extern`
/// declarations only declare, so they never count.
#[must_use]
pub fn check_duplicates(blocks: &[&AuxiliaryBlock]) -> Vec<ConversionWarning> {
    let mut first_seen: HashMap<&str, &AuxiliaryBlock> = HashMap::new();
    let mut warnings = Vec::new();

    for &block in blocks {
        if is_declaration_only(block) {
            continue;
        }
        for name in &block.defines {
            match first_seen.get(name.as_str()) {
                None => {
                    first_seen.insert(name.as_str(), block);
                }
                Some(first) if first.body().trim() != block.body().trim() => {
                    warnings.push(
                        ConversionWarning::new(
                            WarningKind::DuplicateDefinition,
                            name.as_str(),
                            format!(
                                "{} is defined at line {} and again at line {}",
                                name, first.line, block.line
                            ),
                        )
                        .in_block(block.name.clone()),
                    );
                }
                Some(_) => {}
            }
        }
    }

    warnings
}

fn is_declaration_only(block: &AuxiliaryBlock) -> bool {
    block.kind == BlockKind::Prototype
        || (block.kind == BlockKind::Variable && block.body().trim_start().starts_with("extern"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeyGrid, LogicalKey, Placement};

    fn block(name: &str, kind: BlockKind, text: &str, defines: &[&str]) -> AuxiliaryBlock {
        AuxiliaryBlock {
            name: name.to_string(),
            kind,
            text: text.to_string(),
            body_offset: 0,
            line: 1,
            placement: Placement::AfterKeymap,
            defines: defines.iter().map(|d| (*d).to_string()).collect(),
        }
    }

    fn layer(name: &str, keys: &[&str]) -> Layer {
        let keys = keys.iter().map(|k| LogicalKey::new(k)).collect();
        Layer::new(name, KeyGrid::from_flat(keys, 12))
    }

    #[test]
    fn test_parse_layer_keycode_simple() {
        assert_eq!(parse_layer_keycode("MO(1)"), Some((1, LayerRefKind::Momentary)));
        assert_eq!(parse_layer_keycode("TG(2)"), Some((2, LayerRefKind::Toggle)));
        assert_eq!(parse_layer_keycode("TO(0)"), Some((0, LayerRefKind::SwitchTo)));
        assert_eq!(parse_layer_keycode("TT(3)"), Some((3, LayerRefKind::TapToggle)));
        assert_eq!(parse_layer_keycode("OSL(1)"), Some((1, LayerRefKind::OneShot)));
        assert_eq!(parse_layer_keycode("DF(0)"), Some((0, LayerRefKind::DefaultSet)));
    }

    #[test]
    fn test_parse_layer_keycode_compound() {
        assert_eq!(parse_layer_keycode("LT(2, KC_SPC)"), Some((2, LayerRefKind::TapHold)));
        assert_eq!(parse_layer_keycode("LM(3, MOD_LSFT)"), Some((3, LayerRefKind::LayerMod)));
    }

    #[test]
    fn test_parse_layer_keycode_invalid() {
        assert_eq!(parse_layer_keycode("KC_A"), None);
        assert_eq!(parse_layer_keycode("LCTL_T(KC_A)"), None);
        assert_eq!(parse_layer_keycode("MO(_LOWER)"), None);
        assert_eq!(parse_layer_keycode("MO("), None);
        assert_eq!(parse_layer_keycode("LT(1)"), None);
    }

    #[test]
    fn test_check_layer_refs_flags_missing_layer() {
        let layers = vec![layer("_BASE", &["MO(1)", "TT(4)"]), layer("_LOWER", &["KC_A"])];
        let warnings = check_layer_refs(&layers);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].name, "TT(4)");
        assert_eq!(warnings[0].block.as_deref(), Some("layer _BASE"));
        assert!(warnings[0].message.contains("only 2 layers exist"));
    }

    #[test]
    fn test_builtins() {
        assert!(is_builtin("KC_TRANSPARENT"));
        assert!(is_builtin("MT"));
        assert!(is_builtin("LCTL_T"));
        assert!(is_builtin("tap_dance_action_t"));
        assert!(is_builtin("PLANCK_SOUND"));
        assert!(!is_builtin("DANCE_0"));
        assert!(!is_builtin("dance_0_finished"));
    }

    #[test]
    fn test_check_dangling_cells_and_tables() {
        let codes = block("tap_dance_codes", BlockKind::Enum, "enum tap_dance_codes { DANCE_0 };", &["DANCE_0"]);
        let finished = block("dance_0_finished", BlockKind::Function, "void dance_0_finished(void) {}", &["dance_0_finished"]);
        let table = block(
            "tap_dance_actions",
            BlockKind::Table,
            "tap_dance_action_t tap_dance_actions[] = {\n  [DANCE_0] = ACTION_TAP_DANCE_FN_ADVANCED(NULL, dance_0_finished, dance_0_reset),\n};",
            &["tap_dance_actions"],
        );
        let blocks = vec![&codes, &finished, &table];
        let defined = defined_names(blocks.iter().copied());
        let layers = vec![layer("_BASE", &["TD(DANCE_0)", "TD(DANCE_1)", "TD(DANCE_1)", "KC_A"])];

        let warnings = check_dangling(&layers, &blocks, &defined);
        let names: Vec<&str> = warnings.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["DANCE_1", "dance_0_reset"]);
        assert_eq!(warnings[1].block.as_deref(), Some("tap_dance_actions"));
    }

    #[test]
    fn test_check_duplicates() {
        let first = block("LOWER", BlockKind::Define, "#define LOWER MO(_LOWER)", &["LOWER"]);
        let same = block("LOWER", BlockKind::Define, "\n#define LOWER MO(_LOWER)", &["LOWER"]);
        let different = block("LOWER", BlockKind::Define, "#define LOWER MO(1)", &["LOWER"]);
        let prototype = block("matrix_scan_user", BlockKind::Prototype, "void matrix_scan_user(void);", &["matrix_scan_user"]);
        let function = block("matrix_scan_user", BlockKind::Function, "void matrix_scan_user(void) {}", &["matrix_scan_user"]);

        assert!(check_duplicates(&[&first, &same, &prototype, &function]).is_empty());

        let warnings = check_duplicates(&[&first, &different]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::DuplicateDefinition);
        assert_eq!(warnings[0].name, "LOWER");
    }
}
