//! Opt-in source fixes for Oryx exports.
//!
//! Oryx code targets ZSA's QMK fork. A few constructs do not build against
//! upstream QMK or Vial; these patches rewrite them mechanically. Every
//! change is recorded in the [`ConversionReport`].

use crate::constants::APP_BINARY_NAME;
use crate::firmware::report::ConversionReport;
use crate::models::{AuxiliaryBlock, BlockKind, Profile};
use regex::Regex;
use std::sync::LazyLock;

static ZSA_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([ \t]*)(#[ \t]*include[ \t]+"(?:version|zsa)\.h")"#).expect("include pattern compiles")
});

static MUSE_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([ \t]*)(#[ \t]*include[ \t]+"muse\.h")"#).expect("include pattern compiles")
});

static LAYER_STATE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:uint8_t|uint32_t)\s+layer_state_set_user\s*\(\s*(?:uint8_t|uint32_t|layer_state_t)\s+state\s*\)")
        .expect("signature pattern compiles")
});

const LAYER_STATE_REPLACEMENT: &str = "layer_state_t layer_state_set_user(layer_state_t state)";

/// Applies the profile's fixes to `blocks` in place.
pub fn apply(blocks: &mut [AuxiliaryBlock], profile: Profile, report: &mut ConversionReport) {
    for block in blocks.iter_mut() {
        if matches!(block.kind, BlockKind::Include | BlockKind::Conditional) {
            let edited = ZSA_INCLUDE.replace_all(block.body(), "$1// $2").into_owned();
            if set_body(block, edited) {
                report.add_edit(block.name.clone(), "commented out ZSA-only include");
            }
            if profile == Profile::Vial {
                let edited = MUSE_INCLUDE.replace_all(block.body(), "$1// $2").into_owned();
                if set_body(block, edited) {
                    report.add_edit(block.name.clone(), "commented out muse.h include");
                }
            }
        }

        if matches!(block.kind, BlockKind::Function | BlockKind::Prototype | BlockKind::Conditional) {
            let edited = LAYER_STATE_SIGNATURE
                .replace_all(block.body(), LAYER_STATE_REPLACEMENT)
                .into_owned();
            if set_body(block, edited) {
                report.add_edit(block.name.clone(), "rewrote signature to use layer_state_t");
            }
        }

        match profile {
            Profile::Vial if block.name == "matrix_scan_user" => disable_matrix_scan(block, report),
            Profile::Plain if block.body().contains("ZSA_SAFE_RANGE") => {
                let edited = block.body().replace("ZSA_SAFE_RANGE", "SAFE_RANGE");
                set_body(block, edited);
                report.add_edit(block.name.clone(), "replaced ZSA_SAFE_RANGE with SAFE_RANGE");
            }
            _ => {}
        }
    }
}

/// `matrix_scan_user` drives the muse sequencer in Oryx exports, which
/// Vial builds do not link.
fn disable_matrix_scan(block: &mut AuxiliaryBlock, report: &mut ConversionReport) {
    match block.kind {
        BlockKind::Function => {
            let edited = format!("#if 0 // Disabled by {APP_BINARY_NAME}\n{}\n#endif", block.body());
            set_body(block, edited);
            report.add_edit(block.name.clone(), "disabled definition with #if 0");
        }
        BlockKind::Prototype => {
            let edited = block
                .body()
                .lines()
                .map(|line| format!("// {line}"))
                .collect::<Vec<_>>()
                .join("\n");
            set_body(block, edited);
            report.add_edit(block.name.clone(), "commented out prototype");
        }
        _ => {}
    }
}

/// Replaces the block body, keeping its leading trivia. Returns whether
/// anything changed.
fn set_body(block: &mut AuxiliaryBlock, body: String) -> bool {
    if body == block.body() {
        return false;
    }
    let mut text = block.leading().to_string();
    text.push_str(&body);
    block.text = text;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Placement;

    fn block(name: &str, kind: BlockKind, leading: &str, body: &str) -> AuxiliaryBlock {
        AuxiliaryBlock {
            name: name.to_string(),
            kind,
            text: format!("{leading}{body}"),
            body_offset: leading.len(),
            line: 1,
            placement: Placement::BeforeKeymap,
            defines: Vec::new(),
        }
    }

    #[test]
    fn test_comments_out_zsa_includes() {
        let mut blocks = vec![
            block("\"version.h\"", BlockKind::Include, "\n", "#include \"version.h\""),
            block("QMK_KEYBOARD_H", BlockKind::Include, "", "#include QMK_KEYBOARD_H"),
            block(
                "AUDIO_ENABLE",
                BlockKind::Conditional,
                "\n",
                "#ifdef AUDIO_ENABLE\n#include \"muse.h\"\n#endif",
            ),
        ];
        let mut report = ConversionReport::new();
        apply(&mut blocks, Profile::Vial, &mut report);

        assert_eq!(blocks[0].text, "\n// #include \"version.h\"");
        assert_eq!(blocks[1].text, "#include QMK_KEYBOARD_H");
        assert_eq!(blocks[2].text, "\n#ifdef AUDIO_ENABLE\n// #include \"muse.h\"\n#endif");
        assert_eq!(report.edits.len(), 2);
    }

    #[test]
    fn test_plain_keeps_muse_and_replaces_safe_range() {
        let mut blocks = vec![
            block("AUDIO_ENABLE", BlockKind::Conditional, "", "#ifdef AUDIO_ENABLE\n#include \"muse.h\"\n#endif"),
            block("custom_keycodes", BlockKind::Enum, "\n", "enum custom_keycodes {\n  RGB_SLD = ZSA_SAFE_RANGE,\n};"),
        ];
        let mut report = ConversionReport::new();
        apply(&mut blocks, Profile::Plain, &mut report);

        assert!(blocks[0].text.contains("\n#include \"muse.h\""));
        assert!(blocks[1].text.contains("RGB_SLD = SAFE_RANGE,"));
        assert_eq!(report.edits.len(), 1);
    }

    #[test]
    fn test_rewrites_layer_state_signature() {
        let mut blocks = vec![block(
            "layer_state_set_user",
            BlockKind::Function,
            "",
            "uint32_t layer_state_set_user(uint32_t state) {\n  return state;\n}",
        )];
        let mut report = ConversionReport::new();
        apply(&mut blocks, Profile::Vial, &mut report);
        assert!(blocks[0]
            .text
            .starts_with("layer_state_t layer_state_set_user(layer_state_t state) {"));
    }

    #[test]
    fn test_disables_matrix_scan_user() {
        let mut blocks = vec![
            block("matrix_scan_user", BlockKind::Prototype, "\n", "void matrix_scan_user(void);"),
            block("matrix_scan_user", BlockKind::Function, "\n\n", "void matrix_scan_user(void) {\n}"),
        ];
        let mut report = ConversionReport::new();
        apply(&mut blocks, Profile::Vial, &mut report);

        assert_eq!(blocks[0].text, "\n// void matrix_scan_user(void);");
        assert_eq!(
            blocks[1].text,
            "\n\n#if 0 // Disabled by oryx2olkb\nvoid matrix_scan_user(void) {\n}\n#endif"
        );
        assert_eq!(blocks[1].leading(), "\n\n");
    }
}
