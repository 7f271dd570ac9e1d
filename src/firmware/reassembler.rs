//! Builds the output `keymap.c` around the rendered array.
//!
//! Output order:
//!
//! 1. banner, then the blocks that preceded the array, verbatim
//! 2. forward declarations the new layout needs
//! 3. the rendered array
//! 4. the blocks that followed the array, verbatim
//! 5. Vial introspection stubs for names nothing defines

// Allow format! appended to String - more readable for building C source
#![allow(clippy::format_push_string)]

use crate::constants::APP_BINARY_NAME;
use crate::firmware::report::ConversionReport;
use crate::models::{AuxiliaryBlock, BlockKind, Layer, Placement, Profile, SourceDocument};
use crate::parser::scan::{find_top_level, identifiers, split_top_level, strip_comments};
use crate::services::references::{self, is_builtin};
use std::collections::HashSet;

/// Table that both the keymap and Vial's `vial.c` define.
pub const TAP_DANCE_TABLE: &str = "tap_dance_actions";

/// Undefines the Vial switch so `vial.c` skips its own table.
pub const TAP_DANCE_GUARD: &str = "#ifdef VIAL_TAP_DANCE_ENABLE\n#undef VIAL_TAP_DANCE_ENABLE\n#endif\n";

/// Introspection symbols Vial expects, with the stub emitted when missing.
const INTROSPECTION_STUBS: [(&str, &str); 2] = [
    (
        "key_combos",
        "#ifdef COMBO_ENABLE\nconst combo_t PROGMEM key_combos[0] = {};\n#endif\n",
    ),
    (
        "key_overrides",
        "#ifdef KEY_OVERRIDE_ENABLE\nconst key_override_t *key_overrides[] = { NULL };\n#endif\n",
    ),
];

/// Merges the rendered keymap array with the carried-over blocks.
#[derive(Debug, Clone)]
pub struct Reassembler {
    profile: Profile,
    generated_at: Option<String>,
}

impl Reassembler {
    /// Creates a reassembler for `profile`.
    #[must_use]
    pub const fn new(profile: Profile) -> Self {
        Self {
            profile,
            generated_at: None,
        }
    }

    /// Adds a generation time line to the banner.
    #[must_use]
    pub fn with_timestamp(mut self, stamp: impl Into<String>) -> Self {
        self.generated_at = Some(stamp.into());
        self
    }

    /// Produces the output document. `blocks` replaces `doc.blocks` so that
    /// patched copies can be emitted; warnings go into `report`.
    pub fn assemble(
        &self,
        doc: &SourceDocument,
        blocks: &[AuxiliaryBlock],
        keymap: &str,
        layers: &[Layer],
        report: &mut ConversionReport,
    ) -> String {
        let (before, after): (Vec<&AuxiliaryBlock>, Vec<&AuxiliaryBlock>) = blocks
            .iter()
            .partition(|block| block.placement == Placement::BeforeKeymap);

        let mut guard_pending = self.profile == Profile::Vial;
        let mut out = self.banner();

        for block in &before {
            push_block(&mut out, block, &mut guard_pending, report);
        }

        let forward = forward_declarations(&before, &after, layers);
        if !forward.is_empty() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("\n// Forward declarations\n");
            for (name, prototype) in forward {
                out.push_str(&prototype);
                out.push('\n');
                report.add_edit(name, "added forward declaration");
            }
        }

        out.push_str(&doc.keymap.leading);
        out.push_str(keymap);

        for block in &after {
            push_block(&mut out, block, &mut guard_pending, report);
        }

        if self.profile == Profile::Vial {
            let stubs: Vec<&str> = INTROSPECTION_STUBS
                .iter()
                .filter(|(name, _)| !blocks.iter().any(|block| block.defines_name(name)))
                .map(|(_, stub)| *stub)
                .collect();
            if !stubs.is_empty() {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("\n/* Introspection Fixes for Vial/QMK */\n");
                for stub in stubs {
                    out.push_str(stub);
                }
            }
        }

        let all: Vec<&AuxiliaryBlock> = blocks.iter().collect();
        let defined = references::defined_names(blocks);
        for warning in references::check_layer_refs(layers)
            .into_iter()
            .chain(references::check_dangling(layers, &all, &defined))
            .chain(references::check_duplicates(&all))
        {
            report.add_warning(warning);
        }

        tracing::debug!(
            bytes = out.len(),
            warnings = report.warnings.len(),
            "Reassembled keymap source"
        );
        out
    }

    fn banner(&self) -> String {
        let mut banner = format!("// Converted by {APP_BINARY_NAME}\n");
        match self.profile {
            Profile::Vial => banner.push_str("// Retains Vial/OLKB Matrix Compatibility\n"),
            Profile::Plain => banner.push_str("// QMK Planck grid layout (LAYOUT_planck_grid)\n"),
        }
        if let Some(stamp) = &self.generated_at {
            banner.push_str(&format!("// Generated at {stamp}\n"));
        }
        banner
    }
}

fn push_block(
    out: &mut String,
    block: &AuxiliaryBlock,
    guard_pending: &mut bool,
    report: &mut ConversionReport,
) {
    if *guard_pending && block.defines_name(TAP_DANCE_TABLE) {
        *guard_pending = false;
        let leading = block.leading();
        out.push_str(leading);
        if !leading.is_empty() && !leading.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(TAP_DANCE_GUARD);
        out.push_str(block.body());
        report.add_edit(block.name.clone(), "inserted VIAL_TAP_DANCE_ENABLE guard before the table");
        return;
    }
    out.push_str(&block.text);
}

/// Prototypes for functions defined after the array but used earlier:
/// by a key cell, or by a block that precedes the definition. Returns
/// `(function name, prototype)` pairs in definition order.
fn forward_declarations(
    before: &[&AuxiliaryBlock],
    after: &[&AuxiliaryBlock],
    layers: &[Layer],
) -> Vec<(String, String)> {
    let cell_idents: HashSet<&str> = layers
        .iter()
        .flat_map(|layer| layer.source.cells())
        .flat_map(|(_, key)| identifiers(key.as_str()))
        .collect();
    let available = references::defined_names(before.iter().copied());
    let declared_before = |name: &str| {
        before
            .iter()
            .any(|block| block.kind == BlockKind::Prototype && block.name == name)
    };

    let mut prototypes = Vec::new();
    for (def_idx, function) in after.iter().enumerate() {
        if function.kind != BlockKind::Function || declared_before(&function.name) {
            continue;
        }
        let name = function.name.as_str();

        let first_use = if cell_idents.contains(name) {
            Some(0)
        } else {
            after[..def_idx].iter().position(|block| {
                block.kind != BlockKind::Prototype
                    && identifiers(&strip_comments(block.body())).contains(&name)
            })
        };
        let Some(first_use) = first_use else {
            continue;
        };
        let declared_early = after[..first_use]
            .iter()
            .any(|block| block.kind == BlockKind::Prototype && block.name == name);
        if declared_early {
            continue;
        }

        let Some(signature) = signature_of(function) else {
            continue;
        };
        if !signature_available(&signature, name, &available) {
            tracing::debug!(function = name, "Skipping forward declaration; signature uses later types");
            continue;
        }
        prototypes.push((name.to_string(), format!("{signature};")));
    }
    prototypes
}

/// The function header with whitespace collapsed, e.g.
/// `void dance_0_finished(tap_dance_state_t *state, void *user_data)`.
fn signature_of(function: &AuxiliaryBlock) -> Option<String> {
    let code = strip_comments(function.body());
    let header = &code[..code.find('{')?];
    Some(header.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn signature_available(signature: &str, name: &str, available: &HashSet<String>) -> bool {
    let Some(open) = find_top_level(signature, b'(') else {
        return false;
    };
    let close = signature.rfind(')').unwrap_or(signature.len());
    let mut needed: Vec<&str> = identifiers(&signature[..open])
        .into_iter()
        .filter(|ident| *ident != name)
        .collect();

    for param in split_top_level(&signature[open + 1..close.max(open + 1)], b',') {
        let mut idents = identifiers(param);
        // The last identifier names the parameter unless it is the only one
        if idents.len() > 1 {
            idents.pop();
        }
        needed.extend(idents);
    }

    needed
        .into_iter()
        .all(|ident| is_builtin(ident) || available.contains(ident))
}
