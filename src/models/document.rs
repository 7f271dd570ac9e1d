//! A source file split into the keymap array and its surrounding blocks.

use crate::models::block::{AuxiliaryBlock, Placement};
use serde::{Deserialize, Serialize};

/// The `keymaps[][MATRIX_ROWS][MATRIX_COLS]` definition as found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapConstruct {
    /// Whitespace and comments in front of the definition
    pub leading: String,
    /// The definition itself, from `const` through the closing `;`
    pub text: String,
    /// 1-based line where the definition starts
    pub line: usize,
}

/// Output of the block extractor.
///
/// Concatenating the blocks placed before the keymap, the keymap's leading
/// trivia and text, then the blocks placed after it reproduces the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Auxiliary blocks in source order
    pub blocks: Vec<AuxiliaryBlock>,
    /// The layer array
    pub keymap: KeymapConstruct,
}

impl SourceDocument {
    /// Blocks that precede the keymap array.
    pub fn before_keymap(&self) -> impl Iterator<Item = &AuxiliaryBlock> {
        self.blocks
            .iter()
            .filter(|block| block.placement == Placement::BeforeKeymap)
    }

    /// Blocks that follow the keymap array.
    pub fn after_keymap(&self) -> impl Iterator<Item = &AuxiliaryBlock> {
        self.blocks
            .iter()
            .filter(|block| block.placement == Placement::AfterKeymap)
    }

    /// First block that defines `name`.
    #[must_use]
    pub fn definition_of(&self, name: &str) -> Option<&AuxiliaryBlock> {
        self.blocks.iter().find(|block| block.defines_name(name))
    }

    /// Rebuilds the original source text.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for block in self.before_keymap() {
            out.push_str(&block.text);
        }
        out.push_str(&self.keymap.leading);
        out.push_str(&self.keymap.text);
        for block in self.after_keymap() {
            out.push_str(&block.text);
        }
        out
    }
}
