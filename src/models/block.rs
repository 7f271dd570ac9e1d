//! Verbatim auxiliary code blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of top-level construct a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// `#include ...`
    Include,
    /// `#define NAME ...`
    Define,
    /// Any other single-line directive (`#pragma`, `#undef`, `#else`, ...)
    Directive,
    /// `#if` / `#ifdef` / `#ifndef` ... `#endif` group
    Conditional,
    /// `typedef ...;`
    Typedef,
    /// `enum ... { ... };`
    Enum,
    /// `struct` or `union` declaration
    Record,
    /// Function declaration without a body
    Prototype,
    /// Function definition with a body
    Function,
    /// Array definition with an initializer (`name[] = { ... };`)
    Table,
    /// Any other declaration
    Variable,
    /// Whitespace and comments after the last construct
    Trivia,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Include => "include",
            Self::Define => "define",
            Self::Directive => "directive",
            Self::Conditional => "conditional",
            Self::Typedef => "typedef",
            Self::Enum => "enum",
            Self::Record => "record",
            Self::Prototype => "prototype",
            Self::Function => "function",
            Self::Table => "table",
            Self::Variable => "variable",
            Self::Trivia => "trivia",
        };
        f.write_str(label)
    }
}

/// Where a block sits relative to the `keymaps` array in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Appears before the array
    BeforeKeymap,
    /// Appears after the array
    AfterKeymap,
}

/// A top-level construct carried into the output as opaque text.
///
/// `text` holds the exact source bytes, including the whitespace and
/// comments that led up to the construct. `body_offset` marks where the
/// construct itself begins inside `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryBlock {
    /// Primary name (function, macro, table, header, condition, ...)
    pub name: String,
    /// Construct kind
    pub kind: BlockKind,
    /// Verbatim source text
    pub text: String,
    /// Byte offset of the construct inside `text`
    pub body_offset: usize,
    /// 1-based line where the construct starts
    pub line: usize,
    /// Position relative to the keymap array
    pub placement: Placement,
    /// Every name this block makes available (enumerators, group members, ...)
    pub defines: Vec<String>,
}

impl AuxiliaryBlock {
    /// The construct without its leading trivia.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.text[self.body_offset..]
    }

    /// The whitespace and comments in front of the construct.
    #[must_use]
    pub fn leading(&self) -> &str {
        &self.text[..self.body_offset]
    }

    /// True when the block makes `name` available.
    #[must_use]
    pub fn defines_name(&self, name: &str) -> bool {
        self.defines.iter().any(|defined| defined == name)
    }
}
