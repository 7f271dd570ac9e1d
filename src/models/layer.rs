//! Named keymap layers.

use crate::models::grid::{SourceGrid, TargetGrid};
use serde::{Deserialize, Serialize};

/// One entry of the `keymaps` array.
///
/// Layers are positional: `MO(1)` in a handler refers to whatever layer sits
/// at index 1, so the order of a `Vec<Layer>` is significant and must be kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Designator as written (e.g. `_BASE`), or the positional index
    pub name: String,
    /// Layout macro the source used (e.g. `LAYOUT_planck_grid`), if any
    pub layout_macro: Option<String>,
    /// Keys in the visual source topology
    pub source: SourceGrid,
    /// Keys in the target topology, once remapped
    pub target: Option<TargetGrid>,
}

impl Layer {
    /// Creates an untransformed layer.
    pub fn new(name: impl Into<String>, source: SourceGrid) -> Self {
        Self {
            name: name.into(),
            layout_macro: None,
            source,
            target: None,
        }
    }

    /// Sets the source layout macro name.
    #[must_use]
    pub fn with_layout_macro(mut self, layout_macro: impl Into<String>) -> Self {
        self.layout_macro = Some(layout_macro.into());
        self
    }
}
