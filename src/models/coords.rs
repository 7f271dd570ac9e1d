//! Board-level coordinate constants.

use serde::{Deserialize, Serialize};

/// A switch position in the target (electrical) matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixCoord {
    /// Matrix row
    pub row: u8,
    /// Matrix column
    pub col: u8,
}

impl MatrixCoord {
    /// Creates a new matrix coordinate.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Keys that must be held together to unlock Vial editing.
///
/// Vial consumes the combo as two parallel lists, so the coordinates are
/// exposed both as pairs and as the split row and column lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockCombo {
    /// Key positions in target coordinates
    pub keys: Vec<MatrixCoord>,
}

impl UnlockCombo {
    /// Creates a combo from key positions.
    #[must_use]
    pub fn new(keys: Vec<MatrixCoord>) -> Self {
        Self { keys }
    }

    /// Row list for `VIAL_UNLOCK_COMBO_ROWS`.
    #[must_use]
    pub fn rows(&self) -> Vec<u8> {
        self.keys.iter().map(|key| key.row).collect()
    }

    /// Column list for `VIAL_UNLOCK_COMBO_COLS`.
    #[must_use]
    pub fn cols(&self) -> Vec<u8> {
        self.keys.iter().map(|key| key.col).collect()
    }
}
