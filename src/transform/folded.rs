//! Left/right half folding for the Planck rev6 PCB.
//!
//! The rev6 wires the 4×12 visual grid as an 8×6 matrix: the left half keeps
//! its rows, the right half is stacked underneath it.
//!
//! ```text
//! visual (4×12)                     matrix (8×6)
//! L0 L0 L0 L0 L0 L0 R0 R0 R0 ...    row 0..3 = left half, rows as-is
//! ...                               row 4..7 = right half, row + 4
//! ```

use crate::models::{Coord, Shape};
use crate::transform::MatrixTransform;

/// Folds each source row's right half below the left half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldedHalves {
    source: Shape,
}

impl FoldedHalves {
    /// Creates the strategy for a source grid with an even column count.
    #[must_use]
    pub const fn new(source: Shape) -> Self {
        Self { source }
    }

    const fn half(&self) -> usize {
        self.source.cols / 2
    }
}

impl MatrixTransform for FoldedHalves {
    fn name(&self) -> &'static str {
        "folded-halves"
    }

    fn source_shape(&self) -> Shape {
        self.source
    }

    fn target_shape(&self) -> Shape {
        Shape::new(self.source.rows * 2, self.half())
    }

    fn map(&self, coord: Coord) -> Coord {
        let half = self.half();
        Coord::new(coord.row + (coord.col / half) * self.source.rows, coord.col % half)
    }

    fn row_label(&self, row: usize) -> String {
        if row < self.source.rows {
            format!("L{row}")
        } else {
            format!("R{}", row - self.source.rows)
        }
    }
}
