//! Pass-through strategy for the plain `LAYOUT_planck_grid` profile.

use crate::models::{Coord, Shape};
use crate::transform::MatrixTransform;

/// Keeps every key where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    shape: Shape,
}

impl Identity {
    /// Creates the strategy for grids of `shape`.
    #[must_use]
    pub const fn new(shape: Shape) -> Self {
        Self { shape }
    }
}

impl MatrixTransform for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn source_shape(&self) -> Shape {
        self.shape
    }

    fn target_shape(&self) -> Shape {
        self.shape
    }

    fn map(&self, coord: Coord) -> Coord {
        coord
    }

    fn row_label(&self, row: usize) -> String {
        format!("row {row}")
    }
}
