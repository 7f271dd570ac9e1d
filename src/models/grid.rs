//! Row-major key grids and their coordinates.

use crate::models::key::LogicalKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dimensions of a key grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Number of rows
    pub rows: usize,
    /// Number of columns in every row
    pub cols: usize,
}

impl Shape {
    /// Creates a new shape.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cells(self) -> usize {
        self.rows * self.cols
    }

    /// True when the coordinate lies inside this shape.
    #[must_use]
    pub const fn contains(self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.rows, self.cols)
    }
}

/// A (row, column) cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
}

impl Coord {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Ordered rows of keys for one layer.
///
/// Rows may be ragged while the grid comes straight out of the parser;
/// [`KeyGrid::has_shape`] is the check the remapper relies on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyGrid {
    rows: Vec<Vec<LogicalKey>>,
}

/// A layer grid in the visual source topology.
pub type SourceGrid = KeyGrid;

/// A layer grid in the electrical target topology.
pub type TargetGrid = KeyGrid;

impl KeyGrid {
    /// Builds a grid from explicit rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<LogicalKey>>) -> Self {
        Self { rows }
    }

    /// Chunks a flat key list into rows of `cols` keys. The last row is
    /// short when the list length is not a multiple of `cols`.
    #[must_use]
    pub fn from_flat(keys: Vec<LogicalKey>, cols: usize) -> Self {
        if cols == 0 {
            return Self { rows: vec![keys] };
        }
        let rows = keys.chunks(cols).map(<[LogicalKey]>::to_vec).collect();
        Self { rows }
    }

    /// A grid of the given shape with every cell set to `fill`.
    #[must_use]
    pub fn filled(shape: Shape, fill: &LogicalKey) -> Self {
        Self {
            rows: vec![vec![fill.clone(); shape.cols]; shape.rows],
        }
    }

    /// The rows of this grid.
    #[must_use]
    pub fn rows(&self) -> &[Vec<LogicalKey>] {
        &self.rows
    }

    /// Total number of cells across all rows.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// True when the grid has exactly `shape.rows` rows of `shape.cols` keys.
    #[must_use]
    pub fn has_shape(&self, shape: Shape) -> bool {
        self.rows.len() == shape.rows && self.rows.iter().all(|row| row.len() == shape.cols)
    }

    /// Human-readable description of the actual dimensions.
    #[must_use]
    pub fn describe(&self) -> String {
        if let Some(first) = self.rows.first() {
            if self.rows.iter().all(|row| row.len() == first.len()) {
                return Shape::new(self.rows.len(), first.len()).to_string();
            }
        }
        let widths: Vec<String> = self.rows.iter().map(|row| row.len().to_string()).collect();
        format!(
            "{} cells in {} rows (widths {})",
            self.cell_count(),
            self.rows.len(),
            widths.join(", ")
        )
    }

    /// Returns the key at `coord`, if present.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&LogicalKey> {
        self.rows.get(coord.row)?.get(coord.col)
    }

    /// Overwrites the key at `coord`. Returns `false` when out of range.
    pub fn set(&mut self, coord: Coord, key: LogicalKey) -> bool {
        match self.rows.get_mut(coord.row).and_then(|row| row.get_mut(coord.col)) {
            Some(cell) => {
                *cell = key;
                true
            }
            None => false,
        }
    }

    /// Iterates all cells in row-major order with their coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &LogicalKey)> {
        self.rows.iter().enumerate().flat_map(|(row, keys)| {
            keys.iter()
                .enumerate()
                .map(move |(col, key)| (Coord::new(row, col), key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<LogicalKey> {
        (0..n).map(|i| LogicalKey::new(format!("K{i}"))).collect()
    }

    #[test]
    fn test_from_flat_chunks_rows() {
        let grid = KeyGrid::from_flat(keys(48), 12);
        assert!(grid.has_shape(Shape::new(4, 12)));
        assert_eq!(grid.get(Coord::new(1, 0)).unwrap().as_str(), "K12");
        assert_eq!(grid.get(Coord::new(3, 11)).unwrap().as_str(), "K47");
    }

    #[test]
    fn test_from_flat_short_list_is_ragged() {
        let grid = KeyGrid::from_flat(keys(47), 12);
        assert!(!grid.has_shape(Shape::new(4, 12)));
        assert_eq!(grid.describe(), "47 cells in 4 rows (widths 12, 12, 12, 11)");
    }

    #[test]
    fn test_set_out_of_range() {
        let mut grid = KeyGrid::filled(Shape::new(2, 2), &LogicalKey::placeholder());
        assert!(grid.set(Coord::new(1, 1), LogicalKey::new("KC_A")));
        assert!(!grid.set(Coord::new(2, 0), LogicalKey::new("KC_B")));
        assert_eq!(grid.describe(), "2×2");
    }
}
