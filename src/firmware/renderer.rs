//! Serializes target grids back into a C `keymaps` array literal.

// Allow format! appended to String - more readable for building C source
#![allow(clippy::format_push_string)]

use crate::models::TargetGrid;
use crate::transform::MatrixTransform;

/// Declaration line that opens the array.
pub const KEYMAP_HEADER: &str = "const uint16_t PROGMEM keymaps[][MATRIX_ROWS][MATRIX_COLS] = {";

/// Minimum cell width in matrix rows.
const CELL_WIDTH: usize = 7;

/// How each layer is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStyle {
    /// Nested braces, one `{ ... }, // L0` line per matrix row
    Matrix,
    /// A layout macro call with one line per row, e.g. `LAYOUT_planck_grid(...)`
    LayoutMacro(String),
}

/// Renders layers in the target topology of a transform.
pub struct KeymapRenderer<'a> {
    transform: &'a dyn MatrixTransform,
    style: RenderStyle,
}

impl<'a> KeymapRenderer<'a> {
    /// Creates a renderer labelling rows through `transform`.
    #[must_use]
    pub fn new(transform: &'a dyn MatrixTransform, style: RenderStyle) -> Self {
        Self { transform, style }
    }

    /// Renders the complete array definition, ending with `};` and no
    /// trailing newline.
    pub fn render<'l>(&self, layers: impl IntoIterator<Item = (&'l str, &'l TargetGrid)>) -> String {
        let mut out = String::new();
        out.push_str(KEYMAP_HEADER);
        out.push('\n');

        for (name, grid) in layers {
            match &self.style {
                RenderStyle::Matrix => self.render_matrix_layer(&mut out, name, grid),
                RenderStyle::LayoutMacro(macro_name) => render_macro_layer(&mut out, macro_name, name, grid),
            }
        }

        out.push_str("};");
        out
    }

    fn render_matrix_layer(&self, out: &mut String, name: &str, grid: &TargetGrid) {
        out.push_str(&format!("    [{name}] = {{ // Converted from {name}\n"));
        for (row_idx, row) in grid.rows().iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .map(|key| format!("{:<width$}", key.as_str(), width = CELL_WIDTH))
                .collect();
            out.push_str(&format!(
                "        {{ {} }}, // {}\n",
                cells.join(", "),
                self.transform.row_label(row_idx)
            ));
        }
        out.push_str("    },\n");
    }
}

fn render_macro_layer(out: &mut String, macro_name: &str, name: &str, grid: &TargetGrid) {
    out.push_str(&format!("    [{name}] = {macro_name}(\n"));
    let rows: Vec<String> = grid
        .rows()
        .iter()
        .map(|row| {
            let keys: Vec<&str> = row.iter().map(|key| key.as_str()).collect();
            format!("        {}", keys.join(", "))
        })
        .collect();
    out.push_str(&rows.join(",\n"));
    out.push_str("\n    ),\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coord, LogicalKey, Shape, SourceGrid};
    use crate::transform::{FoldedHalves, Identity};

    fn folded_layer() -> TargetGrid {
        let mut source = SourceGrid::filled(Shape::new(4, 12), &LogicalKey::placeholder());
        source.set(Coord::new(0, 0), LogicalKey::new("A"));
        source.set(Coord::new(0, 7), LogicalKey::new("TD(DANCE_0)"));
        FoldedHalves::new(Shape::new(4, 12)).remap("_BASE", &source).unwrap()
    }

    #[test]
    fn test_matrix_rendering() {
        let fold = FoldedHalves::new(Shape::new(4, 12));
        let grid = folded_layer();
        let text = KeymapRenderer::new(&fold, RenderStyle::Matrix).render([("_BASE", &grid)]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], KEYMAP_HEADER);
        assert_eq!(lines[1], "    [_BASE] = { // Converted from _BASE");
        assert_eq!(
            lines[2],
            "        { A      , KC_NO  , KC_NO  , KC_NO  , KC_NO  , KC_NO   }, // L0"
        );
        assert_eq!(
            lines[6],
            "        { KC_NO  , TD(DANCE_0), KC_NO  , KC_NO  , KC_NO  , KC_NO   }, // R0"
        );
        assert_eq!(lines[10], "    },");
        assert_eq!(lines[11], "};");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_one_comment_per_row() {
        let fold = FoldedHalves::new(Shape::new(4, 12));
        let grid = folded_layer();
        let text = KeymapRenderer::new(&fold, RenderStyle::Matrix).render([("_BASE", &grid), ("_LOWER", &grid)]);
        for label in ["L0", "L1", "L2", "L3", "R0", "R1", "R2", "R3"] {
            assert_eq!(text.matches(&format!("}}, // {label}\n")).count(), 2, "{label}");
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let fold = FoldedHalves::new(Shape::new(4, 12));
        let grid = folded_layer();
        let renderer = KeymapRenderer::new(&fold, RenderStyle::Matrix);
        assert_eq!(renderer.render([("_BASE", &grid)]), renderer.render([("_BASE", &grid)]));
    }

    #[test]
    fn test_layout_macro_rendering() {
        let identity = Identity::new(Shape::new(2, 3));
        let keys = ["KC_A", "KC_B", "KC_C", "KC_D", "KC_E", "KC_F"].map(LogicalKey::new).to_vec();
        let grid = TargetGrid::from_flat(keys, 3);
        let text = KeymapRenderer::new(&identity, RenderStyle::LayoutMacro("LAYOUT_planck_grid".into()))
            .render([("0", &grid)]);
        assert_eq!(
            text,
            "const uint16_t PROGMEM keymaps[][MATRIX_ROWS][MATRIX_COLS] = {\n    [0] = LAYOUT_planck_grid(\n        KC_A, KC_B, KC_C,\n        KC_D, KC_E, KC_F\n    ),\n};"
        );
    }
}
