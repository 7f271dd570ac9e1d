//! Fatal conversion errors.

use crate::models::Shape;
use thiserror::Error;

/// Errors that abort a conversion before any output is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The layer array, or the delimiters around it, could not be located
    #[error("Malformed input{}: {message}", at_line(.line))]
    MalformedInput {
        /// What was missing or unbalanced
        message: String,
        /// 1-based source line, when known
        line: Option<usize>,
    },

    /// A layer's grid does not have the shape the topology requires
    #[error("Layer {layer} has {found}, expected {expected}")]
    ShapeMismatch {
        /// Layer designator
        layer: String,
        /// Required source shape
        expected: Shape,
        /// Description of what the layer actually holds
        found: String,
    },
}

impl ConvertError {
    /// Creates a malformed-input error.
    pub fn malformed(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::MalformedInput {
            message: message.into(),
            line,
        }
    }

    /// Creates a shape-mismatch error.
    pub fn shape_mismatch(layer: impl Into<String>, expected: Shape, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            layer: layer.into(),
            expected,
            found: found.into(),
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|line| format!(" at line {line}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_with_line() {
        let err = ConvertError::malformed("unterminated '{'", Some(12));
        assert_eq!(err.to_string(), "Malformed input at line 12: unterminated '{'");
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = ConvertError::shape_mismatch("_BASE", Shape::new(4, 12), "3×12");
        assert_eq!(err.to_string(), "Layer _BASE has 3×12, expected 4×12");
    }
}
