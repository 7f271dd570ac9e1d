//! Conversion report: non-fatal findings and edits made along the way.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

use serde::{Deserialize, Serialize};

/// Everything a conversion noticed or changed beyond the plain remap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Problems that did not stop the conversion
    pub warnings: Vec<ConversionWarning>,
    /// Edits made to auxiliary blocks or inserted around them
    pub edits: Vec<AppliedEdit>,
}

impl ConversionReport {
    /// Creates a new empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            warnings: Vec::new(),
            edits: Vec::new(),
        }
    }

    /// True when no warnings were raised.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ConversionWarning) {
        tracing::debug!(kind = %warning.kind, name = %warning.name, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Records an edit.
    pub fn add_edit(&mut self, block: impl Into<String>, description: impl Into<String>) {
        self.edits.push(AppliedEdit {
            block: block.into(),
            description: description.into(),
        });
    }

    /// Warnings of one kind.
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ConversionWarning> {
        self.warnings.iter().filter(move |warning| warning.kind == kind)
    }

    /// Formats the report for the terminal.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.edits.is_empty() {
            message.push_str(&format!("{} edits:\n", self.edits.len()));
            for edit in &self.edits {
                message.push_str(&format!("  - {}: {}\n", edit.block, edit.description));
            }
        }

        if !self.warnings.is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(&format!("⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }
}

/// A non-fatal problem found while reassembling the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionWarning {
    /// Type of warning
    pub kind: WarningKind,
    /// Block (or layer) where the problem was seen, if any
    pub block: Option<String>,
    /// The identifier involved
    pub name: String,
    /// Human-readable message
    pub message: String,
}

impl ConversionWarning {
    /// Creates a new warning.
    pub fn new(kind: WarningKind, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            block: None,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Sets the block context.
    #[must_use]
    pub fn in_block(mut self, block: impl Into<String>) -> Self {
        self.block = Some(block.into());
        self
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.block {
            Some(block) => write!(f, "[{}] {}: {}", block, self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Types of conversion warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Identifier used but defined nowhere and not a firmware built-in
    DanglingReference,
    /// Same name defined twice with different text
    DuplicateDefinition,
    /// Layer keycode pointing past the last layer
    LayerOutOfRange,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingReference => write!(f, "Dangling Reference"),
            Self::DuplicateDefinition => write!(f, "Duplicate Definition"),
            Self::LayerOutOfRange => write!(f, "Layer Out of Range"),
        }
    }
}

/// A change made to the carried-over code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedEdit {
    /// Name of the block that was edited (or inserted before)
    pub block: String,
    /// What was done
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = ConversionWarning::new(
            WarningKind::DanglingReference,
            "dance_9_finished",
            "dance_9_finished is not defined",
        )
        .in_block("tap_dance_actions");
        assert_eq!(
            warning.to_string(),
            "[tap_dance_actions] Dangling Reference: dance_9_finished is not defined"
        );
    }

    #[test]
    fn test_format_message_lists_edits_and_warnings() {
        let mut report = ConversionReport::new();
        assert!(report.is_clean());
        assert!(report.format_message().is_empty());

        report.add_edit("\"version.h\"", "commented out ZSA-only include");
        report.add_warning(ConversionWarning::new(
            WarningKind::LayerOutOfRange,
            "MO(9)",
            "MO(9) targets layer 9 but only 4 layers exist",
        ));

        let message = report.format_message();
        assert!(message.contains("1 edits:"));
        assert!(message.contains("\"version.h\": commented out ZSA-only include"));
        assert!(message.contains("1 warnings:"));
        assert!(message.contains("1. Layer Out of Range: MO(9) targets layer 9"));
        assert_eq!(report.warnings_of(WarningKind::LayerOutOfRange).count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_warning_kind_serializes_snake_case() {
        let json = serde_json::to_string(&WarningKind::DuplicateDefinition).unwrap();
        assert_eq!(json, "\"duplicate_definition\"");
    }
}
