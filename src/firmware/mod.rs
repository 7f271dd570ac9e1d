//! Firmware source generation.
//!
//! This module renders the converted `keymaps` array, stitches it back
//! together with the carried-over code, fills the `config.h` / `rules.mk`
//! templates and writes the result to disk.

pub mod patches;
pub mod reassembler;
pub mod renderer;
pub mod report;
pub mod templates;
pub mod writer;

// Re-export firmware types
pub use reassembler::Reassembler;
pub use renderer::{KeymapRenderer, RenderStyle};
pub use report::{AppliedEdit, ConversionReport, ConversionWarning, WarningKind};
pub use templates::{FeatureFlags, TemplateConfig, TemplateEmitter};
pub use writer::OutputBundle;
