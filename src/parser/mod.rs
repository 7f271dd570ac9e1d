//! Reading QMK keymap sources.
//!
//! The extractor splits a `keymap.c` into top-level blocks without a C
//! grammar; the keymap parser then breaks the located `keymaps` array into
//! layers of opaque key tokens.

pub mod extractor;
pub mod keymap;
pub(crate) mod scan;

// Re-export commonly used functions
pub use extractor::extract;
pub use keymap::{parse_layers, ShortLayers};
