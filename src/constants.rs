//! Application-wide constants.
//!
//! Names and default paths shared by the CLI, the config loader and the
//! generated file banners.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Oryx to OLKB Converter";

/// The binary name of the application (used in banners and command examples).
pub const APP_BINARY_NAME: &str = "oryx2olkb";

/// Default location of the Oryx export.
pub const DEFAULT_INPUT: &str = "zsa_oryx_source/keymap.c";

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "olkb_firmware";

/// Output file names, in write order.
pub const OUTPUT_FILES: [&str; 3] = ["keymap.c", "config.h", "rules.mk"];
