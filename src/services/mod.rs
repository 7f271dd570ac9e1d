//! Service layer for business logic.
//!
//! This module contains the conversion pipeline and the reference checks
//! it reports through.

pub mod converter;
pub mod references;

// Re-export commonly used types and functions
pub use converter::{Conversion, ConvertOptions, Converter};
