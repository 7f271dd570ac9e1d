//! Oryx to OLKB Library
//!
//! This library converts keymaps exported by ZSA Oryx for the 4×12 Planck
//! grid into sources for the OLKB Planck rev6, whose matrix is wired as
//! 8 rows × 6 columns. Non-layout code is carried over verbatim; the
//! `config.h` / `rules.mk` templates enable Vial.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod firmware;
pub mod models;
pub mod parser;
pub mod services;
pub mod transform;

pub use error::ConvertError;
