//! Data models for keymap conversion.
//!
//! Keys, grids, layers and auxiliary blocks are plain data; parsing,
//! remapping and rendering live in their own modules.

pub mod block;
pub mod coords;
pub mod document;
pub mod grid;
pub mod key;
pub mod layer;
pub mod profile;

// Re-export all model types
pub use block::{AuxiliaryBlock, BlockKind, Placement};
pub use coords::{MatrixCoord, UnlockCombo};
pub use document::{KeymapConstruct, SourceDocument};
pub use grid::{Coord, KeyGrid, Shape, SourceGrid, TargetGrid};
pub use key::{LogicalKey, NO_KEY};
pub use layer::Layer;
pub use profile::Profile;
