//! Matrix remapping between board topologies.
//!
//! A [`MatrixTransform`] says where each cell of a source grid lands in the
//! target grid. Implementations only provide the coordinate map and the two
//! shapes; [`MatrixTransform::remap`] does the bookkeeping.

pub mod folded;
pub mod identity;

pub use folded::FoldedHalves;
pub use identity::Identity;

use crate::error::ConvertError;
use crate::models::{Coord, Layer, LogicalKey, MatrixCoord, Profile, Shape, SourceGrid, TargetGrid, UnlockCombo};

/// A total, one-to-one mapping from source cells to target cells.
pub trait MatrixTransform {
    /// Short strategy name for logs and reports.
    fn name(&self) -> &'static str;

    /// Shape every source layer must have.
    fn source_shape(&self) -> Shape;

    /// Shape of the produced grids.
    fn target_shape(&self) -> Shape;

    /// Target position of a source cell. Only called with coordinates inside
    /// [`MatrixTransform::source_shape`].
    fn map(&self, coord: Coord) -> Coord;

    /// Comment label rendered after a target row.
    fn row_label(&self, row: usize) -> String;

    /// Relocates every key of `source` into a new target grid.
    ///
    /// Target cells no source cell maps to hold [`LogicalKey::placeholder`].
    fn remap(&self, layer: &str, source: &SourceGrid) -> Result<TargetGrid, ConvertError> {
        let expected = self.source_shape();
        if !source.has_shape(expected) {
            return Err(ConvertError::shape_mismatch(layer, expected, source.describe()));
        }

        let mut target = TargetGrid::filled(self.target_shape(), &LogicalKey::placeholder());
        for (coord, key) in source.cells() {
            let dest = self.map(coord);
            if !target.set(dest, key.clone()) {
                tracing::warn!(layer, from = %coord, to = %dest, "Mapped cell falls outside target grid");
            }
        }
        Ok(target)
    }
}

/// The strategy a profile converts with.
#[must_use]
pub fn for_profile(profile: Profile) -> Box<dyn MatrixTransform> {
    let planck = Shape::new(4, 12);
    match profile {
        Profile::Vial => Box::new(FoldedHalves::new(planck)),
        Profile::Plain => Box::new(Identity::new(planck)),
    }
}

/// Remaps every layer in place, stopping at the first layer with the wrong
/// shape.
pub fn remap_layers(transform: &dyn MatrixTransform, layers: &mut [Layer]) -> Result<(), ConvertError> {
    for layer in layers.iter_mut() {
        let target = transform.remap(&layer.name, &layer.source)?;
        layer.target = Some(target);
    }
    tracing::debug!(
        strategy = transform.name(),
        layers = layers.len(),
        "Remapped layers"
    );
    Ok(())
}

/// Default unlock combo: the top-left and top-right keys of the visual grid,
/// expressed in target coordinates.
#[must_use]
pub fn unlock_combo(transform: &dyn MatrixTransform) -> UnlockCombo {
    let cols = transform.source_shape().cols;
    let corners = [Coord::new(0, 0), Coord::new(0, cols.saturating_sub(1))];
    UnlockCombo::new(
        corners
            .into_iter()
            .map(|corner| {
                let dest = transform.map(corner);
                MatrixCoord::new(
                    u8::try_from(dest.row).unwrap_or(u8::MAX),
                    u8::try_from(dest.col).unwrap_or(u8::MAX),
                )
            })
            .collect(),
    )
}
