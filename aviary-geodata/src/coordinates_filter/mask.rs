//! Boolean mask filter.

use super::{log_stage, CoordinatesFilter};
use aviary_core::{AviaryError, Coordinates, Result};

/// Keep the origins whose mask entry is `true`, in their original order.
///
/// The mask must be exactly as long as `coordinates`.
pub fn mask_filter(coordinates: Coordinates, mask: &[bool]) -> Result<Coordinates> {
    if mask.len() != coordinates.len() {
        return Err(AviaryError::invalid_value(
            "mask",
            "mask must have the same length as the coordinates.",
            format!("mask of length {} for {} coordinates", mask.len(), coordinates.len()),
        ));
    }

    Ok(coordinates
        .into_iter()
        .zip(mask)
        .filter_map(|(origin, &keep)| keep.then_some(origin))
        .collect())
}

/// Coordinates filter that filters based on a boolean mask.
#[derive(Debug, Clone)]
pub struct MaskFilter {
    mask: Vec<bool>,
}

impl MaskFilter {
    pub fn new(mask: impl Into<Vec<bool>>) -> Self {
        Self { mask: mask.into() }
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }
}

impl CoordinatesFilter for MaskFilter {
    fn name(&self) -> &'static str {
        "mask"
    }

    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates> {
        let before = coordinates.len();
        let filtered = mask_filter(coordinates, &self.mask)?;
        log_stage(self.name(), before, filtered.len());
        Ok(filtered)
    }
}
