//! Duplicate removal.

use super::{log_stage, CoordinatesFilter};
use aviary_core::{Coordinates, Result};
use rustc_hash::FxHashSet;

/// Remove repeated origins, keeping the first occurrence of each.
///
/// Survivors keep the relative order of their first occurrence.
pub fn duplicates_filter(coordinates: Coordinates) -> Coordinates {
    let mut seen = FxHashSet::default();
    seen.reserve(coordinates.len());

    coordinates
        .into_iter()
        .filter(|origin| seen.insert(*origin))
        .collect()
}

/// Coordinates filter that removes duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicatesFilter;

impl DuplicatesFilter {
    pub fn new() -> Self {
        Self
    }
}

impl CoordinatesFilter for DuplicatesFilter {
    fn name(&self) -> &'static str {
        "duplicates"
    }

    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates> {
        let before = coordinates.len();
        let filtered = duplicates_filter(coordinates);
        log_stage(self.name(), before, filtered.len());
        Ok(filtered)
    }
}
