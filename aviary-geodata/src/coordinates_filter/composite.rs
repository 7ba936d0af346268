//! Sequential composition of coordinates filters.

use super::{log_stage, CoordinatesFilter};
use aviary_core::{Coordinates, Result};

/// Apply `filters` in order, feeding each the previous output.
///
/// Stops at the first error and returns it unchanged.
pub fn composite_filter(
    coordinates: Coordinates,
    filters: &[Box<dyn CoordinatesFilter>],
) -> Result<Coordinates> {
    filters
        .iter()
        .try_fold(coordinates, |coordinates, filter| filter.filter(coordinates))
}

/// Coordinates filter that chains other filters.
///
/// An empty composite returns its input unchanged.
#[derive(Debug, Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn CoordinatesFilter>>,
}

impl CompositeFilter {
    pub fn new(filters: Vec<Box<dyn CoordinatesFilter>>) -> Self {
        Self { filters }
    }

    /// Append a filter.
    pub fn push(&mut self, filter: impl CoordinatesFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Builder form of [`CompositeFilter::push`].
    pub fn with(mut self, filter: impl CoordinatesFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn filters(&self) -> &[Box<dyn CoordinatesFilter>] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl CoordinatesFilter for CompositeFilter {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates> {
        let before = coordinates.len();
        let filtered = composite_filter(coordinates, &self.filters)?;
        log_stage(self.name(), before, filtered.len());
        Ok(filtered)
    }
}
