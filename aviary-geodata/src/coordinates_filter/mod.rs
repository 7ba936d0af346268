//! Coordinates filters.
//!
//! A coordinates filter decides which tiles survive for processing: it takes
//! the tile origins of one batch and returns the filtered origins. Filters
//! are configured once, hold no per-call state, and can be shared across
//! threads.
//!
//! - [`CompositeFilter`]: applies child filters in declared order
//! - [`DuplicatesFilter`]: removes repeated origins
//! - [`GeospatialFilter`]: tests tile polygons against reference geometries
//! - [`MaskFilter`]: keeps origins where a boolean mask is set
//! - [`SetFilter`]: set algebra against another origin sequence
//!
//! Each filter also has a functional form (`duplicates_filter`,
//! `set_filter`, ...) for one-off use.
//!
//! A filter either returns the complete filtered sequence or an error; there
//! are no partial results.

mod composite;
mod duplicates;
mod geospatial;
mod mask;
mod set;

pub use composite::{composite_filter, CompositeFilter};
pub use duplicates::{duplicates_filter, DuplicatesFilter};
pub use geospatial::{geospatial_filter, GeospatialFilter, GeospatialFilterMode};
pub use mask::{mask_filter, MaskFilter};
pub use set::{set_filter, SetFilter, SetFilterMode};

use aviary_core::{Coordinates, Result};
use std::fmt::Debug;

/// Filter over tile origins.
pub trait CoordinatesFilter: Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Filter `coordinates`.
    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates>;
}

impl<F: CoordinatesFilter + ?Sized> CoordinatesFilter for Box<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates> {
        (**self).filter(coordinates)
    }
}

impl<F: CoordinatesFilter + ?Sized> CoordinatesFilter for std::sync::Arc<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates> {
        (**self).filter(coordinates)
    }
}

fn log_stage(name: &'static str, before: usize, after: usize) {
    tracing::debug!(
        filter = name,
        input = before,
        output = after,
        removed = before.saturating_sub(after),
        "Filtered coordinates"
    );
}
