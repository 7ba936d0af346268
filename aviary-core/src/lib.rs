//! Core types for the aviary tile-grid engine.
//!
//! This crate holds the value types every other part of aviary builds on:
//!
//! - [`BoundingBox`]: validated integer extent with buffering and quantization
//! - [`Coordinates`]: ordered tile origins `(x_min, y_min)`
//! - [`GeometryCollection`]: CRS-tagged polygonal reference geometries
//! - [`TileSize`] / [`EpsgCode`]: validated scalars
//! - [`AviaryError`]: the two-tier (type / value) error taxonomy
//!
//! Grid generation and the coordinates filters live in `aviary-geodata`.

pub mod bounding_box;
pub mod coordinates;
pub mod error;
pub mod geometry;
pub mod types;

pub use bounding_box::BoundingBox;
pub use coordinates::{json_kind, Coordinates, TileOrigin};
pub use error::{AviaryError, Result};
pub use geometry::{parse_wkt, GeometryCollection};
pub use types::{BufferSize, Coordinate, EpsgCode, TileSize};
