//! # Aviary Geodata
//!
//! Tile grids and the filters that decide which tiles get processed.
//!
//! This crate provides:
//! - Grid generation: tile origins covering a [`BoundingBox`](aviary_core::BoundingBox)
//! - A spatial join over reference geometries, backed by an R-tree
//! - Coordinates filters (duplicates, geospatial, mask, set, composite)
//! - [`ProcessArea`]: a set of tiles with set algebra, chunking and JSON I/O
//! - [`ProcessAreaConfig`]: TOML configuration for process areas
//!
//! ## Design Principles
//!
//! 1. **Synchronous**: no I/O besides explicit file loaders
//! 2. **Immutable filters**: configured once, shareable across threads
//! 3. **Whole results**: a filter returns every surviving origin or an error
//!
//! ## Example
//!
//! ```ignore
//! use aviary_core::{BoundingBox, Coordinates, TileSize};
//! use aviary_geodata::{
//!     compute_coordinates, CompositeFilter, CoordinatesFilter, DuplicatesFilter, SetFilter,
//!     SetFilterMode,
//! };
//!
//! let bbox = BoundingBox::new(363084, 5715326, 363340, 5715582)?;
//! let coordinates = compute_coordinates(&bbox, TileSize::new(128)?, true)?;
//!
//! let filter = CompositeFilter::default()
//!     .with(DuplicatesFilter)
//!     .with(SetFilter::new(processed, SetFilterMode::Difference));
//! let coordinates = filter.filter(coordinates)?;
//! ```

pub mod config;
pub mod coordinates_filter;
pub mod grid_generator;
pub mod process_area;
pub mod spatial_join;

pub use config::{ProcessAreaConfig, ProcessAreaSource};
pub use coordinates_filter::{
    composite_filter, duplicates_filter, geospatial_filter, mask_filter, set_filter,
    CompositeFilter, CoordinatesFilter, DuplicatesFilter, GeospatialFilter, GeospatialFilterMode,
    MaskFilter, SetFilter, SetFilterMode,
};
pub use grid_generator::{compute_coordinates, generate_grid, generate_tiles, tile_polygon};
pub use process_area::ProcessArea;
pub use spatial_join::{SpatialJoin, SpatialPredicate};
