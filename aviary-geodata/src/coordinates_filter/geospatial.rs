//! Geospatial filtering against reference geometries.

use super::{log_stage, CoordinatesFilter};
use crate::grid_generator::generate_tiles;
use crate::spatial_join::{SpatialJoin, SpatialPredicate};
use aviary_core::{AviaryError, Coordinates, EpsgCode, GeometryCollection, Result, TileSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Geospatial operation applied by [`GeospatialFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum GeospatialFilterMode {
    /// Drop tiles lying within any reference geometry.
    Difference,
    /// Keep tiles whose interior intersects any reference geometry.
    Intersection,
}

impl GeospatialFilterMode {
    const ALLOWED: &'static str = "difference or intersection";

    pub fn as_str(self) -> &'static str {
        match self {
            GeospatialFilterMode::Difference => "difference",
            GeospatialFilterMode::Intersection => "intersection",
        }
    }

    fn predicate(self) -> SpatialPredicate {
        match self {
            GeospatialFilterMode::Difference => SpatialPredicate::Within,
            GeospatialFilterMode::Intersection => SpatialPredicate::InteriorIntersects,
        }
    }
}

impl FromStr for GeospatialFilterMode {
    type Err = AviaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "difference" => Ok(GeospatialFilterMode::Difference),
            "intersection" => Ok(GeospatialFilterMode::Intersection),
            _ => Err(AviaryError::invalid_mode(Self::ALLOWED, s)),
        }
    }
}

impl TryFrom<String> for GeospatialFilterMode {
    type Error = AviaryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<GeospatialFilterMode> for &'static str {
    fn from(mode: GeospatialFilterMode) -> Self {
        mode.as_str()
    }
}

impl fmt::Display for GeospatialFilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter `coordinates` by the spatial relation of their tiles to `join`'s
/// reference geometries. Input order is preserved.
fn apply(
    coordinates: Coordinates,
    tile_size: TileSize,
    join: &SpatialJoin,
    mode: GeospatialFilterMode,
) -> Coordinates {
    let tiles = generate_tiles(&coordinates, tile_size);
    let flags = join.join(&tiles, mode.predicate());

    coordinates
        .into_iter()
        .zip(flags)
        .filter_map(|(origin, hit)| {
            let keep = match mode {
                GeospatialFilterMode::Difference => !hit,
                GeospatialFilterMode::Intersection => hit,
            };
            tracing::trace!(x = origin.0, y = origin.1, keep, "Geospatial decision");
            keep.then_some(origin)
        })
        .collect()
}

/// Coordinates filter that filters based on reference geometries.
///
/// With [`GeospatialFilterMode::Difference`] a tile is removed when it lies
/// completely within a reference geometry. With
/// [`GeospatialFilterMode::Intersection`] a tile is kept when its interior
/// intersects a reference geometry; tiles only touching a geometry along an
/// edge or at a corner are dropped. This is stricter than a plain
/// `intersects` predicate, where boundary contact counts as a hit, so a
/// tile-aligned polygon keeps only the tiles it covers.
///
/// The reference geometries are indexed once at construction.
#[derive(Debug, Clone)]
pub struct GeospatialFilter {
    tile_size: TileSize,
    epsg_code: EpsgCode,
    join: Arc<SpatialJoin>,
    mode: GeospatialFilterMode,
}

impl GeospatialFilter {
    /// Create a geospatial filter.
    ///
    /// `geometries` must be in the CRS given by `epsg_code`.
    pub fn new(
        tile_size: TileSize,
        epsg_code: EpsgCode,
        geometries: impl Into<Arc<GeometryCollection>>,
        mode: GeospatialFilterMode,
    ) -> Result<Self> {
        let geometries = geometries.into();
        if geometries.epsg_code() != epsg_code {
            return Err(AviaryError::invalid_value(
                "epsg_code",
                format!("geometries must be in {epsg_code}."),
                geometries.epsg_code(),
            ));
        }
        if geometries.is_empty() {
            tracing::warn!(%mode, "Geospatial filter without reference geometries");
        }

        Ok(Self {
            tile_size,
            epsg_code,
            join: Arc::new(SpatialJoin::new(geometries)),
            mode,
        })
    }

    /// Like [`GeospatialFilter::new`], parsing `mode` first.
    pub fn with_mode_str(
        tile_size: TileSize,
        epsg_code: EpsgCode,
        geometries: impl Into<Arc<GeometryCollection>>,
        mode: &str,
    ) -> Result<Self> {
        let mode = mode.parse()?;
        Self::new(tile_size, epsg_code, geometries, mode)
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn epsg_code(&self) -> EpsgCode {
        self.epsg_code
    }

    pub fn geometries(&self) -> &GeometryCollection {
        self.join.geometries()
    }

    pub fn mode(&self) -> GeospatialFilterMode {
        self.mode
    }
}

impl CoordinatesFilter for GeospatialFilter {
    fn name(&self) -> &'static str {
        "geospatial"
    }

    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates> {
        let before = coordinates.len();
        let filtered = apply(coordinates, self.tile_size, &self.join, self.mode);
        log_stage(self.name(), before, filtered.len());
        Ok(filtered)
    }
}

/// One-off geospatial filter. Builds the spatial index for this call only.
pub fn geospatial_filter(
    coordinates: Coordinates,
    tile_size: TileSize,
    epsg_code: EpsgCode,
    geometries: impl Into<Arc<GeometryCollection>>,
    mode: GeospatialFilterMode,
) -> Result<Coordinates> {
    GeospatialFilter::new(tile_size, epsg_code, geometries, mode)?.filter(coordinates)
}
