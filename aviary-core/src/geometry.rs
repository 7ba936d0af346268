//! Reference geometries tagged with a coordinate reference system.
//!
//! A [`GeometryCollection`] holds the polygons a geospatial filter tests tiles
//! against (areas of interest, already processed regions, ...). Only polygonal
//! geometries are accepted; anything else is a type error.
//!
//! Geometries are read from WKT, one geometry per line when loaded from a
//! file. Blank lines and lines starting with `#` are skipped.

use crate::error::{AviaryError, Result};
use crate::types::EpsgCode;
use geo::BoundingRect;
use geo_types::{Coord, Geometry, Polygon, Rect};
use std::path::Path;

/// WKT-style name of a geometry's type, for error messages.
fn type_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Polygonal reference geometries in one coordinate reference system.
#[derive(Debug, Clone)]
pub struct GeometryCollection {
    epsg_code: EpsgCode,
    geometries: Vec<Geometry<f64>>,
}

impl GeometryCollection {
    /// Create a collection, rejecting non-polygonal geometries.
    pub fn new(epsg_code: EpsgCode, geometries: Vec<Geometry<f64>>) -> Result<Self> {
        if let Some(geom) = geometries
            .iter()
            .find(|geom| !matches!(geom, Geometry::Polygon(_) | Geometry::MultiPolygon(_)))
        {
            return Err(AviaryError::invalid_type(
                "geometries",
                "Polygon or MultiPolygon",
                type_name(geom),
            ));
        }
        Ok(Self {
            epsg_code,
            geometries,
        })
    }

    /// Create an empty collection.
    pub fn empty(epsg_code: EpsgCode) -> Self {
        Self {
            epsg_code,
            geometries: Vec::new(),
        }
    }

    /// Create a collection from polygons.
    pub fn from_polygons(epsg_code: EpsgCode, polygons: impl IntoIterator<Item = Polygon<f64>>) -> Self {
        Self {
            epsg_code,
            geometries: polygons.into_iter().map(Geometry::Polygon).collect(),
        }
    }

    /// Parse one WKT string per geometry.
    pub fn from_wkt<'a>(
        epsg_code: EpsgCode,
        wkts: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let geometries = wkts.into_iter().map(parse_wkt).collect::<Result<Vec<_>>>()?;
        Self::new(epsg_code, geometries)
    }

    /// Read a file with one WKT geometry per line.
    pub fn from_wkt_file(epsg_code: EpsgCode, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let lines = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        let collection = Self::from_wkt(epsg_code, lines)?;

        tracing::debug!(
            path = %path.display(),
            geometries = collection.len(),
            "Loaded reference geometries"
        );
        Ok(collection)
    }

    /// Coordinate reference system of the geometries.
    pub fn epsg_code(&self) -> EpsgCode {
        self.epsg_code
    }

    /// The geometries in insertion order.
    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    /// Number of geometries.
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Iterate over the geometries.
    pub fn iter(&self) -> impl Iterator<Item = &Geometry<f64>> {
        self.geometries.iter()
    }

    /// Total extent of all geometries, `None` if the collection is empty.
    pub fn total_bounds(&self) -> Option<Rect<f64>> {
        self.geometries
            .iter()
            .filter_map(|geom| geom.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}

/// Parse WKT string to geo-types Geometry.
pub fn parse_wkt(wkt: &str) -> Result<Geometry<f64>> {
    use wkt::TryFromWkt;
    Geometry::<f64>::try_from_wkt_str(wkt).map_err(|e| AviaryError::WktParse(format!("{:?}", e)))
}
