//! Process areas.
//!
//! A process area is the set of tiles to process: the origin `(x_min, y_min)`
//! of every tile plus the common tile size. Areas can be built from a
//! bounding box, from reference geometries, from JSON or from a
//! [`ProcessAreaConfig`], and combined with set algebra:
//!
//! ```text
//! (&a + &b)?   union
//! (&a - &b)?   difference
//! (&a & &b)?   intersection
//! ```
//!
//! The operators return `Result` because both operands must share a tile size.
//!
//! JSON form: `{"coordinates": [[x_min, y_min], ...], "tile_size": 128}`.

use crate::config::{ProcessAreaConfig, ProcessAreaSource};
use crate::coordinates_filter::{
    duplicates_filter, geospatial_filter, set_filter, CoordinatesFilter, GeospatialFilterMode,
    SetFilterMode,
};
use crate::grid_generator::{compute_coordinates, generate_tiles};
use aviary_core::{
    json_kind, AviaryError, BoundingBox, Coordinates, EpsgCode, GeometryCollection, Result,
    TileOrigin, TileSize,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, BitAnd, Sub};
use std::path::Path;
use std::slice::SliceIndex;

/// Tiles of one tile size, identified by their bottom left corners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessArea {
    coordinates: Coordinates,
    tile_size: TileSize,
}

impl ProcessArea {
    pub fn new(coordinates: Coordinates, tile_size: TileSize) -> Self {
        Self {
            coordinates,
            tile_size,
        }
    }

    /// A process area without tiles.
    pub fn empty(tile_size: TileSize) -> Self {
        Self::new(Coordinates::new(), tile_size)
    }

    /// All tiles covering `bounding_box`.
    pub fn from_bounding_box(
        bounding_box: &BoundingBox,
        tile_size: TileSize,
        quantize: bool,
    ) -> Result<Self> {
        let coordinates = compute_coordinates(bounding_box, tile_size, quantize)?;
        Ok(Self::new(coordinates, tile_size))
    }

    /// All tiles whose interior intersects any of `geometries`.
    ///
    /// Uses [`GeospatialFilterMode::Intersection`], so tiles that only share
    /// an edge or a corner with a geometry are not part of the area.
    pub fn from_geometries(
        geometries: &GeometryCollection,
        tile_size: TileSize,
        quantize: bool,
    ) -> Result<Self> {
        let bounding_box = BoundingBox::from_geometries(geometries)?;
        let coordinates = compute_coordinates(&bounding_box, tile_size, quantize)?;
        let coordinates = geospatial_filter(
            coordinates,
            tile_size,
            geometries.epsg_code(),
            geometries.clone(),
            GeospatialFilterMode::Intersection,
        )?;
        Ok(Self::new(coordinates, tile_size))
    }

    /// Parse the process area JSON form.
    ///
    /// A wrong shape is a type error, a non-positive tile size a value error.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| {
            AviaryError::invalid_type("json", "object with coordinates and tile_size", json_kind(&value))
        })?;

        let coordinates = object.get("coordinates").ok_or_else(|| {
            AviaryError::invalid_type("json", "coordinates field", "missing field")
        })?;
        let coordinates = Coordinates::from_json_value(coordinates)?;

        let tile_size = object
            .get("tile_size")
            .ok_or_else(|| AviaryError::invalid_type("json", "tile_size field", "missing field"))?;
        let tile_size = tile_size.as_i64().ok_or_else(|| {
            AviaryError::invalid_type("tile_size", "integer", json_kind(tile_size))
        })?;
        let tile_size = i32::try_from(tile_size)
            .map_err(|_| {
                AviaryError::invalid_value("tile_size", "tile_size must fit in 32 bits.", tile_size)
            })
            .and_then(TileSize::new)?;

        Ok(Self::new(coordinates, tile_size))
    }

    /// Read the process area JSON form from a file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let process_area = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::debug!(
            path = %path.display(),
            tiles = process_area.len(),
            "Loaded process area"
        );
        Ok(process_area)
    }

    /// Build the process area described by `config`.
    ///
    /// Relative paths in `config` are resolved against `base_dir`.
    pub fn from_config(config: &ProcessAreaConfig, base_dir: &Path) -> Result<Self> {
        let process_area = match config.source()? {
            ProcessAreaSource::Json(path) => {
                Self::from_json_path(ProcessAreaConfig::resolve_path(base_dir, &path))?
            }
            ProcessAreaSource::Geometries { path, tile_size } => {
                let geometries = GeometryCollection::from_wkt_file(
                    config.epsg_code()?,
                    ProcessAreaConfig::resolve_path(base_dir, &path),
                )?;
                Self::from_geometries(&geometries, tile_size, config.quantize)?
            }
            ProcessAreaSource::BoundingBox {
                bounding_box,
                tile_size,
            } => Self::from_bounding_box(&bounding_box, tile_size, config.quantize)?,
        };

        let Some(processed) = &config.processed_json else {
            return Ok(process_area);
        };
        let processed =
            Self::from_json_path(ProcessAreaConfig::resolve_path(base_dir, processed))?;
        process_area.difference(&processed)
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn into_coordinates(self) -> Coordinates {
        self.coordinates
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Covered area in square meters.
    pub fn area(&self) -> u64 {
        let tile_size = u64::from(self.tile_size.get().unsigned_abs());
        self.len() as u64 * tile_size * tile_size
    }

    pub fn iter(&self) -> impl Iterator<Item = TileOrigin> + '_ {
        self.coordinates.iter().copied()
    }

    pub fn get(&self, index: usize) -> Option<TileOrigin> {
        self.coordinates.get(index).copied()
    }

    /// Sub-area over `range`, `None` if the range is out of bounds.
    pub fn slice<I>(&self, range: I) -> Option<Self>
    where
        I: SliceIndex<[TileOrigin], Output = [TileOrigin]>,
    {
        let origins = self.coordinates.get(range)?;
        Some(Self::new(origins.to_vec().into(), self.tile_size))
    }

    pub fn contains(&self, origin: TileOrigin) -> bool {
        self.coordinates.contains(&origin)
    }

    fn check_tile_size(&self, other: &ProcessArea) -> Result<()> {
        if self.tile_size != other.tile_size {
            return Err(AviaryError::invalid_value(
                "tile_size",
                "The tile sizes of the process areas must be equal.",
                format!("{} and {}", self.tile_size, other.tile_size),
            ));
        }
        Ok(())
    }

    fn combine(&self, other: &ProcessArea, mode: SetFilterMode) -> Result<Self> {
        self.check_tile_size(other)?;
        let coordinates = set_filter(self.coordinates.clone(), &other.coordinates, mode);
        Ok(Self::new(coordinates, self.tile_size))
    }

    /// Tiles in either area; duplicates are dropped.
    pub fn union(&self, other: &ProcessArea) -> Result<Self> {
        self.combine(other, SetFilterMode::Union)
    }

    /// Tiles of this area not in `other`.
    pub fn difference(&self, other: &ProcessArea) -> Result<Self> {
        self.combine(other, SetFilterMode::Difference)
    }

    /// Tiles of this area also in `other`.
    pub fn intersection(&self, other: &ProcessArea) -> Result<Self> {
        self.combine(other, SetFilterMode::Intersection)
    }

    /// Copy with `origin` appended; duplicates are dropped.
    pub fn append(&self, origin: TileOrigin) -> Self {
        let mut process_area = self.clone();
        process_area.append_mut(origin);
        process_area
    }

    /// Append `origin` in place; duplicates are dropped.
    pub fn append_mut(&mut self, origin: TileOrigin) -> &mut Self {
        let mut coordinates = std::mem::take(&mut self.coordinates);
        coordinates.push(origin);
        self.coordinates = duplicates_filter(coordinates);
        self
    }

    /// Split into `num_chunks` contiguous areas.
    ///
    /// Chunk sizes differ by at most one, larger chunks first. Asking for more
    /// chunks than tiles yields empty trailing chunks.
    pub fn chunk(&self, num_chunks: usize) -> Result<Vec<Self>> {
        if num_chunks == 0 {
            return Err(AviaryError::invalid_value(
                "num_chunks",
                "num_chunks must be positive.",
                num_chunks,
            ));
        }

        let base = self.len() / num_chunks;
        let extra = self.len() % num_chunks;
        let mut start = 0;

        Ok((0..num_chunks)
            .map(|index| {
                let size = base + usize::from(index < extra);
                let origins = &self.coordinates[start..start + size];
                start += size;
                Self::new(origins.to_vec().into(), self.tile_size)
            })
            .collect())
    }

    /// Copy filtered by `coordinates_filter`.
    pub fn filter(&self, coordinates_filter: &dyn CoordinatesFilter) -> Result<Self> {
        let coordinates = coordinates_filter.filter(self.coordinates.clone())?;
        Ok(Self::new(coordinates, self.tile_size))
    }

    /// Filter in place. On error the area is unchanged.
    pub fn filter_mut(&mut self, coordinates_filter: &dyn CoordinatesFilter) -> Result<&mut Self> {
        self.coordinates = coordinates_filter.filter(self.coordinates.clone())?;
        Ok(self)
    }

    /// Tile polygons tagged with `epsg_code`.
    pub fn to_geometry_collection(&self, epsg_code: EpsgCode) -> GeometryCollection {
        GeometryCollection::from_polygons(
            epsg_code,
            generate_tiles(&self.coordinates, self.tile_size),
        )
    }

    /// Serialize to the JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for ProcessArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 4;

        let fmt_origins = |origins: &[TileOrigin]| -> Vec<String> {
            origins.iter().map(|(x, y)| format!("[{x}, {y}]")).collect()
        };
        let origins = if self.len() > SHOWN {
            let mut shown = fmt_origins(&self.coordinates[..SHOWN / 2]);
            shown.push("...".to_string());
            shown.extend(fmt_origins(&self.coordinates[self.len() - SHOWN / 2..]));
            shown
        } else {
            fmt_origins(&self.coordinates)
        };

        writeln!(f, "ProcessArea(")?;
        writeln!(f, "    coordinates=[{}],", origins.join(", "))?;
        writeln!(f, "    tile_size={},", self.tile_size)?;
        write!(f, ")")
    }
}

impl<'a> IntoIterator for &'a ProcessArea {
    type Item = &'a TileOrigin;
    type IntoIter = std::slice::Iter<'a, TileOrigin>;

    fn into_iter(self) -> Self::IntoIter {
        self.coordinates.iter()
    }
}

impl Add for &ProcessArea {
    type Output = Result<ProcessArea>;

    fn add(self, other: Self) -> Self::Output {
        self.union(other)
    }
}

impl Sub for &ProcessArea {
    type Output = Result<ProcessArea>;

    fn sub(self, other: Self) -> Self::Output {
        self.difference(other)
    }
}

impl BitAnd for &ProcessArea {
    type Output = Result<ProcessArea>;

    fn bitand(self, other: Self) -> Self::Output {
        self.intersection(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates_filter::MaskFilter;

    fn tile_size(value: i32) -> TileSize {
        TileSize::new(value).unwrap()
    }

    fn process_area() -> ProcessArea {
        ProcessArea::new(
            Coordinates::from([(-128, -128), (0, -128), (-128, 0), (0, 0)]),
            tile_size(128),
        )
    }

    #[test]
    fn test_from_bounding_box() {
        let bbox = BoundingBox::new(-128, -128, 128, 128).unwrap();
        let area = ProcessArea::from_bounding_box(&bbox, tile_size(128), true).unwrap();
        assert_eq!(area, process_area());
        assert_eq!(area.area(), 4 * 128 * 128);
    }

    #[test]
    fn test_from_geometries() {
        let epsg = EpsgCode::new(25832).unwrap();
        let geometries = GeometryCollection::from_wkt(
            epsg,
            ["POLYGON((-96 -96, 96 -96, 96 -32, -96 -32, -96 -96))"],
        )
        .unwrap();
        let area = ProcessArea::from_geometries(&geometries, tile_size(128), true).unwrap();
        assert_eq!(area.coordinates().as_slice(), &[(-128, -128), (0, -128)]);
    }

    #[test]
    fn test_from_geometries_skips_touching_tiles() {
        let epsg = EpsgCode::new(25832).unwrap();
        let geometries = GeometryCollection::from_wkt(
            epsg,
            [
                "POLYGON((-128 -128, 0 -128, 0 0, -128 0, -128 -128))",
                "POLYGON((100 100, 120 100, 120 120, 100 120, 100 100))",
            ],
        )
        .unwrap();
        let area = ProcessArea::from_geometries(&geometries, tile_size(128), true).unwrap();
        assert_eq!(area.coordinates().as_slice(), &[(-128, -128), (0, 0)]);
    }

    #[test]
    fn test_from_json() {
        let area = ProcessArea::from_json(
            r#"{"coordinates": [[-128, -128], [0, -128], [-128, 0], [0, 0]], "tile_size": 128}"#,
        )
        .unwrap();
        assert_eq!(area, process_area());

        let empty = ProcessArea::from_json(r#"{"coordinates": [], "tile_size": 64}"#).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.tile_size(), tile_size(64));
    }

    #[test]
    fn test_json_round_trip() {
        let json = process_area().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"coordinates":[[-128,-128],[0,-128],[-128,0],[0,0]],"tile_size":128}"#
        );
        assert_eq!(ProcessArea::from_json(&json).unwrap(), process_area());
    }

    #[test]
    fn test_from_json_errors() {
        let err = ProcessArea::from_json(r#"{"coordinates": [[0, 0, 0]], "tile_size": 128}"#)
            .unwrap_err();
        assert!(err.is_type_error());

        let err = ProcessArea::from_json(r#"{"coordinates": [[0, 0]]}"#).unwrap_err();
        assert!(err.is_type_error());

        let err = ProcessArea::from_json(r#"[[0, 0]]"#).unwrap_err();
        assert!(err.is_type_error());

        let err = ProcessArea::from_json(r#"{"coordinates": [], "tile_size": -1}"#).unwrap_err();
        assert!(err.is_value_error());

        let err = ProcessArea::from_json("{").unwrap_err();
        assert!(matches!(err, AviaryError::Json(_)));
    }

    #[test]
    fn test_accessors() {
        let area = process_area();
        assert_eq!(area.len(), 4);
        assert_eq!(area.get(1), Some((0, -128)));
        assert_eq!(area.get(4), None);
        assert!(area.contains((-128, 0)));
        assert!(!area.contains((128, 0)));
        assert_eq!(area.iter().count(), 4);
        assert_eq!((&area).into_iter().next(), Some(&(-128, -128)));

        let sliced = area.slice(1..3).unwrap();
        assert_eq!(sliced.coordinates().as_slice(), &[(0, -128), (-128, 0)]);
        assert_eq!(sliced.tile_size(), area.tile_size());
        assert!(area.slice(2..9).is_none());
    }

    #[test]
    fn test_set_algebra() {
        let area = process_area();
        let other = ProcessArea::new(Coordinates::from([(0, 0), (128, 0)]), tile_size(128));

        let union = (&area + &other).unwrap();
        assert_eq!(
            union.coordinates().as_slice(),
            &[(-128, -128), (0, -128), (-128, 0), (0, 0), (128, 0)]
        );

        let difference = (&area - &other).unwrap();
        assert_eq!(
            difference.coordinates().as_slice(),
            &[(-128, -128), (0, -128), (-128, 0)]
        );

        let intersection = (&area & &other).unwrap();
        assert_eq!(intersection.coordinates().as_slice(), &[(0, 0)]);
    }

    #[test]
    fn test_set_algebra_tile_size_mismatch() {
        let other = ProcessArea::empty(tile_size(64));
        let err = (&process_area() + &other).unwrap_err();
        assert!(err.is_value_error());
        assert_eq!(err.param(), Some("tile_size"));
        assert!((&process_area() - &other).is_err());
        assert!((&process_area() & &other).is_err());
    }

    #[test]
    fn test_append() {
        let area = process_area().append((128, 0));
        assert_eq!(area.len(), 5);
        assert_eq!(area.get(4), Some((128, 0)));

        let mut area = process_area();
        area.append_mut((0, 0));
        assert_eq!(area, process_area());
    }

    #[test]
    fn test_chunk() {
        let area = ProcessArea::new(
            (0..5).map(|i| (i * 128, 0)).collect(),
            tile_size(128),
        );

        let chunks = area.chunk(2).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(ProcessArea::len).collect();
        assert_eq!(sizes, vec![3, 2]);
        assert_eq!(chunks[1].coordinates().as_slice(), &[(384, 0), (512, 0)]);

        let chunks = area.chunk(7).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(ProcessArea::len).collect();
        assert_eq!(sizes, vec![1, 1, 1, 1, 1, 0, 0]);

        assert!(area.chunk(0).unwrap_err().is_value_error());
    }

    #[test]
    fn test_filter() {
        let mask = MaskFilter::new([true, false, false, true]);
        let filtered = process_area().filter(&mask).unwrap();
        assert_eq!(filtered.coordinates().as_slice(), &[(-128, -128), (0, 0)]);

        let mut area = process_area();
        assert!(area.filter_mut(&MaskFilter::new([true])).is_err());
        assert_eq!(area, process_area());
    }

    #[test]
    fn test_to_geometry_collection() {
        let epsg = EpsgCode::new(25832).unwrap();
        let collection = process_area().to_geometry_collection(epsg);
        assert_eq!(collection.len(), 4);
        assert_eq!(collection.epsg_code(), epsg);
    }

    #[test]
    fn test_display() {
        let area = ProcessArea::new(
            (0..5).map(|i| (i * 128, 0)).collect(),
            tile_size(128),
        );
        assert_eq!(
            area.to_string(),
            "ProcessArea(\n    coordinates=[[0, 0], [128, 0], ..., [384, 0], [512, 0]],\n    tile_size=128,\n)"
        );
    }
}
