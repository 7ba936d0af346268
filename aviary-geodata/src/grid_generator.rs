//! Grid generation.
//!
//! Tiles are squares of side `tile_size` identified by their bottom left
//! corner. [`compute_coordinates`] lays such tiles over a bounding box:
//!
//! 1. With `quantize`, the lower corner is floored to a multiple of the tile
//!    size. The upper corner is left as given.
//! 2. Origins stride by the tile size from the lower corner up to, but not
//!    including, `x_max` / `y_max`. A trailing partial tile still gets an
//!    origin; padding it is up to the tile fetcher.
//! 3. Origins are emitted row-major: every `x` of the first row, then every
//!    `x` of the next row.

use aviary_core::bounding_box::floor_to;
use aviary_core::{
    AviaryError, BoundingBox, Coordinate, Coordinates, EpsgCode, GeometryCollection, Result,
    TileOrigin, TileSize,
};
use geo_types::{Coord, Polygon, Rect};

/// Compute the origin `(x_min, y_min)` of every tile covering `bounding_box`.
pub fn compute_coordinates(
    bounding_box: &BoundingBox,
    tile_size: TileSize,
    quantize: bool,
) -> Result<Coordinates> {
    let step = i64::from(tile_size.get());

    let (x_min, y_min) = if quantize {
        let snap = |value: i64| {
            floor_to(value, step).ok_or_else(|| {
                AviaryError::invalid_value(
                    "bounding_box",
                    "quantized bounding box must fit in 64-bit coordinates.",
                    value,
                )
            })
        };
        (snap(bounding_box.x_min())?, snap(bounding_box.y_min())?)
    } else {
        (bounding_box.x_min(), bounding_box.y_min())
    };

    let xs = axis(x_min, bounding_box.x_max(), tile_size)?;
    let ys = axis(y_min, bounding_box.y_max(), tile_size)?;

    let mut coordinates = Coordinates::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            coordinates.push((x, y));
        }
    }

    tracing::debug!(
        bounding_box = %bounding_box,
        tile_size = tile_size.get(),
        quantize,
        columns = xs.len(),
        rows = ys.len(),
        "Computed grid coordinates"
    );

    Ok(coordinates)
}

/// Arithmetic progression `start, start + step, ...` strictly below `end`.
fn axis(start: i64, end: i64, tile_size: TileSize) -> Result<Vec<Coordinate>> {
    (start..end)
        .step_by(tile_size.get() as usize)
        .map(|value| {
            Coordinate::try_from(value).map_err(|_| {
                AviaryError::invalid_value(
                    "bounding_box",
                    "tile origins must fit in 32-bit coordinates.",
                    value,
                )
            })
        })
        .collect()
}

/// Square polygon of side `tile_size` anchored at `origin`.
pub fn tile_polygon(origin: TileOrigin, tile_size: TileSize) -> Polygon<f64> {
    let (x_min, y_min) = (f64::from(origin.0), f64::from(origin.1));
    let size = tile_size.as_f64();
    Rect::new(
        Coord { x: x_min, y: y_min },
        Coord {
            x: x_min + size,
            y: y_min + size,
        },
    )
    .to_polygon()
}

/// One tile polygon per origin, in the same order as `coordinates`.
pub fn generate_tiles(coordinates: &[TileOrigin], tile_size: TileSize) -> Vec<Polygon<f64>> {
    coordinates
        .iter()
        .map(|&origin| tile_polygon(origin, tile_size))
        .collect()
}

/// Tile polygons of the grid covering `bounding_box`, tagged with `epsg_code`.
pub fn generate_grid(
    bounding_box: &BoundingBox,
    tile_size: TileSize,
    epsg_code: EpsgCode,
    quantize: bool,
) -> Result<GeometryCollection> {
    let coordinates = compute_coordinates(bounding_box, tile_size, quantize)?;
    Ok(GeometryCollection::from_polygons(
        epsg_code,
        generate_tiles(&coordinates, tile_size),
    ))
}
