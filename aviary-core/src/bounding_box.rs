//! Bounding box of an area of interest.
//!
//! A [`BoundingBox`] is four integer coordinates in meters with
//! `x_min < x_max` and `y_min < y_max`. The invariant holds after every public
//! operation: construction validates both axes, each setter validates against
//! the opposite corner, and a failed operation leaves the box unchanged.

use crate::error::{AviaryError, Result};
use crate::geometry::GeometryCollection;
use crate::types::{BufferSize, EpsgCode};
use geo_types::{Coord, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned bounding box in a projected CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i64; 4]", into = "[i64; 4]")]
pub struct BoundingBox {
    x_min: i64,
    y_min: i64,
    x_max: i64,
    y_max: i64,
}

fn x_error(x_min: i64, x_max: i64) -> AviaryError {
    AviaryError::invalid_value(
        "bounding_box",
        "x_min must be less than x_max.",
        format!("x_min={x_min}, x_max={x_max}"),
    )
}

fn y_error(y_min: i64, y_max: i64) -> AviaryError {
    AviaryError::invalid_value(
        "bounding_box",
        "y_min must be less than y_max.",
        format!("y_min={y_min}, y_max={y_max}"),
    )
}

impl BoundingBox {
    /// Create a bounding box.
    pub fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Result<Self> {
        if x_min >= x_max {
            return Err(x_error(x_min, x_max));
        }
        if y_min >= y_max {
            return Err(y_error(y_min, y_max));
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Create the smallest integer bounding box covering a geometry collection.
    ///
    /// The minimum corner is floored and the maximum corner is ceiled.
    pub fn from_geometries(geometries: &GeometryCollection) -> Result<Self> {
        let rect = geometries.total_bounds().ok_or_else(|| {
            AviaryError::invalid_value(
                "geometries",
                "geometries must contain at least one geometry.",
                "empty collection",
            )
        })?;

        Self::new(
            rect.min().x.floor() as i64,
            rect.min().y.floor() as i64,
            rect.max().x.ceil() as i64,
            rect.max().y.ceil() as i64,
        )
    }

    pub fn x_min(&self) -> i64 {
        self.x_min
    }

    pub fn y_min(&self) -> i64 {
        self.y_min
    }

    pub fn x_max(&self) -> i64 {
        self.x_max
    }

    pub fn y_max(&self) -> i64 {
        self.y_max
    }

    /// Set `x_min`; fails if `value >= x_max`.
    pub fn set_x_min(&mut self, value: i64) -> Result<()> {
        if value >= self.x_max {
            return Err(x_error(value, self.x_max));
        }
        self.x_min = value;
        Ok(())
    }

    /// Set `y_min`; fails if `value >= y_max`.
    pub fn set_y_min(&mut self, value: i64) -> Result<()> {
        if value >= self.y_max {
            return Err(y_error(value, self.y_max));
        }
        self.y_min = value;
        Ok(())
    }

    /// Set `x_max`; fails if `value <= x_min`.
    pub fn set_x_max(&mut self, value: i64) -> Result<()> {
        if value <= self.x_min {
            return Err(x_error(self.x_min, value));
        }
        self.x_max = value;
        Ok(())
    }

    /// Set `y_max`; fails if `value <= y_min`.
    pub fn set_y_max(&mut self, value: i64) -> Result<()> {
        if value <= self.y_min {
            return Err(y_error(self.y_min, value));
        }
        self.y_max = value;
        Ok(())
    }

    pub fn width(&self) -> u64 {
        self.x_max.abs_diff(self.x_min)
    }

    pub fn height(&self) -> u64 {
        self.y_max.abs_diff(self.y_min)
    }

    /// Area in square meters.
    pub fn area(&self) -> u128 {
        u128::from(self.width()) * u128::from(self.height())
    }

    /// Corners as `[x_min, y_min, x_max, y_max]`.
    pub fn to_array(&self) -> [i64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// Corner by position in `(x_min, y_min, x_max, y_max)`.
    pub fn get(&self, index: usize) -> Option<i64> {
        self.to_array().get(index).copied()
    }

    /// Iterate over `x_min, y_min, x_max, y_max`.
    pub fn iter(&self) -> impl Iterator<Item = i64> {
        self.to_array().into_iter()
    }

    /// Expand (positive) or shrink (negative) every side by `buffer_size`.
    ///
    /// A negative size whose magnitude reaches half the width or half the
    /// height is rejected, since it would collapse or invert the box.
    pub fn buffer(&self, buffer_size: BufferSize) -> Result<Self> {
        let magnitude = u128::from(buffer_size.unsigned_abs()) * 2;
        let collapses = magnitude >= u128::from(self.width())
            || magnitude >= u128::from(self.height());

        if buffer_size < 0 && collapses {
            return Err(AviaryError::invalid_value(
                "buffer_size",
                "buffer_size must be less than half the width or height of the bounding box.",
                buffer_size,
            ));
        }

        let overflow = || {
            AviaryError::invalid_value(
                "buffer_size",
                "buffered bounding box must fit in 64-bit coordinates.",
                buffer_size,
            )
        };

        Self::new(
            self.x_min.checked_sub(buffer_size).ok_or_else(overflow)?,
            self.y_min.checked_sub(buffer_size).ok_or_else(overflow)?,
            self.x_max.checked_add(buffer_size).ok_or_else(overflow)?,
            self.y_max.checked_add(buffer_size).ok_or_else(overflow)?,
        )
    }

    /// In-place variant of [`buffer`](Self::buffer).
    pub fn buffer_mut(&mut self, buffer_size: BufferSize) -> Result<&mut Self> {
        *self = self.buffer(buffer_size)?;
        Ok(self)
    }

    /// Snap the box outward to multiples of `value`.
    ///
    /// The minimum corner is floored and the maximum corner is ceiled, so the
    /// result always covers the original box. Fails if a snapped corner
    /// leaves the 64-bit range.
    pub fn quantize(&self, value: i64) -> Result<Self> {
        if value <= 0 {
            return Err(AviaryError::invalid_value(
                "value",
                "value must be positive.",
                value,
            ));
        }

        let overflow = || {
            AviaryError::invalid_value(
                "value",
                "quantized bounding box must fit in 64-bit coordinates.",
                value,
            )
        };

        Self::new(
            floor_to(self.x_min, value).ok_or_else(overflow)?,
            floor_to(self.y_min, value).ok_or_else(overflow)?,
            ceil_to(self.x_max, value).ok_or_else(overflow)?,
            ceil_to(self.y_max, value).ok_or_else(overflow)?,
        )
    }

    /// In-place variant of [`quantize`](Self::quantize).
    pub fn quantize_mut(&mut self, value: i64) -> Result<&mut Self> {
        *self = self.quantize(value)?;
        Ok(self)
    }

    /// Box as a polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            Coord {
                x: self.x_min as f64,
                y: self.y_min as f64,
            },
            Coord {
                x: self.x_max as f64,
                y: self.y_max as f64,
            },
        )
        .to_polygon()
    }

    /// Box as a single-polygon geometry collection.
    pub fn to_geometry_collection(&self, epsg_code: EpsgCode) -> GeometryCollection {
        GeometryCollection::from_polygons(epsg_code, [self.to_polygon()])
    }
}

/// Largest multiple of `value` that is `<= coordinate`, or `None` if it is
/// below `i64::MIN`. `value` must be positive.
pub fn floor_to(coordinate: i64, value: i64) -> Option<i64> {
    coordinate.checked_sub(coordinate.rem_euclid(value))
}

/// Smallest multiple of `value` that is `>= coordinate`, or `None` if it is
/// above `i64::MAX`. `value` must be positive.
fn ceil_to(coordinate: i64, value: i64) -> Option<i64> {
    coordinate.checked_add((value - coordinate.rem_euclid(value)).rem_euclid(value))
}

impl TryFrom<[i64; 4]> for BoundingBox {
    type Error = AviaryError;

    fn try_from([x_min, y_min, x_max, y_max]: [i64; 4]) -> Result<Self> {
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl TryFrom<&[i64]> for BoundingBox {
    type Error = AviaryError;

    fn try_from(values: &[i64]) -> Result<Self> {
        let corners: [i64; 4] = values.try_into().map_err(|_| {
            AviaryError::invalid_type(
                "bounding_box",
                "4 integers (x_min, y_min, x_max, y_max)",
                format!("{} integers", values.len()),
            )
        })?;
        Self::try_from(corners)
    }
}

impl From<BoundingBox> for [i64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox(x_min={}, y_min={}, x_max={}, y_max={})",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> BoundingBox {
        BoundingBox::new(x_min, y_min, x_max, y_max).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_axes() {
        let err = BoundingBox::new(128, -128, -128, 128).unwrap_err();
        assert!(err.is_value_error());
        assert!(err.to_string().contains("x_min must be less than x_max"));

        let err = BoundingBox::new(-128, 128, 128, 128).unwrap_err();
        assert!(err.to_string().contains("y_min must be less than y_max"));
    }

    #[test]
    fn test_setters_revalidate() {
        let mut b = bbox(-128, -128, 128, 128);

        assert!(b.set_x_min(128).is_err());
        assert!(b.set_y_min(200).is_err());
        assert!(b.set_x_max(-128).is_err());
        assert!(b.set_y_max(-200).is_err());
        assert_eq!(b, bbox(-128, -128, 128, 128));

        b.set_x_min(-256).unwrap();
        b.set_y_max(512).unwrap();
        assert_eq!(b.to_array(), [-256, -128, 128, 512]);
    }

    #[test]
    fn test_buffer() {
        let b = bbox(-128, -128, 128, 128);
        assert_eq!(b.buffer(0).unwrap(), b);
        assert_eq!(b.buffer(64).unwrap(), bbox(-192, -192, 192, 192));
        assert_eq!(b.buffer(-64).unwrap(), bbox(-64, -64, 64, 64));
        assert!(b.buffer(-128).unwrap_err().is_value_error());
        assert!(b.buffer(-192).unwrap_err().is_value_error());
    }

    #[test]
    fn test_buffer_non_square_box() {
        // 512 wide, 128 tall: shrinking by 64 collapses the height only.
        let b = bbox(0, 0, 512, 128);
        let err = b.buffer(-64).unwrap_err();
        assert_eq!(err.param(), Some("buffer_size"));
        assert_eq!(b.buffer(-63).unwrap(), bbox(63, 63, 449, 65));
    }

    #[test]
    fn test_buffer_mut() {
        let mut b = bbox(-128, -128, 128, 128);
        b.buffer_mut(64).unwrap();
        assert_eq!(b, bbox(-192, -192, 192, 192));

        assert!(b.buffer_mut(-500).is_err());
        assert_eq!(b, bbox(-192, -192, 192, 192));
    }

    #[test]
    fn test_quantize() {
        assert_eq!(
            bbox(-127, -127, 127, 127).quantize(128).unwrap(),
            bbox(-128, -128, 128, 128)
        );
        assert_eq!(
            bbox(127, 127, 257, 257).quantize(128).unwrap(),
            bbox(0, 0, 384, 384)
        );
        assert_eq!(
            bbox(363084, 5715326, 363340, 5715582).quantize(128).unwrap(),
            bbox(363008, 5715200, 363392, 5715584)
        );
        assert!(bbox(0, 0, 1, 1).quantize(0).unwrap_err().is_value_error());
        assert!(bbox(0, 0, 1, 1).quantize(-128).unwrap_err().is_value_error());
    }

    #[test]
    fn test_quantize_covers_original() {
        for value in [1, 3, 7, 64, 100, 128] {
            for (x_min, y_min, x_max, y_max) in
                [(-300, -17, 5, 900), (1, 2, 3, 4), (-1000, -1000, -999, -1)]
            {
                let b = bbox(x_min, y_min, x_max, y_max);
                let q = b.quantize(value).unwrap();
                for corner in q.iter() {
                    assert_eq!(corner.rem_euclid(value), 0);
                }
                assert!(q.x_min() <= b.x_min() && q.y_min() <= b.y_min());
                assert!(q.x_max() >= b.x_max() && q.y_max() >= b.y_max());
            }
        }
    }

    #[test]
    fn test_tuple_view() {
        let b = bbox(1, 2, 3, 4);
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(b.get(2), Some(3));
        assert_eq!(b.get(4), None);
        assert_eq!(b.area(), 4);
    }

    #[test]
    fn test_full_range_box() {
        let b = bbox(i64::MIN, 0, i64::MAX, 10);
        assert_eq!(b.width(), u64::MAX);
        assert_eq!(b.height(), 10);
        assert_eq!(b.area(), u128::from(u64::MAX) * 10);

        assert_eq!(
            b.buffer(-1).unwrap(),
            bbox(i64::MIN + 1, 1, i64::MAX - 1, 9)
        );
        assert!(b.buffer(-5).unwrap_err().is_value_error());

        let err = b.buffer(1).unwrap_err();
        assert_eq!(err.param(), Some("buffer_size"));
    }

    #[test]
    fn test_quantize_out_of_range() {
        let err = bbox(0, 0, i64::MAX - 1, 10).quantize(128).unwrap_err();
        assert!(err.is_value_error());
        assert_eq!(err.param(), Some("value"));

        let err = bbox(i64::MIN, 0, 0, 10).quantize(1000).unwrap_err();
        assert_eq!(err.param(), Some("value"));

        // Already aligned corners need no room to snap.
        assert_eq!(
            bbox(i64::MIN, 0, 0, 10).quantize(1).unwrap(),
            bbox(i64::MIN, 0, 0, 10)
        );
    }

    #[test]
    fn test_try_from_slice() {
        let values: &[i64] = &[0, 0, 128, 128];
        assert_eq!(BoundingBox::try_from(values).unwrap(), bbox(0, 0, 128, 128));

        let values: &[i64] = &[0, 0, 128];
        assert!(BoundingBox::try_from(values).unwrap_err().is_type_error());

        let values: &[i64] = &[0, 0, 0, 128];
        assert!(BoundingBox::try_from(values).unwrap_err().is_value_error());
    }

    #[test]
    fn test_serde() {
        let b: BoundingBox = serde_json::from_str("[-128, -128, 128, 128]").unwrap();
        assert_eq!(b, bbox(-128, -128, 128, 128));
        assert_eq!(serde_json::to_string(&b).unwrap(), "[-128,-128,128,128]");
        assert!(serde_json::from_str::<BoundingBox>("[128, -128, -128, 128]").is_err());
    }

    #[test]
    fn test_from_geometries() {
        let epsg = EpsgCode::new(25832).unwrap();
        let geometries = GeometryCollection::from_wkt(
            epsg,
            ["POLYGON((-0.5 0.2, 10.1 0.2, 10.1 20.9, -0.5 20.9, -0.5 0.2))"],
        )
        .unwrap();
        assert_eq!(
            BoundingBox::from_geometries(&geometries).unwrap(),
            bbox(-1, 0, 11, 21)
        );
        assert!(BoundingBox::from_geometries(&GeometryCollection::empty(epsg)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            bbox(0, 1, 2, 3).to_string(),
            "BoundingBox(x_min=0, y_min=1, x_max=2, y_max=3)"
        );
    }
}
