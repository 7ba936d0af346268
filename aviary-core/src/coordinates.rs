//! Tile origin coordinates.
//!
//! [`Coordinates`] is an ordered sequence of `(x_min, y_min)` pairs, each the
//! bottom left corner of one square tile. The tile size is not stored here; it
//! travels alongside (see `ProcessArea` in `aviary-geodata`). The type imposes
//! no uniqueness invariant.

use crate::error::{AviaryError, Result};
use crate::types::Coordinate;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Bottom left corner `(x_min, y_min)` of one tile.
pub type TileOrigin = (Coordinate, Coordinate);

/// Ordered sequence of tile origins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinates(Vec<TileOrigin>);

impl Coordinates {
    /// Create an empty coordinate sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an empty coordinate sequence with room for `capacity` origins.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Append one origin.
    pub fn push(&mut self, origin: TileOrigin) {
        self.0.push(origin);
    }

    /// Append all origins of `other`.
    pub fn extend_from(&mut self, other: &Coordinates) {
        self.0.extend_from_slice(&other.0);
    }

    /// Borrow the origins as a slice.
    pub fn as_slice(&self) -> &[TileOrigin] {
        &self.0
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<TileOrigin> {
        self.0
    }

    /// Copy of the origins sorted by `(y_min, x_min)`, i.e. row-major.
    ///
    /// Useful for comparing sequences whose order is not guaranteed.
    pub fn sorted(&self) -> Coordinates {
        let mut origins = self.0.clone();
        origins.sort_unstable_by_key(|&(x, y)| (y, x));
        Self(origins)
    }

    /// Parse a JSON array of `[x_min, y_min]` rows.
    ///
    /// Rows that are not two-element integer arrays are type errors.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let rows = value.as_array().ok_or_else(|| {
            AviaryError::invalid_type("coordinates", "array of [x, y] pairs", json_kind(value))
        })?;

        rows.iter().map(origin_from_json).collect()
    }
}

fn origin_from_json(row: &serde_json::Value) -> Result<TileOrigin> {
    let pair = match row.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        Some(other) => {
            return Err(AviaryError::invalid_type(
                "coordinates",
                "[x, y] pair",
                format!("array of length {}", other.len()),
            ))
        }
        None => {
            return Err(AviaryError::invalid_type(
                "coordinates",
                "[x, y] pair",
                json_kind(row),
            ))
        }
    };

    let component = |value: &serde_json::Value| -> Result<Coordinate> {
        let int = value.as_i64().ok_or_else(|| {
            AviaryError::invalid_type("coordinates", "32-bit integer", json_kind(value))
        })?;
        Coordinate::try_from(int).map_err(|_| {
            AviaryError::invalid_type("coordinates", "32-bit integer", int.to_string())
        })
    };

    Ok((component(&pair[0])?, component(&pair[1])?))
}

/// Short description of a JSON value's kind, for type errors.
pub fn json_kind(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".into(),
        serde_json::Value::Bool(_) => "boolean".into(),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => format!("integer {n}"),
        serde_json::Value::Number(n) => format!("float {n}"),
        serde_json::Value::String(_) => "string".into(),
        serde_json::Value::Array(items) => format!("array of length {}", items.len()),
        serde_json::Value::Object(_) => "object".into(),
    }
}

impl Deref for Coordinates {
    type Target = [TileOrigin];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<TileOrigin>> for Coordinates {
    fn from(origins: Vec<TileOrigin>) -> Self {
        Self(origins)
    }
}

impl<const N: usize> From<[TileOrigin; N]> for Coordinates {
    fn from(origins: [TileOrigin; N]) -> Self {
        Self(origins.to_vec())
    }
}

impl FromIterator<TileOrigin> for Coordinates {
    fn from_iter<I: IntoIterator<Item = TileOrigin>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Coordinates {
    type Item = TileOrigin;
    type IntoIter = std::vec::IntoIter<TileOrigin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Coordinates {
    type Item = &'a TileOrigin;
    type IntoIter = std::slice::Iter<'a, TileOrigin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
