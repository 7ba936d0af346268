//! Scalar aliases and validated newtypes shared across the workspace.

use crate::error::{AviaryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate of a tile origin in meters.
pub type Coordinate = i32;

/// Buffer size in meters.
pub type BufferSize = i64;

/// Tile size in meters, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TileSize(i32);

impl TileSize {
    /// Validate a tile size.
    pub fn new(value: i32) -> Result<Self> {
        if value <= 0 {
            return Err(AviaryError::invalid_value(
                "tile_size",
                "tile_size must be positive.",
                value,
            ));
        }
        Ok(Self(value))
    }

    /// Tile size in meters.
    pub fn get(self) -> i32 {
        self.0
    }

    /// Tile size as `f64`, for polygon construction.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<i32> for TileSize {
    type Error = AviaryError;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TileSize> for i32 {
    fn from(value: TileSize) -> Self {
        value.0
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// EPSG code resolved against the CRS registry.
///
/// The registry is the `crs-definitions` database; codes that do not resolve
/// are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EpsgCode {
    code: u16,
    proj4: &'static str,
}

impl EpsgCode {
    /// Resolve an EPSG code in the CRS registry.
    pub fn new(code: u32) -> Result<Self> {
        let unregistered = || {
            AviaryError::invalid_value(
                "epsg_code",
                "epsg_code must be registered in the CRS registry.",
                code,
            )
        };
        let short = u16::try_from(code).map_err(|_| unregistered())?;
        let proj4 = crs_definitions::from_code(short)
            .map(|def| def.proj4)
            .ok_or_else(unregistered)?;
        Ok(Self { code: short, proj4 })
    }

    /// Numeric EPSG code.
    pub fn code(self) -> u32 {
        u32::from(self.code)
    }

    /// PROJ string of the reference system.
    pub fn proj4(self) -> &'static str {
        self.proj4
    }

    /// True if the reference system uses degrees instead of meters.
    pub fn is_geographic(self) -> bool {
        self.proj4.contains("+proj=longlat")
    }
}

impl TryFrom<u32> for EpsgCode {
    type Error = AviaryError;

    fn try_from(code: u32) -> Result<Self> {
        Self::new(code)
    }
}

impl From<EpsgCode> for u32 {
    fn from(value: EpsgCode) -> Self {
        value.code()
    }
}

impl fmt::Display for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.code)
    }
}
