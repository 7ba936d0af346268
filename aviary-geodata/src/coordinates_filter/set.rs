//! Set algebra on tile origins.

use super::{duplicates_filter, log_stage, CoordinatesFilter};
use aviary_core::{AviaryError, Coordinates, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Set operation applied by [`SetFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SetFilterMode {
    /// Keep origins not in the additional coordinates.
    Difference,
    /// Keep origins also in the additional coordinates.
    Intersection,
    /// Concatenate both sequences, then drop duplicates.
    Union,
}

impl SetFilterMode {
    const ALLOWED: &'static str = "difference, intersection or union";

    pub fn as_str(self) -> &'static str {
        match self {
            SetFilterMode::Difference => "difference",
            SetFilterMode::Intersection => "intersection",
            SetFilterMode::Union => "union",
        }
    }
}

impl FromStr for SetFilterMode {
    type Err = AviaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "difference" => Ok(SetFilterMode::Difference),
            "intersection" => Ok(SetFilterMode::Intersection),
            "union" => Ok(SetFilterMode::Union),
            _ => Err(AviaryError::invalid_mode(Self::ALLOWED, s)),
        }
    }
}

impl TryFrom<String> for SetFilterMode {
    type Error = AviaryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SetFilterMode> for &'static str {
    fn from(mode: SetFilterMode) -> Self {
        mode.as_str()
    }
}

impl fmt::Display for SetFilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine `coordinates` with `additional_coordinates`.
///
/// Membership compares whole `(x, y)` pairs. Difference and intersection keep
/// the order of `coordinates`; union appends `additional_coordinates` and
/// keeps the first occurrence of every origin.
pub fn set_filter(
    coordinates: Coordinates,
    additional_coordinates: &Coordinates,
    mode: SetFilterMode,
) -> Coordinates {
    match mode {
        SetFilterMode::Difference => {
            let other: FxHashSet<_> = additional_coordinates.iter().copied().collect();
            coordinates
                .into_iter()
                .filter(|origin| !other.contains(origin))
                .collect()
        }
        SetFilterMode::Intersection => {
            let other: FxHashSet<_> = additional_coordinates.iter().copied().collect();
            coordinates
                .into_iter()
                .filter(|origin| other.contains(origin))
                .collect()
        }
        SetFilterMode::Union => {
            let mut combined = coordinates;
            combined.extend_from(additional_coordinates);
            duplicates_filter(combined)
        }
    }
}

/// Coordinates filter that applies a set operation against fixed coordinates.
#[derive(Debug, Clone)]
pub struct SetFilter {
    additional_coordinates: Coordinates,
    mode: SetFilterMode,
}

impl SetFilter {
    pub fn new(additional_coordinates: Coordinates, mode: SetFilterMode) -> Self {
        Self {
            additional_coordinates,
            mode,
        }
    }

    /// Like [`SetFilter::new`], parsing `mode` first.
    pub fn with_mode_str(additional_coordinates: Coordinates, mode: &str) -> Result<Self> {
        Ok(Self::new(additional_coordinates, mode.parse()?))
    }

    pub fn additional_coordinates(&self) -> &Coordinates {
        &self.additional_coordinates
    }

    pub fn mode(&self) -> SetFilterMode {
        self.mode
    }
}

impl CoordinatesFilter for SetFilter {
    fn name(&self) -> &'static str {
        "set"
    }

    fn filter(&self, coordinates: Coordinates) -> Result<Coordinates> {
        let before = coordinates.len();
        let filtered = set_filter(coordinates, &self.additional_coordinates, self.mode);
        log_stage(self.name(), before, filtered.len());
        Ok(filtered)
    }
}
