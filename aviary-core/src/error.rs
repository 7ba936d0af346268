//! Error types for aviary.
//!
//! Validated inputs fail in one of two tiers:
//!
//! - [`AviaryError::InvalidType`]: the input has the wrong representation
//!   (a bounding box list that is not four entries long, a coordinate row that
//!   is not a pair, a geometry that is not a polygon).
//! - [`AviaryError::InvalidValue`]: the representation is right but a domain
//!   constraint is violated (inverted bounding box, non-positive tile size,
//!   unregistered EPSG code, invalid filter mode).
//!
//! Both tiers are fatal. Nothing in this workspace retries.

use thiserror::Error;

/// Result type alias using [`AviaryError`].
pub type Result<T> = std::result::Result<T, AviaryError>;

/// Aviary error type.
#[derive(Error, Debug)]
pub enum AviaryError {
    /// Input has the wrong representation.
    #[error("Invalid {param}! Expected {expected}, got {actual}.")]
    InvalidType {
        param: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// Input violates a domain constraint.
    #[error("Invalid {param}! {constraint} (got {value})")]
    InvalidValue {
        param: &'static str,
        constraint: String,
        value: String,
    },

    /// WKT parsing error.
    #[error("WKT parse error: {0}")]
    WktParse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AviaryError {
    /// Create a type-kind error.
    pub fn invalid_type(
        param: &'static str,
        expected: &'static str,
        actual: impl Into<String>,
    ) -> Self {
        AviaryError::InvalidType {
            param,
            expected,
            actual: actual.into(),
        }
    }

    /// Create a value-kind error.
    pub fn invalid_value(
        param: &'static str,
        constraint: impl Into<String>,
        value: impl std::fmt::Display,
    ) -> Self {
        AviaryError::InvalidValue {
            param,
            constraint: constraint.into(),
            value: value.to_string(),
        }
    }

    /// Create the error raised for an unknown filter mode.
    pub fn invalid_mode(allowed: &str, value: impl std::fmt::Display) -> Self {
        Self::invalid_value("mode", format!("mode must be one of {allowed}."), value)
    }

    /// True for errors caused by a wrong input representation.
    pub fn is_type_error(&self) -> bool {
        matches!(self, AviaryError::InvalidType { .. })
    }

    /// True for errors caused by a violated domain constraint.
    pub fn is_value_error(&self) -> bool {
        matches!(self, AviaryError::InvalidValue { .. })
    }

    /// Name of the offending parameter, for the two validation tiers.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            AviaryError::InvalidType { param, .. } | AviaryError::InvalidValue { param, .. } => {
                Some(param)
            }
            _ => None,
        }
    }
}
