//! Process area configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! bounding_box = [363084, 5715326, 363340, 5715582]
//! tile_size = 128
//! epsg_code = 25832
//! quantize = true
//! processed_json = "processed.json"
//! ```
//!
//! ## Sources (first usable wins)
//!
//! 1. `json`: a process area JSON file
//! 2. `geometries` + `tile_size`: a WKT file, one polygon per line
//! 3. `bounding_box` + `tile_size`
//!
//! `processed_json` is optional and subtracted from whichever source is used.
//! Relative paths are resolved against the directory passed to
//! [`ProcessAreaConfig::resolve_path`], usually the config file's directory.

use aviary_core::{AviaryError, BoundingBox, EpsgCode, Result, TileSize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_epsg_code() -> u32 {
    25832
}

fn default_quantize() -> bool {
    true
}

/// Configuration for [`ProcessArea::from_config`](crate::ProcessArea::from_config).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessAreaConfig {
    /// `[x_min, y_min, x_max, y_max]`
    #[serde(default)]
    pub bounding_box: Option<Vec<i64>>,

    /// WKT file with the reference geometries.
    #[serde(default)]
    pub geometries: Option<PathBuf>,

    /// Process area JSON file.
    #[serde(default)]
    pub json: Option<PathBuf>,

    /// Process area JSON file of already processed tiles.
    #[serde(default)]
    pub processed_json: Option<PathBuf>,

    #[serde(default)]
    pub tile_size: Option<i32>,

    /// CRS of `geometries`.
    #[serde(default = "default_epsg_code")]
    pub epsg_code: u32,

    #[serde(default = "default_quantize")]
    pub quantize: bool,
}

impl Default for ProcessAreaConfig {
    fn default() -> Self {
        Self {
            bounding_box: None,
            geometries: None,
            json: None,
            processed_json: None,
            tile_size: None,
            epsg_code: default_epsg_code(),
            quantize: default_quantize(),
        }
    }
}

/// Where a configured process area comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessAreaSource {
    Json(PathBuf),
    Geometries { path: PathBuf, tile_size: TileSize },
    BoundingBox { bounding_box: BoundingBox, tile_size: TileSize },
}

impl ProcessAreaConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded process area config");
        Ok(config)
    }

    /// Check field shapes and that at least one source is usable.
    pub fn validate(&self) -> Result<()> {
        self.epsg_code()?;
        self.source().map(|_| ())
    }

    /// The configured bounding box, validated.
    pub fn bounding_box(&self) -> Result<Option<BoundingBox>> {
        self.bounding_box
            .as_deref()
            .map(BoundingBox::try_from)
            .transpose()
    }

    /// The configured tile size, validated.
    pub fn tile_size(&self) -> Result<Option<TileSize>> {
        self.tile_size.map(TileSize::new).transpose()
    }

    pub fn epsg_code(&self) -> Result<EpsgCode> {
        EpsgCode::new(self.epsg_code)
    }

    /// Pick the source by precedence: json, geometries, bounding box.
    pub fn source(&self) -> Result<ProcessAreaSource> {
        let bounding_box = self.bounding_box()?;
        let tile_size = self.tile_size()?;

        if let Some(path) = &self.json {
            return Ok(ProcessAreaSource::Json(path.clone()));
        }
        match (&self.geometries, bounding_box, tile_size) {
            (Some(path), _, Some(tile_size)) => Ok(ProcessAreaSource::Geometries {
                path: path.clone(),
                tile_size,
            }),
            (None, Some(bounding_box), Some(tile_size)) => Ok(ProcessAreaSource::BoundingBox {
                bounding_box,
                tile_size,
            }),
            _ => Err(AviaryError::invalid_value(
                "config",
                "config must have one of the following field sets: \
                 json | geometries, tile_size | bounding_box, tile_size.",
                self.present_fields(),
            )),
        }
    }

    /// Resolve `path` against `base_dir` unless it is absolute.
    pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    fn present_fields(&self) -> String {
        let fields: Vec<&str> = [
            ("bounding_box", self.bounding_box.is_some()),
            ("geometries", self.geometries.is_some()),
            ("json", self.json.is_some()),
            ("processed_json", self.processed_json.is_some()),
            ("tile_size", self.tile_size.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        if fields.is_empty() {
            "no fields".to_string()
        } else {
            fields.join(", ")
        }
    }
}
