//! Spatial join between tile polygons and reference geometries.
//!
//! The reference envelopes are bulk-loaded into an R-tree once. Each tile
//! queries the tree with its own envelope (touching envelopes are returned),
//! and the candidates are refined with the exact `geo` predicate:
//!
//! - [`SpatialPredicate::Within`]: the reference geometry contains the tile.
//! - [`SpatialPredicate::InteriorIntersects`]: the interiors of the tile and
//!   the reference geometry intersect. Tiles that only share an edge or a
//!   corner with the reference geometry do not match.

use aviary_core::GeometryCollection;
use geo::{BoundingRect, Contains, Relate};
use geo_types::{Geometry, Polygon, Rect};
use rstar::{RTree, RTreeObject, AABB};
use std::fmt;
use std::sync::Arc;

/// Predicate a tile must satisfy against at least one reference geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialPredicate {
    Within,
    InteriorIntersects,
}

/// Envelope of one reference geometry, by position in the collection.
#[derive(Debug, Clone)]
struct IndexedEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn aabb(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// R-tree backed index over a reference geometry collection.
pub struct SpatialJoin {
    geometries: Arc<GeometryCollection>,
    tree: RTree<IndexedEnvelope>,
}

impl fmt::Debug for SpatialJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialJoin")
            .field("epsg_code", &self.geometries.epsg_code())
            .field("geometries", &self.geometries.len())
            .field("indexed", &self.tree.size())
            .finish()
    }
}

impl SpatialJoin {
    /// Index the envelopes of `geometries`.
    pub fn new(geometries: impl Into<Arc<GeometryCollection>>) -> Self {
        let geometries = geometries.into();
        let entries = geometries
            .iter()
            .enumerate()
            .filter_map(|(index, geom)| {
                geom.bounding_rect().map(|rect| IndexedEnvelope {
                    index,
                    envelope: aabb(rect),
                })
            })
            .collect();

        Self {
            geometries,
            tree: RTree::bulk_load(entries),
        }
    }

    /// The indexed reference geometries.
    pub fn geometries(&self) -> &GeometryCollection {
        &self.geometries
    }

    /// Check whether `tile` satisfies `predicate` against any reference geometry.
    pub fn matches(&self, tile: &Polygon<f64>, predicate: SpatialPredicate) -> bool {
        let Some(rect) = tile.bounding_rect() else {
            return false;
        };
        let tile_geom = Geometry::Polygon(tile.clone());
        let references = self.geometries.geometries();

        self.tree
            .locate_in_envelope_intersecting(&aabb(rect))
            .any(|candidate| {
                let reference = &references[candidate.index];
                match predicate {
                    SpatialPredicate::Within => reference.contains(&tile_geom),
                    SpatialPredicate::InteriorIntersects => {
                        let matrix = reference.relate(&tile_geom);
                        matrix.is_intersects() && !matrix.is_touches()
                    }
                }
            })
    }

    /// Join `tiles` against the reference geometries.
    ///
    /// Returns one flag per tile, index-parallel to `tiles`.
    pub fn join(&self, tiles: &[Polygon<f64>], predicate: SpatialPredicate) -> Vec<bool> {
        let flags: Vec<bool> = tiles
            .iter()
            .map(|tile| self.matches(tile, predicate))
            .collect();

        tracing::trace!(
            tiles = tiles.len(),
            references = self.geometries.len(),
            matched = flags.iter().filter(|&&hit| hit).count(),
            ?predicate,
            "Spatial join"
        );
        flags
    }
}
