use std::borrow::Cow;
use std::collections::BTreeSet;

use anyhow::Result;
use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};

use geom::{Bounds, Distance, Frame, MultiPolygon, Polygon, Pt2D};
use hexutil::prettyprint_usize;

use crate::StudyArea;

/// Refuse to lay out more hexagons than this; the radius is too small for the study area.
const MAX_CANDIDATE_HEXAGONS: f64 = 10_000_000.0;
/// Relative to a hexagon's area. Boolean ops on floats aren't exact, so cuts within this of
/// nothing or of the whole hexagon are treated as such.
const AREA_TOLERANCE: f64 = 1e-6;

/// What geometry a tile keeps when it straddles the study area's boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileShape {
    /// Keep the complete hexagon. Every tile has the same shape and its centroid is the hexagon's
    /// center.
    Whole,
    /// Keep only the part inside the study area. Boundary tiles get smaller, and their centroids
    /// move inwards.
    Clipped,
}

impl Default for TileShape {
    fn default() -> TileShape {
        TileShape::Whole
    }
}

/// Vertical distance between rows of hexagon centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStep {
    /// `radius * sqrt(3)`. Rows are spaced a full hexagon apart, so the lattice leaves gaps
    /// between rows, and samples in a gap belong to no tile.
    Standard,
    /// `radius * sqrt(3) / 2`. Rows overlap, and the tiles completely cover the study area.
    Dense,
}

impl Default for RowStep {
    fn default() -> RowStep {
        RowStep::Dense
    }
}

impl RowStep {
    fn dy(self, radius: f64) -> f64 {
        match self {
            RowStep::Standard => radius * 3.0_f64.sqrt(),
            RowStep::Dense => radius * 3.0_f64.sqrt() / 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOptions {
    #[serde(default)]
    pub shape: TileShape,
    #[serde(default)]
    pub row_step: RowStep,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HexTile {
    /// Unique within one grid. Grids produced by `HexGrid::generate` number tiles 0..N.
    pub id: usize,
    pub geometry: MultiPolygon,
    /// Computed from `geometry`, so it respects the grid's `TileShape`
    pub centroid: Pt2D,
}

impl HexTile {
    /// `None` if the geometry has no centroid.
    pub fn new(id: usize, geometry: MultiPolygon) -> Option<HexTile> {
        let centroid = geometry.centroid()?;
        Some(HexTile {
            id,
            geometry,
            centroid,
        })
    }

    pub fn intersects_pt(&self, pt: Pt2D) -> bool {
        self.geometry.intersects_pt(pt)
    }
}

/// Hexagons covering a study area, all in one projected frame. Read-only once generated.
#[derive(Clone, Debug, PartialEq)]
pub struct HexGrid {
    pub frame: Frame,
    pub tiles: Vec<HexTile>,
}

impl HexGrid {
    /// Accepts tiles from anywhere. Nothing checks that the IDs are unique; see `has_unique_ids`.
    pub fn new(frame: Frame, tiles: Vec<HexTile>) -> HexGrid {
        HexGrid { frame, tiles }
    }

    pub fn empty(frame: Frame) -> HexGrid {
        HexGrid::new(frame, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles whole hexagons over the study area with the default options.
    pub fn generate(area: &StudyArea, radius: f64, frame: &Frame) -> Result<HexGrid> {
        HexGrid::generate_with_options(area, radius, frame, GridOptions::default())
    }

    /// Lays pointy-top hexagons over the study area's bounding box, buffered by two radii, then
    /// keeps the ones overlapping the study area with positive area. The study area is
    /// reprojected into `frame` first if needed.
    ///
    /// An empty study area or a useless radius produces an empty grid and a warning. A frame
    /// that isn't projected is an error, since hexagon sizes are in meters.
    pub fn generate_with_options(
        area: &StudyArea,
        radius: f64,
        frame: &Frame,
        opts: GridOptions,
    ) -> Result<HexGrid> {
        if area.is_empty() {
            warn!("The study area is empty, so there's no hex grid");
            return Ok(HexGrid::empty(frame.clone()));
        }
        if !frame.is_projected() {
            bail!(
                "Can't generate a hex grid in {}, since it isn't measured in meters",
                frame
            );
        }
        if !radius.is_finite() || radius <= 0.0 {
            warn!("Hexagon radius {} is unusable, so there's no hex grid", radius);
            return Ok(HexGrid::empty(frame.clone()));
        }
        let area = if area.frame.as_ref() == Some(frame) {
            Cow::Borrowed(area)
        } else {
            Cow::Owned(area.reproject(frame)?)
        };

        let bounds = area.get_bounds();
        let buffer = 2.0 * radius;
        let width = bounds.width() + 2.0 * buffer;
        let height = bounds.height() + 2.0 * buffer;
        // Hexagon areas are proportional to radius^2
        if !width.is_finite() || !height.is_finite() || !(radius * radius).is_finite() {
            warn!("Hexagon radius {} is too large to lay out, so there's no hex grid", radius);
            return Ok(HexGrid::empty(frame.clone()));
        }
        let dx = 1.5 * radius;
        let dy = opts.row_step.dy(radius);
        let estimate = ((width / dx).ceil() + 1.0) * ((height / dy).ceil() + 1.0);
        if estimate > MAX_CANDIDATE_HEXAGONS {
            bail!(
                "A radius of {}m would need about {} hexagons over a {:.0}m by {:.0}m study area; \
                 use a bigger radius",
                radius,
                estimate,
                bounds.width(),
                bounds.height()
            );
        }

        let candidates = lay_hexagons(
            &bounds.buffer(Distance::meters(buffer)),
            radius,
            opts.row_step,
        );
        if candidates.is_empty() {
            warn!("No hexagons fit over the study area with radius {}m", radius);
            return Ok(HexGrid::empty(frame.clone()));
        }

        let mut tiles = Vec::new();
        for hexagon in candidates {
            if !bounds.overlaps(&hexagon.get_bounds()) {
                continue;
            }
            let cut = area.mask.intersection(&hexagon);
            let full = hexagon.area();
            if cut.is_empty() || cut.area() <= AREA_TOLERANCE * full {
                continue;
            }
            let fully_inside = (cut.area() - full).abs() <= AREA_TOLERANCE * full;
            let geometry = if opts.shape == TileShape::Whole || fully_inside {
                MultiPolygon::from(hexagon)
            } else {
                cut
            };
            // IDs are dense over the survivors
            if let Some(tile) = HexTile::new(tiles.len(), geometry) {
                tiles.push(tile);
            }
        }

        if tiles.is_empty() {
            warn!("None of the hexagons overlap the study area");
        } else {
            info!(
                "Kept {} hexagons with radius {}m over the study area",
                prettyprint_usize(tiles.len()),
                radius
            );
        }
        Ok(HexGrid::new(frame.clone(), tiles))
    }

    pub fn has_unique_ids(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.tiles.iter().all(|t| seen.insert(t.id))
    }

    /// Renumbers tiles 0..N in their current order.
    pub fn with_dense_ids(mut self) -> HexGrid {
        for (idx, tile) in self.tiles.iter_mut().enumerate() {
            tile.id = idx;
        }
        self
    }

    /// One feature per tile, with `hex_id` and the centroid as properties.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .tiles
            .iter()
            .map(|tile| {
                let mut feature = Feature {
                    bbox: None,
                    geometry: Some(tile.geometry.to_geojson()),
                    id: None,
                    properties: None,
                    foreign_members: None,
                };
                feature.set_property("hex_id", tile.id);
                feature.set_property("centroid_x", tile.centroid.x());
                feature.set_property("centroid_y", tile.centroid.y());
                feature
            })
            .collect();
        crate::export::feature_collection(features, Some(&self.frame))
    }
}

/// Every hexagon of the lattice covering the bounds, row by row. Centers are computed from their
/// row and column index, never accumulated, so the same inputs give bit-identical hexagons.
fn lay_hexagons(bounds: &Bounds, radius: f64, row_step: RowStep) -> Vec<Polygon> {
    let dx = 1.5 * radius;
    let dy = row_step.dy(radius);

    let mut hexagons = Vec::new();
    for row in 0.. {
        let y = bounds.min_y + (row as f64) * dy;
        if y >= bounds.max_y {
            break;
        }
        let offset = if row % 2 == 1 { dx / 2.0 } else { 0.0 };
        for col in 0.. {
            let x = bounds.min_x + offset + (col as f64) * dx;
            if x >= bounds.max_x {
                break;
            }
            hexagons.push(Polygon::hexagon(Pt2D::new(x, y), Distance::meters(radius)));
        }
    }
    debug!(
        "Laid out {} candidate hexagons",
        prettyprint_usize(hexagons.len())
    );
    hexagons
}
