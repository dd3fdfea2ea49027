use anyhow::{Context, Result};

use geom::{Bounds, Frame, MultiPolygon, Polygon, Pt2D};

/// The region samples are allowed to come from: the union of every boundary polygon. Built once
/// per run and only read afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct StudyArea {
    pub frame: Option<Frame>,
    pub mask: MultiPolygon,
}

impl StudyArea {
    /// Dissolves all of the polygons into one clipping mask.
    pub fn new(polygons: Vec<Polygon>, frame: Option<Frame>) -> StudyArea {
        StudyArea {
            frame,
            mask: MultiPolygon::union_all(polygons),
        }
    }

    pub fn empty(frame: Option<Frame>) -> StudyArea {
        StudyArea {
            frame,
            mask: MultiPolygon::empty(),
        }
    }

    /// No polygons, or nothing with positive area
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn get_bounds(&self) -> Bounds {
        self.mask.get_bounds()
    }

    pub fn area(&self) -> f64 {
        self.mask.area()
    }

    pub fn intersects_pt(&self, pt: Pt2D) -> bool {
        self.mask.intersects_pt(pt)
    }

    pub fn reproject(&self, to: &Frame) -> Result<StudyArea> {
        let from = self
            .frame
            .as_ref()
            .ok_or_else(|| anyhow!("Study area doesn't have a coordinate frame, can't reproject"))?;
        if from == to {
            return Ok(self.clone());
        }
        if !from.can_transform_to(to) {
            bail!("Can't reproject the study area from {} to {}", from, to);
        }
        let mask = self
            .mask
            .try_map_pts(|pt| from.transform(pt, to))
            .with_context(|| format!("reprojecting the study area from {} to {}", from, to))?;
        Ok(StudyArea {
            frame: Some(to.clone()),
            mask,
        })
    }
}
