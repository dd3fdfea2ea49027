//! Planar geometry primitives for hexagon sampling. Most types are thin wrappers around the
//! `geo` crate, expressed in meters of some projected `Frame`.

#[macro_use]
extern crate anyhow;

mod bounds;
mod distance;
mod frame;
mod gps;
mod polygon;
mod pt;
mod utm;

pub use crate::bounds::Bounds;
pub use crate::distance::Distance;
pub use crate::frame::Frame;
pub use crate::gps::LonLat;
pub use crate::polygon::{MultiPolygon, Polygon};
pub use crate::pt::Pt2D;

/// Reprojects many points at once. Fails if the frames can't be related, even with no points,
/// and otherwise on the first point that can't be transformed.
pub fn reproject_all(pts: &[Pt2D], from: &Frame, to: &Frame) -> anyhow::Result<Vec<Pt2D>> {
    if from == to {
        return Ok(pts.to_vec());
    }
    if !from.can_transform_to(to) {
        bail!("Can't reproject from {} to {}", from, to);
    }
    pts.iter().map(|pt| from.transform(*pt, to)).collect()
}
