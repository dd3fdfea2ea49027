use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in some planar frame, usually meters. The frame itself is tracked by whatever
/// collection owns the point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        Pt2D { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn offset(self, dx: f64, dy: f64) -> Pt2D {
        Pt2D::new(self.x + dx, self.y + dy)
    }

    /// Straight-line distance, in the units of the frame.
    pub fn raw_dist_to(self, to: Pt2D) -> f64 {
        (self.x - to.x).hypot(self.y - to.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(self, other: Pt2D, threshold: f64) -> bool {
        self.raw_dist_to(other) <= threshold
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x, self.y)
    }
}

impl From<Pt2D> for geo::Coord {
    fn from(pt: Pt2D) -> Self {
        geo::Coord { x: pt.x, y: pt.y }
    }
}

impl From<Pt2D> for geo::Point {
    fn from(pt: Pt2D) -> Self {
        geo::Point::new(pt.x, pt.y)
    }
}

impl From<geo::Coord> for Pt2D {
    fn from(coord: geo::Coord) -> Self {
        Pt2D::new(coord.x, coord.y)
    }
}

impl From<geo::Point> for Pt2D {
    fn from(pt: geo::Point) -> Self {
        Pt2D::new(pt.x(), pt.y())
    }
}
