use rstar::AABB;
use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D};

/// Represents a rectangular boundary of `Pt2D` points.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    /// A boundary including no points.
    pub fn new() -> Bounds {
        Bounds {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        }
    }

    /// Create a boundary covering some points.
    pub fn from(pts: &[Pt2D]) -> Bounds {
        let mut b = Bounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    pub fn from_rect(rect: geo::Rect) -> Bounds {
        Bounds {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        }
    }

    /// Update the boundary to include this point.
    pub fn update(&mut self, pt: Pt2D) {
        self.min_x = self.min_x.min(pt.x());
        self.max_x = self.max_x.max(pt.x());
        self.min_y = self.min_y.min(pt.y());
        self.max_y = self.max_y.max(pt.y());
    }

    /// Expand the boundary to include another.
    pub fn union(&mut self, other: Bounds) {
        if other.is_empty() {
            return;
        }
        self.update(Pt2D::new(other.min_x, other.min_y));
        self.update(Pt2D::new(other.max_x, other.max_y));
    }

    /// True if nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// True if the point is within the boundary, edges included.
    pub fn contains(&self, pt: Pt2D) -> bool {
        pt.x() >= self.min_x && pt.x() <= self.max_x && pt.y() >= self.min_y && pt.y() <= self.max_y
    }

    /// True if the two boxes overlap at all, touching edges included.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Grows the boundary by the same amount on every side.
    pub fn buffer(&self, dist: Distance) -> Bounds {
        let d = dist.inner_meters();
        Bounds {
            min_x: self.min_x - d,
            min_y: self.min_y - d,
            max_x: self.max_x + d,
            max_y: self.max_y + d,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Transform into an envelope for an `rstar::RTree`.
    pub fn as_aabb(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }

    pub fn get_corners(&self) -> Vec<Pt2D> {
        vec![
            Pt2D::new(self.min_x, self.min_y),
            Pt2D::new(self.max_x, self.min_y),
            Pt2D::new(self.max_x, self.max_y),
            Pt2D::new(self.min_x, self.max_y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_and_overlap() {
        let b = Bounds::from(&[Pt2D::new(0.0, 0.0), Pt2D::new(200.0, 100.0)]);
        assert_eq!(b.width(), 200.0);
        assert_eq!(b.height(), 100.0);

        let bigger = b.buffer(Distance::meters(100.0));
        assert_eq!(bigger.min_x, -100.0);
        assert_eq!(bigger.max_y, 200.0);
        assert!(bigger.contains(Pt2D::new(-100.0, 200.0)));

        let touching = Bounds::from(&[Pt2D::new(200.0, 100.0), Pt2D::new(300.0, 300.0)]);
        assert!(b.overlaps(&touching));
        let apart = Bounds::from(&[Pt2D::new(201.0, 0.0), Pt2D::new(300.0, 300.0)]);
        assert!(!b.overlaps(&apart));
    }

    #[test]
    fn from_geo_rect() {
        let rect = geo::Rect::new(
            geo::Coord { x: 5.0, y: -1.0 },
            geo::Coord { x: -3.0, y: 4.0 },
        );
        assert_eq!(
            Bounds::from_rect(rect),
            Bounds::from(&[Pt2D::new(-3.0, -1.0), Pt2D::new(5.0, 4.0)])
        );
    }

    #[test]
    fn empty_bounds() {
        let mut b = Bounds::new();
        assert!(b.is_empty());
        b.union(Bounds::new());
        assert!(b.is_empty());
        b.update(Pt2D::new(1.0, 2.0));
        assert!(!b.is_empty());
        assert_eq!(b.width(), 0.0);
    }
}
