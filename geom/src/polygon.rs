use std::fmt;

use anyhow::Result;
use geo::{Area, BooleanOps, BoundingRect, Centroid, Intersects};

use crate::{Bounds, Distance, Pt2D};

/// A single polygon, possibly with holes.
#[derive(PartialEq, Clone, Debug)]
pub struct Polygon {
    inner: geo::Polygon,
}

impl Polygon {
    /// Builds a polygon from an outer ring. The ring is closed automatically.
    pub fn new(pts: Vec<Pt2D>) -> Result<Polygon> {
        Polygon::with_holes(pts, Vec::new())
    }

    pub fn with_holes(outer: Vec<Pt2D>, holes: Vec<Vec<Pt2D>>) -> Result<Polygon> {
        let exterior = to_line_string(outer)?;
        let interiors = holes
            .into_iter()
            .map(to_line_string)
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon {
            inner: geo::Polygon::new(exterior, interiors),
        })
    }

    /// A regular hexagon with circumradius `radius`. Vertex `i` sits at angle `60 * i + 30`
    /// degrees from the center, so the hexagon points up and down and has vertical left and
    /// right edges.
    ///
    /// The offsets are computed once and shared by every vertex, so two hexagons whose centers
    /// differ by exactly `2 * h` horizontally share a bit-identical edge.
    pub fn hexagon(center: Pt2D, radius: Distance) -> Polygon {
        let r = radius.inner_meters();
        let h = r * 3.0_f64.sqrt() / 2.0;
        let half = r / 2.0;
        let offsets = [
            (h, half),
            (0.0, r),
            (-h, half),
            (-h, -half),
            (0.0, -r),
            (h, -half),
        ];
        let mut coords: Vec<geo::Coord> = offsets
            .iter()
            .map(|(dx, dy)| geo::Coord::from(center.offset(*dx, *dy)))
            .collect();
        coords.push(coords[0]);
        Polygon {
            inner: geo::Polygon::new(geo::LineString::new(coords), Vec::new()),
        }
    }

    /// An axis-aligned rectangle.
    pub fn rectangle_two_corners(pt1: Pt2D, pt2: Pt2D) -> Result<Polygon> {
        let b = Bounds::from(&[pt1, pt2]);
        if b.width() == 0.0 || b.height() == 0.0 {
            bail!("Degenerate rectangle between {} and {}", pt1, pt2);
        }
        Polygon::new(b.get_corners())
    }

    /// Parses GeoJSON-style rings: the first is the exterior, the rest are holes.
    pub fn from_geojson(raw: &[Vec<Vec<f64>>]) -> Result<Polygon> {
        let mut rings = Vec::new();
        for ring in raw {
            let mut pts = Vec::new();
            for pos in ring {
                if pos.len() < 2 {
                    bail!("Position {:?} doesn't have an x and y", pos);
                }
                pts.push(Pt2D::new(pos[0], pos[1]));
            }
            rings.push(pts);
        }
        if rings.is_empty() {
            bail!("Polygon has no rings");
        }
        let outer = rings.remove(0);
        Polygon::with_holes(outer, rings)
    }

    /// The outer ring, with the first point repeated at the end.
    pub fn points(&self) -> Vec<Pt2D> {
        self.inner
            .exterior()
            .coords()
            .map(|c| Pt2D::from(*c))
            .collect()
    }

    pub fn get_bounds(&self) -> Bounds {
        self.inner
            .bounding_rect()
            .map(Bounds::from_rect)
            .unwrap_or_default()
    }

    /// The area-weighted centroid. `None` only for an empty polygon.
    pub fn centroid(&self) -> Option<Pt2D> {
        self.inner.centroid().map(Pt2D::from)
    }

    /// Usually m^2
    pub fn area(&self) -> f64 {
        // Don't use signed_area, since polygons may have either orientation
        self.inner.unsigned_area()
    }

    /// Is the point inside the polygon or on its boundary?
    pub fn intersects_pt(&self, pt: Pt2D) -> bool {
        self.inner.intersects(&geo::Point::from(pt))
    }

    /// Applies a fallible transformation to every vertex, preserving holes.
    pub fn try_map_pts<F: Fn(Pt2D) -> Result<Pt2D>>(&self, f: F) -> Result<Polygon> {
        let map_ring = |ring: &geo::LineString| -> Result<geo::LineString> {
            let coords = ring
                .coords()
                .map(|c| f(Pt2D::from(*c)).map(geo::Coord::from))
                .collect::<Result<Vec<_>>>()?;
            Ok(geo::LineString::new(coords))
        };
        let exterior = map_ring(self.inner.exterior())?;
        let interiors = self
            .inner
            .interiors()
            .iter()
            .map(map_ring)
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon {
            inner: geo::Polygon::new(exterior, interiors),
        })
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.inner))
    }

}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Polygon with {} points and {} holes",
            self.inner.exterior().0.len(),
            self.inner.interiors().len()
        )?;
        for (idx, pt) in self.points().into_iter().enumerate() {
            writeln!(f, "  {}: {}", idx, pt)?;
        }
        Ok(())
    }
}

impl From<geo::Polygon> for Polygon {
    fn from(inner: geo::Polygon) -> Self {
        Polygon { inner }
    }
}

impl From<Polygon> for geo::Polygon {
    fn from(poly: Polygon) -> Self {
        poly.inner
    }
}

/// Zero or more polygons treated as one region. Used for clipping masks and for tiles that were
/// cut by a boundary.
#[derive(PartialEq, Clone, Debug)]
pub struct MultiPolygon {
    inner: geo::MultiPolygon,
}

impl MultiPolygon {
    pub fn empty() -> MultiPolygon {
        MultiPolygon {
            inner: geo::MultiPolygon::new(Vec::new()),
        }
    }

    /// Merges every polygon into one region, dissolving shared edges and overlaps.
    pub fn union_all(list: Vec<Polygon>) -> MultiPolygon {
        let mut iter = list.into_iter();
        let first = match iter.next() {
            Some(p) => p,
            None => return MultiPolygon::empty(),
        };

        let mut result = geo::MultiPolygon::new(vec![first.inner]);
        for p in iter {
            result = result.union(&geo::MultiPolygon::new(vec![p.inner]));
        }
        MultiPolygon { inner: result }
    }

    pub fn polygons(&self) -> Vec<Polygon> {
        self.inner.0.iter().cloned().map(Polygon::from).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.0.is_empty() || self.area() == 0.0
    }

    pub fn area(&self) -> f64 {
        self.inner.unsigned_area()
    }

    pub fn get_bounds(&self) -> Bounds {
        self.inner
            .bounding_rect()
            .map(Bounds::from_rect)
            .unwrap_or_default()
    }

    pub fn centroid(&self) -> Option<Pt2D> {
        self.inner.centroid().map(Pt2D::from)
    }

    /// Is the point inside any member polygon or on a boundary?
    pub fn intersects_pt(&self, pt: Pt2D) -> bool {
        self.inner.intersects(&geo::Point::from(pt))
    }

    /// The part of `polygon` covered by this region. May be empty.
    pub fn intersection(&self, polygon: &Polygon) -> MultiPolygon {
        let other = geo::MultiPolygon::new(vec![polygon.inner.clone()]);
        MultiPolygon {
            inner: self.inner.intersection(&other),
        }
    }

    pub fn try_map_pts<F: Fn(Pt2D) -> Result<Pt2D>>(&self, f: F) -> Result<MultiPolygon> {
        let polygons = self
            .inner
            .0
            .iter()
            .map(|p| Polygon::from(p.clone()).try_map_pts(&f).map(|p| p.inner))
            .collect::<Result<Vec<_>>>()?;
        Ok(MultiPolygon {
            inner: geo::MultiPolygon::new(polygons),
        })
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.inner))
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        MultiPolygon {
            inner: geo::MultiPolygon::new(vec![polygon.inner]),
        }
    }
}

impl From<geo::MultiPolygon> for MultiPolygon {
    fn from(inner: geo::MultiPolygon) -> Self {
        MultiPolygon { inner }
    }
}

fn to_line_string(pts: Vec<Pt2D>) -> Result<geo::LineString> {
    let mut coords: Vec<geo::Coord> = pts.into_iter().map(geo::Coord::from).collect();
    if coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        bail!("A ring needs at least 3 distinct points, got {}", coords.len());
    }
    if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        bail!("A ring has non-finite points");
    }
    // geo closes the ring for us
    Ok(geo::LineString::new(coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x1: f64, y1: f64, x2: f64, y2: f64) -> Polygon {
        Polygon::rectangle_two_corners(Pt2D::new(x1, y1), Pt2D::new(x2, y2)).unwrap()
    }

    #[test]
    fn hexagon_vertices() {
        let center = Pt2D::new(10.0, -5.0);
        let hex = Polygon::hexagon(center, Distance::meters(50.0));
        let pts = hex.points();
        assert_eq!(pts.len(), 7);
        assert_eq!(pts[0], pts[6]);
        for (i, pt) in pts.iter().take(6).enumerate() {
            let angle = (60.0 * i as f64 + 30.0).to_radians();
            let expected = center.offset(50.0 * angle.cos(), 50.0 * angle.sin());
            assert!(pt.approx_eq(expected, 1e-9), "vertex {}: {} vs {}", i, pt, expected);
            assert!((pt.raw_dist_to(center) - 50.0).abs() < 1e-9);
        }
        // Pointy-top: the topmost vertex is straight above the center
        assert_eq!(pts[1], Pt2D::new(10.0, 45.0));

        let area = 1.5 * 3.0_f64.sqrt() * 50.0 * 50.0;
        assert!((hex.area() - area).abs() < 1e-6);
        assert!(hex.centroid().unwrap().approx_eq(center, 1e-9));
    }

    #[test]
    fn neighbors_share_an_exact_edge() {
        let r = Distance::meters(50.0);
        let h = 50.0 * 3.0_f64.sqrt() / 2.0;
        let left = Polygon::hexagon(Pt2D::new(0.0, 0.0), r);
        let right = Polygon::hexagon(Pt2D::new(2.0 * h, 0.0), r);
        let on_edge = Pt2D::new(h, 0.0);
        assert!(left.intersects_pt(on_edge));
        assert!(right.intersects_pt(on_edge));
        assert!((left.area() - right.area()).abs() < 1e-9);
    }

    #[test]
    fn intersects_pt_includes_boundary() {
        let sq = square(0.0, 0.0, 10.0, 10.0);
        assert!(sq.intersects_pt(Pt2D::new(5.0, 5.0)));
        assert!(sq.intersects_pt(Pt2D::new(10.0, 5.0)));
        assert!(sq.intersects_pt(Pt2D::new(0.0, 0.0)));
        assert!(!sq.intersects_pt(Pt2D::new(10.001, 5.0)));
    }

    #[test]
    fn union_and_intersection() {
        let mask = MultiPolygon::union_all(vec![
            square(0.0, 0.0, 10.0, 10.0),
            square(10.0, 0.0, 20.0, 10.0),
            square(5.0, 5.0, 15.0, 15.0),
        ]);
        // 200 for the two adjacent squares, plus the 10x5 strip sticking out the top
        assert!((mask.area() - 250.0).abs() < 1e-6);
        let b = mask.get_bounds();
        for (actual, expected) in [(b.min_x, 0.0), (b.min_y, 0.0), (b.max_x, 20.0), (b.max_y, 15.0)] {
            assert!((actual - expected).abs() < 1e-9, "{:?}", b);
        }

        let cut = mask.intersection(&square(15.0, -5.0, 25.0, 5.0));
        assert!((cut.area() - 25.0).abs() < 1e-6);
        assert!(cut.centroid().unwrap().approx_eq(Pt2D::new(17.5, 2.5), 1e-6));

        let touching_only = mask.intersection(&square(20.0, 0.0, 30.0, 10.0));
        assert!(touching_only.is_empty());
    }

    #[test]
    fn holes() {
        let donut = Polygon::from_geojson(&[
            vec![
                vec![0.0, 0.0],
                vec![10.0, 0.0],
                vec![10.0, 10.0],
                vec![0.0, 10.0],
                vec![0.0, 0.0],
            ],
            vec![
                vec![4.0, 4.0],
                vec![6.0, 4.0],
                vec![6.0, 6.0],
                vec![4.0, 6.0],
                vec![4.0, 4.0],
            ],
        ])
        .unwrap();
        assert!((donut.area() - 96.0).abs() < 1e-9);
        assert!(!donut.intersects_pt(Pt2D::new(5.0, 5.0)));
        assert!(donut.intersects_pt(Pt2D::new(4.0, 5.0)));
    }

    #[test]
    fn bad_rings() {
        assert!(Polygon::new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(1.0, 1.0)]).is_err());
        assert!(Polygon::from_geojson(&[vec![vec![0.0], vec![1.0, 1.0], vec![2.0, 0.0]]]).is_err());
        assert!(Polygon::rectangle_two_corners(Pt2D::new(0.0, 0.0), Pt2D::new(0.0, 5.0)).is_err());
        assert!(MultiPolygon::union_all(Vec::new()).is_empty());
    }

    #[test]
    fn map_pts() {
        let moved = square(0.0, 0.0, 10.0, 10.0)
            .try_map_pts(|pt| Ok(pt.offset(100.0, 0.0)))
            .unwrap();
        assert_eq!(moved.get_bounds().min_x, 100.0);
        assert!(square(0.0, 0.0, 1.0, 1.0)
            .try_map_pts(|_| Err(anyhow!("nope")))
            .is_err());
    }
}
