use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Pt2D;

/// longitude is x, latitude is y
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    /// Interprets a point in a geographic frame.
    pub fn from_pt(pt: Pt2D) -> LonLat {
        LonLat::new(pt.x(), pt.y())
    }

    pub fn to_pt(self) -> Pt2D {
        Pt2D::new(self.longitude, self.latitude)
    }

    pub fn is_valid(self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}
