use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::{utm, LonLat, Pt2D};

/// Spherical Web Mercator uses the WGS84 semi-major axis as the sphere radius.
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// A coordinate reference frame. Everything except `Wgs84` is planar and measured in meters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
    /// EPSG:4326, longitude and latitude in degrees
    Wgs84,
    /// EPSG:3857
    WebMercator,
    /// EPSG:326zz in the north, EPSG:327zz in the south
    Utm { zone: u8, north: bool },
    /// Some planar grid in meters that can't be related to any other frame. Written
    /// `LOCAL:<name>`.
    Local(String),
}

impl Frame {
    /// Understands `EPSG:32610`, `epsg:4326`, a bare `3857`, OGC URNs like
    /// `urn:ogc:def:crs:EPSG::32610` and `urn:ogc:def:crs:OGC:1.3:CRS84`, and `LOCAL:<name>`.
    pub fn parse(input: &str) -> Result<Frame> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            bail!("Empty coordinate frame");
        }
        let upper = trimmed.to_ascii_uppercase();

        if let Some(name) = upper.strip_prefix("LOCAL:") {
            if name.is_empty() {
                bail!("Local frame {} needs a name", input);
            }
            // Keep the caller's casing for the name
            return Ok(Frame::Local(trimmed[6..].to_string()));
        }
        if upper.ends_with("CRS84") {
            return Ok(Frame::Wgs84);
        }

        let code = if let Some(code) = upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
            // The version is usually empty, giving "EPSG::4326", but may be "EPSG:9.9:4326"
            code.rsplit(':').next().unwrap_or(code)
        } else if let Some(code) = upper.strip_prefix("EPSG:") {
            code
        } else {
            &upper
        };
        let code = code
            .parse::<u32>()
            .map_err(|_| anyhow!("Can't parse coordinate frame {}", input))?;
        Frame::from_epsg(code)
    }

    pub fn from_epsg(code: u32) -> Result<Frame> {
        match code {
            4326 => Ok(Frame::Wgs84),
            3857 => Ok(Frame::WebMercator),
            32601..=32660 => Ok(Frame::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Frame::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => bail!("Unsupported coordinate frame EPSG:{}", code),
        }
    }

    pub fn epsg(&self) -> Option<u32> {
        match self {
            Frame::Wgs84 => Some(4326),
            Frame::WebMercator => Some(3857),
            Frame::Utm { zone, north } => {
                let base = if *north { 32600 } else { 32700 };
                Some(base + u32::from(*zone))
            }
            Frame::Local(_) => None,
        }
    }

    /// Are coordinates linear and measured in meters? Areas and distances only make sense in
    /// projected frames.
    pub fn is_projected(&self) -> bool {
        !matches!(self, Frame::Wgs84)
    }

    /// Local frames can't be related to anything but themselves.
    pub fn can_transform_to(&self, to: &Frame) -> bool {
        self == to || !(matches!(self, Frame::Local(_)) || matches!(to, Frame::Local(_)))
    }

    /// Transforms a point from this frame into another.
    pub fn transform(&self, pt: Pt2D, to: &Frame) -> Result<Pt2D> {
        if self == to {
            return Ok(pt);
        }
        let gps = self.to_gps(pt)?;
        to.from_gps(gps)
    }

    fn to_gps(&self, pt: Pt2D) -> Result<LonLat> {
        if !pt.is_finite() {
            bail!("Can't transform non-finite {} out of {}", pt, self);
        }
        match self {
            Frame::Wgs84 => Ok(LonLat::from_pt(pt)),
            Frame::WebMercator => {
                let lon = (pt.x() / WEB_MERCATOR_RADIUS).to_degrees();
                let lat = (2.0 * (pt.y() / WEB_MERCATOR_RADIUS).exp().atan()
                    - std::f64::consts::FRAC_PI_2)
                    .to_degrees();
                Ok(LonLat::new(lon, lat))
            }
            Frame::Utm { zone, north } => Ok(utm::inverse(pt.x(), pt.y(), *zone, *north)),
            Frame::Local(_) => bail!("Can't transform out of local frame {}", self),
        }
    }

    #[allow(clippy::wrong_self_convention)]
    fn from_gps(&self, gps: LonLat) -> Result<Pt2D> {
        if !gps.is_valid() {
            bail!("{} isn't a valid WGS84 position", gps);
        }
        match self {
            Frame::Wgs84 => Ok(gps.to_pt()),
            Frame::WebMercator => {
                let lat = gps
                    .latitude
                    .clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT)
                    .to_radians();
                let x = WEB_MERCATOR_RADIUS * gps.longitude.to_radians();
                let y = WEB_MERCATOR_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
                Ok(Pt2D::new(x, y))
            }
            Frame::Utm { zone, north } => {
                let (x, y) = utm::forward(gps, *zone, *north);
                Ok(Pt2D::new(x, y))
            }
            Frame::Local(_) => bail!("Can't transform into local frame {}", self),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Frame::Local(name) => write!(f, "LOCAL:{}", name),
            _ => write!(f, "EPSG:{}", self.epsg().unwrap_or_default()),
        }
    }
}

impl FromStr for Frame {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Frame> {
        Frame::parse(input)
    }
}
