//! Transverse Mercator on the WGS84 ellipsoid, using the series from Snyder's "Map Projections: A
//! Working Manual" (USGS 1395), p. 61-64. Accurate to well under a millimeter within a zone.

use crate::LonLat;

const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

fn e2() -> f64 {
    F * (2.0 - F)
}

/// Longitude of the zone's central meridian, in degrees.
pub fn central_meridian(zone: u8) -> f64 {
    -183.0 + 6.0 * f64::from(zone)
}

fn meridian_arc(phi: f64) -> f64 {
    let e2 = e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Returns (easting, northing) in meters.
pub fn forward(gps: LonLat, zone: u8, north: bool) -> (f64, f64) {
    let e2 = e2();
    let ep2 = e2 / (1.0 - e2);

    let phi = gps.latitude.to_radians();
    let lam = gps.longitude.to_radians();
    let lam0 = central_meridian(zone).to_radians();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let n = A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = phi.tan().powi(2);
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * (lam - lam0);
    let m = meridian_arc(phi);

    let x = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;
    let y = K0
        * (m + n
            * phi.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    let y = if north { y } else { y + FALSE_NORTHING_SOUTH };
    (x, y)
}

pub fn inverse(easting: f64, northing: f64, zone: u8, north: bool) -> LonLat {
    let e2 = e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let y = if north {
        northing
    } else {
        northing - FALSE_NORTHING_SOUTH
    };
    let m = y / K0;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = phi1.tan().powi(2);
    let n1 = A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = (easting - FALSE_EASTING) / (n1 * K0);

    let phi = phi1
        - (n1 * phi1.tan() / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lam = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / cos_phi1;

    LonLat::new(
        central_meridian(zone) + lam.to_degrees(),
        phi.to_degrees(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    #[test]
    fn central_meridians() {
        assert_eq!(central_meridian(1), -177.0);
        assert_eq!(central_meridian(10), -123.0);
        assert_eq!(central_meridian(33), 15.0);
    }

    #[test]
    fn on_the_central_meridian() {
        let (x, y) = forward(LonLat::new(-123.0, 0.0), 10, true);
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        // The meridian arc from the equator to 45N is 4,984,944.378 m on WGS84
        let (x, y) = forward(LonLat::new(-123.0, 45.0), 10, true);
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!((y - 0.9996 * 4_984_944.378).abs() < 0.01, "got {}", y);

        let (_, y) = forward(LonLat::new(-123.0, -45.0), 10, false);
        assert!((y - (10_000_000.0 - 0.9996 * 4_984_944.378)).abs() < 0.01);
    }

    #[test]
    fn round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(42);
        for _ in 0..1000 {
            let zone = rng.gen_range(1..=60);
            let lon = central_meridian(zone) + rng.gen_range(-3.0..3.0);
            let lat = rng.gen_range(-79.0..83.0);
            let north = lat >= 0.0;
            let (x, y) = forward(LonLat::new(lon, lat), zone, north);
            let back = inverse(x, y, zone, north);
            assert!(
                (back.longitude - lon).abs() < 1e-7 && (back.latitude - lat).abs() < 1e-7,
                "{}, {} came back as {}",
                lon,
                lat,
                back
            );
        }
    }
}
