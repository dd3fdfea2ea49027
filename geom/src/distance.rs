use std::{cmp, fmt};

use serde::{Deserialize, Serialize};

/// A distance, in meters. Can be negative.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Distance(f64);

// By construction, Distance is a finite f64.
impl Eq for Distance {}

#[allow(clippy::derive_ord_xor_partial_ord)] // false positive
impl Ord for Distance {
    fn cmp(&self, other: &Distance) -> cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Distance {
    /// Creates a distance in meters.
    pub fn meters(value: f64) -> Distance {
        if !value.is_finite() {
            panic!("Bad Distance {}", value);
        }

        Distance(value)
    }

    /// Returns the distance in meters. Prefer to work with type-safe `Distance`s.
    pub fn inner_meters(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}m", (self.0 * 10.0).round() / 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Distance::meters(50.0).to_string(), "50m");
        assert_eq!(Distance::meters(12.345).to_string(), "12.3m");
        assert_eq!(Distance::meters(50.0).inner_meters(), 50.0);
    }

    #[test]
    #[should_panic]
    fn non_finite_panics() {
        Distance::meters(f64::NAN);
    }

    #[test]
    fn ordering() {
        let mut list = vec![
            Distance::meters(15.0),
            Distance::meters(-1.0),
            Distance::meters(5.0),
        ];
        list.sort();
        assert_eq!(
            list,
            vec![
                Distance::meters(-1.0),
                Distance::meters(5.0),
                Distance::meters(15.0)
            ]
        );
    }
}
