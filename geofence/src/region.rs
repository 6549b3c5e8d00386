//! The named circular region matched against vehicle positions.

use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Radius used when a record does not carry one.
pub const DEFAULT_RADIUS_METERS: i32 = 50;

/// A named circle on the Earth's surface, e.g. "Home" or a known charger.
///
/// Regions are immutable once built; reloading replaces whole snapshots.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    name: String,
    lat: f64,
    lng: f64,
    radius_meters: i32,
}

impl Region {
    /// Creates a region centered at `(lat, lng)` in decimal degrees.
    pub fn new(name: impl Into<String>, lat: f64, lng: f64, radius_meters: i32) -> Self {
        Region {
            name: name.into(),
            lat,
            lng,
            radius_meters,
        }
    }

    /// Creates a region with [`DEFAULT_RADIUS_METERS`].
    pub fn with_default_radius(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Region::new(name, lat, lng, DEFAULT_RADIUS_METERS)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn radius_meters(&self) -> i32 {
        self.radius_meters
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (lat={:.6}, lng={:.6}, radius={}m)",
            self.name, self.lat, self.lng, self.radius_meters
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_region() {
        let region = Region::new("Home", 48.0, 11.0, 100);
        assert_eq!(region.name(), "Home");
        assert_eq!(region.lat(), 48.0);
        assert_eq!(region.lng(), 11.0);
        assert_eq!(region.radius_meters(), 100);
    }

    #[test]
    fn test_default_radius() {
        let region = Region::with_default_radius("Store", 48.1, 11.2);
        assert_eq!(region.radius_meters(), 50);
    }

    #[test]
    fn test_display() {
        let region = Region::new("Work", 48.1, 11.5, 200);
        assert_eq!(
            region.to_string(),
            "Work (lat=48.100000, lng=11.500000, radius=200m)"
        );
    }
}
