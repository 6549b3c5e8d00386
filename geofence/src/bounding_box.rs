/// A latitude/longitude rectangle used to prefilter regions before the exact
/// distance test.
///
/// The box is half-open: the minimum edges belong to it, the maximum edges do
/// not. Coordinates are decimal degrees.
///
/// # Examples
///
/// ```rust
/// use geofence::BoundingBox;
///
/// let bbox = BoundingBox::around(48.0, 11.0, 0.2);
/// assert!(bbox.contains_point(48.1, 11.1));
/// assert!(bbox.contains_point(47.8, 10.8));
/// assert!(!bbox.contains_point(48.2, 11.0));
/// ```
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct BoundingBox {
    /// Southern edge (inclusive)
    pub min_lat: f64,
    /// Western edge (inclusive)
    pub min_lng: f64,
    /// Northern edge (exclusive)
    pub max_lat: f64,
    /// Eastern edge (exclusive)
    pub max_lng: f64,
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox([{}, {}) x [{}, {}))",
            self.min_lat, self.max_lat, self.min_lng, self.max_lng
        )
    }
}

impl BoundingBox {
    /// Creates a new bounding box with the specified edges.
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> BoundingBox {
        BoundingBox {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        }
    }

    /// Creates a square box extending `half_extent` degrees in every
    /// direction from the given center.
    pub fn around(lat: f64, lng: f64, half_extent: f64) -> BoundingBox {
        BoundingBox::new(
            lat - half_extent,
            lng - half_extent,
            lat + half_extent,
            lng + half_extent,
        )
    }

    /// Checks if this bounding box contains a point.
    #[inline]
    pub fn contains_point(&self, lat: f64, lng: f64) -> bool {
        self.min_lat <= lat && lat < self.max_lat && self.min_lng <= lng && lng < self.max_lng
    }
}
