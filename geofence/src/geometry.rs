//! Great-circle distance between geographic coordinates.
//!
//! Region radii in existing geofence files were tuned against an Earth radius
//! of 6,376,500 m rather than the WGS84 mean radius. The constant must stay
//! as it is, otherwise positions near a region's edge change classification.

/// Earth radius in meters used for every distance computation.
pub const EARTH_RADIUS_METERS: f64 = 6_376_500.0;

/// Calculates the great-circle distance in meters between two points using
/// the Haversine formula.
///
/// Arguments are `(longitude, latitude)` pairs in decimal degrees. The result
/// is never negative and does not depend on argument order.
///
/// # Example
///
/// ```rust
/// use geofence::geometry::distance_meters;
///
/// let d = distance_meters(11.0, 48.0, 11.0, 48.0);
/// assert_eq!(d, 0.0);
/// ```
pub fn distance_meters(
    longitude: f64,
    latitude: f64,
    other_longitude: f64,
    other_latitude: f64,
) -> f64 {
    let lat1_rad = latitude.to_radians();
    let lat2_rad = other_latitude.to_radians();
    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = other_longitude.to_radians() - longitude.to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Moves a point due north by `meters` and returns the new latitude.
///
/// Inverse of [`distance_meters`] along a meridian; handy for placing test
/// positions at an exact distance from a region center.
pub fn offset_latitude(latitude: f64, meters: f64) -> f64 {
    latitude + (meters / EARTH_RADIUS_METERS).to_degrees()
}
