//! Great-circle distance helpers

use crate::LatLon;

/// Mean Earth radius used for all edge weights, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points in kilometers.
///
/// Every graph edge weight and every snapping distance goes through this one
/// function, so rebuilding a graph from the same segments reproduces the same
/// weights bit for bit.
#[inline]
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Sum of haversine distances along a polyline, in kilometers
pub fn polyline_length_km(points: &[LatLon]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum()
}
