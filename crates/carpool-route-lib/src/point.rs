//! Geographic point type used both as query input and as graph node key

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A (latitude, longitude) pair in decimal degrees.
///
/// Equality is exact coordinate equality: two road vertices are the same graph
/// node only if the dataset gives them bit-identical coordinates. `-0.0` and
/// `0.0` compare equal and hash identically.
///
/// With the `serde` feature the point is (de)serialized as a `[lat, lon]` pair,
/// matching the segment dataset layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(f64, f64)", into = "(f64, f64)"))]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Create a new point from latitude and longitude in degrees
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both coordinates are finite and within WGS84 ranges.
    ///
    /// The routing core does not validate its inputs; callers use this before
    /// handing coordinates over.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Total order on (lat, lon), used to orient undirected edges
    #[inline]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.lat
            .total_cmp(&other.lat)
            .then_with(|| self.lon.total_cmp(&other.lon))
    }
}

#[inline(always)]
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 { 0 } else { value.to_bits() }
}

impl Eq for LatLon {}

impl Hash for LatLon {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical_bits(self.lat).hash(state);
        canonical_bits(self.lon).hash(state);
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for LatLon {
    #[inline]
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for (f64, f64) {
    #[inline]
    fn from(point: LatLon) -> Self {
        (point.lat, point.lon)
    }
}

/// `geo` uses x = longitude, y = latitude
impl From<LatLon> for geo::Point<f64> {
    #[inline]
    fn from(point: LatLon) -> Self {
        geo::Point::new(point.lon, point.lat)
    }
}

impl From<geo::Point<f64>> for LatLon {
    #[inline]
    fn from(point: geo::Point<f64>) -> Self {
        Self {
            lat: point.y(),
            lon: point.x(),
        }
    }
}
