//! Bounding-box prefilter for large segment datasets

use crate::{LatLon, Result, RoutingError, Segment};
use geo::{Coord, Rect};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default enlargement of the query box in each direction, in degrees
pub const DEFAULT_BUFFER_DEG: f64 = 0.1;

/// Reject a negative or non-finite buffer
pub fn validate_buffer(buffer_deg: f64) -> Result<()> {
    if buffer_deg.is_finite() && buffer_deg >= 0.0 {
        Ok(())
    } else {
        Err(RoutingError::InvalidQuery(format!(
            "buffer must be a finite non-negative number of degrees, got {buffer_deg}"
        )))
    }
}

/// Axis-aligned query region in degrees (`x` = longitude, `y` = latitude)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryBounds {
    rect: Rect<f64>,
}

/// Counts reported by a filtering pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterStats {
    /// Segments in the input dataset
    pub total: usize,
    /// Segments with at least one vertex inside the query box
    pub kept: usize,
}

impl QueryBounds {
    /// Bounding box of `points`, enlarged by `buffer_deg` on every side.
    ///
    /// An empty point list gives the degenerate (0, 0, 0, 0) box.
    pub fn around(points: &[LatLon], buffer_deg: f64) -> Self {
        if points.is_empty() {
            return Self::degenerate();
        }

        let (min_lat, max_lat, min_lon, max_lon) = points.iter().fold(
            (
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
            ),
            |(min_lat, max_lat, min_lon, max_lon), p| {
                (
                    min_lat.min(p.lat),
                    max_lat.max(p.lat),
                    min_lon.min(p.lon),
                    max_lon.max(p.lon),
                )
            },
        );

        Self {
            rect: Rect::new(
                Coord {
                    x: min_lon - buffer_deg,
                    y: min_lat - buffer_deg,
                },
                Coord {
                    x: max_lon + buffer_deg,
                    y: max_lat + buffer_deg,
                },
            ),
        }
    }

    /// The zero-area box at the origin
    pub fn degenerate() -> Self {
        Self {
            rect: Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }),
        }
    }

    /// Inclusive containment test on all four edges
    #[inline]
    pub fn contains(&self, point: LatLon) -> bool {
        let min = self.rect.min();
        let max = self.rect.max();
        min.y <= point.lat && point.lat <= max.y && min.x <= point.lon && point.lon <= max.x
    }

    #[inline]
    pub fn min_lat(&self) -> f64 {
        self.rect.min().y
    }

    #[inline]
    pub fn max_lat(&self) -> f64 {
        self.rect.max().y
    }

    #[inline]
    pub fn min_lon(&self) -> f64 {
        self.rect.min().x
    }

    #[inline]
    pub fn max_lon(&self) -> f64 {
        self.rect.max().x
    }

    /// Underlying `geo` rectangle
    #[inline]
    pub fn rect(&self) -> Rect<f64> {
        self.rect
    }
}

/// Keep the segments that have at least one vertex inside the query box.
///
/// Kept segments are returned whole and in input order; vertices outside the
/// box stay attached to their segment. An empty `query_points` list keeps
/// nothing, and so does a buffer rejected by [`validate_buffer`].
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn filter_segments<'a>(
    segments: &'a [Segment],
    query_points: &[LatLon],
    buffer_deg: f64,
) -> Vec<&'a Segment> {
    filter_segments_with_stats(segments, query_points, buffer_deg).0
}

/// Same as [`filter_segments`], also returning the before/after counts
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn filter_segments_with_stats<'a>(
    segments: &'a [Segment],
    query_points: &[LatLon],
    buffer_deg: f64,
) -> (Vec<&'a Segment>, FilterStats) {
    if query_points.is_empty() {
        tracing::warn!(
            "Empty query point list, filtering out all {} segments",
            segments.len()
        );
        return (
            Vec::new(),
            FilterStats {
                total: segments.len(),
                kept: 0,
            },
        );
    }

    if let Err(e) = validate_buffer(buffer_deg) {
        tracing::warn!("{}, filtering out all {} segments", e, segments.len());
        return (
            Vec::new(),
            FilterStats {
                total: segments.len(),
                kept: 0,
            },
        );
    }

    let bounds = QueryBounds::around(query_points, buffer_deg);
    tracing::debug!(
        "Query box lat [{:.6}, {:.6}] lon [{:.6}, {:.6}]",
        bounds.min_lat(),
        bounds.max_lat(),
        bounds.min_lon(),
        bounds.max_lon()
    );

    let kept: Vec<&Segment> = segments
        .par_iter()
        .filter(|segment| segment.nodes.iter().any(|&p| bounds.contains(p)))
        .collect();

    let stats = FilterStats {
        total: segments.len(),
        kept: kept.len(),
    };
    tracing::info!(
        "Filtered from {} segments to {} segments",
        stats.total,
        stats.kept
    );

    (kept, stats)
}
