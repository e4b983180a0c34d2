//! Snapping arbitrary coordinates onto graph nodes

use crate::graph::{NodeId, RoadGraph};
use crate::utils::haversine_km;
use crate::{LatLon, Result, RoutingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of snapping a coordinate onto the graph
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snap {
    pub node: NodeId,
    /// Coordinate of `node`
    pub point: LatLon,
    /// Haversine distance from the query point to `point`, in km
    pub distance_km: f64,
}

/// Find the graph node closest to `point`.
///
/// This is an exact scan over every node by haversine distance. Ties go to the
/// node inserted first.
///
/// # Errors
/// `NoGraphData` if the graph has no nodes.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn try_nearest_node(graph: &RoadGraph, point: LatLon) -> Result<Snap> {
    let mut best: Option<Snap> = None;

    for (idx, &candidate) in graph.points().iter().enumerate() {
        let distance_km = haversine_km(point, candidate);
        // Strict comparison keeps the earliest node on ties
        if best.is_none_or(|current| distance_km < current.distance_km) {
            best = Some(Snap {
                node: NodeId::from_index(idx),
                point: candidate,
                distance_km,
            });
        }
    }

    best.ok_or(RoutingError::NoGraphData)
}

/// Coordinate of the graph node closest to `point`.
///
/// On a graph without nodes the query point is returned unchanged; use
/// [`try_nearest_node`] to detect that case.
pub fn nearest_node(graph: &RoadGraph, point: LatLon) -> LatLon {
    match try_nearest_node(graph, point) {
        Ok(snap) => snap.point,
        Err(_) => point,
    }
}
