//! Carpool Route Library - Shared destination routing on a road graph
//!
//! Given a set of start locations and a set of candidate destinations, this
//! library picks the destination with the smallest summed road distance from
//! all starts, computes the shortest road path from every start to it, and
//! finds where those paths merge so a map layer can highlight the shared legs.
//!
//! # Architecture
//!
//! - **[`filter_segments`]**: Bounding-box prefilter over a large segment dataset
//! - **[`build_graph`]**: Weighted undirected [`RoadGraph`] from segment polylines
//! - **[`nearest_node`]**: Exact snapping of arbitrary points onto graph nodes
//! - **[`route`]**: Destination selection and per-start Dijkstra paths
//! - **[`analyze_overlap`]**: Shared-leg groups, tags and meeting points
//! - **[`Planner`]**: All of the above behind one configuration
//! - **[`MapOverlay`]**: Markers and polylines for a renderer
//!
//! # Performance Characteristics
//!
//! - **Filter**: O(V) over all dataset vertices, parallel
//! - **Graph build**: O(V) expected
//! - **Snapping**: O(N) per point, N = graph nodes
//! - **Routing**: O(S × (E + N) log N) for S starts, one search per start in parallel

mod centrality;
pub mod dataset;
mod dijkstra;
mod filter;
mod graph;
mod overlap;
mod overlay;
mod planner;
mod point;
mod router;
mod segment;
mod snap;
pub mod utils;

// Public API exports
pub use centrality::{crow_flies_ranking, most_central};
pub use dijkstra::ShortestPathTree;
pub use filter::{
    DEFAULT_BUFFER_DEG, FilterStats, QueryBounds, filter_segments, filter_segments_with_stats,
    validate_buffer,
};
pub use graph::{GraphInfo, NodeId, RoadGraph, build_graph};
pub use overlap::{
    FALLBACK_TAG, GroupKey, GroupTag, MeetingPoint, OverlapAnalysis, Palette, TaggedEdge,
    analyze_overlap, analyze_overlap_with,
};
pub use overlay::{
    ALTERNATIVE_END_COLOR, BEST_END_COLOR, MapOverlay, Marker, MarkerKind, Polyline,
};
pub use planner::{MeetingPlan, Planner, PlannerConfig};
pub use point::LatLon;
pub use router::{CandidateScore, Path, RouteResult, RouteStats, route, validate_query};
pub use segment::Segment;
pub use snap::{Snap, nearest_node, try_nearest_node};
pub use utils::haversine_km;

/// Error types for the routing pipeline
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("Graph has no nodes")]
    NoGraphData,

    #[error("No path from {start} to {end}")]
    Unreachable { start: LatLon, end: LatLon },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unsupported dataset format: {}", .0.display())]
    UnsupportedDataset(std::path::PathBuf),

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RoutingError>;
