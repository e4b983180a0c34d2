//! Planner - Top-level pipeline from raw segments to a meeting plan
//!
//! Runs the stages in order: bounding-box filter, graph construction, routing
//! with destination selection, then overlap analysis. The straight-line
//! ranking of the candidates is computed alongside for comparison.

use crate::centrality::{crow_flies_ranking, most_central};
use crate::filter::{DEFAULT_BUFFER_DEG, FilterStats, filter_segments_with_stats, validate_buffer};
use crate::graph::{GraphInfo, RoadGraph, build_graph};
use crate::overlap::{OverlapAnalysis, Palette, analyze_overlap_with};
use crate::overlay::MapOverlay;
use crate::router::{RouteResult, route, validate_query};
use crate::{LatLon, Result, Segment};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the planner
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Enlargement of the query bounding box on every side, in degrees.
    /// Default: 0.1
    pub buffer_deg: f64,
    /// Tags handed to path groups by the overlap analysis
    pub palette: Palette,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            buffer_deg: DEFAULT_BUFFER_DEG,
            palette: Palette::default(),
        }
    }
}

impl PlannerConfig {
    /// Check the buffer and the palette
    pub fn validate(&self) -> Result<()> {
        validate_buffer(self.buffer_deg)?;
        self.palette.validate()
    }
}

/// Everything computed for one query
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeetingPlan {
    pub starts: Vec<LatLon>,
    pub candidates: Vec<LatLon>,
    pub filter: FilterStats,
    pub graph: GraphInfo,
    pub route: RouteResult,
    pub overlap: OverlapAnalysis,
    /// Straight-line distance sum per candidate, in candidate order
    pub crow_flies_km: Vec<f64>,
}

impl MeetingPlan {
    /// Renderer-facing markers and polylines for this plan
    pub fn overlay(&self, palette: &Palette) -> MapOverlay {
        MapOverlay::from_plan(self, palette)
    }
}

/// Runs meeting-point queries with one configuration
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Filter `segments` around the query, build the graph and plan on it.
    ///
    /// # Errors
    /// `InvalidQuery` for an empty start or candidate list or a negative
    /// buffer, and `InvalidPalette` for an unusable palette, all before any
    /// work is done.
    pub fn plan(
        &self,
        segments: &[Segment],
        starts: &[LatLon],
        candidates: &[LatLon],
    ) -> Result<MeetingPlan> {
        #[cfg(feature = "profiling")]
        profiling::scope!("planner::plan");

        validate_query(starts, candidates)?;
        self.config.validate()?;

        let query_points: Vec<LatLon> = starts.iter().chain(candidates).copied().collect();
        let (kept, filter) =
            filter_segments_with_stats(segments, &query_points, self.config.buffer_deg);
        let graph = build_graph(kept);

        let mut plan = self.plan_on_graph(&graph, starts, candidates)?;
        plan.filter = filter;
        Ok(plan)
    }

    /// Plan on an already built graph. The filter statistics of the result
    /// are left at zero.
    pub fn plan_on_graph(
        &self,
        graph: &RoadGraph,
        starts: &[LatLon],
        candidates: &[LatLon],
    ) -> Result<MeetingPlan> {
        validate_query(starts, candidates)?;
        self.config.palette.validate()?;

        let route = route(graph, starts, candidates)?;
        let overlap = analyze_overlap_with(&route.paths, &self.config.palette);
        let crow_flies_km = crow_flies_ranking(starts, candidates);
        if let Some(central) =
            most_central(starts, candidates).filter(|&idx| idx != route.best_end_index)
        {
            tracing::debug!(
                "Straight-line pick #{} differs from the road pick #{}",
                central,
                route.best_end_index
            );
        }

        tracing::info!(
            "Planned {} routes to {} with {} meeting points",
            route.paths.iter().filter(|p| !p.is_empty()).count(),
            route.best_end,
            overlap.meeting_points.len()
        );

        Ok(MeetingPlan {
            starts: starts.to_vec(),
            candidates: candidates.to_vec(),
            filter: FilterStats::default(),
            graph: graph.info(),
            route,
            overlap,
            crow_flies_km,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoutingError;
    use crate::overlap::GroupKey;

    fn south(i: usize) -> LatLon {
        LatLon::new(47.50, 6.80 + i as f64 * 0.01)
    }

    fn north(i: usize) -> LatLon {
        LatLon::new(47.51, 6.80 + i as f64 * 0.01)
    }

    /// Small street ladder with two parallel roads joined by rungs, plus a
    /// far away road that the filter must drop
    fn create_test_segments() -> Vec<Segment> {
        let mut segments = vec![
            Segment::new((0..6).map(south).collect())
                .unwrap()
                .with_id(1)
                .with_highway("residential"),
            Segment::new((0..6).map(north).collect())
                .unwrap()
                .with_id(2)
                .with_highway("residential"),
        ];
        for i in [0, 3, 5] {
            segments.push(
                Segment::new(vec![south(i), north(i)])
                    .unwrap()
                    .with_id(10 + i as i64),
            );
        }
        segments.push(
            Segment::new(vec![LatLon::new(10.0, 10.0), LatLon::new(10.01, 10.0)])
                .unwrap()
                .with_id(99),
        );
        segments
    }

    #[test]
    fn test_config_default() {
        let config = PlannerConfig::default();
        assert_eq!(config.buffer_deg, 0.1);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn test_plan_end_to_end() {
        let planner = Planner::new(PlannerConfig::default());
        let segments = create_test_segments();
        let starts = [south(4), north(4)];
        let candidates = [LatLon::new(47.9, 6.5), LatLon::new(47.504, 6.8505)];

        let plan = planner.plan(&segments, &starts, &candidates).unwrap();

        assert_eq!(plan.filter.total, 6);
        assert_eq!(plan.filter.kept, 5);
        assert_eq!(plan.graph.node_count, 12);
        assert_eq!(plan.route.best_end_index, 1);
        assert_eq!(plan.route.best_end_node, south(5));
        assert_eq!(plan.route.paths.len(), 2);
        assert!(plan.route.is_fully_connected());
        assert_eq!(plan.overlap.edges.len(), 2);
        assert_eq!(plan.crow_flies_km.len(), 2);
        assert!(plan.crow_flies_km[1] < plan.crow_flies_km[0]);

        for path in &plan.route.paths {
            assert_eq!(path.last(), Some(&plan.route.best_end_node));
        }
    }

    #[test]
    fn test_plan_finds_meeting_point() {
        let planner = Planner::default();
        let segments = create_test_segments();
        // Both starts on the south road, destination at its far end
        let starts = [south(0), south(2)];
        let end = south(5);

        let plan = planner.plan(&segments, &starts, &[end]).unwrap();
        let shared = GroupKey::new([0, 1]);
        assert_eq!(plan.route.paths[0], (0..6).map(south).collect::<Vec<_>>());
        assert_eq!(plan.route.paths[1], (2..6).map(south).collect::<Vec<_>>());
        assert_eq!(plan.overlap.meeting_point(&shared), Some(south(3)));
    }

    #[test]
    fn test_haversine_path_weights_match_distances() {
        let graph = build_graph(&create_test_segments());
        let starts = [south(0), north(1), north(4), south(2)];
        let candidates = [north(3), south(5)];

        let result = route(&graph, &starts, &candidates).unwrap();
        assert!(result.is_fully_connected());
        for (idx, path) in result.paths.iter().enumerate() {
            let weight = graph.path_weight(path).unwrap();
            let reported = result.pair_distance(idx, result.best_end_index).unwrap();
            assert!((weight - reported).abs() < 1e-6, "start {idx}: {weight} vs {reported}");
        }
        let total: f64 = (0..starts.len())
            .map(|idx| result.pair_distance(idx, result.best_end_index).unwrap())
            .sum();
        assert!((total - result.best_score().unwrap().total_km).abs() < 1e-6);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_plan_with_unreachable_candidate_survives_json() {
        let mut segments = create_test_segments();
        let island = LatLon::new(47.53, 6.85);
        segments.push(Segment::new(vec![island, LatLon::new(47.54, 6.85)]).unwrap());

        let plan = Planner::default()
            .plan(&segments, &[south(0), south(2)], &[island, south(5)])
            .unwrap();
        assert!(!plan.route.distances[0].is_reachable());

        let json = serde_json::to_string(&plan).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["route"]["distances"][0]["total_km"].is_null());

        let restored: MeetingPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.route.distances[0].total_km, f64::INFINITY);
        assert!(!restored.route.distances[0].is_reachable());
        assert!(restored.route.distances[1].is_reachable());
        assert!(
            (restored.route.distances[1].total_km - plan.route.distances[1].total_km).abs() < 1e-9
        );
        assert_eq!(restored.route.best_end_index, 1);
        assert_eq!(
            restored.overlap.meeting_points[0].group,
            GroupKey::new([0, 1])
        );
    }

    #[test]
    fn test_plan_rejects_empty_query() {
        let planner = Planner::default();
        let segments = create_test_segments();
        let result = planner.plan(&segments, &[], &[LatLon::new(47.5, 6.8)]);
        assert!(matches!(result, Err(RoutingError::InvalidQuery(_))));
    }

    #[test]
    fn test_plan_rejects_empty_palette() {
        let mut config = PlannerConfig::default();
        config.palette.individual.clear();
        let planner = Planner::new(config);
        let result = planner.plan(
            &create_test_segments(),
            &[LatLon::new(47.5, 6.8)],
            &[LatLon::new(47.5, 6.81)],
        );
        assert!(matches!(result, Err(RoutingError::InvalidPalette(_))));
    }

    #[test]
    fn test_plan_rejects_negative_buffer() {
        let planner = Planner::new(PlannerConfig {
            buffer_deg: -0.1,
            ..PlannerConfig::default()
        });
        let result = planner.plan(
            &create_test_segments(),
            &[south(0)],
            &[south(5)],
        );
        assert!(matches!(result, Err(RoutingError::InvalidQuery(_))));
    }

    #[test]
    fn test_plan_without_nearby_roads() {
        let planner = Planner::default();
        let segments = create_test_segments();
        let starts = [LatLon::new(-30.0, 150.0)];
        let plan = planner.plan(&segments, &starts, &[LatLon::new(-30.1, 150.1)]).unwrap();
        assert_eq!(plan.filter.kept, 0);
        assert_eq!(plan.graph, GraphInfo::default());
        assert!(plan.route.paths[0].is_empty());
        assert!(plan.overlap.meeting_points.is_empty());
    }
}
