//! Best shared destination selection and per-start shortest paths

use crate::dijkstra::ShortestPathTree;
use crate::graph::RoadGraph;
use crate::snap::{Snap, nearest_node, try_nearest_node};
use crate::{LatLon, Result, RoutingError};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered node coordinates from a start to the destination. Empty when the
/// destination is unreachable from that start.
pub type Path = Vec<LatLon>;

/// Road distances from every start to one candidate end
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateScore {
    /// Candidate as supplied by the caller
    pub candidate: LatLon,
    /// Graph node the candidate snapped to
    pub snapped: LatLon,
    /// Sum of `per_start_km`, infinite if any start cannot reach it.
    /// Written as `null` when infinite.
    #[cfg_attr(feature = "serde", serde(with = "infinite_as_null"))]
    pub total_km: f64,
    /// Distance from each start, in start order
    pub per_start_km: Vec<Option<f64>>,
}

impl CandidateScore {
    /// Whether every start has a road path to this candidate
    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.total_km.is_finite()
    }
}

/// JSON has no infinity, so unreachable totals travel as `null`
#[cfg(feature = "serde")]
mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        value.is_finite().then_some(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Work counters of one routing call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteStats {
    /// Single-source searches run, one per start
    pub dijkstra_runs: usize,
    /// Nodes settled over all searches
    pub settled_nodes: usize,
}

/// Outcome of [`route`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteResult {
    /// Winning candidate as supplied by the caller
    pub best_end: LatLon,
    pub best_end_index: usize,
    /// Graph node the winning candidate snapped to, where every path ends
    pub best_end_node: LatLon,
    /// Graph node each start snapped to, in start order
    pub start_nodes: Vec<LatLon>,
    /// One path per start, in start order
    pub paths: Vec<Path>,
    /// One score per candidate, in candidate order
    pub distances: Vec<CandidateScore>,
    pub stats: RouteStats,
}

impl RouteResult {
    /// Road distance between a start and a candidate, by input index.
    ///
    /// # Errors
    /// `Unreachable` if no path connects them, `InvalidQuery` for an index out
    /// of range.
    pub fn pair_distance(&self, start: usize, candidate: usize) -> Result<f64> {
        let score = self.distances.get(candidate).ok_or_else(|| {
            RoutingError::InvalidQuery(format!("no candidate end with index {candidate}"))
        })?;
        let distance = score.per_start_km.get(start).ok_or_else(|| {
            RoutingError::InvalidQuery(format!("no start point with index {start}"))
        })?;
        distance.ok_or(RoutingError::Unreachable {
            start: self.start_nodes[start],
            end: score.snapped,
        })
    }

    /// Total distance of the first candidate supplied at exactly `candidate`
    pub fn total_distance(&self, candidate: LatLon) -> Option<f64> {
        self.distances
            .iter()
            .find(|score| score.candidate == candidate)
            .map(|score| score.total_km)
    }

    /// Score of the winning candidate
    pub fn best_score(&self) -> Option<&CandidateScore> {
        self.distances.get(self.best_end_index)
    }

    /// Road length of path `start`, `None` if it is empty
    pub fn path_distance(&self, start: usize) -> Option<f64> {
        self.best_score()?.per_start_km.get(start).copied().flatten()
    }

    /// Whether every start reaches the chosen destination
    pub fn is_fully_connected(&self) -> bool {
        self.best_score().is_some_and(CandidateScore::is_reachable)
    }

    fn disconnected(starts: &[LatLon], candidates: &[LatLon], graph: &RoadGraph) -> Self {
        let distances: Vec<CandidateScore> = candidates
            .iter()
            .map(|&candidate| CandidateScore {
                candidate,
                snapped: nearest_node(graph, candidate),
                total_km: f64::INFINITY,
                per_start_km: vec![None; starts.len()],
            })
            .collect();

        Self {
            best_end: candidates[0],
            best_end_index: 0,
            best_end_node: distances[0].snapped,
            start_nodes: starts.iter().map(|&p| nearest_node(graph, p)).collect(),
            paths: vec![Path::new(); starts.len()],
            distances,
            stats: RouteStats::default(),
        }
    }
}

/// Reject queries without starts or without candidates
pub fn validate_query(starts: &[LatLon], candidates: &[LatLon]) -> Result<()> {
    if starts.is_empty() {
        return Err(RoutingError::InvalidQuery(
            "at least one start point is required".to_string(),
        ));
    }
    if candidates.is_empty() {
        return Err(RoutingError::InvalidQuery(
            "at least one candidate end point is required".to_string(),
        ));
    }
    Ok(())
}

/// Pick the candidate end minimizing the summed road distance from all
/// starts, and the shortest path from every start to it.
///
/// Starts and candidates are snapped to their nearest graph node first. A
/// start that cannot reach the winner gets an empty path; a candidate that
/// some start cannot reach scores infinity. Exact ties go to the candidate
/// supplied first. The graph is only read.
///
/// # Errors
/// `InvalidQuery` if `starts` or `candidates` is empty.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn route(graph: &RoadGraph, starts: &[LatLon], candidates: &[LatLon]) -> Result<RouteResult> {
    validate_query(starts, candidates)?;

    if graph.is_empty() {
        tracing::warn!(
            "Routing on an empty graph, no candidate end is reachable from {} starts",
            starts.len()
        );
        return Ok(RouteResult::disconnected(starts, candidates, graph));
    }

    let start_snaps = snap_all(graph, starts)?;
    let end_snaps = snap_all(graph, candidates)?;

    // The graph is undirected: one tree per start gives every start-to-end
    // distance and every path.
    let trees: Vec<ShortestPathTree> = {
        #[cfg(feature = "profiling")]
        profiling::scope!("router::dijkstra_per_start");
        start_snaps
            .par_iter()
            .map(|snap| ShortestPathTree::from_source(graph, snap.node))
            .collect()
    };

    let stats = RouteStats {
        dijkstra_runs: trees.len(),
        settled_nodes: trees.iter().map(ShortestPathTree::settled).sum(),
    };

    let distances: Vec<CandidateScore> = candidates
        .iter()
        .zip(&end_snaps)
        .map(|(&candidate, end)| {
            let per_start_km: Vec<Option<f64>> =
                trees.iter().map(|tree| tree.distance(end.node)).collect();
            let total_km = per_start_km
                .iter()
                .map(|d| d.unwrap_or(f64::INFINITY))
                .sum();
            CandidateScore {
                candidate,
                snapped: end.point,
                total_km,
                per_start_km,
            }
        })
        .collect();

    let best_end_index = select_best(&distances);
    let best = &end_snaps[best_end_index];
    tracing::debug!(
        "Candidate totals (km): {:?}",
        distances.iter().map(|s| s.total_km).collect::<Vec<_>>()
    );

    let paths: Vec<Path> = trees
        .iter()
        .map(|tree| {
            tree.path_to(best.node)
                .map(|ids| ids.into_iter().map(|id| graph.point(id)).collect())
                .unwrap_or_default()
        })
        .collect();

    let unreachable = paths.iter().filter(|p| p.is_empty()).count();
    if unreachable > 0 {
        tracing::warn!(
            "{} of {} starts cannot reach the selected end {}",
            unreachable,
            starts.len(),
            candidates[best_end_index]
        );
    }
    tracing::info!(
        "Selected end #{} {} (total {:.3} km) after {} searches settling {} nodes",
        best_end_index,
        candidates[best_end_index],
        distances[best_end_index].total_km,
        stats.dijkstra_runs,
        stats.settled_nodes
    );

    Ok(RouteResult {
        best_end: candidates[best_end_index],
        best_end_index,
        best_end_node: best.point,
        start_nodes: start_snaps.iter().map(|s| s.point).collect(),
        paths,
        distances,
        stats,
    })
}

fn snap_all(graph: &RoadGraph, points: &[LatLon]) -> Result<Vec<Snap>> {
    points
        .iter()
        .map(|&point| try_nearest_node(graph, point))
        .collect()
}

/// Index of the smallest total, first one on exact ties
fn select_best(scores: &[CandidateScore]) -> usize {
    scores
        .iter()
        .enumerate()
        .skip(1)
        .fold(0, |best, (idx, score)| {
            if score.total_km < scores[best].total_km {
                idx
            } else {
                best
            }
        })
}
