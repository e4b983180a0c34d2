//! Weighted undirected road graph built from segment polylines
//!
//! Every segment vertex becomes a node, every consecutive vertex pair becomes
//! an edge weighted by its haversine length in kilometers. Nodes are addressed
//! by a dense [`NodeId`] in first-insertion order, which is also the order the
//! snapper scans them in.

use crate::utils::haversine_km;
use crate::{LatLon, Segment};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense index of a node in a [`RoadGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Adjacency entry: (neighbour, weight in km). Road nodes rarely have more
/// than four incident edges.
type Neighbors = SmallVec<[(NodeId, f64); 4]>;

/// Node and edge counts of a built graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphInfo {
    pub node_count: usize,
    pub edge_count: usize,
}

/// Undirected road graph keyed by exact coordinates.
///
/// Invariants: no self-loops, at most one edge per unordered node pair, and
/// the weight of an edge is the haversine distance of its endpoints.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    points: Vec<LatLon>,
    ids: HashMap<LatLon, NodeId>,
    adjacency: Vec<Neighbors>,
    edge_count: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RoadGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `nodes` nodes
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            points: Vec::with_capacity(nodes),
            ids: HashMap::with_capacity(nodes),
            adjacency: Vec::with_capacity(nodes),
            edge_count: 0,
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn info(&self) -> GraphInfo {
        GraphInfo {
            node_count: self.node_count(),
            edge_count: self.edge_count,
        }
    }

    /// Look up the node at exactly this coordinate
    #[inline]
    pub fn node_id(&self, point: &LatLon) -> Option<NodeId> {
        self.ids.get(point).copied()
    }

    #[inline]
    pub fn contains(&self, point: &LatLon) -> bool {
        self.ids.contains_key(point)
    }

    /// Coordinate of a node
    ///
    /// Panics if `id` does not belong to this graph.
    #[inline]
    pub fn point(&self, id: NodeId) -> LatLon {
        self.points[id.index()]
    }

    /// All node coordinates in insertion order
    #[inline]
    pub fn points(&self) -> &[LatLon] {
        &self.points
    }

    /// Incident edges of a node as (neighbour, weight km)
    #[inline]
    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, f64)] {
        self.adjacency
            .get(id.index())
            .map(|n| n.as_slice())
            .unwrap_or(&[])
    }

    /// Weight of the edge between `a` and `b`, if they are adjacent
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.neighbors(a)
            .iter()
            .find(|(other, _)| *other == b)
            .map(|&(_, weight)| weight)
    }

    /// Sum of edge weights along a coordinate path.
    ///
    /// Returns `None` if a vertex is not in the graph or two consecutive
    /// vertices are not adjacent. Empty and single-point paths weigh 0.
    pub fn path_weight(&self, path: &[LatLon]) -> Option<f64> {
        let mut total = 0.0;
        for pair in path.windows(2) {
            let a = self.node_id(&pair[0])?;
            let b = self.node_id(&pair[1])?;
            total += self.edge_weight(a, b)?;
        }
        if let [single] = path {
            self.node_id(single)?;
        }
        Some(total)
    }

    /// Get the node for `point`, inserting it if absent
    pub(crate) fn add_node(&mut self, point: LatLon) -> NodeId {
        if let Some(&id) = self.ids.get(&point) {
            return id;
        }
        let id = NodeId(self.points.len() as u32);
        self.points.push(point);
        self.adjacency.push(Neighbors::new());
        self.ids.insert(point, id);
        id
    }

    /// Insert or overwrite the undirected edge `a`-`b`.
    ///
    /// Self-loops are ignored.
    pub(crate) fn insert_edge(&mut self, a: NodeId, b: NodeId, weight: f64) {
        if a == b {
            return;
        }
        let existed = Self::upsert_half(&mut self.adjacency[a.index()], b, weight);
        Self::upsert_half(&mut self.adjacency[b.index()], a, weight);
        if !existed {
            self.edge_count += 1;
        }
    }

    /// Graph with hand-picked weights, for exercising the routing logic on
    /// abstract topologies
    #[cfg(test)]
    pub(crate) fn from_weighted_edges(edges: &[(LatLon, LatLon, f64)]) -> Self {
        let mut graph = Self::new();
        for &(from, to, weight) in edges {
            let a = graph.add_node(from);
            let b = graph.add_node(to);
            graph.insert_edge(a, b, weight);
        }
        graph
    }

    fn upsert_half(neighbors: &mut Neighbors, to: NodeId, weight: f64) -> bool {
        match neighbors.iter_mut().find(|(other, _)| *other == to) {
            Some(entry) => {
                entry.1 = weight;
                true
            }
            None => {
                neighbors.push((to, weight));
                false
            }
        }
    }
}

/// Build the road graph from (filtered) segments.
///
/// Accepts owned segments or references, e.g. the output of
/// [`filter_segments`](crate::filter_segments). Records with fewer than two
/// vertices contribute nothing.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build_graph<S, I>(segments: I) -> RoadGraph
where
    S: Borrow<Segment>,
    I: IntoIterator<Item = S>,
{
    let segments = segments.into_iter();
    // Two endpoints per known segment, shared junctions aside
    let mut graph = RoadGraph::with_capacity(segments.size_hint().0 * 2);
    let mut skipped = 0usize;

    for segment in segments {
        let segment = segment.borrow();
        if !segment.is_routable() {
            skipped += 1;
            continue;
        }
        for (from, to) in segment.edges() {
            let a = graph.add_node(from);
            let b = graph.add_node(to);
            graph.insert_edge(a, b, haversine_km(from, to));
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} segments with fewer than 2 vertices", skipped);
    }
    tracing::info!(
        "Built graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    graph
}
