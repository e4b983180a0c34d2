//! Single-source shortest path trees over a [`RoadGraph`]

use crate::graph::{NodeId, RoadGraph};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry. Ordered so that `BinaryHeap` pops the smallest cost first, with
/// the lower node index winning ties.
#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Distances and predecessors from one source node to every reachable node
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: NodeId,
    dist: Vec<f64>,
    pred: Vec<Option<NodeId>>,
    settled: usize,
}

impl ShortestPathTree {
    /// Run Dijkstra from `source` until the queue drains.
    ///
    /// Panics if `source` does not belong to `graph`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn from_source(graph: &RoadGraph, source: NodeId) -> Self {
        let n = graph.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut pred = vec![None; n];
        let mut settled = 0usize;
        let mut heap = BinaryHeap::new();

        dist[source.index()] = 0.0;
        heap.push(State {
            cost: 0.0,
            node: source,
        });

        while let Some(State { cost, node }) = heap.pop() {
            // Stale entry, a shorter path was already settled
            if cost > dist[node.index()] {
                continue;
            }
            settled += 1;

            for &(next, weight) in graph.neighbors(node) {
                let candidate = cost + weight;
                if candidate < dist[next.index()] {
                    dist[next.index()] = candidate;
                    pred[next.index()] = Some(node);
                    heap.push(State {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        Self {
            source,
            dist,
            pred,
            settled,
        }
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Number of heap pops that settled a node
    #[inline]
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Shortest distance to `target` in km, `None` if unreachable
    pub fn distance(&self, target: NodeId) -> Option<f64> {
        self.dist
            .get(target.index())
            .copied()
            .filter(|d| d.is_finite())
    }

    /// Node sequence from the source to `target`, both included.
    ///
    /// `[source]` when `target` is the source, `None` if unreachable.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        self.distance(target)?;

        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.pred[current.index()]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}
