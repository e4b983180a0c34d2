//! Road segment records as produced by the OSM extraction step

use crate::{LatLon, Result, RoutingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One mapped road way: an ordered polyline of at least two vertices.
///
/// The optional `id` and `highway` fields carry the OSM way id and highway
/// class through filtering; routing ignores them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// OSM way id, if the source provided one
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub id: Option<i64>,
    /// OSM `highway=*` value, if the source provided one
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub highway: Option<String>,
    /// Vertices in way order
    pub nodes: Vec<LatLon>,
}

impl Segment {
    /// Create a segment from its vertices
    ///
    /// # Errors
    /// `InvalidGeometry` if fewer than two vertices are given.
    pub fn new(nodes: Vec<LatLon>) -> Result<Self> {
        if nodes.len() < 2 {
            return Err(RoutingError::InvalidGeometry(format!(
                "segment needs at least 2 vertices, got {}",
                nodes.len()
            )));
        }
        Ok(Self {
            id: None,
            highway: None,
            nodes,
        })
    }

    /// Attach the OSM way id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach the OSM highway class
    pub fn with_highway(mut self, highway: impl Into<String>) -> Self {
        self.highway = Some(highway.into());
        self
    }

    /// Number of vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for deserialized records without any vertex
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether this record can contribute at least one edge
    #[inline]
    pub fn is_routable(&self) -> bool {
        self.nodes.len() >= 2
    }

    /// Consecutive vertex pairs, in way order
    pub fn edges(&self) -> impl Iterator<Item = (LatLon, LatLon)> + '_ {
        self.nodes.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_segment() -> Segment {
        Segment::new(vec![
            LatLon::new(47.50, 6.80),
            LatLon::new(47.51, 6.81),
            LatLon::new(47.52, 6.82),
        ])
        .unwrap()
    }

    #[test]
    fn test_segment_creation() {
        let segment = create_test_segment().with_id(42).with_highway("residential");
        assert_eq!(segment.len(), 3);
        assert_eq!(segment.id, Some(42));
        assert_eq!(segment.highway.as_deref(), Some("residential"));
        assert!(segment.is_routable());
    }

    #[test]
    fn test_single_vertex_segment_fails() {
        let result = Segment::new(vec![LatLon::new(47.5, 6.8)]);
        assert!(matches!(result, Err(RoutingError::InvalidGeometry(_))));
        assert!(Segment::new(Vec::new()).is_err());
    }

    #[test]
    fn test_edges_follow_way_order() {
        let segment = create_test_segment();
        let edges: Vec<_> = segment.edges().collect();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], (segment.nodes[0], segment.nodes[1]));
        assert_eq!(edges[1], (segment.nodes[1], segment.nodes[2]));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_dataset_record() {
        let json = r#"{"id": 7, "highway": "primary", "nodes": [[47.5, 6.8], [47.6, 6.9]]}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(segment.id, Some(7));
        assert_eq!(segment.nodes[1], LatLon::new(47.6, 6.9));

        let bare: Segment = serde_json::from_str(r#"{"nodes": [[1.0, 2.0]]}"#).unwrap();
        assert!(bare.id.is_none());
        assert!(!bare.is_routable());
    }
}
