//! Renderer-neutral map description of a meeting plan

use crate::LatLon;
use crate::overlap::{GroupKey, OverlapAnalysis, Palette};
use crate::planner::MeetingPlan;
use crate::router::RouteResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const BEST_END_COLOR: &str = "red";
pub const ALTERNATIVE_END_COLOR: &str = "gray";
/// Initial zoom level suggested to map renderers
pub const DEFAULT_ZOOM: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MarkerKind {
    Start,
    BestEnd,
    AlternativeEnd,
    MeetingPoint,
}

impl MarkerKind {
    /// Icon name understood by common web map marker sets
    pub fn icon(self) -> &'static str {
        match self {
            MarkerKind::Start => "play",
            MarkerKind::BestEnd => "star",
            MarkerKind::AlternativeEnd => "question-sign",
            MarkerKind::MeetingPoint => "flag",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: LatLon,
    pub color: String,
    pub label: String,
}

/// Run of consecutive path edges in one group
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    pub path_index: usize,
    pub group: GroupKey,
    pub color: String,
    pub points: Vec<LatLon>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapOverlay {
    pub center: LatLon,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub polylines: Vec<Polyline>,
}

/// 1-based start numbers of a group, for labels
fn start_numbers(group: &GroupKey) -> Vec<usize> {
    group.indices().iter().map(|i| i + 1).collect()
}

impl MapOverlay {
    /// Lay out markers and polylines, centered on the chosen destination.
    ///
    /// Starts take their individual path tag, the chosen end is highlighted
    /// and the other candidates are greyed. Every meeting point gets a flag in
    /// its group tag. Paths are split into one polyline per run of edges in
    /// the same group; unreachable starts draw nothing.
    pub fn new(
        starts: &[LatLon],
        candidates: &[LatLon],
        route: &RouteResult,
        overlap: &OverlapAnalysis,
        palette: &Palette,
    ) -> Self {
        let mut markers = Vec::with_capacity(
            starts.len() + candidates.len() + overlap.meeting_points.len(),
        );

        for (idx, &start) in starts.iter().enumerate() {
            markers.push(Marker {
                kind: MarkerKind::Start,
                position: start,
                color: palette.individual_tag(idx).to_string(),
                label: format!("Start Point {}", idx + 1),
            });
        }

        for (idx, &candidate) in candidates.iter().enumerate() {
            let marker = if idx == route.best_end_index {
                Marker {
                    kind: MarkerKind::BestEnd,
                    position: candidate,
                    color: BEST_END_COLOR.to_string(),
                    label: "Best Destination".to_string(),
                }
            } else {
                Marker {
                    kind: MarkerKind::AlternativeEnd,
                    position: candidate,
                    color: ALTERNATIVE_END_COLOR.to_string(),
                    label: "Potential Destination".to_string(),
                }
            };
            markers.push(marker);
        }

        for meeting in &overlap.meeting_points {
            markers.push(Marker {
                kind: MarkerKind::MeetingPoint,
                position: meeting.node,
                color: meeting.tag.clone(),
                label: format!("Meeting: Starts {:?}", start_numbers(&meeting.group)),
            });
        }

        let mut polylines: Vec<Polyline> = Vec::new();
        for (path_index, edges) in overlap.edges.iter().enumerate() {
            let mut current: Option<Polyline> = None;
            for edge in edges {
                match current.as_mut() {
                    Some(line) if line.group == edge.group => line.points.push(edge.to),
                    _ => {
                        if let Some(line) = current.take() {
                            polylines.push(line);
                        }
                        current = Some(Polyline {
                            path_index,
                            group: edge.group.clone(),
                            color: edge.tag.clone(),
                            points: vec![edge.from, edge.to],
                        });
                    }
                }
            }
            polylines.extend(current);
        }

        Self {
            center: route.best_end,
            zoom: DEFAULT_ZOOM,
            markers,
            polylines,
        }
    }

    pub fn from_plan(plan: &MeetingPlan, palette: &Palette) -> Self {
        Self::new(
            &plan.starts,
            &plan.candidates,
            &plan.route,
            &plan.overlap,
            palette,
        )
    }

    pub fn markers_of(&self, kind: MarkerKind) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.kind == kind)
    }
}
