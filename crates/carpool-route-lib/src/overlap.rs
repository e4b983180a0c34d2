//! Shared-leg detection between routed paths
//!
//! Every undirected edge traversed by at least one path is keyed by the set of
//! path indices that traverse it. Paths are then walked in index order, edges
//! in travel order, and each edge is tagged by its group: a single-path group
//! keeps the path's own tag, a shared group gets a tag from the shared palette
//! on first encounter and keeps it for every later edge with the same index
//! set. The node reached at the end of a shared group's first edge is its
//! meeting point.

use crate::router::Path;
use crate::{LatLon, Result, RoutingError};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tag used once the shared palette runs out
pub const FALLBACK_TAG: &str = "black";

/// Sorted, deduplicated set of path indices traversing the same edges
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupKey(SmallVec<[usize; 4]>);

impl GroupKey {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: SmallVec<[usize; 4]> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self(indices)
    }

    pub fn single(index: usize) -> Self {
        Self(smallvec::smallvec![index])
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// More than one path uses this group's edges
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.0.len() > 1
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_slice())
    }
}

fn to_strings(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Tags handed out to path groups
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Palette {
    /// Per-path tags, cycled by path index
    pub individual: Vec<String>,
    /// Tags for shared groups, allocated in discovery order
    pub shared: Vec<String>,
    /// Tag for shared groups discovered after `shared` is used up
    pub fallback: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            individual: to_strings(&["blue", "purple", "darkgreen", "cadetblue"]),
            shared: to_strings(&[
                "orange",
                "red",
                "darkred",
                "green",
                "darkblue",
                "lightred",
                "lightgreen",
                "darkpurple",
            ]),
            fallback: FALLBACK_TAG.to_string(),
        }
    }
}

impl Palette {
    /// # Errors
    /// `InvalidPalette` if `individual` is empty.
    pub fn new(individual: Vec<String>, shared: Vec<String>, fallback: String) -> Result<Self> {
        let palette = Self {
            individual,
            shared,
            fallback,
        };
        palette.validate()?;
        Ok(palette)
    }

    /// Check that per-path tags can be cycled
    pub fn validate(&self) -> Result<()> {
        if self.individual.is_empty() {
            return Err(RoutingError::InvalidPalette(
                "individual palette must contain at least one tag".to_string(),
            ));
        }
        Ok(())
    }

    /// Tag of path `index` when it runs alone
    pub fn individual_tag(&self, index: usize) -> &str {
        if self.individual.is_empty() {
            return &self.fallback;
        }
        &self.individual[index % self.individual.len()]
    }

    /// Tag of the `ordinal`-th shared group discovered
    pub fn shared_tag(&self, ordinal: usize) -> &str {
        self.shared
            .get(ordinal)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// One traversed edge of one path
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedEdge {
    pub from: LatLon,
    pub to: LatLon,
    pub group: GroupKey,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupTag {
    pub key: GroupKey,
    pub tag: String,
}

/// Where the paths of a shared group come together
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeetingPoint {
    pub group: GroupKey,
    pub node: LatLon,
    pub tag: String,
}

/// Result of [`analyze_overlap`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverlapAnalysis {
    /// Per path, its edges in travel order
    pub edges: Vec<Vec<TaggedEdge>>,
    /// Every distinct group in first-seen order
    pub groups: Vec<GroupTag>,
    /// One per shared group, in discovery order
    pub meeting_points: Vec<MeetingPoint>,
}

impl OverlapAnalysis {
    /// Tags only, per path and per edge
    pub fn segment_tags(&self) -> Vec<Vec<String>> {
        self.edges
            .iter()
            .map(|edges| edges.iter().map(|e| e.tag.clone()).collect())
            .collect()
    }

    pub fn meeting_point(&self, group: &GroupKey) -> Option<LatLon> {
        self.meeting_points
            .iter()
            .find(|m| &m.group == group)
            .map(|m| m.node)
    }

    pub fn tag_of(&self, group: &GroupKey) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| &g.key == group)
            .map(|g| g.tag.as_str())
    }

    /// Groups used by more than one path
    pub fn shared_groups(&self) -> impl Iterator<Item = &GroupTag> {
        self.groups.iter().filter(|g| g.key.is_shared())
    }
}

/// Undirected edge identity: endpoints in a fixed order
fn edge_key(a: LatLon, b: LatLon) -> (LatLon, LatLon) {
    if a.total_cmp(&b).is_le() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Tag path edges with the default [`Palette`]
pub fn analyze_overlap(paths: &[Path]) -> OverlapAnalysis {
    analyze_overlap_with(paths, &Palette::default())
}

/// Tag path edges by the set of paths sharing them
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn analyze_overlap_with(paths: &[Path], palette: &Palette) -> OverlapAnalysis {
    let mut users: HashMap<(LatLon, LatLon), SmallVec<[usize; 4]>> = HashMap::new();
    for (idx, path) in paths.iter().enumerate() {
        for pair in path.windows(2) {
            let entry = users.entry(edge_key(pair[0], pair[1])).or_default();
            if entry.last() != Some(&idx) {
                entry.push(idx);
            }
        }
    }

    let mut tags: HashMap<GroupKey, String> = HashMap::new();
    let mut groups = Vec::new();
    let mut meeting_points = Vec::new();
    let mut shared_allocated = 0usize;
    let mut edges: Vec<Vec<TaggedEdge>> = Vec::with_capacity(paths.len());

    for (idx, path) in paths.iter().enumerate() {
        let mut tagged = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let group = users
                .get(&edge_key(from, to))
                .map(|indices| GroupKey::new(indices.iter().copied()))
                .unwrap_or_else(|| GroupKey::single(idx));

            let tag = match tags.get(&group) {
                Some(tag) => tag.clone(),
                None => {
                    let tag = if group.is_shared() {
                        let tag = palette.shared_tag(shared_allocated).to_string();
                        shared_allocated += 1;
                        meeting_points.push(MeetingPoint {
                            group: group.clone(),
                            node: to,
                            tag: tag.clone(),
                        });
                        tag
                    } else {
                        palette.individual_tag(idx).to_string()
                    };
                    tags.insert(group.clone(), tag.clone());
                    groups.push(GroupTag {
                        key: group.clone(),
                        tag: tag.clone(),
                    });
                    tag
                }
            };

            tagged.push(TaggedEdge {
                from,
                to,
                group,
                tag,
            });
        }
        edges.push(tagged);
    }

    tracing::debug!(
        "Tagged {} paths into {} groups with {} meeting points",
        paths.len(),
        groups.len(),
        meeting_points.len()
    );

    OverlapAnalysis {
        edges,
        groups,
        meeting_points,
    }
}
