//! Straight-line ranking of candidate ends, independent of the road graph

use crate::LatLon;
use crate::utils::haversine_km;

/// Per candidate, the sum of haversine distances to every start, in km
pub fn crow_flies_ranking(starts: &[LatLon], candidates: &[LatLon]) -> Vec<f64> {
    candidates
        .iter()
        .map(|&candidate| {
            starts
                .iter()
                .map(|&start| haversine_km(start, candidate))
                .sum()
        })
        .collect()
}

/// Index of the candidate closest to all starts as the crow flies, the first
/// one on ties. `None` without candidates.
pub fn most_central(starts: &[LatLon], candidates: &[LatLon]) -> Option<usize> {
    crow_flies_ranking(starts, candidates)
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, total)| match best {
            Some((_, best_total)) if best_total <= total => best,
            _ => Some((idx, total)),
        })
        .map(|(idx, _)| idx)
}
