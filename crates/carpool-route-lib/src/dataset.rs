//! Loading road segments from files
//!
//! Two formats are understood, chosen by file extension:
//!
//! - `.json`: an array of segment records `{"id", "highway", "nodes": [[lat, lon], ...]}`
//!   as written by the OSM extraction step (needs the `serde` feature)
//! - `.gpx`: every track segment and every route is one road way; the track
//!   `<type>` is used as the highway class

use crate::{LatLon, Result, RoutingError, Segment};
use rayon::prelude::*;
use std::path::Path;

/// Road ways contained in a parsed GPX document
pub fn segments_from_gpx(gpx: &gpx::Gpx) -> Vec<Segment> {
    let to_nodes =
        |points: &[gpx::Waypoint]| -> Vec<LatLon> { points.iter().map(|w| w.point().into()).collect() };

    let tracks = gpx.tracks.iter().flat_map(|track| {
        track.segments.iter().map(move |segment| Segment {
            id: None,
            highway: track.type_.clone(),
            nodes: to_nodes(&segment.points),
        })
    });
    let routes = gpx.routes.iter().map(|route| Segment {
        id: None,
        highway: route.type_.clone(),
        nodes: to_nodes(&route.points),
    });

    tracks
        .chain(routes)
        .filter(Segment::is_routable)
        .collect()
}

/// Read a JSON array of segment records
#[cfg(feature = "serde")]
pub fn segments_from_json<R: std::io::Read>(reader: R) -> Result<Vec<Segment>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load one dataset file, picking the format from its extension
pub fn load_segments_from_file(path: impl AsRef<Path>) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let segments = match extension.as_deref() {
        Some("gpx") => {
            let reader = std::io::BufReader::new(std::fs::File::open(path)?);
            segments_from_gpx(&gpx::read(reader)?)
        }
        #[cfg(feature = "serde")]
        Some("json") => {
            let reader = std::io::BufReader::new(std::fs::File::open(path)?);
            segments_from_json(reader)?
        }
        _ => return Err(RoutingError::UnsupportedDataset(path.to_path_buf())),
    };

    tracing::debug!("Read {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

/// Load dataset files in parallel, concatenated in the order given
pub fn load_segments_from_files<P: AsRef<Path> + Send + Sync>(paths: Vec<P>) -> Result<Vec<Segment>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("dataset::load_segments_from_files");

    let file_count = paths.len();
    let per_file: Result<Vec<Vec<Segment>>> = paths
        .into_par_iter()
        .map(load_segments_from_file)
        .collect();

    let segments: Vec<Segment> = per_file?.into_iter().flatten().collect();
    tracing::info!(
        "Loaded {} segments from {} files",
        segments.len(),
        file_count
    );
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx::{Gpx, Track, TrackSegment, Waypoint};
    use std::path::PathBuf;

    fn create_test_waypoint(lat: f64, lon: f64) -> Waypoint {
        Waypoint::new(geo::Point::new(lon, lat))
    }

    fn create_test_gpx() -> Gpx {
        let mut gpx = Gpx::default();
        let mut track = Track::default();
        track.type_ = Some("residential".to_string());

        let mut road = TrackSegment::default();
        for i in 0..5 {
            road.points
                .push(create_test_waypoint(47.5 + i as f64 * 0.001, 6.8));
        }
        let mut lone = TrackSegment::default();
        lone.points.push(create_test_waypoint(47.6, 6.9));

        track.segments.push(road);
        track.segments.push(lone);
        gpx.tracks.push(track);
        gpx
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("carpool-route-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_segments_from_gpx() {
        let segments = segments_from_gpx(&create_test_gpx());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 5);
        assert_eq!(segments[0].nodes[0], LatLon::new(47.5, 6.8));
        assert_eq!(segments[0].highway.as_deref(), Some("residential"));
    }

    #[test]
    fn test_load_gpx_file() {
        let path = temp_file(
            "roads.gpx",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="carpool-route" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="47.5" lon="6.8"></trkpt>
      <trkpt lat="47.51" lon="6.81"></trkpt>
    </trkseg>
  </trk>
</gpx>"#,
        );
        let segments = load_segments_from_files(vec![&path]).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].nodes[1], LatLon::new(47.51, 6.81));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_file("roads.csv", "lat,lon\n");
        assert!(matches!(
            load_segments_from_file(&path),
            Err(RoutingError::UnsupportedDataset(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("carpool-route-does-not-exist.gpx");
        assert!(matches!(
            load_segments_from_file(&path),
            Err(RoutingError::Io(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_load_json_files_in_order() {
        let first = temp_file(
            "first.json",
            r#"[{"id": 1, "highway": "primary", "nodes": [[47.5, 6.8], [47.6, 6.9]]}]"#,
        );
        let second = temp_file(
            "second.json",
            r#"[{"id": 2, "nodes": [[47.6, 6.9], [47.7, 7.0]]}, {"id": 3, "nodes": [[1.0, 1.0], [1.0, 1.1]]}]"#,
        );

        let segments = load_segments_from_files(vec![first, second]).unwrap();
        let ids: Vec<_> = segments.iter().filter_map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(segments[0].highway.as_deref(), Some("primary"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_malformed_json() {
        let result = segments_from_json(&b"{\"nodes\": 3}"[..]);
        assert!(matches!(result, Err(RoutingError::Json(_))));
    }
}
