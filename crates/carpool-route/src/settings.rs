use crate::error::{CliError, Result};
use carpool_route_lib::{DEFAULT_BUFFER_DEG, LatLon, PlannerConfig};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Carpool Route - Pick the best shared destination for a group of drivers and show where their routes meet
pub struct Settings {
    /// Road segment datasets to load (.json or .gpx)
    #[clap(short, long, value_name = "FILE", required = true, num_args = 1..)]
    pub segments: Vec<PathBuf>,

    /// Start location, repeat for every driver
    #[clap(long = "start", value_name = "LAT,LON", value_parser = parse_lat_lon)]
    pub starts: Vec<LatLon>,

    /// Candidate destination, repeat for every candidate
    #[clap(long = "end", value_name = "LAT,LON", value_parser = parse_lat_lon)]
    pub ends: Vec<LatLon>,

    /// JSON query file with `starts` and `ends` arrays of [lat, lon] pairs,
    /// appended to the locations given on the command line
    #[clap(short, long, value_name = "FILE")]
    pub query: Option<PathBuf>,

    /// Margin around the query locations when selecting road segments, in degrees
    #[clap(long, default_value_t = DEFAULT_BUFFER_DEG)]
    pub buffer: f64,

    /// Write the report to this file instead of stdout
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include markers and polylines for a map renderer in the report
    #[clap(long, default_value = "false")]
    pub overlay: bool,

    /// Indent the JSON report
    #[clap(long, default_value = "false")]
    pub pretty: bool,
}

/// Locations read from a `--query` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryFile {
    pub starts: Vec<LatLon>,
    pub ends: Vec<LatLon>,
}

impl QueryFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::QueryFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Parse a `LAT,LON` pair in decimal degrees
pub fn parse_lat_lon(value: &str) -> std::result::Result<LatLon, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{value}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {e}", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {e}", lon.trim()))?;

    let point = LatLon::new(lat, lon);
    if !point.is_valid() {
        return Err(format!("coordinate out of range: {point}"));
    }
    Ok(point)
}

impl Settings {
    /// Start and candidate locations from the command line and the query file
    pub fn query_points(&self) -> Result<(Vec<LatLon>, Vec<LatLon>)> {
        let mut starts = self.starts.clone();
        let mut ends = self.ends.clone();

        if let Some(path) = &self.query {
            let file = QueryFile::read(path)?;
            tracing::debug!(
                "Query file {} adds {} starts and {} ends",
                path.display(),
                file.starts.len(),
                file.ends.len()
            );
            starts.extend(file.starts);
            ends.extend(file.ends);
        }

        if let Some(&invalid) = starts.iter().chain(&ends).find(|p| !p.is_valid()) {
            return Err(CliError::InvalidCoordinate(invalid));
        }
        Ok((starts, ends))
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            buffer_deg: self.buffer,
            ..PlannerConfig::default()
        }
    }
}
