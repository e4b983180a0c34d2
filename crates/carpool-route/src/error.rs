use carpool_route_lib::{LatLon, RoutingError};
use std::path::PathBuf;

/// Error types for the command line tool
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("Invalid coordinate {0}: latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate(LatLon),

    #[error("Could not read query file {}: {source}", path.display())]
    QueryFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
