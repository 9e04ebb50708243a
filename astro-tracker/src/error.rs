use astro_common::SatelliteId;
use thiserror::Error;

/// Why one satellite's snapshot could not become a usable position.
///
/// Every variant collapses to the same `Error` record in the store; the
/// distinction only feeds the logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The snapshot endpoint could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("HTTP error! Status: {status}, Message: {message}")]
    Http { status: u16, message: String },

    /// The body was not a snapshot
    #[error("Malformed snapshot payload: {0}")]
    Schema(String),

    /// Latitude or longitude is missing, `"N/A"` or not finite
    #[error("Invalid coordinates for {name}: lat {latitude}, lon {longitude}")]
    InvalidCoordinates {
        name: String,
        latitude: String,
        longitude: String,
    },
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) | FetchError::Http { .. } => "transport",
            FetchError::Schema(_) => "schema",
            FetchError::InvalidCoordinates { .. } => "invalid_coordinates",
        }
    }
}

/// Rejected tracker commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The data-acquisition layer is unusable (for instance no API key);
    /// per-satellite data must not be relied on.
    #[error("Satellite feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Satellite {0} is not tracked")]
    UnknownSatellite(SatelliteId),

    #[error("No satellites configured")]
    NoSatellites,

    #[error("Tracker has stopped")]
    Stopped,
}
