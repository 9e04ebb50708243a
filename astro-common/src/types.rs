use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Placeholder used by the upstream feeds when a value could not be fetched.
pub const NOT_AVAILABLE: &str = "N/A";

/// NORAD catalogue number of a tracked object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SatelliteId(NonZeroU32);

impl SatelliteId {
    /// Returns `None` for zero, which is never a valid catalogue number.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SatelliteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid satellite id: {}", s))?;
        Self::new(raw).ok_or_else(|| format!("Invalid satellite id: {}", s))
    }
}

/// A numeric field as the upstream feeds send it.
///
/// N2YO reports plain numbers, the injected initial state may carry numeric
/// text or the literal `"N/A"`. Only [`Coordinate::finite`] decides whether a
/// value is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    pub fn not_available() -> Self {
        Coordinate::Text(NOT_AVAILABLE.to_string())
    }

    /// The value as a finite float, or `None` for `"N/A"`, garbage text, NaN
    /// and infinities.
    pub fn finite(&self) -> Option<f64> {
        match self {
            Coordinate::Number(value) => Some(*value).filter(|v| v.is_finite()),
            Coordinate::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.finite().is_some()
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Coordinate::Number(value)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coordinate::Number(value) => write!(f, "{}", value),
            Coordinate::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Body of a successful `GET /get_satellite_position` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub id: SatelliteId,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub altitude: Coordinate,
    /// UTC seconds since epoch
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Error body returned by the backend endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Last known state of one tracked satellite, as injected at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSatellite {
    pub id: SatelliteId,
    pub name: String,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub altitude: Coordinate,
    pub timestamp: i64,
}

impl InitialSatellite {
    /// Entry for a satellite whose initial fetch failed.
    pub fn unavailable(id: SatelliteId, name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude: Coordinate::not_available(),
            longitude: Coordinate::not_available(),
            altitude: Coordinate::not_available(),
            timestamp,
        }
    }
}

/// Search links rendered next to a person or a craft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLinks {
    pub wikipedia: String,
    pub google: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstronautEntry {
    pub name: String,
    pub craft: String,
    pub links: ExternalLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftEntry {
    pub name: String,
    pub links: ExternalLinks,
}

/// Everything the dashboard page needs at load time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardState {
    pub fetched_at: DateTime<Utc>,
    /// Tracked satellites in configured order
    pub satellites: Vec<InitialSatellite>,
    pub astronauts: Vec<AstronautEntry>,
    pub astronaut_count: u32,
    /// Unique craft names, sorted
    pub crafts: Vec<CraftEntry>,
    /// The N2YO credential is missing, no satellite data was requested
    pub satellite_key_error: bool,
    /// At least one initial satellite fetch failed
    pub satellite_api_error: bool,
    /// The Open Notify census could not be fetched
    pub census_error: bool,
    pub has_global_error: bool,
}
