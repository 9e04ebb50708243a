use astro_common::{DashboardState, InitialSatellite, SatelliteId};

use crate::error::FetchError;

/// Name used for a valid position when neither the endpoint nor the
/// initial state names the satellite
pub const GENERIC_SATELLITE_NAME: &str = "Satellite";

/// Name shown for an error record with no known name
pub const UNKNOWN_SATELLITE_NAME: &str = "Unknown";

/// A validated sub-satellite point. Latitude and longitude are always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    timestamp: i64,
    name: String,
}

impl Position {
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: Option<f64>,
        timestamp: i64,
        name: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let name = name.into();
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(FetchError::InvalidCoordinates {
                name,
                latitude: latitude.to_string(),
                longitude: longitude.to_string(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
            altitude: altitude.filter(|alt| alt.is_finite()),
            timestamp,
            name,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Kilometres; `None` when upstream did not report a usable value
    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    /// UTC seconds since epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Latest known state of one satellite
#[derive(Debug, Clone, PartialEq)]
pub enum PositionRecord {
    Valid(Position),
    Error { name: Option<String> },
}

impl PositionRecord {
    pub fn error(name: Option<String>) -> Self {
        PositionRecord::Error { name }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            PositionRecord::Valid(position) => Some(position),
            PositionRecord::Error { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, PositionRecord::Valid(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PositionRecord::Valid(position) => Some(position.name()),
            PositionRecord::Error { name } => name.as_deref(),
        }
    }

    /// `"N/A"` or otherwise unusable coordinates give an error record that
    /// keeps the injected name.
    pub fn from_initial(initial: &InitialSatellite) -> Self {
        match (initial.latitude.finite(), initial.longitude.finite()) {
            (Some(latitude), Some(longitude)) => Position::new(
                latitude,
                longitude,
                initial.altitude.finite(),
                initial.timestamp,
                initial.name.clone(),
            )
            .map(PositionRecord::Valid)
            .unwrap_or_else(|_| PositionRecord::error(Some(initial.name.clone()))),
            _ => PositionRecord::error(Some(initial.name.clone())),
        }
    }
}

/// Result of one snapshot request
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub id: SatelliteId,
    pub result: Result<Position, FetchError>,
}

impl FetchOutcome {
    /// The record this outcome stores. Bad coordinates keep the name the
    /// payload carried; other failures fall back to `known_name`.
    pub fn to_record(&self, known_name: Option<&str>) -> PositionRecord {
        match &self.result {
            Ok(position) => PositionRecord::Valid(position.clone()),
            Err(FetchError::InvalidCoordinates { name, .. }) => PositionRecord::error(Some(name.clone())),
            Err(_) => PositionRecord::error(known_name.map(str::to_string)),
        }
    }
}

/// Every outcome of one `fetch_all`, tagged with its dispatch order
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Strictly increasing per dispatch, starting at 1
    pub sequence: u64,
    pub outcomes: Vec<FetchOutcome>,
}

/// What the surrounding page injects at startup
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    /// Tracked satellites, in configured order
    pub satellites: Vec<InitialSatellite>,
    /// Set when the data-acquisition layer is unusable as a whole
    pub global_error: Option<String>,
}

impl InitialState {
    pub fn new(satellites: Vec<InitialSatellite>) -> Self {
        Self {
            satellites,
            global_error: None,
        }
    }

    /// Only a missing credential is global; per-satellite failures stay
    /// local to their record.
    pub fn from_dashboard(state: &DashboardState) -> Self {
        let global_error = state
            .satellite_key_error
            .then(|| "N2YO API key is missing on the server".to_string());
        Self {
            satellites: state.satellites.clone(),
            global_error,
        }
    }

    pub fn ids(&self) -> Vec<SatelliteId> {
        self.satellites.iter().map(|sat| sat.id).collect()
    }

    /// The satellite bound to the map at startup
    pub fn default_selection(&self) -> Option<SatelliteId> {
        self.satellites.first().map(|sat| sat.id)
    }

    pub fn name_of(&self, id: SatelliteId) -> Option<&str> {
        self.satellites
            .iter()
            .find(|sat| sat.id == id)
            .map(|sat| sat.name.as_str())
    }
}
