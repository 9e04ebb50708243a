use astro_common::{Coordinate, InitialSatellite, SatelliteId, SnapshotResponse};
use serde::Deserialize;

/// Name reported when N2YO omits `info.satname`
pub const UNKNOWN_SATELLITE_NAME: &str = "Unknown Satellite";

/// Raw `positions` response
#[derive(Debug, Deserialize)]
pub(crate) struct RawPositionsResponse {
    #[serde(default)]
    pub info: Option<RawInfo>,
    #[serde(default)]
    pub positions: Vec<RawPosition>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawInfo {
    #[serde(default)]
    pub satname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPosition {
    pub satlatitude: f64,
    pub satlongitude: f64,
    pub sataltitude: f64,
    pub timestamp: i64,
}

/// Current position of one satellite as reported by N2YO
#[derive(Debug, Clone, PartialEq)]
pub struct SatellitePosition {
    pub id: SatelliteId,
    pub latitude: f64,
    pub longitude: f64,
    /// Kilometres above the WGS-84 ellipsoid
    pub altitude: f64,
    pub timestamp: i64,
    pub name: Option<String>,
}

impl SatellitePosition {
    pub fn to_snapshot(&self) -> SnapshotResponse {
        SnapshotResponse {
            id: self.id,
            latitude: Coordinate::from(self.latitude),
            longitude: Coordinate::from(self.longitude),
            altitude: Coordinate::from(self.altitude),
            timestamp: Some(self.timestamp),
            name: Some(
                self.name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_SATELLITE_NAME.to_string()),
            ),
        }
    }

    /// Injected initial state; the configured name stands in for a missing one.
    pub fn to_initial(&self, configured_name: &str) -> InitialSatellite {
        InitialSatellite {
            id: self.id,
            name: self
                .name
                .clone()
                .unwrap_or_else(|| configured_name.to_string()),
            latitude: Coordinate::from(self.latitude),
            longitude: Coordinate::from(self.longitude),
            altitude: Coordinate::from(self.altitude),
            timestamp: self.timestamp,
        }
    }
}
