//! Builds the page-load state: initial satellite positions plus the census.

use astro_common::{AstronautEntry, CraftEntry, DashboardState, InitialSatellite};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;

use super::census::CensusProvider;
use super::links::{astronaut_links, craft_links};
use super::n2yo::PositionProvider;
use crate::config::BackendConfig;

pub struct DashboardService {
    config: Arc<BackendConfig>,
    /// `None` when the N2YO key is missing
    positions: Option<Arc<dyn PositionProvider>>,
    census: Arc<dyn CensusProvider>,
}

impl DashboardService {
    pub fn new(
        config: Arc<BackendConfig>,
        positions: Option<Arc<dyn PositionProvider>>,
        census: Arc<dyn CensusProvider>,
    ) -> Self {
        Self {
            config,
            positions,
            census,
        }
    }

    /// Query both upstreams and assemble the dashboard.
    ///
    /// Never fails: every upstream problem is reported through the error
    /// flags of [`DashboardState`].
    pub async fn build_state(&self) -> DashboardState {
        let fetched_at = Utc::now();

        let (satellites, satellite_api_error) = self.initial_satellites(fetched_at.timestamp()).await;
        let satellite_key_error = self.positions.is_none();

        let (astronauts, astronaut_count, crafts, census_error) = match self.census.census().await {
            Ok(census) => {
                let astronauts = census
                    .people
                    .iter()
                    .map(|person| AstronautEntry {
                        name: person.name.clone(),
                        craft: person.craft.clone(),
                        links: astronaut_links(&person.name),
                    })
                    .collect();
                let crafts = census
                    .crafts()
                    .into_iter()
                    .map(|name| CraftEntry {
                        links: craft_links(&name),
                        name,
                    })
                    .collect();
                (astronauts, census.number, crafts, false)
            }
            Err(e) => {
                tracing::error!("Failed Open Notify fetch: {}", e);
                (Vec::new(), 0, Vec::new(), true)
            }
        };

        DashboardState {
            fetched_at,
            satellites,
            astronauts,
            astronaut_count,
            crafts,
            satellite_key_error,
            satellite_api_error,
            census_error,
            has_global_error: satellite_key_error || satellite_api_error || census_error,
        }
    }

    /// One entry per configured satellite, in configured order. Failed
    /// lookups fall back to `"N/A"` coordinates stamped with `now`.
    async fn initial_satellites(&self, now: i64) -> (Vec<InitialSatellite>, bool) {
        let Some(provider) = &self.positions else {
            tracing::warn!("N2YO API key missing, skipping initial satellite fetch");
            let satellites = self
                .config
                .satellites
                .iter()
                .map(|sat| InitialSatellite::unavailable(sat.id, sat.name.clone(), now))
                .collect();
            return (satellites, true);
        };

        let lookups = self
            .config
            .satellites
            .iter()
            .map(|sat| provider.current_position(sat.id));
        let results = join_all(lookups).await;

        let mut any_failed = false;
        let satellites = self
            .config
            .satellites
            .iter()
            .zip(results)
            .map(|(sat, result)| match result {
                Ok(position) => position.to_initial(&sat.name),
                Err(e) => {
                    any_failed = true;
                    tracing::error!(
                        "Failed initial N2YO fetch for ID {} (Name: {}): {}",
                        sat.id,
                        sat.name,
                        e
                    );
                    InitialSatellite::unavailable(sat.id, sat.name.clone(), now)
                }
            })
            .collect();

        (satellites, any_failed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::module::census::{Astronaut, Census};
    use crate::module::n2yo::SatellitePosition;
    use astro_common::SatelliteId;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Scripted N2YO stand-in: ids without an entry fail with a transport error.
    pub(crate) struct FakePositions(pub HashMap<u32, (f64, f64)>);

    #[async_trait]
    impl PositionProvider for FakePositions {
        async fn current_position(&self, id: SatelliteId) -> Result<SatellitePosition, UpstreamError> {
            match self.0.get(&id.get()) {
                Some(&(latitude, longitude)) => Ok(SatellitePosition {
                    id,
                    latitude,
                    longitude,
                    altitude: 420.0,
                    timestamp: 1_700_000_000,
                    name: None,
                }),
                None => Err(UpstreamError::Transport {
                    service: "N2YO API",
                    details: "connection refused".to_string(),
                }),
            }
        }
    }

    pub(crate) struct FakeCensus(pub Option<Census>);

    #[async_trait]
    impl CensusProvider for FakeCensus {
        async fn census(&self) -> Result<Census, UpstreamError> {
            self.0
                .clone()
                .ok_or_else(|| UpstreamError::InvalidStructure("Open Notify reported 'failure'".to_string()))
        }
    }

    pub(crate) fn sample_census() -> Census {
        Census {
            people: vec![
                Astronaut { name: "Jasmin Moghbeli".to_string(), craft: "ISS".to_string() },
                Astronaut { name: "Tang Hongbo".to_string(), craft: "Tiangong".to_string() },
                Astronaut { name: "Andreas Mogensen".to_string(), craft: "ISS".to_string() },
            ],
            number: 3,
        }
    }

    #[tokio::test]
    async fn test_build_state_all_healthy() {
        let positions = FakePositions(HashMap::from([
            (25544, (10.0, 20.0)),
            (54216, (-5.0, 100.0)),
            (20580, (28.5, -80.6)),
        ]));
        let service = DashboardService::new(
            Arc::new(BackendConfig::default()),
            Some(Arc::new(positions)),
            Arc::new(FakeCensus(Some(sample_census()))),
        );

        let state = service.build_state().await;

        assert!(!state.has_global_error);
        let ids: Vec<u32> = state.satellites.iter().map(|s| s.id.get()).collect();
        assert_eq!(ids, vec![25544, 54216, 20580]);
        assert_eq!(state.satellites[0].name, "ISS");
        assert_eq!(state.satellites[0].latitude.finite(), Some(10.0));
        assert_eq!(state.astronaut_count, 3);
        let crafts: Vec<&str> = state.crafts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(crafts, vec!["ISS", "Tiangong"]);
    }

    #[tokio::test]
    async fn test_build_state_partial_failure() {
        let positions = FakePositions(HashMap::from([(25544, (10.0, 20.0))]));
        let service = DashboardService::new(
            Arc::new(BackendConfig::default()),
            Some(Arc::new(positions)),
            Arc::new(FakeCensus(None)),
        );

        let state = service.build_state().await;

        assert!(state.satellite_api_error);
        assert!(!state.satellite_key_error);
        assert!(state.census_error);
        assert!(state.has_global_error);
        assert!(state.satellites[0].latitude.is_available());
        assert!(!state.satellites[2].latitude.is_available());
        assert_eq!(state.satellites[2].name, "Hubble");
        assert!(state.astronauts.is_empty());
    }

    #[tokio::test]
    async fn test_build_state_without_key() {
        let service = DashboardService::new(
            Arc::new(BackendConfig::default()),
            None,
            Arc::new(FakeCensus(Some(sample_census()))),
        );

        let state = service.build_state().await;

        assert!(state.satellite_key_error);
        assert_eq!(state.satellites.len(), 3);
        assert!(state.satellites.iter().all(|s| !s.longitude.is_available()));
    }
}
