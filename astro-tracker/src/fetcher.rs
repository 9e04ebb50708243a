//! Per-tick snapshot requests for every tracked satellite.

use astro_common::{ApiErrorBody, SatelliteId, SnapshotResponse};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FetchError;
use crate::model::{Batch, FetchOutcome, GENERIC_SATELLITE_NAME, InitialState, Position};

/// Where snapshots come from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self, id: SatelliteId) -> Result<SnapshotResponse, FetchError>;
}

/// Snapshot endpoint of the AstroDashboard backend
pub struct HttpSnapshotSource {
    client: Client,
    endpoint: String,
}

impl HttpSnapshotSource {
    pub fn new(client: Client, backend_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/get_satellite_position", backend_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_snapshot(&self, id: SatelliteId) -> Result<SnapshotResponse, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("satellite_id", id.get())])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!("Received response for ID {}. Status: {}", id, status);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // Only a plain 200 carries a snapshot
        if status != StatusCode::OK {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|err| err.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(FetchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Schema(e.to_string()))
    }
}

/// Issues one request per satellite and turns the answers into validated
/// outcomes.
pub struct PositionFetcher {
    source: Arc<dyn SnapshotSource>,
    /// Injected names, used when a snapshot carries none
    known_names: HashMap<SatelliteId, String>,
}

impl PositionFetcher {
    pub fn new(source: Arc<dyn SnapshotSource>, known_names: HashMap<SatelliteId, String>) -> Self {
        Self { source, known_names }
    }

    pub fn from_initial(source: Arc<dyn SnapshotSource>, initial: &InitialState) -> Self {
        let known_names = initial
            .satellites
            .iter()
            .map(|sat| (sat.id, sat.name.clone()))
            .collect();
        Self::new(source, known_names)
    }

    pub fn known_name(&self, id: SatelliteId) -> Option<&str> {
        self.known_names.get(&id).map(String::as_str)
    }

    /// Fetch every id concurrently and wait for all of them.
    ///
    /// Always yields exactly one outcome per id, in `ids` order; failures
    /// stay local to their outcome.
    pub async fn fetch_all(&self, ids: &[SatelliteId], sequence: u64) -> Batch {
        tracing::debug!("Fetching satellite locations (batch {}, {} ids)", sequence, ids.len());

        let outcomes = join_all(ids.iter().map(|&id| self.fetch_one(id))).await;

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::debug!(
            "Batch {} settled: {} ok, {} failed",
            sequence,
            outcomes.len() - failed,
            failed
        );

        Batch { sequence, outcomes }
    }

    async fn fetch_one(&self, id: SatelliteId) -> FetchOutcome {
        let result = match self.source.fetch_snapshot(id).await {
            Ok(snapshot) => self.normalize(id, snapshot),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::warn!("Error fetching position for satellite ID {} ({}): {}", id, e.kind(), e);
        }

        FetchOutcome { id, result }
    }

    /// Validate a snapshot for the id it was requested as.
    fn normalize(&self, id: SatelliteId, snapshot: SnapshotResponse) -> Result<Position, FetchError> {
        if snapshot.id != id {
            return Err(FetchError::Schema(format!(
                "snapshot for ID {} answered a request for ID {}",
                snapshot.id, id
            )));
        }

        let name = snapshot
            .name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.known_names.get(&id).cloned())
            .unwrap_or_else(|| GENERIC_SATELLITE_NAME.to_string());

        let (Some(latitude), Some(longitude)) = (snapshot.latitude.finite(), snapshot.longitude.finite()) else {
            return Err(FetchError::InvalidCoordinates {
                name,
                latitude: snapshot.latitude.to_string(),
                longitude: snapshot.longitude.to_string(),
            });
        };

        let timestamp = snapshot
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        Position::new(latitude, longitude, snapshot.altitude.finite(), timestamp, name)
    }
}
