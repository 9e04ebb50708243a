use anyhow::Result;
use astro_common::SatelliteId;
use async_trait::async_trait;
use reqwest::Client;

use super::parser::parse_positions_response;
use super::types::SatellitePosition;
use crate::config::BackendConfig;
use crate::error::UpstreamError;
use crate::module::http::{build_client, get_text};

/// Anything that can report where a satellite is right now
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(&self, id: SatelliteId) -> Result<SatellitePosition, UpstreamError>;
}

/// N2YO REST client holding the server-side API key
pub struct N2yoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl N2yoClient {
    pub fn new(config: &BackendConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout_secs, config.connect_timeout_secs)?,
            base_url: config.n2yo_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// `positions/{id}/{observer_lat}/{observer_lng}/{observer_alt}/{seconds}/&apiKey=...`
    pub fn positions_url(&self, id: SatelliteId) -> String {
        format!(
            "{}/positions/{}/0/0/0/1/&apiKey={}",
            self.base_url,
            id,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl PositionProvider for N2yoClient {
    async fn current_position(&self, id: SatelliteId) -> Result<SatellitePosition, UpstreamError> {
        let label = format!("satellite {}", id);
        let raw = get_text(&self.client, &self.positions_url(id), "N2YO API", &label).await?;

        parse_positions_response(id, raw.status, &raw.body).inspect_err(|e| {
            tracing::warn!("N2YO lookup for satellite {} failed: {}", id, e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_url_encodes_key() {
        let config = BackendConfig::default();
        let client = N2yoClient::new(&config, "AB CD&1".to_string()).unwrap();
        assert_eq!(
            client.positions_url(SatelliteId::new(25544).unwrap()),
            "https://api.n2yo.com/rest/v1/satellite/positions/25544/0/0/0/1/&apiKey=AB%20CD%261"
        );
    }

    #[tokio::test]
    #[ignore] // Requires network connection and a real key
    async fn test_fetch_iss_position() {
        let config = BackendConfig::default();
        let client = N2yoClient::new(&config, "invalid-key".to_string()).unwrap();
        let result = client.current_position(SatelliteId::new(25544).unwrap()).await;
        assert!(result.is_err());
    }
}
