use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use super::parser::parse_astros_response;
use super::types::Census;
use crate::config::BackendConfig;
use crate::error::UpstreamError;
use crate::module::http::{build_client, get_text};

#[async_trait]
pub trait CensusProvider: Send + Sync {
    async fn census(&self) -> Result<Census, UpstreamError>;
}

pub struct OpenNotifyClient {
    client: Client,
    url: String,
}

impl OpenNotifyClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout_secs, config.connect_timeout_secs)?,
            url: config.open_notify_url.clone(),
        })
    }
}

#[async_trait]
impl CensusProvider for OpenNotifyClient {
    async fn census(&self) -> Result<Census, UpstreamError> {
        tracing::info!("Fetching astronaut census from {}", self.url);
        let raw = get_text(&self.client, &self.url, "Open Notify", "astronaut census").await?;
        let census = parse_astros_response(raw.status, &raw.body)?;
        tracing::info!("Census: {} people in space", census.number);
        Ok(census)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network connection
    async fn test_fetch_census() {
        let client = OpenNotifyClient::new(&BackendConfig::default()).unwrap();
        let census = client.census().await.unwrap();
        assert_eq!(census.people.len() as u32, census.number);
    }
}
