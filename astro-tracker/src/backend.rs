//! Page-load state from the AstroDashboard backend.

use anyhow::{Context, Result, bail};
use astro_common::DashboardState;
use reqwest::Client;

pub struct DashboardClient {
    client: Client,
    url: String,
}

impl DashboardClient {
    pub fn new(client: Client, backend_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/api/dashboard", backend_url.trim_end_matches('/')),
        }
    }

    pub async fn fetch(&self) -> Result<DashboardState> {
        tracing::info!("Fetching dashboard state from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Dashboard request failed with status {}", status);
        }

        let state: DashboardState = response
            .json()
            .await
            .context("Failed to decode dashboard state")?;

        if state.census_error {
            tracing::warn!("Backend reported an astronaut census failure");
        }
        if state.satellite_api_error && !state.satellite_key_error {
            tracing::warn!("Backend could not fetch every initial satellite position");
        }
        tracing::info!(
            "Dashboard: {} satellites, {} people in space",
            state.satellites.len(),
            state.astronaut_count
        );

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_url() {
        let client = DashboardClient::new(Client::new(), "http://127.0.0.1:8080/");
        assert_eq!(client.url, "http://127.0.0.1:8080/api/dashboard");
    }

    #[tokio::test]
    #[ignore] // needs a running backend
    async fn test_fetch_local_backend() {
        let client = DashboardClient::new(Client::new(), "http://127.0.0.1:8080");
        let state = client.fetch().await.unwrap();
        assert!(!state.satellites.is_empty());
    }
}
