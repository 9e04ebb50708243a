//! Plain GET helper shared by the upstream clients.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::error::UpstreamError;

const USER_AGENT: &str = "AstroDashboard/0.1";

/// Status code and raw body of an upstream response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub fn build_client(request_timeout_secs: u64, connect_timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(request_timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and read the whole body, whatever the status.
///
/// `label` names the request in logs; `url` may carry a credential and is
/// never logged.
pub async fn get_text(
    client: &Client,
    url: &str,
    service: &'static str,
    label: &str,
) -> Result<RawResponse, UpstreamError> {
    let response = client.get(url).send().await.map_err(|e| {
        tracing::error!("Transport error fetching {} from {}: {}", label, service, e);
        UpstreamError::Transport {
            service,
            details: e.to_string(),
        }
    })?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| {
        tracing::error!("Failed to read {} response body for {}: {}", service, label, e);
        UpstreamError::Transport {
            service,
            details: e.to_string(),
        }
    })?;

    tracing::debug!("{} answered {} for {} ({} bytes)", service, status, label, body.len());
    Ok(RawResponse { status, body })
}

/// First `max_chars` characters of an upstream body, for error messages.
pub fn preview(body: &str, max_chars: usize) -> String {
    let mut preview: String = body.chars().take(max_chars).collect();
    if body.chars().count() > max_chars {
        preview.push_str("...");
    }
    preview
}
