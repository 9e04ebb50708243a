//! Turns raw N2YO responses into [`SatellitePosition`]s.

use astro_common::SatelliteId;
use serde_json::Value;

use super::types::{RawPositionsResponse, SatellitePosition};
use crate::error::UpstreamError;
use crate::module::http::preview;

const SERVICE: &str = "N2YO API";
const PREVIEW_CHARS: usize = 200;

/// Interpret one `positions` response.
///
/// Non-200 statuses become [`UpstreamError::Http`] whatever the body; a 200
/// without a non-empty `positions` array is [`UpstreamError::InvalidStructure`].
pub fn parse_positions_response(
    id: SatelliteId,
    status: u16,
    body: &str,
) -> Result<SatellitePosition, UpstreamError> {
    let parsed: Result<Value, _> = serde_json::from_str(body);

    if status != 200 {
        let mut message = format!("{} returned HTTP status {}", SERVICE, status);
        match parsed.as_ref().ok().and_then(upstream_detail) {
            Some(detail) => message.push_str(&detail),
            None => message.push_str(&format!(". Response: {}", preview(body, PREVIEW_CHARS))),
        }
        return Err(UpstreamError::Http { status, message });
    }

    let value = parsed.map_err(|e| UpstreamError::Json {
        service: SERVICE,
        details: e.to_string(),
    })?;

    let invalid = |value: &Value| {
        let mut message = format!("Invalid or empty data structure in {} response.", SERVICE);
        if let Some(detail) = upstream_detail(value) {
            message.push_str(&detail);
        }
        UpstreamError::InvalidStructure(message)
    };

    let response: RawPositionsResponse =
        serde_json::from_value(value.clone()).map_err(|_| invalid(&value))?;

    let Some(first) = response.positions.into_iter().next() else {
        return Err(invalid(&value));
    };

    Ok(SatellitePosition {
        id,
        latitude: first.satlatitude,
        longitude: first.satlongitude,
        altitude: first.sataltitude,
        timestamp: first.timestamp,
        name: response
            .info
            .and_then(|info| info.satname)
            .filter(|name| !name.trim().is_empty()),
    })
}

/// Status or error text N2YO embeds in its JSON bodies, if any.
fn upstream_detail(value: &Value) -> Option<String> {
    let mut detail = String::new();

    match value.get("status") {
        Some(Value::String(status)) => detail.push_str(&format!(" Status: {}", status)),
        Some(Value::Number(status)) => detail.push_str(&format!(" Status: {}", status)),
        Some(status @ Value::Object(_)) => {
            if let Some(message) = status.get("message").and_then(Value::as_str) {
                detail.push_str(&format!(" - {}", message));
            }
        }
        _ => {}
    }

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        detail.push_str(&format!(" - {}", error));
    }

    if detail.is_empty() { None } else { Some(detail) }
}
