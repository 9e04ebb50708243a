use super::types::{AstrosResponse, Census};
use crate::error::UpstreamError;
use crate::module::http::preview;

const SERVICE: &str = "Open Notify";

/// Interpret an `astros.json` response; anything but `"message": "success"` is an error.
pub fn parse_astros_response(status: u16, body: &str) -> Result<Census, UpstreamError> {
    if status != 200 {
        return Err(UpstreamError::Http {
            status,
            message: format!(
                "{} returned HTTP status {}. Response: {}",
                SERVICE,
                status,
                preview(body, 200)
            ),
        });
    }

    let response: AstrosResponse = serde_json::from_str(body).map_err(|e| UpstreamError::Json {
        service: SERVICE,
        details: e.to_string(),
    })?;

    if response.message != "success" {
        return Err(UpstreamError::InvalidStructure(format!(
            "{} reported '{}'",
            SERVICE, response.message
        )));
    }

    Ok(Census {
        people: response.people,
        number: response.number,
    })
}
