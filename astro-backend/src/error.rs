use astro_common::ApiErrorBody;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure talking to one of the third-party APIs
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Transport error reaching {service}: {details}")]
    Transport { service: &'static str, details: String },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Invalid JSON response from {service}: {details}")]
    Json { service: &'static str, details: String },

    #[error("{0}")]
    InvalidStructure(String),
}

impl UpstreamError {
    /// Machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            UpstreamError::Transport { .. } => "CURL_ERROR",
            UpstreamError::Http { .. } => "HTTP_ERROR",
            UpstreamError::Json { .. } => "JSON_ERROR",
            UpstreamError::InvalidStructure(_) => "INVALID_DATA_STRUCTURE",
        }
    }
}

/// Errors returned by the HTTP endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API Key not found or empty.")]
    MissingApiKey,

    #[error("Satellite ID is required.")]
    MissingId,

    #[error("Invalid Satellite ID.")]
    InvalidId,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingApiKey => "API_KEY_ERROR",
            ApiError::MissingId => "MISSING_ID",
            ApiError::InvalidId => "INVALID_ID",
            ApiError::Upstream(e) => e.code(),
        }
    }

    /// Upstream HTTP errors are relayed with the status N2YO returned.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingId | ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::Upstream(UpstreamError::Http { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ApiErrorBody {
        let status = match self {
            ApiError::Upstream(UpstreamError::Http { status, .. }) => Some(*status),
            _ => None,
        };
        ApiErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
