use astro_common::{DashboardState, SatelliteId, SnapshotResponse};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::module::dashboard::DashboardService;
use crate::module::n2yo::PositionProvider;

static NON_INTEGER_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9+\-]").expect("static pattern"));

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BackendConfig>,
    /// `None` when the N2YO key is missing
    pub positions: Option<Arc<dyn PositionProvider>>,
    pub dashboard: Arc<DashboardService>,
}

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    pub satellite_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/get_satellite_position", get(get_satellite_position))
        .route("/api/dashboard", get(dashboard))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Current position of one allow-listed satellite
async fn get_satellite_position(
    State(state): State<AppState>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let Some(provider) = &state.positions else {
        return Err(ApiError::MissingApiKey);
    };

    let id = parse_requested_id(query.satellite_id.as_deref(), &state.config)?;

    let position = provider.current_position(id).await?;
    info!(
        "Satellite {} at lat {:.4}, lon {:.4}",
        id, position.latitude, position.longitude
    );

    Ok(Json(position.to_snapshot()))
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardState> {
    Json(state.dashboard.build_state().await)
}

/// Validate the `satellite_id` parameter against the allow-list.
///
/// Everything but digits and signs is stripped first; an empty or zero result
/// counts as missing.
pub fn parse_requested_id(raw: Option<&str>, config: &BackendConfig) -> Result<SatelliteId, ApiError> {
    let sanitized = NON_INTEGER_CHARS.replace_all(raw.unwrap_or_default(), "");

    if sanitized.is_empty() || sanitized.trim_start_matches(['+', '-']).trim_start_matches('0').is_empty() {
        return Err(ApiError::MissingId);
    }

    match sanitized.trim_start_matches('+').parse::<SatelliteId>() {
        Ok(id) if config.is_tracked(id) => Ok(id),
        _ => {
            warn!("Invalid Satellite ID requested: {}", sanitized);
            Err(ApiError::InvalidId)
        }
    }
}
