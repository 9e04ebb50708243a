use astro_backend::config::{self, BackendConfig};
use astro_backend::module::census::OpenNotifyClient;
use astro_backend::module::dashboard::DashboardService;
use astro_backend::module::n2yo::{N2yoClient, PositionProvider};
use astro_backend::server::{self, AppState};

use anyhow::{Context, Result};
use std::sync::Arc;

const CONFIG_PATH: &str = "backend.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let (config, from_file) = BackendConfig::load_or_default(CONFIG_PATH)?;

    let _logging_guard =
        astro_common::logging::init_logging(&config.log_dir, "astro-backend", &config.log_level)?;

    tracing::info!("AstroDashboard backend starting...");
    if !from_file {
        tracing::warn!("{} not found, using built-in defaults", CONFIG_PATH);
    }
    tracing::info!(
        "Tracking {} satellites: {:?}",
        config.satellites.len(),
        config.satellites.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );

    let positions: Option<Arc<dyn PositionProvider>> = match config::read_api_key(&config.api_key_path) {
        Some(api_key) => Some(Arc::new(N2yoClient::new(&config, api_key)?)),
        None => {
            tracing::error!(
                "N2YO API key unavailable (check {}), satellite endpoints will report API_KEY_ERROR",
                config.api_key_path
            );
            None
        }
    };

    let config = Arc::new(config);
    let census = Arc::new(OpenNotifyClient::new(&config)?);
    let dashboard = Arc::new(DashboardService::new(config.clone(), positions.clone(), census));

    let app = server::router(AppState {
        config: config.clone(),
        positions,
        dashboard,
    });

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received.");
        })
        .await?;

    Ok(())
}
