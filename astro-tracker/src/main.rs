use astro_tracker::backend::DashboardClient;
use astro_tracker::config::TrackerConfig;
use astro_tracker::console;
use astro_tracker::fetcher::HttpSnapshotSource;
use astro_tracker::map::{LoggingMapSurface, MapProjector};
use astro_tracker::model::InitialState;
use astro_tracker::tracker::Tracker;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

const CONFIG_PATH: &str = "tracker.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let (config, from_file) = TrackerConfig::load_or_default(CONFIG_PATH)?;

    let _logging_guard =
        astro_common::logging::init_logging(&config.log_dir, "astro-tracker", &config.log_level)?;

    tracing::info!("AstroDashboard tracker starting...");
    if !from_file {
        tracing::warn!("{} not found, using built-in defaults", CONFIG_PATH);
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let dashboard = DashboardClient::new(client.clone(), &config.backend_url)
        .fetch()
        .await
        .context("Could not load the initial dashboard state")?;
    let initial = InitialState::from_dashboard(&dashboard);

    let source = Arc::new(HttpSnapshotSource::new(client, &config.backend_url));
    let projector = MapProjector::with_surface(Box::new(LoggingMapSurface));
    let (tracker, handle) = Tracker::new(initial, source, projector, config.poll_interval())?;
    let tracker_task = tokio::spawn(tracker.run());

    let stdin = BufReader::new(tokio::io::stdin());
    let console_handle = handle.clone();
    let console = async move {
        match console::run_console(console_handle, stdin, tokio::io::stdout()).await {
            Ok(true) => tracing::info!("Quit requested."),
            Ok(false) => {
                // Detached from a terminal: keep tracking until Ctrl-C
                tracing::info!("Console closed, press Ctrl-C to stop.");
                std::future::pending::<()>().await;
            }
            Err(e) => tracing::error!("Console error: {}", e),
        }
    };

    tokio::select! {
        _ = console => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received.");
        }
    }

    handle.shutdown();
    tracker_task.await.context("Tracker task failed")?;

    Ok(())
}
