// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use fatigue_monitor::application::alert_service::AlertService;
use fatigue_monitor::application::polling_service::PollingController;
use fatigue_monitor::application::preferences::ensure_defaults;
use fatigue_monitor::application::series_store::SeriesStore;
use fatigue_monitor::infrastructure::config::load_app_config;
use fatigue_monitor::infrastructure::file_store::FileStore;
use fatigue_monitor::infrastructure::http_prediction_client::HttpPredictionClient;
use fatigue_monitor::infrastructure::settings_store::TomlSettingsStore;
use fatigue_monitor::infrastructure::tokio_scheduler::TokioScheduler;
use fatigue_monitor::infrastructure::tracing_notifier::TracingNotifier;
use fatigue_monitor::presentation::app_state::AppState;
use fatigue_monitor::presentation::router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fatigue_monitor=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Storage (infrastructure layer)
    let storage = Arc::new(FileStore::open(&config.storage.data_dir)?);
    let settings = Arc::new(TomlSettingsStore::open(&config.storage.settings_file)?);
    ensure_defaults(settings.as_ref())?;
    let series = SeriesStore::load(storage);

    let source = Arc::new(HttpPredictionClient::new(
        &config.prediction.base_url,
        config.prediction.timeout(),
    )?);

    // Services (application layer)
    let alerts = Arc::new(AlertService::new(Arc::new(TracingNotifier::new(
        config.notifications.authorized,
    ))));
    alerts.request_permission().await;
    alerts.clear_badge().await;

    let controller = Arc::new(PollingController::new(
        source,
        series,
        settings,
        alerts,
        Arc::new(TokioScheduler),
        config.polling.to_polling_config(),
    ));
    controller.start();

    // Router (presentation layer)
    let app = router(Arc::new(AppState {
        controller: controller.clone(),
    }));

    let listener = tokio::net::TcpListener::bind(config.server.bind).await?;
    tracing::info!(
        "Starting fatigue-monitor on {}, polling {}",
        config.server.bind,
        config.prediction.base_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    controller.stop();
    tracing::info!("Polling stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
