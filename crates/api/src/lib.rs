//! Climate Observation API Server
//!
//! Read-only REST API over the weather-station observation store.

use axum::{response::Html, routing::get, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use storage::Store;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
pub mod error;
pub mod routes;
pub mod session;

pub use crate::config::ApiConfig;
pub use crate::error::ApiError;

use crate::config::ReportingConfig;

/// Application state shared across handlers. Read-only after startup.
pub struct AppState {
    /// Observation store pool
    pub store: Store,
    /// Reference date and station selection
    pub reporting: ReportingConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Store, reporting: ReportingConfig) -> Self {
        Self { store, reporting }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(welcome_handler))
        .route(
            "/api/v1.0/precipitation",
            get(routes::precipitation::get_precipitation),
        )
        .route("/api/v1.0/stations", get(routes::stations::get_stations))
        .route("/api/v1.0/tobs", get(routes::tobs::get_tobs))
        .route(
            "/api/v1.0/temp/:start/:end",
            get(routes::temperature::get_temperature_range),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Route listing
async fn welcome_handler() -> Html<&'static str> {
    Html(
        "Available Routes: <br/>\
         /api/v1.0/precipitation <br/>\
         /api/v1.0/stations <br/>\
         /api/v1.0/tobs <br/>\
         /api/v1.0/temp/&lt;start&gt;/&lt;end&gt; <br/>",
    )
}

/// Initialize logging. `RUST_LOG` overrides the default `info` level; calling
/// this twice keeps the first subscriber.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Run the server until ctrl-c, then close the store
pub async fn run_server(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.metrics.enabled {
        let addr = config.metrics_addr()?;
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Prometheus exporter listening on {}", addr);
    }

    let store = Store::connect(&config.database).await?;
    let state = Arc::new(AppState::new(store.clone(), config.reporting.clone()));
    let app = create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    info!(
        "Starting API server on {} (reference {:?} {}, station {:?} {})",
        config.server.bind_addr,
        config.reporting.reference_mode,
        config.reporting.reference_date,
        config.reporting.station_mode,
        config.reporting.station_id,
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
