//! Travel planner route HTTP service.
//!
//! # Endpoints
//!
//! - `POST /api/v1/route` - Shortest route with distance, time, fuel budget,
//!   polyline and endpoint weather
//! - `POST /api/v1/route/alternatives` - Up to three distinct routes
//! - `POST /api/v1/nearby` - Places near a location, best rated first
//! - `GET /api/v1/locations` - Every registered location name
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//!
//! # Configuration
//!
//! - `TRAVELPLANNER_DATASET_PATH` - JSON dataset file (built-in data if unset)
//! - `ORS_API_KEY`, `OPENWEATHER_API_KEY` - provider keys; providers without a
//!   key are disabled and routes fall back to graph geometry
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8080)

mod handlers;

use std::env;
use std::net::SocketAddr;

use tracing::{error, info, Instrument};

use travelplanner_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig,
};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("route");
    let root_span = init_logging(&logging_config);

    run().instrument(root_span).await
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let port = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let state = AppState::from_env().map_err(|e| {
        error!(error = %e, "failed to load application state");
        e
    })?;
    info!(
        locations = state.location_count(),
        edges = state.edge_count(),
        dataset = ?state.dataset_path(),
        "application state loaded"
    );

    let app = handlers::app(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
