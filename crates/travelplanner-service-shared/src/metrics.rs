//! Prometheus metrics for the planner endpoints.
//!
//! [`init_metrics`] installs the recorder once at startup and
//! [`metrics_handler`] renders it. The `record_*` helpers are safe to call
//! without a recorder; the samples are dropped.
//!
//! ```no_run
//! use travelplanner_service_shared::metrics::{init_metrics, metrics_handler, MetricsConfig};
//! use axum::{routing::get, Router};
//!
//! let config = MetricsConfig::from_env();
//! if init_metrics(&config).is_ok() {
//!     let _app: Router = Router::new().route(&config.path, get(metrics_handler));
//! }
//! ```

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use travelplanner_lib::{Error as LibError, PolylineSource};

pub const ROUTES_CALCULATED: &str = "travelplanner_routes_calculated_total";
pub const ROUTES_FAILED: &str = "travelplanner_routes_failed_total";
pub const ROUTE_DISTANCE_KM: &str = "travelplanner_route_distance_km";
pub const POLYLINE_FALLBACKS: &str = "travelplanner_polyline_fallback_total";
pub const NEARBY_RETURNED: &str = "travelplanner_nearby_places_returned";

/// Bucket bounds in kilometres. Trips inside the city are short; the tail
/// covers the outlying landmarks.
const DISTANCE_BUCKETS_KM: [f64; 9] = [1.0, 2.0, 4.0, 6.0, 8.0, 12.0, 16.0, 24.0, 40.0];

const DEFAULT_METRICS_PATH: &str = "/metrics";

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the exposition, always starting with `/`.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl MetricsConfig {
    /// Reads `METRICS_ENABLED` (anything but "false" enables) and
    /// `METRICS_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup("METRICS_ENABLED")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let path = lookup("METRICS_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| p.len() > 1 && p.starts_with('/'))
            .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_string());

        Self { enabled, path }
    }
}

#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    #[error("metrics are disabled")]
    Disabled,
    #[error("metrics recorder already initialized")]
    AlreadyInitialized,
    #[error("failed to install metrics recorder: {0}")]
    InstallFailed(String),
}

pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(ROUTE_DISTANCE_KM.to_string()),
            &DISTANCE_BUCKETS_KM,
        )
        .and_then(|builder| builder.install_recorder())
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Prometheus text exposition, or a comment line before [`init_metrics`].
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_else(|| "# metrics recorder not installed\n".to_string())
}

/// Endpoint label on the planner counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerEndpoint {
    Route,
    Alternatives,
    Nearby,
}

impl PlannerEndpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            PlannerEndpoint::Route => "route",
            PlannerEndpoint::Alternatives => "alternatives",
            PlannerEndpoint::Nearby => "nearby",
        }
    }
}

pub fn record_route_calculated(endpoint: PlannerEndpoint) {
    metrics::counter!(ROUTES_CALCULATED, "endpoint" => endpoint.as_str()).increment(1);
}

/// `reason` is a [`failure_reason`] label or "validation_error" for bodies
/// rejected before planning.
pub fn record_route_failed(reason: &'static str, endpoint: PlannerEndpoint) {
    metrics::counter!(
        ROUTES_FAILED,
        "reason" => reason,
        "endpoint" => endpoint.as_str()
    )
    .increment(1);
}

pub fn record_route_distance(distance_km: f64) {
    metrics::histogram!(ROUTE_DISTANCE_KM).record(distance_km);
}

/// Counts polylines that did not come from the road router.
pub fn record_polyline_source(source: PolylineSource) {
    if source != PolylineSource::Provider {
        metrics::counter!(POLYLINE_FALLBACKS, "source" => source.as_str()).increment(1);
    }
}

pub fn record_nearby_returned(count: usize) {
    metrics::histogram!(NEARBY_RETURNED).record(count as f64);
}

pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::UnknownLocation { .. } => "unknown_location",
        LibError::InvalidRequest { .. } => "validation_error",
        LibError::RouteNotFound { .. } => "no_path",
        _ => "internal_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> MetricsConfig {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        MetricsConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn config_defaults() {
        let config = config_from(&[]);
        assert!(config.enabled);
        assert_eq!(config.path, DEFAULT_METRICS_PATH);
    }

    #[test]
    fn config_reads_overrides() {
        let config = config_from(&[("METRICS_ENABLED", "FALSE"), ("METRICS_PATH", "/prom")]);
        assert!(!config.enabled);
        assert_eq!(config.path, "/prom");
    }

    #[test]
    fn config_rejects_relative_path() {
        assert_eq!(config_from(&[("METRICS_PATH", "prom")]).path, DEFAULT_METRICS_PATH);
        assert_eq!(config_from(&[("METRICS_PATH", "/")]).path, DEFAULT_METRICS_PATH);
    }

    #[test]
    fn disabled_config_does_not_install() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(matches!(init_metrics(&config), Err(MetricsError::Disabled)));
    }

    #[tokio::test]
    async fn handler_renders_text() {
        let output = metrics_handler().await;
        assert!(output.is_empty() || output.contains('#') || output.contains("travelplanner"));
    }

    #[test]
    fn helpers_work_without_recorder() {
        record_route_calculated(PlannerEndpoint::Route);
        record_route_failed("no_path", PlannerEndpoint::Alternatives);
        record_route_distance(11.6);
        record_polyline_source(PolylineSource::GraphPath);
        record_polyline_source(PolylineSource::Provider);
        record_nearby_returned(3);
    }

    #[test]
    fn endpoint_labels() {
        assert_eq!(PlannerEndpoint::Route.as_str(), "route");
        assert_eq!(PlannerEndpoint::Alternatives.as_str(), "alternatives");
        assert_eq!(PlannerEndpoint::Nearby.as_str(), "nearby");
    }

    #[test]
    fn failure_reason_labels() {
        let unknown = LibError::UnknownLocation {
            name: "Atlantis".to_string(),
            suggestions: vec![],
            valid: vec![],
        };
        let unreachable = LibError::RouteNotFound {
            start: "A".to_string(),
            goal: "B".to_string(),
        };
        let blank = LibError::InvalidRequest {
            message: "source must not be empty".to_string(),
        };
        assert_eq!(failure_reason(&unknown), "unknown_location");
        assert_eq!(failure_reason(&unreachable), "no_path");
        assert_eq!(failure_reason(&blank), "validation_error");
    }
}
