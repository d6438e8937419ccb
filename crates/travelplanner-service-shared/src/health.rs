//! Health check handlers for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// RFC 3339 time at which the check ran.
    pub checked_at: String,

    /// Number of registered locations (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations_loaded: Option<usize>,

    /// Number of directed edges in the routing graph (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_edges: Option<usize>,
}

impl HealthStatus {
    fn base(status: String, service: &str, version: &str) -> Self {
        Self {
            status,
            service: service.to_string(),
            version: version.to_string(),
            checked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            locations_loaded: None,
            graph_edges: None,
        }
    }

    pub fn alive(service: &str, version: &str) -> Self {
        Self::base("ok".to_string(), service, version)
    }

    pub fn ready(service: &str, version: &str, locations: usize, edges: usize) -> Self {
        Self {
            locations_loaded: Some(locations),
            graph_edges: Some(edges),
            ..Self::base("ok".to_string(), service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self::base(format!("not_ready: {}", reason), service, version)
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"travelplanner-service-shared","version":"0.1.0","checked_at":"..."}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Ready once the planner holds at least one location and one edge.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let locations = state.location_count();
    let edges = state.edge_count();

    if locations == 0 || edges == 0 {
        let status = HealthStatus::not_ready(service, version, "routing graph is empty");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, locations, edges);
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("route", "1.0.0");
        assert_eq!(status.status, "ok");
        assert!(status.locations_loaded.is_none());
        assert!(status.checked_at.ends_with('Z'));
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("route", "1.0.0", "no data");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("no data"));
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::alive("route", "0.1.0")).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("locations_loaded"));
    }

    #[tokio::test]
    async fn test_health_ready_reports_graph_size() {
        let state = test_state();
        let response = health_ready(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let status =
            HealthStatus::ready("route", "0.1.0", state.location_count(), state.edge_count());
        assert_eq!(status.locations_loaded, Some(16));
        assert!(status.graph_edges.unwrap_or(0) > 0);
    }
}
