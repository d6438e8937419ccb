//! Shared infrastructure for the travel planner HTTP service.
//!
//! This crate provides the HTTP glue around [`travelplanner_lib::RoutePlanner`]:
//!
//! - [`AppState`]: The planner, built once at startup and shared by all handlers
//! - [`health`]: Health check handlers for liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ApiResponse`]: A [`ServiceResponse`] body or a problem, returned by every handler
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request tracking and metrics middleware
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin and all routing logic resides in `travelplanner-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate parameters                                      │
//! │  - Call RoutePlanner                                        │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides offline planner state for handler
//! testing. Enable the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    failure_reason, init_metrics, metrics_handler, record_nearby_returned,
    record_polyline_source, record_route_calculated, record_route_distance, record_route_failed,
    MetricsConfig, MetricsError, PlannerEndpoint,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    from_lib_error, ProblemDetails, ProblemKind, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_ROUTE_NOT_FOUND, PROBLEM_UNKNOWN_LOCATION,
};
pub use request::{NearbyRequest, RouteRequest, Validate};
pub use response::{ApiResponse, ServiceResponse};
pub use state::{AppState, AppStateError, DATASET_PATH_ENV, PLACES_PATH_ENV};
