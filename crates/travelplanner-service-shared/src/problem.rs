//! RFC 9457 problem responses for the planner endpoints.
//!
//! Every failure the service returns is one of four [`ProblemKind`]s. The
//! kind fixes the type URI, title, and status; the occurrence adds detail,
//! the request ID as `instance`, and for unknown names the lists a client
//! needs to correct its input.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use travelplanner_lib::Error as LibError;

pub const PROBLEM_UNKNOWN_LOCATION: &str = "/problems/unknown-location";
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// The failure categories a planner request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    /// A source, destination, or anchor name is not in the registry.
    UnknownLocation,
    /// Both names are known but no path connects them.
    RouteNotFound,
    /// Malformed JSON or a blank field.
    InvalidRequest,
    /// Broken data or anything else the caller cannot fix.
    Internal,
}

impl ProblemKind {
    pub fn type_uri(self) -> &'static str {
        match self {
            ProblemKind::UnknownLocation => PROBLEM_UNKNOWN_LOCATION,
            ProblemKind::RouteNotFound => PROBLEM_ROUTE_NOT_FOUND,
            ProblemKind::InvalidRequest => PROBLEM_INVALID_REQUEST,
            ProblemKind::Internal => PROBLEM_INTERNAL_ERROR,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ProblemKind::UnknownLocation => "Unknown Location",
            ProblemKind::RouteNotFound => "Route Not Found",
            ProblemKind::InvalidRequest => "Invalid Request",
            ProblemKind::Internal => "Internal Error",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ProblemKind::UnknownLocation | ProblemKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ProblemKind::RouteNotFound => StatusCode::NOT_FOUND,
            ProblemKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Problem document returned with a non-2xx status.
///
/// ```
/// use travelplanner_service_shared::{ProblemDetails, PROBLEM_ROUTE_NOT_FOUND};
///
/// let problem = ProblemDetails::route_not_found("Clock Tower", "Island", "trip-1");
/// assert_eq!(problem.type_uri, PROBLEM_ROUTE_NOT_FOUND);
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request ID of the failing call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Close matches for an unknown name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,

    /// Every name the registry accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_locations: Option<Vec<String>>,

    pub content_type: String,
}

impl ProblemDetails {
    /// Problem of `kind` for the request `request_id`, explained by `detail`.
    pub fn of(kind: ProblemKind, detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            type_uri: kind.type_uri().to_string(),
            title: kind.title().to_string(),
            status: kind.status().as_u16(),
            detail: Some(detail.into()),
            instance: Some(request_id.into()),
            suggestions: None,
            valid_locations: None,
            content_type: PROBLEM_CONTENT_TYPE.to_string(),
        }
    }

    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::of(ProblemKind::InvalidRequest, detail, request_id)
    }

    /// 400 for a name missing from the registry, carrying the close matches
    /// and the full list of accepted names.
    pub fn unknown_location(
        name: &str,
        suggestions: &[String],
        valid: &[String],
        request_id: impl Into<String>,
    ) -> Self {
        let detail = match suggestions {
            [] => format!("Location '{name}' not found"),
            _ => format!(
                "Location '{name}' not found. Did you mean: {}?",
                suggestions.join(", ")
            ),
        };

        Self {
            suggestions: Some(suggestions.to_vec()),
            valid_locations: Some(valid.to_vec()),
            ..Self::of(ProblemKind::UnknownLocation, detail, request_id)
        }
    }

    pub fn route_not_found(start: &str, goal: &str, request_id: impl Into<String>) -> Self {
        Self::of(
            ProblemKind::RouteNotFound,
            format!("No route exists from '{start}' to '{goal}'"),
            request_id,
        )
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::of(ProblemKind::Internal, detail, request_id)
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({}): {}", self.title, self.status, detail),
            None => write!(f, "{} ({})", self.title, self.status),
        }
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response
    }
}

/// Map a planner error onto the problem the caller sees.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownLocation {
            name,
            suggestions,
            valid,
        } => ProblemDetails::unknown_location(name, suggestions, valid, request_id),
        LibError::InvalidRequest { message } => ProblemDetails::bad_request(message, request_id),
        LibError::RouteNotFound { start, goal } => {
            ProblemDetails::route_not_found(start, goal, request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
