//! Response envelopes for the planner endpoints.
//!
//! Handlers return [`ApiResponse`], which is either a [`ServiceResponse`]
//! body with status 200 or a [`ProblemDetails`] with its own status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::problem::ProblemDetails;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Successful body: the payload's fields at the top level plus
/// `content_type`, mirroring the field `ProblemDetails` carries.
///
/// ```
/// use travelplanner_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Locations {
///     locations: Vec<String>,
/// }
///
/// let response = ServiceResponse::new(Locations { locations: vec![] });
/// assert_eq!(response.content_type, "application/json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,
    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Outcome of a planner endpoint.
#[derive(Debug)]
pub enum ApiResponse<T> {
    Ok(ServiceResponse<T>),
    Problem(ProblemDetails),
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse::Ok(ServiceResponse::new(data))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResponse::Ok(_))
    }
}

impl<T> From<ProblemDetails> for ApiResponse<T> {
    fn from(problem: ProblemDetails) -> Self {
        ApiResponse::Problem(problem)
    }
}

impl<T> From<Box<ProblemDetails>> for ApiResponse<T> {
    fn from(problem: Box<ProblemDetails>) -> Self {
        ApiResponse::Problem(*problem)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Ok(body) => (StatusCode::OK, body).into_response(),
            ApiResponse::Problem(problem) => problem.into_response(),
        }
    }
}
