//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

fn require(field: &str, value: &str, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if value.trim().is_empty() {
        return Err(Box::new(ProblemDetails::bad_request(
            format!("The '{}' field is required and cannot be empty", field),
            request_id,
        )));
    }
    Ok(())
}

/// Body of the route and alternatives endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Starting location name.
    #[serde(default)]
    pub source: String,

    /// Destination location name.
    #[serde(default)]
    pub destination: String,
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require("source", &self.source, request_id)?;
        require("destination", &self.destination, request_id)
    }
}

impl From<&RouteRequest> for travelplanner_lib::RouteRequest {
    fn from(value: &RouteRequest) -> Self {
        travelplanner_lib::RouteRequest::new(value.source.trim(), value.destination.trim())
    }
}

/// Body of the nearby places endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyRequest {
    /// Registered location to search around.
    #[serde(default)]
    pub location: String,

    /// Optional place category, e.g. `restaurant` or `cafe`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Validate for NearbyRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require("location", &self.location, request_id)
    }
}
