use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the travel planner library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a requested location name is not part of the registry.
    #[error("unknown location: {name}{}", format_suggestions(.suggestions))]
    UnknownLocation {
        name: String,
        suggestions: Vec<String>,
        valid: Vec<String>,
    },

    /// Raised when a request is missing a required field.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Raised when no route could be found between two locations.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when the connectivity table references a location missing from
    /// the registry.
    #[error("connectivity entry {from} -> {to} references unknown location {missing}")]
    UnknownConnectivityLocation {
        from: String,
        to: String,
        missing: String,
    },

    /// Raised when a place in the catalogue is anchored to an unknown location.
    #[error("place {place} is anchored to unknown location {anchor}")]
    UnknownPlaceAnchor { place: String, anchor: String },

    /// Raised when the same location name is registered twice.
    #[error("duplicate location name encountered: {name}")]
    DuplicateLocation { name: String },

    /// Raised when a graph edge carries a negative or non-finite weight.
    #[error("edge {from} -> {to} has invalid weight {weight}")]
    InvalidEdgeWeight { from: String, to: String, weight: f64 },

    /// Raised when a coordinate pair lies outside the valid latitude/longitude range.
    #[error("location {name} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        name: String,
        latitude: f64,
        longitude: f64,
    },

    /// Raised when place catalogue data fails validation.
    #[error("invalid place data: {message}")]
    PlaceDataValidation { message: String },

    /// Raised when a dataset file could not be read.
    #[error("failed to load dataset from {path}: {message}")]
    DatasetLoad { path: PathBuf, message: String },

    /// Raised when an external provider has no configuration (e.g. missing API key).
    #[error("{provider} provider is not configured")]
    ProviderUnavailable { provider: &'static str },

    /// Raised when an external provider answers with a non-success status.
    #[error("{provider} provider returned HTTP {status}: {body}")]
    ProviderStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Raised when an external provider payload is missing expected fields.
    #[error("{provider} provider returned a malformed payload: {message}")]
    MalformedPayload {
        provider: &'static str,
        message: String,
    },

    /// Raised when an external provider did not answer within the configured timeout.
    #[error("{provider} provider timed out after {millis} ms")]
    ProviderTimeout { provider: &'static str, millis: u128 },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for CSV errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether this error originates from user input rather than configuration
    /// or an external provider.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownLocation { .. } | Error::InvalidRequest { .. }
        )
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
