use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{truncate_body, RoadRoute, RoadRouter};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::polyline::{decode_polyline, DEFAULT_PRECISION};

pub(super) const PROVIDER: &str = "openrouteservice";

/// OpenRouteService driving directions client.
#[derive(Debug, Clone)]
pub struct OrsRouter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: DirectionsSummary,
    geometry: String,
}

/// ORS omits both fields for zero-length routes.
#[derive(Debug, Default, Deserialize)]
struct DirectionsSummary {
    /// Metres.
    #[serde(default)]
    distance: f64,
    /// Seconds.
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: u32,
    message: String,
}

impl OrsRouter {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn directions_url(&self) -> String {
        format!("{}/v2/directions/driving-car", self.base_url)
    }
}

#[async_trait]
impl RoadRouter for OrsRouter {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn directions(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadRoute> {
        let url = self.directions_url();
        let body = json!({ "coordinates": [from.lon_lat(), to.lon_lat()] });
        debug!(?from, ?to, "requesting driving directions");

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = match serde_json::from_str::<ErrorPayload>(&text) {
                Ok(payload) => format!("{} (code {})", payload.error.message, payload.error.code),
                Err(_) => truncate_body(&text),
            };
            return Err(Error::ProviderStatus {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: DirectionsResponse =
            serde_json::from_str(&text).map_err(|err| Error::MalformedPayload {
                provider: PROVIDER,
                message: err.to_string(),
            })?;

        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedPayload {
                provider: PROVIDER,
                message: "response contains no routes".to_string(),
            })?;

        let coordinates = decode_polyline(&route.geometry, DEFAULT_PRECISION).ok_or_else(|| {
            Error::MalformedPayload {
                provider: PROVIDER,
                message: "route geometry is not a valid encoded polyline".to_string(),
            }
        })?;

        Ok(RoadRoute {
            coordinates,
            distance_km: route.summary.distance / 1000.0,
            duration_minutes: route.summary.duration / 60.0,
        })
    }
}
