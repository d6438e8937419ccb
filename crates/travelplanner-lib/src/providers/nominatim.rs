use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{truncate_body, Geocoder};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;

pub(super) const PROVIDER: &str = "nominatim";

/// OpenStreetMap Nominatim search client.
///
/// Nominatim requires an identifying `User-Agent`, which is set on the shared
/// HTTP client.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim reports coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>> {
        let url = format!("{}/search", self.base_url);
        debug!(query, "geocoding");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::ProviderStatus {
                provider: PROVIDER,
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let hits: Vec<SearchHit> =
            serde_json::from_str(&text).map_err(|err| Error::MalformedPayload {
                provider: PROVIDER,
                message: err.to_string(),
            })?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let parse = |value: &str| {
            value.parse::<f64>().map_err(|_| Error::MalformedPayload {
                provider: PROVIDER,
                message: format!("coordinate {value:?} is not a number"),
            })
        };
        let point = GeoPoint::new(parse(&hit.lat)?, parse(&hit.lon)?);
        Ok(point.is_valid().then_some(point))
    }
}
