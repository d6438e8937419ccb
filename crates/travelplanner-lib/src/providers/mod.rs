//! Clients for the external services the planner consults.
//!
//! Each provider is an async trait so the planner can be wired with real
//! HTTP clients in production and with in-memory fakes in tests. None of the
//! provider calls is retried; callers treat every failure as absorbable.

mod config;
mod nominatim;
mod openweather;
mod ors;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::weather::WeatherSnapshot;

pub use config::{ProviderConfig, DEFAULT_GEOCODE_REGION, DEFAULT_PROVIDER_TIMEOUT};
pub use nominatim::NominatimGeocoder;
pub use openweather::OpenWeatherProvider;
pub use ors::OrsRouter;

/// Road-following route between two points as reported by a routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadRoute {
    /// Decoded geometry in `[lat, lon]` order.
    pub coordinates: Vec<GeoPoint>,
    /// Driving distance in kilometres.
    pub distance_km: f64,
    /// Driving duration in minutes.
    pub duration_minutes: f64,
}

/// Provider of driving directions.
#[async_trait]
pub trait RoadRouter: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    async fn directions(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadRoute>;
}

/// Provider of current weather conditions.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn current(&self, at: GeoPoint) -> Result<WeatherSnapshot>;
}

/// Free-text place lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// First match for `query`, or `None` when the service found nothing.
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>>;
}

/// Stand-in for a provider that has not been configured.
///
/// Every call fails immediately with [`Error::ProviderUnavailable`], which
/// sends callers straight to their fallback.
#[derive(Debug, Clone, Copy)]
pub struct DisabledProvider {
    name: &'static str,
}

impl DisabledProvider {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn unavailable<T>(&self) -> Result<T> {
        Err(Error::ProviderUnavailable {
            provider: self.name,
        })
    }
}

#[async_trait]
impl RoadRouter for DisabledProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn directions(&self, _from: GeoPoint, _to: GeoPoint) -> Result<RoadRoute> {
        self.unavailable()
    }
}

#[async_trait]
impl WeatherProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn current(&self, _at: GeoPoint) -> Result<WeatherSnapshot> {
        self.unavailable()
    }
}

#[async_trait]
impl Geocoder for DisabledProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn geocode(&self, _query: &str) -> Result<Option<GeoPoint>> {
        self.unavailable()
    }
}

/// The set of providers a planner is wired with.
#[derive(Clone)]
pub struct Providers {
    pub router: Arc<dyn RoadRouter>,
    pub weather: Arc<dyn WeatherProvider>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl Providers {
    /// Providers that never leave the process.
    pub fn offline() -> Self {
        Self {
            router: Arc::new(DisabledProvider::new(ors::PROVIDER)),
            weather: Arc::new(DisabledProvider::new(openweather::PROVIDER)),
            geocoder: Arc::new(DisabledProvider::new(nominatim::PROVIDER)),
        }
    }

    /// Build HTTP clients for every provider that has the configuration it
    /// needs; the rest are disabled.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        let router: Arc<dyn RoadRouter> = match &config.ors_api_key {
            Some(key) => Arc::new(OrsRouter::new(
                client.clone(),
                key.clone(),
                config.ors_base_url.clone(),
            )),
            None => Arc::new(DisabledProvider::new(ors::PROVIDER)),
        };

        let weather: Arc<dyn WeatherProvider> = match &config.openweather_api_key {
            Some(key) => Arc::new(OpenWeatherProvider::new(
                client.clone(),
                key.clone(),
                config.openweather_base_url.clone(),
            )),
            None => Arc::new(DisabledProvider::new(openweather::PROVIDER)),
        };

        let geocoder: Arc<dyn Geocoder> = match &config.nominatim_base_url {
            Some(base_url) => Arc::new(NominatimGeocoder::new(client, base_url.clone())),
            None => Arc::new(DisabledProvider::new(nominatim::PROVIDER)),
        };

        tracing::info!(
            router = router.name(),
            router_enabled = config.ors_api_key.is_some(),
            weather_enabled = config.openweather_api_key.is_some(),
            geocoder_enabled = config.nominatim_base_url.is_some(),
            "providers configured"
        );

        Ok(Self {
            router,
            weather,
            geocoder,
        })
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("router", &self.router.name())
            .field("weather", &self.weather.name())
            .field("geocoder", &self.geocoder.name())
            .finish()
    }
}

/// Await `future`, failing with [`Error::ProviderTimeout`] after `timeout`.
pub async fn with_timeout<T, F>(provider: &'static str, timeout: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| Error::ProviderTimeout {
            provider,
            millis: timeout.as_millis(),
        })?
}

/// Clip a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 256;
    match body.char_indices().nth(LIMIT) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_provider_reports_unavailable() {
        let provider = DisabledProvider::new("openrouteservice");
        let err = provider
            .directions(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0))
            .await
            .expect_err("disabled");
        assert!(matches!(
            err,
            Error::ProviderUnavailable {
                provider: "openrouteservice"
            }
        ));
    }

    #[tokio::test]
    async fn with_timeout_reports_elapsed_budget() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        };
        let err = with_timeout("slow", Duration::from_millis(10), slow)
            .await
            .expect_err("timed out");
        assert!(matches!(
            err,
            Error::ProviderTimeout {
                provider: "slow",
                millis: 10
            }
        ));
    }

    #[test]
    fn truncate_body_clips_long_payloads() {
        let long = "x".repeat(300);
        let clipped = truncate_body(&long);
        assert_eq!(clipped.len(), 259);
        assert!(clipped.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
