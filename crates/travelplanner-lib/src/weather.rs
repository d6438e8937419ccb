//! Current weather for route endpoints.
//!
//! Weather is decoration: the annotator never fails, it reports `None` for an
//! endpoint whose conditions could not be fetched and logs why.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dataset::GeoRegistry;
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::providers::{
    with_timeout, Geocoder, WeatherProvider, DEFAULT_GEOCODE_REGION, DEFAULT_PROVIDER_TIMEOUT,
};

/// Current conditions at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius, rounded.
    pub temperature: i64,
    /// Degrees Celsius, rounded.
    pub feels_like: i64,
    /// Relative humidity in percent.
    pub humidity: i64,
    pub description: String,
    /// Metres per second.
    pub wind_speed: f64,
    /// Provider icon code, e.g. `01d`.
    pub icon: String,
}

/// Weather at both ends of a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteWeather {
    pub source: Option<WeatherSnapshot>,
    pub destination: Option<WeatherSnapshot>,
}

/// Looks up weather for named locations.
#[derive(Clone)]
pub struct WeatherAnnotator {
    provider: Arc<dyn WeatherProvider>,
    geocoder: Arc<dyn Geocoder>,
    region: String,
    timeout: Duration,
}

impl WeatherAnnotator {
    pub fn new(provider: Arc<dyn WeatherProvider>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            provider,
            geocoder,
            region: DEFAULT_GEOCODE_REGION.to_string(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Region appended to geocoding queries for names outside the registry.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Weather at `name`, or `None` when it could not be determined.
    pub async fn snapshot(&self, registry: &GeoRegistry, name: &str) -> Option<WeatherSnapshot> {
        match self.try_snapshot(registry, name).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(location = name, error = %err, "weather lookup failed");
                None
            }
        }
    }

    /// Weather at both endpoints, fetched concurrently.
    pub async fn annotate(
        &self,
        registry: &GeoRegistry,
        source: &str,
        destination: &str,
    ) -> RouteWeather {
        let (source, destination) = tokio::join!(
            self.snapshot(registry, source),
            self.snapshot(registry, destination)
        );
        RouteWeather {
            source,
            destination,
        }
    }

    async fn try_snapshot(&self, registry: &GeoRegistry, name: &str) -> Result<WeatherSnapshot> {
        let point = match registry.position(name) {
            Some(point) => point,
            None => self.geocode(name).await?,
        };
        with_timeout(self.provider.name(), self.timeout, self.provider.current(point)).await
    }

    async fn geocode(&self, name: &str) -> Result<GeoPoint> {
        let query = format!("{name}, {}", self.region);
        let hit = with_timeout(
            self.geocoder.name(),
            self.timeout,
            self.geocoder.geocode(&query),
        )
        .await?;
        hit.ok_or_else(|| Error::MalformedPayload {
            provider: self.geocoder.name(),
            message: format!("no match for {query:?}"),
        })
    }
}

impl std::fmt::Debug for WeatherAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAnnotator")
            .field("provider", &self.provider.name())
            .field("geocoder", &self.geocoder.name())
            .field("region", &self.region)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::providers::DisabledProvider;
    use crate::test_helpers::{sample_weather, FixedGeocoder, FixedWeather, RecordingWeather};

    #[tokio::test]
    async fn registered_names_skip_the_geocoder() {
        let dataset = Dataset::builtin().unwrap();
        let weather = Arc::new(RecordingWeather::new(sample_weather()));
        let geocoder = Arc::new(FixedGeocoder::new(None));
        let annotator = WeatherAnnotator::new(weather.clone(), geocoder.clone());

        let snapshot = annotator
            .snapshot(dataset.registry(), "Clock Tower")
            .await
            .expect("snapshot");
        assert_eq!(snapshot, sample_weather());
        assert_eq!(
            weather.calls(),
            vec![dataset.registry().position("Clock Tower").unwrap()]
        );
        assert!(geocoder.queries().is_empty());
    }

    #[tokio::test]
    async fn unknown_names_are_geocoded_with_region() {
        let dataset = Dataset::builtin().unwrap();
        let geocoder = Arc::new(FixedGeocoder::new(Some(GeoPoint::new(30.45, 78.08))));
        let annotator = WeatherAnnotator::new(
            Arc::new(FixedWeather::new(sample_weather())),
            geocoder.clone(),
        );

        assert!(annotator
            .snapshot(dataset.registry(), "Mussoorie")
            .await
            .is_some());
        assert_eq!(geocoder.queries(), vec!["Mussoorie, Dehradun, India"]);
    }

    #[tokio::test]
    async fn failures_are_absorbed() {
        let dataset = Dataset::builtin().unwrap();
        let annotator = WeatherAnnotator::new(
            Arc::new(DisabledProvider::new("weather")),
            Arc::new(FixedGeocoder::new(None)),
        );

        let weather = annotator
            .annotate(dataset.registry(), "Clock Tower", "Nowhere")
            .await;
        assert_eq!(weather, RouteWeather::default());
    }
}
