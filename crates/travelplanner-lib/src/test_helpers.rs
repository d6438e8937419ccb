// Fake providers and fixtures for offline tests of this crate and its dependents.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dataset::{Dataset, GeoRegistry};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::providers::{
    DisabledProvider, Geocoder, Providers, RoadRoute, RoadRouter, WeatherProvider,
};
use crate::routing::{PlannerConfig, RoutePlanner};
use crate::weather::WeatherSnapshot;

/// Dataset with `A(0,0)`, `B(0,1)`, `C(1,1)` and connections `A-B`, `B-C`.
pub fn abc_dataset() -> Dataset {
    Dataset::from_json_str(
        r#"{
            "locations": [
                {"name": "A", "latitude": 0.0, "longitude": 0.0},
                {"name": "B", "latitude": 0.0, "longitude": 1.0},
                {"name": "C", "latitude": 1.0, "longitude": 1.0}
            ],
            "connections": {"A": ["B"], "B": ["A", "C"], "C": ["B"]}
        }"#,
    )
    .expect("fixture dataset is valid")
}

/// Registry of the `abc_dataset` locations.
pub fn abc_registry() -> GeoRegistry {
    abc_dataset().registry().clone()
}

pub fn sample_weather() -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: 24,
        feels_like: 25,
        humidity: 60,
        description: "scattered clouds".to_string(),
        wind_speed: 2.1,
        icon: "03d".to_string(),
    }
}

/// Planner over the built-in data with every provider disabled.
pub fn offline_planner() -> RoutePlanner {
    RoutePlanner::builtin(Providers::offline(), PlannerConfig::default())
        .expect("builtin planner")
}

/// Planner over the built-in data using `router` and no weather.
pub fn planner_with_router(router: Arc<dyn RoadRouter>) -> RoutePlanner {
    let providers = Providers {
        router,
        ..Providers::offline()
    };
    RoutePlanner::builtin(providers, PlannerConfig::default()).expect("builtin planner")
}

/// Planner over the built-in data with the given providers.
pub fn planner_with(
    router: Arc<dyn RoadRouter>,
    weather: Arc<dyn WeatherProvider>,
) -> RoutePlanner {
    let providers = Providers {
        router,
        weather,
        geocoder: Arc::new(DisabledProvider::new("geocoder")),
    };
    RoutePlanner::builtin(providers, PlannerConfig::default()).expect("builtin planner")
}

/// Router that always answers with the same geometry.
#[derive(Debug, Clone)]
pub struct FixedRouter {
    coordinates: Vec<GeoPoint>,
    distance_km: f64,
}

impl FixedRouter {
    pub fn new(coordinates: Vec<GeoPoint>, distance_km: f64) -> Self {
        Self {
            coordinates,
            distance_km,
        }
    }
}

#[async_trait]
impl RoadRouter for FixedRouter {
    fn name(&self) -> &'static str {
        "fixed-router"
    }

    async fn directions(&self, _from: GeoPoint, _to: GeoPoint) -> Result<RoadRoute> {
        Ok(RoadRoute {
            coordinates: self.coordinates.clone(),
            distance_km: self.distance_km,
            duration_minutes: self.distance_km * 1.5,
        })
    }
}

/// Router that records every request and then fails or echoes the endpoints.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    calls: Mutex<Vec<(GeoPoint, GeoPoint)>>,
    fail: bool,
}

impl RecordingRouter {
    /// Answers with a straight line between the endpoints.
    pub fn straight() -> Self {
        Self::default()
    }

    /// Fails every request with a provider status error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(GeoPoint, GeoPoint)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RoadRouter for RecordingRouter {
    fn name(&self) -> &'static str {
        "recording-router"
    }

    async fn directions(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadRoute> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((from, to));
        }
        if self.fail {
            return Err(Error::ProviderStatus {
                provider: "recording-router",
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(RoadRoute {
            coordinates: vec![from, to],
            distance_km: from.distance_km(&to),
            duration_minutes: 0.0,
        })
    }
}

/// Weather provider that always reports the same conditions.
#[derive(Debug, Clone)]
pub struct FixedWeather {
    snapshot: WeatherSnapshot,
}

impl FixedWeather {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl WeatherProvider for FixedWeather {
    fn name(&self) -> &'static str {
        "fixed-weather"
    }

    async fn current(&self, _at: GeoPoint) -> Result<WeatherSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Weather provider that records the points it was asked about.
#[derive(Debug)]
pub struct RecordingWeather {
    snapshot: WeatherSnapshot,
    calls: Mutex<Vec<GeoPoint>>,
}

impl RecordingWeather {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self {
            snapshot,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GeoPoint> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WeatherProvider for RecordingWeather {
    fn name(&self) -> &'static str {
        "recording-weather"
    }

    async fn current(&self, at: GeoPoint) -> Result<WeatherSnapshot> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(at);
        }
        Ok(self.snapshot.clone())
    }
}

/// Geocoder with a single canned answer that records its queries.
#[derive(Debug)]
pub struct FixedGeocoder {
    hit: Option<GeoPoint>,
    queries: Mutex<Vec<String>>,
}

impl FixedGeocoder {
    pub fn new(hit: Option<GeoPoint>) -> Self {
        Self {
            hit,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    fn name(&self) -> &'static str {
        "fixed-geocoder"
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        Ok(self.hit)
    }
}
