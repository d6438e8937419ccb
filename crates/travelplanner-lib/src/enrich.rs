//! Turning a graph path into a real-world route estimate.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::dataset::GeoRegistry;
use crate::error::{Error, Result};
use crate::geo::{round2, GeoPoint};
use crate::providers::{with_timeout, RoadRouter, DEFAULT_PROVIDER_TIMEOUT};

pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;
pub const DEFAULT_MILEAGE_KM_PER_LITRE: f64 = 40.0;
pub const DEFAULT_FUEL_PRICE_PER_LITRE: f64 = 100.0;

/// Constants used to derive time and cost from distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentConfig {
    pub average_speed_kmh: f64,
    pub mileage_km_per_litre: f64,
    pub fuel_price_per_litre: f64,
    /// Upper bound on the road router call.
    pub provider_timeout: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            mileage_km_per_litre: DEFAULT_MILEAGE_KM_PER_LITRE,
            fuel_price_per_litre: DEFAULT_FUEL_PRICE_PER_LITRE,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

/// Which fallback tier produced a route's polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolylineSource {
    /// Road geometry from the routing provider.
    Provider,
    /// Straight segments between the path's nodes.
    GraphPath,
    /// A single segment from source to destination.
    Direct,
}

impl PolylineSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolylineSource::Provider => "provider",
            PolylineSource::GraphPath => "graph_path",
            PolylineSource::Direct => "direct",
        }
    }
}

impl fmt::Display for PolylineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated driving time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TravelTime {
    /// Hours, rounded to two decimals.
    pub hours: f64,
}

impl TravelTime {
    /// Time needed to cover `distance_km` at `speed_kmh`.
    pub fn from_distance(distance_km: f64, speed_kmh: f64) -> Self {
        Self {
            hours: round2(distance_km / speed_kmh),
        }
    }

    /// Whole hours and leftover whole minutes.
    pub fn hours_and_minutes(&self) -> (u64, u64) {
        let hours = self.hours.trunc();
        // 0.35 h is stored as 0.34999...; the epsilon keeps it at 21 minutes.
        let minutes = ((self.hours - hours) * 60.0 + 1e-9).floor();
        (hours as u64, minutes as u64)
    }
}

impl fmt::Display for TravelTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes) = self.hours_and_minutes();
        if hours > 0 {
            write!(f, "{hours} hours {minutes} minutes")
        } else {
            write!(f, "{minutes} minutes")
        }
    }
}

/// Fuel cost of a round trip over `distance_km`, rounded to two decimals.
pub fn fuel_cost(distance_km: f64, mileage_km_per_litre: f64, price_per_litre: f64) -> f64 {
    round2(distance_km * 2.0 / mileage_km_per_litre * price_per_litre)
}

/// Sum of great-circle legs between consecutive points, rounded to two decimals.
pub fn path_distance_km(points: &[GeoPoint]) -> f64 {
    round2(
        points
            .windows(2)
            .map(|pair| pair[0].distance_km(&pair[1]))
            .sum(),
    )
}

/// Coordinates of each node of `path`.
///
/// Every path node comes from the graph, so a name missing from the registry
/// means the dataset and graph disagree.
pub fn path_points(path: &[String], registry: &GeoRegistry) -> Result<Vec<GeoPoint>> {
    path.iter()
        .map(|name| registry.resolve(name).map(|location| location.position))
        .collect()
}

/// Real-world figures for a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub travel_time: TravelTime,
    pub fuel_cost: f64,
    /// At least two points.
    pub polyline: Vec<GeoPoint>,
    pub polyline_source: PolylineSource,
    /// Driving distance reported by the road router, when it answered.
    pub road_distance_km: Option<f64>,
    pub road_duration_minutes: Option<f64>,
}

/// Computes route estimates, consulting the road router for geometry.
#[derive(Clone)]
pub struct RouteEnricher {
    router: Arc<dyn RoadRouter>,
    config: EnrichmentConfig,
}

impl RouteEnricher {
    pub fn new(router: Arc<dyn RoadRouter>, config: EnrichmentConfig) -> Self {
        Self { router, config }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Distance and travel time without contacting any provider.
    pub fn summarize(
        &self,
        path: &[String],
        registry: &GeoRegistry,
    ) -> Result<(f64, TravelTime)> {
        let points = path_points(path, registry)?;
        let distance = path_distance_km(&points);
        Ok((
            distance,
            TravelTime::from_distance(distance, self.config.average_speed_kmh),
        ))
    }

    /// Full estimate for a non-empty path.
    ///
    /// Router failures are logged and replaced by the path's own geometry;
    /// only a path the registry cannot place is an error.
    pub async fn enrich(&self, path: &[String], registry: &GeoRegistry) -> Result<RouteEstimate> {
        let points = path_points(path, registry)?;
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Err(Error::InvalidRequest {
                message: "cannot estimate an empty path".to_string(),
            });
        };

        let distance_km = path_distance_km(&points);
        let travel_time = TravelTime::from_distance(distance_km, self.config.average_speed_kmh);
        let fuel_cost = fuel_cost(
            distance_km,
            self.config.mileage_km_per_litre,
            self.config.fuel_price_per_litre,
        );

        let routed = with_timeout(
            self.router.name(),
            self.config.provider_timeout,
            self.router.directions(first, last),
        )
        .await;

        let (road_distance_km, road_duration_minutes) = match &routed {
            Ok(route) => (Some(route.distance_km), Some(route.duration_minutes)),
            Err(_) => (None, None),
        };

        let (polyline, polyline_source) = match routed {
            Ok(route) if route.coordinates.iter().any(|point| !point.is_valid()) => {
                warn!(
                    provider = self.router.name(),
                    points = route.coordinates.len(),
                    "road geometry has out-of-range coordinates, using graph path"
                );
                fallback_polyline(points, first, last)
            }
            Ok(route) if route.coordinates.len() >= 2 => {
                (route.coordinates, PolylineSource::Provider)
            }
            Ok(route) => {
                warn!(
                    provider = self.router.name(),
                    points = route.coordinates.len(),
                    "road geometry too short, using graph path"
                );
                fallback_polyline(points, first, last)
            }
            Err(err) => {
                warn!(
                    provider = self.router.name(),
                    error = %err,
                    "road geometry unavailable, using graph path"
                );
                fallback_polyline(points, first, last)
            }
        };

        debug!(
            distance_km,
            hours = travel_time.hours,
            source = %polyline_source,
            "route enriched"
        );

        Ok(RouteEstimate {
            distance_km,
            travel_time,
            fuel_cost,
            polyline,
            polyline_source,
            road_distance_km,
            road_duration_minutes,
        })
    }
}

fn fallback_polyline(
    points: Vec<GeoPoint>,
    first: GeoPoint,
    last: GeoPoint,
) -> (Vec<GeoPoint>, PolylineSource) {
    if points.len() >= 2 {
        (points, PolylineSource::GraphPath)
    } else {
        (vec![first, last], PolylineSource::Direct)
    }
}

impl fmt::Debug for RouteEnricher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEnricher")
            .field("router", &self.router.name())
            .field("config", &self.config)
            .finish()
    }
}
