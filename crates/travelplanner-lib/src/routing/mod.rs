//! Route planning between named locations.
//!
//! This module provides:
//! - [`RouteRequest`] - source and destination names
//! - [`RoutePlan`] - shortest path with its real-world estimate and weather
//! - [`AlternativeRoute`] - one entry of the alternatives list
//! - [`PlannerConfig`] - travel constants and limits
//! - [`RoutePlanner`] - the orchestrator tying registry, graph, and providers
//!
//! # Example
//!
//! ```ignore
//! use travelplanner_lib::{PlannerConfig, Providers, RoutePlanner, RouteRequest};
//!
//! let planner = RoutePlanner::builtin(Providers::offline(), PlannerConfig::default())?;
//! let plan = planner
//!     .plan_route(&RouteRequest::new("Clock Tower", "Sahastradhara"))
//!     .await?;
//! println!("{} km, {}", plan.estimate.distance_km, plan.estimate.travel_time);
//! ```

mod planner;

pub use planner::RoutePlanner;

use std::env;

use serde::Serialize;

use crate::enrich::{EnrichmentConfig, RouteEstimate, TravelTime};
use crate::error::{Error, Result};
use crate::providers::ProviderConfig;
use crate::weather::RouteWeather;

/// Largest number of alternatives returned by default.
pub const DEFAULT_MAX_ALTERNATIVES: usize = 3;

/// Route between two named locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub source: String,
    pub destination: String,
}

impl RouteRequest {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Reject blank names before they reach the registry.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("source", &self.source),
            ("destination", &self.destination),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidRequest {
                    message: format!("{field} must not be empty"),
                });
            }
        }
        Ok(())
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub source: String,
    pub destination: String,
    /// Location names from source to destination.
    pub path: Vec<String>,
    /// Sum of rounded edge weights along the path.
    pub graph_cost: f64,
    pub estimate: RouteEstimate,
    pub weather: RouteWeather,
}

impl RoutePlan {
    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// One candidate from the alternatives search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeRoute {
    pub path: Vec<String>,
    /// Real distance along the path, not the graph cost.
    pub distance_km: f64,
    pub travel_time: TravelTime,
}

/// Settings for the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub enrichment: EnrichmentConfig,
    pub max_alternatives: usize,
    /// Region appended to geocoding queries for weather lookups.
    pub geocode_region: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let providers = ProviderConfig::default();
        Self {
            enrichment: EnrichmentConfig {
                provider_timeout: providers.timeout,
                ..EnrichmentConfig::default()
            },
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            geocode_region: providers.geocode_region,
        }
    }
}

impl PlannerConfig {
    /// Load from environment variables, taking the provider timeout and
    /// geocoding region from `providers`.
    ///
    /// - `AVERAGE_SPEED_KMH` (default 40)
    /// - `FUEL_MILEAGE_KM_PER_LITRE` (default 40)
    /// - `FUEL_PRICE_PER_LITRE` (default 100)
    pub fn from_env(providers: &ProviderConfig) -> Self {
        Self::from_lookup(providers, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(providers: &ProviderConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EnrichmentConfig::default();
        let positive = |key: &str, default: f64| match lookup(key) {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => value,
                _ => {
                    tracing::warn!(variable = key, value = %raw, "invalid value, using default");
                    default
                }
            },
            None => default,
        };

        Self {
            enrichment: EnrichmentConfig {
                average_speed_kmh: positive("AVERAGE_SPEED_KMH", defaults.average_speed_kmh),
                mileage_km_per_litre: positive(
                    "FUEL_MILEAGE_KM_PER_LITRE",
                    defaults.mileage_km_per_litre,
                ),
                fuel_price_per_litre: positive(
                    "FUEL_PRICE_PER_LITRE",
                    defaults.fuel_price_per_litre,
                ),
                provider_timeout: providers.timeout,
            },
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            geocode_region: providers.geocode_region.clone(),
        }
    }
}
