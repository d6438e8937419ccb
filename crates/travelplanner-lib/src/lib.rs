//! Travel planner library entry points.
//!
//! This crate holds the route-planning engine: the registry of named
//! locations, the weighted graph derived from it, Dijkstra search, and the
//! enrichment that turns a path into distance, time, fuel cost, a map
//! polyline, and endpoint weather. Higher-level consumers (the HTTP service
//! and the CLI) should only depend on the items exported here instead of
//! reimplementing behavior.
//!

#![deny(warnings)]

pub mod dataset;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod graph;
pub mod path;
pub mod places;
pub mod polyline;
pub mod providers;
pub mod routing;
pub mod weather;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use dataset::{load_dataset, Dataset, GeoRegistry, Location};
pub use enrich::{
    fuel_cost, EnrichmentConfig, PolylineSource, RouteEnricher, RouteEstimate, TravelTime,
};
pub use error::{Error, Result};
pub use geo::{great_circle_km, GeoPoint};
pub use graph::{build_graph, Graph};
pub use path::{k_shortest_distinct_paths, shortest_path, PathResult, SearchMode};
pub use places::{load_places, Place, PlaceCatalog};
pub use providers::{
    DisabledProvider, Geocoder, ProviderConfig, Providers, RoadRoute, RoadRouter,
    WeatherProvider,
};
pub use routing::{AlternativeRoute, PlannerConfig, RoutePlan, RoutePlanner, RouteRequest};
pub use weather::{RouteWeather, WeatherAnnotator, WeatherSnapshot};
