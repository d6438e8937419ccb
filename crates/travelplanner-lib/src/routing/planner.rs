use std::sync::Arc;

use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::enrich::RouteEnricher;
use crate::error::{Error, Result};
use crate::graph::{build_graph, Graph};
use crate::path::{k_shortest_distinct_paths, shortest_path};
use crate::places::{Place, PlaceCatalog};
use crate::providers::Providers;
use crate::weather::WeatherAnnotator;

use super::{AlternativeRoute, PlannerConfig, RoutePlan, RouteRequest};

/// Answers route, alternatives, and nearby queries against one dataset.
///
/// The dataset and graph are built once and shared read-only, so a planner
/// can be wrapped in an `Arc` and used from many requests at once.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    dataset: Arc<Dataset>,
    graph: Graph,
    places: Arc<PlaceCatalog>,
    enricher: RouteEnricher,
    weather: WeatherAnnotator,
    config: PlannerConfig,
}

impl RoutePlanner {
    pub fn new(
        dataset: Dataset,
        places: PlaceCatalog,
        providers: Providers,
        config: PlannerConfig,
    ) -> Result<Self> {
        let graph = build_graph(&dataset)?;
        let enricher = RouteEnricher::new(providers.router, config.enrichment);
        let weather = WeatherAnnotator::new(providers.weather, providers.geocoder)
            .with_region(config.geocode_region.clone())
            .with_timeout(config.enrichment.provider_timeout);

        Ok(Self {
            dataset: Arc::new(dataset),
            graph,
            places: Arc::new(places),
            enricher,
            weather,
            config,
        })
    }

    /// Planner over the built-in dataset and places catalogue.
    pub fn builtin(providers: Providers, config: PlannerConfig) -> Result<Self> {
        let dataset = Dataset::builtin()?;
        let places = PlaceCatalog::builtin(dataset.registry())?;
        Self::new(dataset, places, providers, config)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn places(&self) -> &PlaceCatalog {
        &self.places
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Shortest route with distance, time, cost, polyline, and weather.
    ///
    /// Both names are checked against the registry before the graph is
    /// searched. Road geometry and weather are fetched concurrently and their
    /// failures never fail the plan.
    pub async fn plan_route(&self, request: &RouteRequest) -> Result<RoutePlan> {
        self.check_endpoints(request)?;
        let registry = self.dataset.registry();

        let found = shortest_path(&self.graph, &request.source, &request.destination);
        if !found.is_reachable() {
            return Err(Error::RouteNotFound {
                start: request.source.clone(),
                goal: request.destination.clone(),
            });
        }
        debug!(
            source = %request.source,
            destination = %request.destination,
            hops = found.hop_count(),
            cost = found.cost,
            "shortest path found"
        );

        let (estimate, weather) = tokio::join!(
            self.enricher.enrich(&found.path, registry),
            self.weather
                .annotate(registry, &request.source, &request.destination)
        );
        let estimate = estimate?;

        info!(
            source = %request.source,
            destination = %request.destination,
            distance_km = estimate.distance_km,
            polyline = %estimate.polyline_source,
            "route planned"
        );

        Ok(RoutePlan {
            source: request.source.clone(),
            destination: request.destination.clone(),
            path: found.path,
            graph_cost: found.cost,
            estimate,
            weather,
        })
    }

    /// Up to `max_alternatives` distinct paths, cheapest first.
    pub fn alternatives(&self, request: &RouteRequest) -> Result<Vec<AlternativeRoute>> {
        self.check_endpoints(request)?;
        let registry = self.dataset.registry();

        let found = k_shortest_distinct_paths(
            &self.graph,
            &request.source,
            &request.destination,
            self.config.max_alternatives,
        );
        if found.is_empty() {
            return Err(Error::RouteNotFound {
                start: request.source.clone(),
                goal: request.destination.clone(),
            });
        }

        found
            .into_iter()
            .map(|result| {
                let (distance_km, travel_time) = self.enricher.summarize(&result.path, registry)?;
                Ok(AlternativeRoute {
                    path: result.path,
                    distance_km,
                    travel_time,
                })
            })
            .collect()
    }

    /// Places near `location`, best rated first.
    pub fn nearby(&self, location: &str, category: Option<&str>) -> Result<Vec<Place>> {
        if location.trim().is_empty() {
            return Err(Error::InvalidRequest {
                message: "location must not be empty".to_string(),
            });
        }
        self.places
            .nearby(self.dataset.registry(), location, category)
    }

    /// Registered location names in lexical order.
    pub fn locations(&self) -> Vec<String> {
        self.dataset
            .registry()
            .names()
            .map(str::to_string)
            .collect()
    }

    fn check_endpoints(&self, request: &RouteRequest) -> Result<()> {
        request.validate()?;
        let registry = self.dataset.registry();
        registry.resolve(&request.source)?;
        registry.resolve(&request.destination)?;
        Ok(())
    }
}
