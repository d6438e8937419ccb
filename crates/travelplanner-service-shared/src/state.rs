//! Application state for the HTTP service.
//!
//! The planner owns the dataset, graph, places catalogue and provider
//! clients. It is built once at startup and handed to every handler.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use travelplanner_lib::{
    load_dataset, load_places, Error as LibError, PlannerConfig, ProviderConfig, Providers,
    RoutePlanner,
};

/// Environment variable naming an optional JSON dataset file.
pub const DATASET_PATH_ENV: &str = "TRAVELPLANNER_DATASET_PATH";

/// Environment variable naming an optional places CSV file.
pub const PLACES_PATH_ENV: &str = "TRAVELPLANNER_PLACES_PATH";

/// Error during application state initialization.
#[derive(Debug, Error)]
pub enum AppStateError {
    /// The configured dataset file does not exist.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// The configured places file does not exist.
    #[error("places catalogue not found: {0}")]
    PlacesNotFound(String),

    /// The dataset, places catalogue, or provider clients failed to load.
    #[error("failed to build route planner: {0}")]
    Planner(#[from] LibError),
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use travelplanner_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let names = state.planner().locations();
///     // ... use names
/// }
///
/// let state = AppState::from_env()?;
/// let app = Router::new()
///     .route("/api/v1/locations", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    planner: RoutePlanner,
    dataset_path: Option<PathBuf>,
}

impl AppState {
    /// Build state from environment configuration.
    ///
    /// Reads `TRAVELPLANNER_DATASET_PATH` and `TRAVELPLANNER_PLACES_PATH`
    /// (built-in data when unset) and the provider and travel settings
    /// documented on [`ProviderConfig::from_env`] and [`PlannerConfig::from_env`].
    pub fn from_env() -> Result<Self, AppStateError> {
        let path_var = |key: &str| {
            env::var(key)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };
        let dataset_path = path_var(DATASET_PATH_ENV);
        let places_path = path_var(PLACES_PATH_ENV);
        let providers = ProviderConfig::from_env();
        let config = PlannerConfig::from_env(&providers);
        Self::load(
            dataset_path.as_deref(),
            places_path.as_deref(),
            &providers,
            config,
        )
    }

    /// Load the dataset, places catalogue, and provider clients.
    pub fn load(
        dataset_path: Option<&Path>,
        places_path: Option<&Path>,
        providers: &ProviderConfig,
        config: PlannerConfig,
    ) -> Result<Self, AppStateError> {
        if let Some(path) = dataset_path.filter(|path| !path.exists()) {
            return Err(AppStateError::DatasetNotFound(path.display().to_string()));
        }
        if let Some(path) = places_path.filter(|path| !path.exists()) {
            return Err(AppStateError::PlacesNotFound(path.display().to_string()));
        }

        let dataset = load_dataset(dataset_path)?;
        let places = load_places(places_path, dataset_path.is_some(), dataset.registry())?;

        let clients = Providers::from_config(providers)?;
        let planner = RoutePlanner::new(dataset, places, clients, config)?;
        tracing::info!(
            locations = planner.dataset().registry().len(),
            edges = planner.graph().edge_count(),
            "route planner ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                planner,
                dataset_path: dataset_path.map(Path::to_path_buf),
            }),
        })
    }

    /// Create application state from a pre-built planner.
    ///
    /// This is useful for testing with fake providers.
    pub fn from_planner(planner: RoutePlanner) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                planner,
                dataset_path: None,
            }),
        }
    }

    pub fn planner(&self) -> &RoutePlanner {
        &self.inner.planner
    }

    /// Dataset file in use, or `None` for the built-in data.
    pub fn dataset_path(&self) -> Option<&Path> {
        self.inner.dataset_path.as_deref()
    }

    pub fn location_count(&self) -> usize {
        self.inner.planner.dataset().registry().len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.planner.graph().edge_count()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("location_count", &self.location_count())
            .field("edge_count", &self.edge_count())
            .field("dataset_path", &self.inner.dataset_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelplanner_lib::test_helpers::offline_planner;

    #[test]
    fn test_app_state_from_planner() {
        let state = AppState::from_planner(offline_planner());

        assert_eq!(state.location_count(), 16);
        assert!(state.edge_count() > 0);
        assert!(state.dataset_path().is_none());
    }

    #[test]
    fn test_app_state_clone_shares_planner() {
        let state1 = AppState::from_planner(offline_planner());
        let state2 = state1.clone();

        assert!(Arc::ptr_eq(&state1.inner, &state2.inner));
    }

    #[test]
    fn test_app_state_debug() {
        let state = AppState::from_planner(offline_planner());
        let debug = format!("{:?}", state);

        assert!(debug.contains("AppState"));
        assert!(debug.contains("location_count"));
        assert!(debug.contains("edge_count"));
    }

    #[test]
    fn test_app_state_error_display() {
        let err = AppStateError::DatasetNotFound("/path/to/places.json".to_string());
        assert!(err.to_string().contains("/path/to/places.json"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_app_state_load_nonexistent() {
        let result = AppState::load(
            Some(Path::new("/nonexistent/path/to/dataset.json")),
            None,
            &ProviderConfig::default(),
            PlannerConfig::default(),
        );

        match result {
            Err(AppStateError::DatasetNotFound(path)) => assert!(path.contains("nonexistent")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_app_state_load_builtin_without_keys() {
        let providers = ProviderConfig {
            nominatim_base_url: None,
            ..ProviderConfig::default()
        };
        let state = AppState::load(None, None, &providers, PlannerConfig::default()).unwrap();
        assert!(!state.planner().places().is_empty());
        assert_eq!(state.location_count(), 16);
    }
}
