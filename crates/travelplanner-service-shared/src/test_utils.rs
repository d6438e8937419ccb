//! Test utilities for handler testing.
//!
//! All state built here runs fully offline: road routing, weather and
//! geocoding are disabled, so routes fall back to graph geometry.

use std::sync::OnceLock;

use travelplanner_lib::test_helpers::offline_planner;
use travelplanner_lib::{Dataset, PlaceCatalog, PlannerConfig, Providers, RoutePlanner};

use crate::middleware::RequestId;
use crate::state::AppState;

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Shared offline state over the built-in Dehradun data.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| AppState::from_planner(offline_planner()))
        .clone()
}

/// Offline state over a small dataset where `Island` has no connections.
pub fn island_state() -> AppState {
    let dataset = Dataset::from_json_str(ISLAND_DATASET).expect("island dataset is valid");
    let planner = RoutePlanner::new(
        dataset,
        PlaceCatalog::default(),
        Providers::offline(),
        PlannerConfig::default(),
    )
    .expect("island planner");
    AppState::from_planner(planner)
}

const ISLAND_DATASET: &str = r#"{
    "locations": [
        {"name": "North Gate", "latitude": 30.40, "longitude": 78.05},
        {"name": "Market", "latitude": 30.33, "longitude": 78.04},
        {"name": "Island", "latitude": 30.20, "longitude": 78.20}
    ],
    "connections": {
        "North Gate": ["Market"],
        "Market": ["North Gate"]
    }
}"#;

/// Location names in the built-in data for use in tests.
pub mod fixture_locations {
    pub const CLOCK_TOWER: &str = "Clock Tower";
    pub const SAHASTRADHARA: &str = "Sahastradhara";
    pub const RAJPUR_ROAD: &str = "Rajpur Road";
    pub const FOREST_RESEARCH_INSTITUTE: &str = "Forest Research Institute";
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", RequestId::generate())
}
