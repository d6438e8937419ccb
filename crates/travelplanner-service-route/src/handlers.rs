//! Route, alternatives, nearby, and locations endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use travelplanner_lib::{GeoPoint, Place, PolylineSource, RouteWeather};
use travelplanner_service_shared::{
    extract_or_generate_request_id, failure_reason, from_lib_error, health_live, health_ready,
    metrics_handler, record_nearby_returned, record_polyline_source, record_route_calculated,
    record_route_distance, record_route_failed, ApiResponse, AppState, MetricsLayer,
    NearbyRequest, PlannerEndpoint, ProblemDetails, RouteRequest, ServiceResponse, Validate,
};

/// Shortest route returned to the caller.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Real distance along the path in kilometres.
    distance: f64,
    path: Vec<String>,
    /// e.g. "1 hours 15 minutes".
    time: String,
    fuel_budget: f64,
    weather: RouteWeather,
    /// `[lat, lon]` pairs for drawing the route.
    polyline_coords: Vec<GeoPoint>,
    polyline_source: PolylineSource,
}

#[derive(Debug, Serialize)]
pub struct AlternativeEntry {
    distance: f64,
    path: Vec<String>,
    time: String,
}

#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    routes: Vec<AlternativeEntry>,
    count: usize,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    location: String,
    places: Vec<Place>,
    count: usize,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    locations: Vec<String>,
}

/// Build the service router.
pub fn app(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/api/v1/route", post(route_handler))
        .route("/api/v1/route/alternatives", post(alternatives_handler))
        .route("/api/v1/nearby", post(nearby_handler))
        .route("/api/v1/locations", get(locations_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(MetricsLayer)
        .with_state(state)
}

/// Unwrap a JSON body and validate it, or produce the 400 problem.
fn parse_body<B: Validate>(
    payload: Result<Json<B>, JsonRejection>,
    request_id: &str,
) -> Result<B, Box<ProblemDetails>> {
    let Json(body) = payload.map_err(|rejection| {
        Box::new(ProblemDetails::bad_request(
            rejection.body_text(),
            request_id,
        ))
    })?;
    body.validate(request_id)?;
    Ok(body)
}

/// Handle POST /api/v1/route requests.
async fn route_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> ApiResponse<RouteResponse> {
    let request_id = extract_or_generate_request_id(&headers);
    let request = match parse_body(payload, request_id.as_str()) {
        Ok(request) => request,
        Err(problem) => {
            record_route_failed("validation_error", PlannerEndpoint::Route);
            return problem.into();
        }
    };

    info!(
        request_id = %request_id,
        source = %request.source,
        destination = %request.destination,
        "handling route request"
    );

    let plan = match state.planner().plan_route(&(&request).into()).await {
        Ok(plan) => plan,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "route planning failed");
            record_route_failed(failure_reason(&e), PlannerEndpoint::Route);
            return from_lib_error(&e, request_id.as_str()).into();
        }
    };

    record_route_calculated(PlannerEndpoint::Route);
    record_route_distance(plan.estimate.distance_km);
    record_polyline_source(plan.estimate.polyline_source);

    let estimate = plan.estimate;
    ApiResponse::ok(RouteResponse {
        distance: estimate.distance_km,
        path: plan.path,
        time: estimate.travel_time.to_string(),
        fuel_budget: estimate.fuel_cost,
        weather: plan.weather,
        polyline_coords: estimate.polyline,
        polyline_source: estimate.polyline_source,
    })
}

/// Handle POST /api/v1/route/alternatives requests.
async fn alternatives_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> ApiResponse<AlternativesResponse> {
    let request_id = extract_or_generate_request_id(&headers);
    let request = match parse_body(payload, request_id.as_str()) {
        Ok(request) => request,
        Err(problem) => {
            record_route_failed("validation_error", PlannerEndpoint::Alternatives);
            return problem.into();
        }
    };

    let routes = match state.planner().alternatives(&(&request).into()) {
        Ok(routes) => routes,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "alternatives search failed");
            record_route_failed(failure_reason(&e), PlannerEndpoint::Alternatives);
            return from_lib_error(&e, request_id.as_str()).into();
        }
    };
    record_route_calculated(PlannerEndpoint::Alternatives);

    let routes: Vec<AlternativeEntry> = routes
        .into_iter()
        .map(|route| AlternativeEntry {
            distance: route.distance_km,
            path: route.path,
            time: route.travel_time.to_string(),
        })
        .collect();

    info!(request_id = %request_id, count = routes.len(), "alternatives computed");
    ApiResponse::ok(AlternativesResponse {
        count: routes.len(),
        routes,
    })
}

/// Handle POST /api/v1/nearby requests.
async fn nearby_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NearbyRequest>, JsonRejection>,
) -> ApiResponse<NearbyResponse> {
    let request_id = extract_or_generate_request_id(&headers);
    let request = match parse_body(payload, request_id.as_str()) {
        Ok(request) => request,
        Err(problem) => {
            record_route_failed("validation_error", PlannerEndpoint::Nearby);
            return problem.into();
        }
    };
    let location = request.location.trim().to_string();

    match state
        .planner()
        .nearby(&location, request.category.as_deref())
    {
        Ok(places) => {
            record_nearby_returned(places.len());
            ApiResponse::ok(NearbyResponse {
                location,
                count: places.len(),
                places,
            })
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "nearby lookup failed");
            record_route_failed(failure_reason(&e), PlannerEndpoint::Nearby);
            from_lib_error(&e, request_id.as_str()).into()
        }
    }
}

/// Handle GET /api/v1/locations requests.
async fn locations_handler(State(state): State<AppState>) -> ServiceResponse<LocationsResponse> {
    ServiceResponse::new(LocationsResponse {
        locations: state.planner().locations(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use travelplanner_service_shared::test_utils::{fixture_locations, island_state, test_state};
    use travelplanner_service_shared::{PROBLEM_ROUTE_NOT_FOUND, PROBLEM_UNKNOWN_LOCATION};

    fn server(state: AppState) -> TestServer {
        TestServer::new(app(state, "/metrics")).expect("test server")
    }

    #[tokio::test]
    async fn route_returns_enriched_plan() {
        let response = server(test_state())
            .post("/api/v1/route")
            .json(&json!({
                "source": fixture_locations::CLOCK_TOWER,
                "destination": fixture_locations::SAHASTRADHARA
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["path"][0], fixture_locations::CLOCK_TOWER);
        assert!(body["distance"].as_f64().unwrap() > 0.0);
        assert!(body["time"].as_str().unwrap().ends_with("minutes"));
        assert!(body["fuel_budget"].as_f64().unwrap() > 0.0);
        assert!(body["polyline_coords"].as_array().unwrap().len() >= 2);
        assert_eq!(body["polyline_source"], "graph_path");
        assert!(body["weather"]["source"].is_null());
        assert_eq!(body["content_type"], "application/json");
    }

    #[tokio::test]
    async fn unknown_location_is_bad_request_listing_valid_names() {
        let response = server(test_state())
            .post("/api/v1/route")
            .json(&json!({"source": "Clock Towr", "destination": "Sahastradhara"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["type"], PROBLEM_UNKNOWN_LOCATION);
        assert_eq!(body["valid_locations"].as_array().unwrap().len(), 16);
        assert_eq!(body["suggestions"][0], fixture_locations::CLOCK_TOWER);
    }

    #[tokio::test]
    async fn blank_field_is_bad_request() {
        let response = server(test_state())
            .post("/api/v1/route")
            .json(&json!({"source": "Clock Tower", "destination": " "}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["detail"].as_str().unwrap().contains("destination"));
    }

    #[tokio::test]
    async fn unreachable_destination_is_not_found() {
        let response = server(island_state())
            .post("/api/v1/route")
            .json(&json!({"source": "North Gate", "destination": "Island"}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["type"], PROBLEM_ROUTE_NOT_FOUND);
    }

    #[tokio::test]
    async fn alternatives_are_capped_and_counted() {
        let response = server(test_state())
            .post("/api/v1/route/alternatives")
            .json(&json!({
                "source": fixture_locations::FOREST_RESEARCH_INSTITUTE,
                "destination": fixture_locations::SAHASTRADHARA
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let routes = body["routes"].as_array().unwrap();
        assert!(!routes.is_empty() && routes.len() <= 3);
        assert_eq!(body["count"].as_u64(), Some(routes.len() as u64));
        assert_eq!(
            routes[0]["path"][0],
            fixture_locations::FOREST_RESEARCH_INSTITUTE
        );
    }

    #[tokio::test]
    async fn alternatives_for_isolated_node_is_not_found() {
        server(island_state())
            .post("/api/v1/route/alternatives")
            .json(&json!({"source": "Island", "destination": "Market"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn nearby_filters_by_type_and_sorts_by_rating() {
        let response = server(test_state())
            .post("/api/v1/nearby")
            .json(&json!({"location": fixture_locations::RAJPUR_ROAD, "type": "Cafe"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);
        assert_eq!(body["places"][0]["name"], "Orchard Cafe");
        assert_eq!(body["places"][1]["name"], "Barista Rajpur Road");
    }

    #[tokio::test]
    async fn nearby_unknown_location_is_bad_request() {
        server(test_state())
            .post("/api/v1/nearby")
            .json(&json!({"location": "Atlantis"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_problem_details() {
        let response = server(test_state())
            .post("/api/v1/route")
            .text("not json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn locations_are_listed() {
        let response = server(test_state()).get("/api/v1/locations").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["locations"].as_array().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn request_id_is_echoed_in_problem_and_header() {
        let response = server(test_state())
            .post("/api/v1/route")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("trip-7"),
            )
            .json(&json!({"source": "Atlantis", "destination": "Clock Tower"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.header("x-request-id"), "trip-7");
        let body: Value = response.json();
        assert_eq!(body["instance"], "trip-7");
    }

    #[tokio::test]
    async fn health_endpoints_respond() {
        let server = server(test_state());
        server.get("/health/live").await.assert_status_ok();

        let ready: Value = server.get("/health/ready").await.json();
        assert_eq!(ready["status"], "ok");
        assert_eq!(ready["locations_loaded"], 16);
    }
}
