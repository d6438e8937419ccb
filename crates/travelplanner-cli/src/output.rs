//! Output formatting for planner results.
//!
//! Every renderer writes to a `Write` so commands print to stdout and tests
//! capture into a buffer. JSON output uses the same field names as the HTTP
//! service.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use travelplanner_lib::{
    AlternativeRoute, GeoPoint, Place, PolylineSource, RoutePlan, RouteWeather, WeatherSnapshot,
};

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Debug, Serialize)]
struct RouteView<'a> {
    distance: f64,
    path: &'a [String],
    time: String,
    fuel_budget: f64,
    weather: &'a RouteWeather,
    polyline_coords: &'a [GeoPoint],
    polyline_source: PolylineSource,
}

#[derive(Debug, Serialize)]
struct AlternativeView<'a> {
    distance: f64,
    path: &'a [String],
    time: String,
}

#[derive(Debug, Serialize)]
struct AlternativesView<'a> {
    routes: Vec<AlternativeView<'a>>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct NearbyView<'a> {
    location: &'a str,
    places: &'a [Place],
    count: usize,
}

#[derive(Debug, Serialize)]
struct LocationsView<'a> {
    locations: &'a [String],
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn write_path<W: Write>(out: &mut W, path: &[String]) -> io::Result<()> {
    for (index, name) in path.iter().enumerate() {
        writeln!(out, "  {:>2}. {}", index + 1, name)?;
    }
    Ok(())
}

fn write_weather<W: Write>(
    out: &mut W,
    name: &str,
    weather: Option<&WeatherSnapshot>,
) -> io::Result<()> {
    match weather {
        Some(w) => writeln!(
            out,
            "Weather at {}: {}°C (feels like {}°C), {}, humidity {}%",
            name, w.temperature, w.feels_like, w.description, w.humidity
        ),
        None => writeln!(out, "Weather at {}: unavailable", name),
    }
}

/// Render the shortest route.
pub fn render_route<W: Write>(
    out: &mut W,
    plan: &RoutePlan,
    format: OutputFormat,
) -> io::Result<()> {
    let estimate = &plan.estimate;
    match format {
        OutputFormat::Json => write_json(
            out,
            &RouteView {
                distance: estimate.distance_km,
                path: &plan.path,
                time: estimate.travel_time.to_string(),
                fuel_budget: estimate.fuel_cost,
                weather: &plan.weather,
                polyline_coords: &estimate.polyline,
                polyline_source: estimate.polyline_source,
            },
        ),
        OutputFormat::Text => {
            writeln!(out, "Route from {} to {}:", plan.source, plan.destination)?;
            write_path(out, &plan.path)?;
            writeln!(out, "Distance: {:.2} km", estimate.distance_km)?;
            writeln!(out, "Time: {}", estimate.travel_time)?;
            writeln!(out, "Fuel budget: {:.2}", estimate.fuel_cost)?;
            writeln!(
                out,
                "Polyline: {} points ({})",
                estimate.polyline.len(),
                estimate.polyline_source
            )?;
            write_weather(out, &plan.source, plan.weather.source.as_ref())?;
            write_weather(out, &plan.destination, plan.weather.destination.as_ref())
        }
    }
}

/// Render the alternatives list, cheapest first.
pub fn render_alternatives<W: Write>(
    out: &mut W,
    routes: &[AlternativeRoute],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &AlternativesView {
                routes: routes
                    .iter()
                    .map(|route| AlternativeView {
                        distance: route.distance_km,
                        path: &route.path,
                        time: route.travel_time.to_string(),
                    })
                    .collect(),
                count: routes.len(),
            },
        ),
        OutputFormat::Text => {
            for (index, route) in routes.iter().enumerate() {
                writeln!(
                    out,
                    "Option {}: {:.2} km, {}",
                    index + 1,
                    route.distance_km,
                    route.travel_time
                )?;
                write_path(out, &route.path)?;
            }
            Ok(())
        }
    }
}

/// Render places near `location`.
pub fn render_nearby<W: Write>(
    out: &mut W,
    location: &str,
    places: &[Place],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &NearbyView {
                location,
                places,
                count: places.len(),
            },
        ),
        OutputFormat::Text => {
            if places.is_empty() {
                return writeln!(out, "No places found near {}", location);
            }
            writeln!(out, "Places near {}:", location)?;
            for place in places {
                writeln!(out, "  {:.1}  {} [{}]", place.rating, place.name, place.category)?;
            }
            Ok(())
        }
    }
}

/// Render the registered location names.
pub fn render_locations<W: Write>(
    out: &mut W,
    locations: &[String],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &LocationsView { locations }),
        OutputFormat::Text => {
            for name in locations {
                writeln!(out, "{}", name)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelplanner_lib::test_helpers::{offline_planner, sample_weather};
    use travelplanner_lib::RouteRequest;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[tokio::test]
    async fn route_text_lists_stops_and_figures() {
        let mut plan = offline_planner()
            .plan_route(&RouteRequest::new("Clock Tower", "Rajpur Road"))
            .await
            .unwrap();
        plan.weather.source = Some(sample_weather());

        let text = render(|out| render_route(out, &plan, OutputFormat::Text));
        assert!(text.starts_with("Route from Clock Tower to Rajpur Road:"));
        assert!(text.contains("   1. Clock Tower"));
        assert!(text.contains("Time: "));
        assert!(text.contains("(graph_path)"));
        assert!(text.contains(
            "Weather at Clock Tower: 24°C (feels like 25°C), scattered clouds"
        ));
        assert!(text.contains("Weather at Rajpur Road: unavailable"));
    }

    #[tokio::test]
    async fn route_json_matches_service_fields() {
        let plan = offline_planner()
            .plan_route(&RouteRequest::new("Clock Tower", "Rajpur Road"))
            .await
            .unwrap();

        let json = render(|out| render_route(out, &plan, OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for field in [
            "distance",
            "path",
            "time",
            "fuel_budget",
            "weather",
            "polyline_coords",
            "polyline_source",
        ] {
            assert!(value.get(field).is_some(), "{field} missing");
        }
    }

    #[test]
    fn empty_nearby_text_says_so() {
        let text = render(|out| render_nearby(out, "Max Hospital", &[], OutputFormat::Text));
        assert_eq!(text, "No places found near Max Hospital\n");
    }

    #[test]
    fn locations_json_wraps_names() {
        let names = vec!["Clock Tower".to_string()];
        let json = render(|out| render_locations(out, &names, OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["locations"][0], "Clock Tower");
    }
}
