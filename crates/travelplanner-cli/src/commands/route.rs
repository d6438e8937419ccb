//! Route and alternatives command handlers.

use std::io;

use anyhow::Result;

use travelplanner_lib::RouteRequest;

use super::{describe, load_planner, DataSources};
use crate::output::{render_alternatives, render_route, OutputFormat};

/// Handle the route subcommand: shortest path with the full estimate.
pub async fn handle_route_command(
    sources: DataSources<'_>,
    format: OutputFormat,
    from: &str,
    to: &str,
) -> Result<()> {
    let planner = load_planner(sources, None)?;
    let plan = planner
        .plan_route(&RouteRequest::new(from, to))
        .await
        .map_err(describe)?;

    render_route(&mut io::stdout().lock(), &plan, format)?;
    Ok(())
}

/// Handle the alternatives subcommand: up to `max` distinct paths.
pub fn handle_alternatives_command(
    sources: DataSources<'_>,
    format: OutputFormat,
    from: &str,
    to: &str,
    max: usize,
) -> Result<()> {
    let planner = load_planner(sources, Some(max))?;
    let routes = planner
        .alternatives(&RouteRequest::new(from, to))
        .map_err(describe)?;

    render_alternatives(&mut io::stdout().lock(), &routes, format)?;
    Ok(())
}
