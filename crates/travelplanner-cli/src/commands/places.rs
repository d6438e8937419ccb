//! Nearby places and location listing.

use std::io;

use anyhow::Result;

use super::{describe, load_planner, DataSources};
use crate::output::{render_locations, render_nearby, OutputFormat};

pub fn handle_nearby_command(
    sources: DataSources<'_>,
    format: OutputFormat,
    location: &str,
    category: Option<&str>,
) -> Result<()> {
    let planner = load_planner(sources, None)?;
    let places = planner.nearby(location, category).map_err(describe)?;

    render_nearby(&mut io::stdout().lock(), location, &places, format)?;
    Ok(())
}

pub fn handle_locations_command(sources: DataSources<'_>, format: OutputFormat) -> Result<()> {
    let planner = load_planner(sources, None)?;
    render_locations(&mut io::stdout().lock(), &planner.locations(), format)?;
    Ok(())
}
