//! Dataset consistency report.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use travelplanner_lib::build_graph;

use super::DataSources;

use crate::output::OutputFormat;

/// Summary of a dataset check.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub locations: usize,
    pub edges: usize,
    pub places: usize,
    /// Connections declared in only one direction, as `[from, to]`.
    pub one_way: Vec<(String, String)>,
}

impl CheckReport {
    pub fn write<W: Write>(&self, out: &mut W, format: OutputFormat) -> io::Result<()> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)
            }
            OutputFormat::Text => {
                writeln!(out, "Locations: {}", self.locations)?;
                writeln!(out, "Edges: {}", self.edges)?;
                writeln!(out, "Places: {}", self.places)?;
                if self.one_way.is_empty() {
                    return writeln!(out, "No one-way connections");
                }
                writeln!(out, "One-way connections: {}", self.one_way.len())?;
                for (from, to) in &self.one_way {
                    writeln!(out, "  {} -> {}", from, to)?;
                }
                Ok(())
            }
        }
    }
}

/// Load and validate the dataset and places catalogue.
pub fn build_report(sources: DataSources<'_>) -> Result<CheckReport> {
    let (data, places) = sources.load()?;
    let graph = build_graph(&data).context("failed to build routing graph")?;

    Ok(CheckReport {
        locations: data.registry().len(),
        edges: graph.edge_count(),
        places: places.len(),
        one_way: data.one_way_connections(),
    })
}

/// Handle the check subcommand. With `strict`, one-way connections fail the
/// command.
pub fn handle_check_command(
    sources: DataSources<'_>,
    format: OutputFormat,
    strict: bool,
) -> Result<()> {
    let report = build_report(sources)?;
    report.write(&mut io::stdout().lock(), format)?;

    if strict && !report.one_way.is_empty() {
        bail!(
            "dataset has {} one-way connection(s)",
            report.one_way.len()
        );
    }
    Ok(())
}
