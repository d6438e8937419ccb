// Handlers for each CLI subcommand. main.rs parses arguments and dispatches here.

pub mod check;
pub mod places;
pub mod route;

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use travelplanner_lib::{
    load_dataset, load_places, Dataset, Error as LibError, PlaceCatalog, PlannerConfig,
    ProviderConfig, Providers, RoutePlanner,
};

/// Data files selected on the command line; `None` means built-in data.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataSources<'a> {
    pub dataset: Option<&'a Path>,
    pub places: Option<&'a Path>,
}

impl DataSources<'_> {
    pub fn load(&self) -> Result<(Dataset, PlaceCatalog)> {
        let data = load_dataset(self.dataset).with_context(|| match self.dataset {
            Some(path) => format!("failed to load dataset from {}", path.display()),
            None => "failed to load the built-in dataset".to_string(),
        })?;
        let places = load_places(self.places, self.dataset.is_some(), data.registry())
            .context("failed to load the places catalogue")?;
        Ok((data, places))
    }
}

/// Build a planner over the selected data.
///
/// Provider keys and travel constants come from the environment; without
/// keys the planner runs offline.
pub fn load_planner(
    sources: DataSources<'_>,
    max_alternatives: Option<usize>,
) -> Result<RoutePlanner> {
    let (data, places) = sources.load()?;

    let provider_config = ProviderConfig::from_env();
    let mut config = PlannerConfig::from_env(&provider_config);
    if let Some(max) = max_alternatives {
        config.max_alternatives = max;
    }
    let providers =
        Providers::from_config(&provider_config).context("failed to configure providers")?;

    RoutePlanner::new(data, places, providers, config).context("failed to build routing graph")
}

/// Turn a planner error into a message for the terminal. Unknown names also
/// list every valid location.
pub fn describe(err: LibError) -> anyhow::Error {
    match &err {
        LibError::UnknownLocation { valid, .. } => {
            anyhow!("{}\nvalid locations: {}", err, valid.join(", "))
        }
        _ => err.into(),
    }
}
