use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use travelplanner_cli::commands::{
    check::handle_check_command,
    places::{handle_locations_command, handle_nearby_command},
    route::{handle_alternatives_command, handle_route_command},
    DataSources,
};
use travelplanner_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Route planning between Dehradun landmarks")]
struct Cli {
    /// JSON dataset to use instead of the built-in locations.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Places CSV to use instead of the built-in catalogue.
    #[arg(long, global = true)]
    places: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shortest route with distance, time, fuel budget, and weather.
    Route {
        /// Starting location name.
        #[arg(long = "from")]
        from: String,
        /// Destination location name.
        #[arg(long = "to")]
        to: String,
    },
    /// Distinct alternative routes, shortest first.
    Alternatives {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
        /// Largest number of routes to list.
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..))]
        max: u16,
    },
    /// Places near a location, best rated first.
    Nearby {
        #[arg(long)]
        location: String,
        /// Place category such as restaurant, cafe, or hotel.
        #[arg(long = "type")]
        category: Option<String>,
    },
    /// List every known location.
    Locations,
    /// Validate the dataset and report one-way connections.
    Check {
        /// Fail when any connection is declared in only one direction.
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let sources = DataSources {
        dataset: cli.dataset.as_deref(),
        places: cli.places.as_deref(),
    };

    match &cli.command {
        Command::Route { from, to } => handle_route_command(sources, cli.format, from, to).await,
        Command::Alternatives { from, to, max } => {
            handle_alternatives_command(sources, cli.format, from, to, usize::from(*max))
        }
        Command::Nearby { location, category } => {
            handle_nearby_command(sources, cli.format, location, category.as_deref())
        }
        Command::Locations => handle_locations_command(sources, cli.format),
        Command::Check { strict } => handle_check_command(sources, cli.format, *strict),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
