//! Flight Tracker - Look up flights between airports from the terminal
//!
//! Searches the aviationstack API for flights between two IATA airport codes,
//! shows up to three results, and falls back to the last cached results when
//! the API is unavailable.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use flighttracker::cli::{
    flight_tracking_url, parse_route_args, render_flights, status_line, Cli, Command,
};
use flighttracker::{AviationstackClient, Config, FlightLookup, FlightStore};

/// Sets up logging on stderr, keeping stdout for results
///
/// `RUST_LOG` takes precedence over the `--verbose` flag.
fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "warn,flighttracker=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads configuration, applying the `--db` flag last
fn load_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Some(ref db) = cli.db {
        config.database_path = Some(db.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Track { ref flight_code } => {
            println!("{}", flight_tracking_url(flight_code)?);
        }
        Command::Cached => {
            let config = load_config(&cli)?;
            let store = FlightStore::open(&config.database_path()?)?;
            println!("{}", render_flights(&store.top_three()?));
        }
        Command::Lookup {
            ref departure,
            ref arrival,
            swap,
        } => {
            let (departure, arrival) = parse_route_args(departure, arrival, swap)?;
            let config = load_config(&cli)?;
            let api_key = config.require_api_key()?;

            let store = FlightStore::open(&config.database_path()?)?;
            let client = AviationstackClient::from_config(&config, api_key)?;
            let lookup = FlightLookup::new(client, store).with_request_limit(config.request_limit);

            let outcome = lookup.lookup(departure.as_str(), arrival.as_str()).await;
            debug!(origin = ?outcome.origin, count = outcome.flights.len(), "lookup finished");

            println!("{}", status_line(&outcome));
            println!("{}", render_flights(&outcome.flights));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
