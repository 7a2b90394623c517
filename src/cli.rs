//! Command-line interface parsing and output for the flight tracker
//!
//! This module handles parsing of CLI arguments using clap, validation of
//! airport and flight codes, and rendering of flight lists for the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::{AirportCode, Flight};
use crate::lookup::{FlightOrigin, LookupOutcome};

/// Base URL for live flight tracking pages
const FLIGHT_TRACKING_BASE_URL: &str = "https://www.flightaware.com/live/flight";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// One of the airport codes is not a three-letter IATA code
    #[error("Enter valid 3-letter IATA codes (got '{departure}' and '{arrival}')")]
    InvalidAirportCodes { departure: String, arrival: String },

    /// No flight code was given
    #[error("Please enter a flight code")]
    EmptyFlightCode,
}

/// Flight Tracker - Look up flights between airports
#[derive(Parser, Debug)]
#[command(name = "flighttracker")]
#[command(about = "Look up flights between two airports and keep the latest results offline")]
#[command(version)]
pub struct Cli {
    /// Path of the flight cache database (overrides config and FLIGHTTRACKER_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Look up flights between two airports
    ///
    /// Examples:
    ///   flighttracker lookup JFK LHR
    ///   flighttracker lookup jfk lhr --swap   # Looks up LHR -> JFK
    Lookup {
        /// Departure airport IATA code
        departure: String,
        /// Arrival airport IATA code
        arrival: String,
        /// Swap departure and arrival before searching
        #[arg(long)]
        swap: bool,
    },

    /// Show the three most recent cached flights
    Cached,

    /// Print the live tracking page URL for a flight
    Track {
        /// Flight code, e.g. BA117
        flight_code: String,
    },
}

/// Validates and normalizes a departure/arrival pair
///
/// # Arguments
/// * `departure` - The departure code from the CLI
/// * `arrival` - The arrival code from the CLI
/// * `swap` - Whether to exchange the two before validating
///
/// # Returns
/// * `Ok((AirportCode, AirportCode))` in search order
/// * `Err(CliError::InvalidAirportCodes)` if either code is not three letters
pub fn parse_route_args(
    departure: &str,
    arrival: &str,
    swap: bool,
) -> Result<(AirportCode, AirportCode), CliError> {
    let (departure, arrival) = if swap {
        (arrival, departure)
    } else {
        (departure, arrival)
    };

    match (AirportCode::parse(departure), AirportCode::parse(arrival)) {
        (Ok(dep), Ok(arr)) => Ok((dep, arr)),
        _ => Err(CliError::InvalidAirportCodes {
            departure: departure.to_string(),
            arrival: arrival.to_string(),
        }),
    }
}

/// Builds the live tracking URL for a flight code
pub fn flight_tracking_url(flight_code: &str) -> Result<String, CliError> {
    let code = flight_code.trim();
    if code.is_empty() {
        return Err(CliError::EmptyFlightCode);
    }
    Ok(format!("{}/{}", FLIGHT_TRACKING_BASE_URL, code))
}

/// Formats the average flight duration line
///
/// Shows `N/A` for an empty list or when no duration is known.
pub fn average_duration_line(flights: &[Flight]) -> String {
    if flights.is_empty() {
        return "Average flight time: N/A".to_string();
    }

    let total: u64 = flights.iter().map(|f| u64::from(f.duration_minutes)).sum();
    let avg = total as f64 / flights.len() as f64;
    if avg > 0.0 {
        format!("Average flight time: {:.1} minutes", avg)
    } else {
        "Average flight time: N/A".to_string()
    }
}

/// Formats a single flight for display
pub fn format_flight(flight: &Flight) -> String {
    let mut line = format!(
        "{:<8} {} -> {}  {} - {}  {} min",
        flight.flight_number,
        flight.departure_airport,
        flight.arrival_airport,
        flight.departure_time,
        flight.arrival_time,
        flight.duration_minutes,
    );
    if flight.delay_minutes > 0 {
        line.push_str(&format!("  (delayed {} min)", flight.delay_minutes));
    }
    line
}

/// Status message for a lookup outcome
pub fn status_line(outcome: &LookupOutcome) -> String {
    match outcome.origin {
        FlightOrigin::Remote => format!("Found {} flights", outcome.flights.len()),
        FlightOrigin::CachedNoResults | FlightOrigin::CachedNoUsableRecords => {
            "No flights found. Showing cached data.".to_string()
        }
        FlightOrigin::CachedAfterFailure { .. } => {
            "Error occurred. Showing cached data.".to_string()
        }
    }
}

/// Renders a flight list followed by the average duration
pub fn render_flights(flights: &[Flight]) -> String {
    let mut out = String::new();
    if flights.is_empty() {
        out.push_str("No cached flights\n");
    }
    for flight in flights {
        out.push_str(&format_flight(flight));
        out.push('\n');
    }
    out.push_str(&average_duration_line(flights));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(number: &str, duration: u32, delay: u32) -> Flight {
        Flight {
            flight_number: number.to_string(),
            departure_airport: "JFK".to_string(),
            arrival_airport: "LHR".to_string(),
            departure_time: "01 Jan 2024 10:00".to_string(),
            arrival_time: "01 Jan 2024 17:00".to_string(),
            delay_minutes: delay,
            duration_minutes: duration,
        }
    }

    fn outcome(origin: FlightOrigin, flights: Vec<Flight>) -> LookupOutcome {
        LookupOutcome {
            flights,
            origin,
            superseded: false,
        }
    }

    #[test]
    fn test_parse_route_args_normalizes() {
        let (dep, arr) = parse_route_args(" jfk", "lhr ", false).unwrap();
        assert_eq!(dep.as_str(), "JFK");
        assert_eq!(arr.as_str(), "LHR");
    }

    #[test]
    fn test_parse_route_args_swap() {
        let (dep, arr) = parse_route_args("JFK", "LHR", true).unwrap();
        assert_eq!(dep.as_str(), "LHR");
        assert_eq!(arr.as_str(), "JFK");
    }

    #[test]
    fn test_parse_route_args_invalid() {
        let result = parse_route_args("JF", "LHR", false);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Enter valid 3-letter IATA codes"));
        assert!(err.to_string().contains("JF"));

        assert!(parse_route_args("JFK", "L1R", false).is_err());
    }

    #[test]
    fn test_flight_tracking_url() {
        assert_eq!(
            flight_tracking_url(" BA117 ").unwrap(),
            "https://www.flightaware.com/live/flight/BA117"
        );
    }

    #[test]
    fn test_flight_tracking_url_empty() {
        let err = flight_tracking_url("   ").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a flight code");
    }

    #[test]
    fn test_average_duration_line() {
        let flights = vec![flight("A", 100, 0), flight("B", 201, 0)];
        assert_eq!(
            average_duration_line(&flights),
            "Average flight time: 150.5 minutes"
        );
    }

    #[test]
    fn test_average_duration_line_not_available() {
        assert_eq!(average_duration_line(&[]), "Average flight time: N/A");
        assert_eq!(
            average_duration_line(&[flight("A", 0, 0)]),
            "Average flight time: N/A"
        );
    }

    #[test]
    fn test_format_flight_shows_delay_only_when_positive() {
        let on_time = format_flight(&flight("BA117", 420, 0));
        assert!(on_time.contains("BA117"));
        assert!(on_time.contains("JFK -> LHR"));
        assert!(on_time.contains("420 min"));
        assert!(!on_time.contains("delayed"));

        let delayed = format_flight(&flight("BA117", 420, 35));
        assert!(delayed.contains("(delayed 35 min)"));
    }

    #[test]
    fn test_status_line_variants() {
        let flights = vec![flight("A", 60, 0), flight("B", 60, 0)];
        assert_eq!(
            status_line(&outcome(FlightOrigin::Remote, flights.clone())),
            "Found 2 flights"
        );
        assert_eq!(
            status_line(&outcome(FlightOrigin::CachedNoResults, flights.clone())),
            "No flights found. Showing cached data."
        );
        assert_eq!(
            status_line(&outcome(FlightOrigin::CachedNoUsableRecords, Vec::new())),
            "No flights found. Showing cached data."
        );
        assert_eq!(
            status_line(&outcome(
                FlightOrigin::CachedAfterFailure {
                    reason: "timeout".to_string()
                },
                flights
            )),
            "Error occurred. Showing cached data."
        );
    }

    #[test]
    fn test_render_flights_empty() {
        let rendered = render_flights(&[]);
        assert!(rendered.starts_with("No cached flights"));
        assert!(rendered.ends_with("Average flight time: N/A"));
    }

    #[test]
    fn test_cli_parse_lookup() {
        let cli = Cli::parse_from(["flighttracker", "lookup", "jfk", "lhr"]);
        assert_eq!(
            cli.command,
            Command::Lookup {
                departure: "jfk".to_string(),
                arrival: "lhr".to_string(),
                swap: false,
            }
        );
        assert!(!cli.verbose);
        assert!(cli.db.is_none());
    }

    #[test]
    fn test_cli_parse_lookup_with_swap_and_globals() {
        let cli = Cli::parse_from([
            "flighttracker",
            "lookup",
            "JFK",
            "LHR",
            "--swap",
            "--db",
            "/tmp/f.db",
            "-v",
        ]);
        assert!(matches!(cli.command, Command::Lookup { swap: true, .. }));
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/f.db")));
    }

    #[test]
    fn test_cli_parse_cached_and_track() {
        let cli = Cli::parse_from(["flighttracker", "cached"]);
        assert_eq!(cli.command, Command::Cached);

        let cli = Cli::parse_from(["flighttracker", "track", "BA117"]);
        assert_eq!(
            cli.command,
            Command::Track {
                flight_code: "BA117".to_string()
            }
        );
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["flighttracker"]).is_err());
    }
}
