//! Core data models for the flight tracker
//!
//! This module contains the flight entity shown to the user and persisted in
//! the local cache, the airport code type, and the remote API client.

pub mod aviationstack;
pub mod timestamp;

pub use aviationstack::{
    AirlineInfo, AirportInfo, ApiError, ApiResponse, AviationstackClient, FlightData, FlightInfo,
    FlightQuery, FlightSource, SourceError,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A flight as displayed to the user and stored in the local cache
///
/// The flight number uniquely identifies a cached row; storing a flight with
/// an existing number replaces the previous row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Flight number (IATA, ICAO, or numeric designator)
    pub flight_number: String,
    /// Departure airport IATA code
    pub departure_airport: String,
    /// Arrival airport IATA code
    pub arrival_airport: String,
    /// Departure time, formatted for display
    pub departure_time: String,
    /// Arrival time, formatted for display
    pub arrival_time: String,
    /// Delay in minutes
    pub delay_minutes: u32,
    /// Scheduled flight duration in minutes
    pub duration_minutes: u32,
}

/// Error returned when a string is not a valid IATA airport code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid IATA airport code: '{0}'")]
pub struct InvalidAirportCode(pub String);

/// A three-letter IATA airport code, always uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AirportCode(String);

impl AirportCode {
    /// Parses an airport code, trimming whitespace and uppercasing it
    ///
    /// # Returns
    /// * `Ok(AirportCode)` if the input is exactly three ASCII letters
    /// * `Err(InvalidAirportCode)` otherwise
    pub fn parse(input: &str) -> Result<Self, InvalidAirportCode> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code))
        } else {
            Err(InvalidAirportCode(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AirportCode {
    type Err = InvalidAirportCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AirportCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_code_uppercases_and_trims() {
        let code = AirportCode::parse(" jfk ").expect("should parse");
        assert_eq!(code.as_str(), "JFK");
        assert_eq!(code.to_string(), "JFK");
    }

    #[test]
    fn test_airport_code_rejects_wrong_length() {
        assert!(AirportCode::parse("JF").is_err());
        assert!(AirportCode::parse("JFKX").is_err());
        assert!(AirportCode::parse("").is_err());
    }

    #[test]
    fn test_airport_code_rejects_non_letters() {
        assert!(AirportCode::parse("J1K").is_err());
        assert!(AirportCode::parse("J K").is_err());
        // Multi-byte letters are not IATA codes
        assert!(AirportCode::parse("ÅLS").is_err());
    }

    #[test]
    fn test_airport_code_error_message() {
        let err = AirportCode::parse("xx").unwrap_err();
        assert!(err.to_string().contains("'xx'"));
    }

    #[test]
    fn test_airport_code_from_str() {
        let code: AirportCode = "lhr".parse().expect("should parse");
        assert_eq!(code.as_ref(), "LHR");
    }

    #[test]
    fn test_flight_serialization_roundtrip() {
        let flight = Flight {
            flight_number: "BA117".to_string(),
            departure_airport: "LHR".to_string(),
            arrival_airport: "JFK".to_string(),
            departure_time: "01 Jan 2024 10:00".to_string(),
            arrival_time: "01 Jan 2024 18:00".to_string(),
            delay_minutes: 15,
            duration_minutes: 480,
        };

        let json = serde_json::to_string(&flight).expect("Failed to serialize Flight");
        let deserialized: Flight =
            serde_json::from_str(&json).expect("Failed to deserialize Flight");

        assert_eq!(deserialized, flight);
    }
}
