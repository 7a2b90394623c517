//! Flight Tracker Library
//!
//! Looks up flights between two airports through the aviationstack API and
//! keeps the most recent results in a local SQLite cache, which is served
//! whenever the API fails or has nothing usable.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod lookup;

pub use cache::{FlightCache, FlightStore, StoreError};
pub use config::{Config, ConfigError};
pub use data::{AirportCode, AviationstackClient, Flight, FlightSource, SourceError};
pub use lookup::{FlightLookup, FlightOrigin, LookupOutcome};
