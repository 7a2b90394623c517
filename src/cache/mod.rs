//! Cache module for storing recently fetched flights
//!
//! This module provides a SQLite-backed flight store keyed by flight number.
//! The lookup flow writes fresh results into it and reads the most recent
//! flights back whenever the remote API fails or has nothing usable, so the
//! user always sees the last known data.

mod store;

pub use store::{FlightCache, FlightStore, StoreError, TOP_FLIGHTS};
