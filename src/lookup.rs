//! Flight lookup with cache fallback
//!
//! `FlightLookup` asks the remote source for flights between two airports,
//! keeps the first three usable records, stores them, and returns them. When
//! the remote call fails or yields nothing usable, the three most recent
//! cached flights are returned instead. A lookup never fails; the returned
//! [`FlightOrigin`] says where the flights came from and why.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cache::{FlightCache, TOP_FLIGHTS};
use crate::data::timestamp::{duration_minutes, format_display};
use crate::data::{Flight, FlightData, FlightQuery, FlightSource};

/// Number of records requested from the server per lookup
pub const DEFAULT_REQUEST_LIMIT: u32 = 10;

/// Where the flights of a lookup came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightOrigin {
    /// Fresh results from the remote source
    Remote,
    /// The remote source returned no records; cached flights are shown
    CachedNoResults,
    /// Every remote record lacked required data; cached flights are shown
    CachedNoUsableRecords,
    /// The remote call failed; cached flights are shown
    CachedAfterFailure { reason: String },
}

impl FlightOrigin {
    /// Whether the flights were read from the local cache
    pub fn is_cached(&self) -> bool {
        !matches!(self, FlightOrigin::Remote)
    }
}

/// Result of a single lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOutcome {
    /// At most three flights
    pub flights: Vec<Flight>,
    /// Where the flights came from
    pub origin: FlightOrigin,
    /// Set when a newer lookup was started before this one finished
    pub superseded: bool,
}

/// A required field that a remote record did not provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Orchestrates the remote flight source and the local flight cache
pub struct FlightLookup<S, C> {
    source: S,
    cache: C,
    request_limit: u32,
    generation: AtomicU64,
}

impl<S: FlightSource, C: FlightCache> FlightLookup<S, C> {
    /// Creates a lookup flow over the given source and cache
    pub fn new(source: S, cache: C) -> Self {
        Self {
            source,
            cache,
            request_limit: DEFAULT_REQUEST_LIMIT,
            generation: AtomicU64::new(0),
        }
    }

    /// Overrides the number of records requested from the server
    pub fn with_request_limit(mut self, limit: u32) -> Self {
        self.request_limit = limit;
        self
    }

    /// Returns the underlying flight cache
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Looks up flights from `departure` to `arrival`
    ///
    /// # Arguments
    /// * `departure` - Departure airport IATA code
    /// * `arrival` - Arrival airport IATA code
    ///
    /// # Behavior
    /// - Fetches up to `request_limit` records from the remote source
    /// - Maps records to flights, dropping those missing required data
    /// - Stores and returns the first three flights
    /// - Falls back to the three most recent cached flights when the fetch
    ///   fails, returns no records, or no record is usable
    pub async fn lookup(&self, departure: &str, arrival: &str) -> LookupOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = FlightQuery {
            limit: self.request_limit,
            departure: Some(departure.trim().to_uppercase()),
            arrival: Some(arrival.trim().to_uppercase()),
        };
        info!(departure = ?query.departure, arrival = ?query.arrival, "looking up flights");

        let (flights, origin) = self.resolve(&query).await;

        LookupOutcome {
            flights,
            origin,
            superseded: self.generation.load(Ordering::SeqCst) != ticket,
        }
    }

    async fn resolve(&self, query: &FlightQuery) -> (Vec<Flight>, FlightOrigin) {
        let response = match self.source.fetch_flights(query).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "flight API call failed, returning cached flights");
                let origin = FlightOrigin::CachedAfterFailure {
                    reason: e.to_string(),
                };
                return (self.cached_top_three(), origin);
            }
        };

        let records = response.data.unwrap_or_default();
        debug!(count = records.len(), "flight API returned records");
        if records.is_empty() {
            warn!("no matching flights found, returning cached flights");
            return (self.cached_top_three(), FlightOrigin::CachedNoResults);
        }

        let flights: Vec<Flight> = records
            .iter()
            .filter_map(|record| match map_record(record) {
                Ok(flight) => Some(flight),
                Err(e) => {
                    warn!(error = %e, "skipping flight record");
                    None
                }
            })
            .take(TOP_FLIGHTS)
            .collect();
        debug!(count = flights.len(), "mapped valid flights");

        if flights.is_empty() {
            warn!("no usable flight records, returning cached flights");
            return (self.cached_top_three(), FlightOrigin::CachedNoUsableRecords);
        }

        match self.cache.upsert_all(&flights) {
            Ok(()) => debug!(count = flights.len(), "stored flights in cache"),
            Err(e) => error!(error = %e, "failed to store flights in cache"),
        }
        (flights, FlightOrigin::Remote)
    }

    /// Returns the three most recent cached flights
    ///
    /// A cache read failure is logged and yields an empty list.
    pub fn cached_top_three(&self) -> Vec<Flight> {
        self.cache.top(TOP_FLIGHTS).unwrap_or_else(|e| {
            error!(error = %e, "failed to read cached flights");
            Vec::new()
        })
    }
}

/// Maps a remote record to a flight
///
/// The flight number prefers the IATA code, then the ICAO code, then the
/// numeric designator. Times prefer the scheduled value over the estimated
/// one. The delay prefers the arrival delay over the departure delay.
pub fn map_record(record: &FlightData) -> Result<Flight, MappingError> {
    let info = record.flight.as_ref();
    let departure = record.departure.as_ref();
    let arrival = record.arrival.as_ref();

    let flight_number = info
        .and_then(|f| f.iata.clone().or_else(|| f.icao.clone()).or_else(|| f.number.clone()))
        .ok_or(MappingError::MissingField("flight number"))?;
    let departure_airport = departure
        .and_then(|d| d.iata.clone())
        .ok_or(MappingError::MissingField("departure airport"))?;
    let arrival_airport = arrival
        .and_then(|a| a.iata.clone())
        .ok_or(MappingError::MissingField("arrival airport"))?;
    let departure_time = departure
        .and_then(|d| d.scheduled.as_deref().or(d.estimated.as_deref()))
        .ok_or(MappingError::MissingField("departure time"))?;
    let arrival_time = arrival
        .and_then(|a| a.scheduled.as_deref().or(a.estimated.as_deref()))
        .ok_or(MappingError::MissingField("arrival time"))?;

    let delay = arrival
        .and_then(|a| a.delay)
        .or_else(|| departure.and_then(|d| d.delay))
        .unwrap_or(0);

    Ok(Flight {
        flight_number,
        departure_airport,
        arrival_airport,
        departure_time: format_display(departure_time),
        arrival_time: format_display(arrival_time),
        delay_minutes: u32::try_from(delay.max(0)).unwrap_or(u32::MAX),
        duration_minutes: duration_minutes(departure_time, arrival_time),
    })
}
