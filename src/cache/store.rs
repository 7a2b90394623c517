//! SQLite flight store
//!
//! Provides a `FlightStore` that persists flights in a single `flights` table
//! keyed by flight number, with insert-or-replace writes and a "most recent N"
//! read ordered by departure time.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, Row};
use thiserror::Error;
use tracing::debug;

use crate::data::timestamp;
use crate::data::Flight;

/// Number of flights returned by a cache fallback
pub const TOP_FLIGHTS: usize = 3;

/// Format of the derived sort column
const SORT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS flights (
        flight_number     TEXT PRIMARY KEY NOT NULL,
        departure_airport TEXT NOT NULL,
        arrival_airport   TEXT NOT NULL,
        departure_time    TEXT NOT NULL,
        arrival_time      TEXT NOT NULL,
        delay_minutes     INTEGER NOT NULL DEFAULT 0,
        duration_minutes  INTEGER NOT NULL DEFAULT 0,
        departure_sort    TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_flights_departure_sort ON flights (departure_sort);
";

/// Errors that can occur when reading or writing the flight store
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite returned an error
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// The database directory could not be created
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another thread panicked while holding the connection
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

/// Persistent storage for recently fetched flights
pub trait FlightCache: Send + Sync {
    /// Inserts the flights, replacing any row with the same flight number
    fn upsert_all(&self, flights: &[Flight]) -> Result<(), StoreError>;

    /// Returns up to `limit` flights, most recent departure first
    fn top(&self, limit: usize) -> Result<Vec<Flight>, StoreError>;
}

impl<T: FlightCache + ?Sized> FlightCache for Arc<T> {
    fn upsert_all(&self, flights: &[Flight]) -> Result<(), StoreError> {
        (**self).upsert_all(flights)
    }

    fn top(&self, limit: usize) -> Result<Vec<Flight>, StoreError> {
        (**self).top(limit)
    }
}

/// SQLite-backed flight cache
///
/// The connection sits behind a mutex so that one store can be shared by
/// concurrent lookups; every operation holds the lock for its whole duration.
#[derive(Debug)]
pub struct FlightStore {
    conn: Mutex<Connection>,
}

impl FlightStore {
    /// Opens (or creates) the database at `path`, creating parent directories
    /// and the schema as needed
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened flight store");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Returns the three most recent flights
    pub fn top_three(&self) -> Result<Vec<Flight>, StoreError> {
        self.top(TOP_FLIGHTS)
    }
}

impl FlightCache for FlightStore {
    fn upsert_all(&self, flights: &[Flight]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO flights (
                    flight_number, departure_airport, arrival_airport,
                    departure_time, arrival_time, delay_minutes, duration_minutes,
                    departure_sort
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for flight in flights {
                // Local wall-clock time; flights from different UTC offsets may interleave
                let sort_key = timestamp::parse_display(&flight.departure_time)
                    .map(|dt| dt.format(SORT_FORMAT).to_string());
                stmt.execute(params![
                    flight.flight_number,
                    flight.departure_airport,
                    flight.arrival_airport,
                    flight.departure_time,
                    flight.arrival_time,
                    flight.delay_minutes,
                    flight.duration_minutes,
                    sort_key,
                ])?;
            }
        }
        tx.commit()?;

        debug!(count = flights.len(), "stored flights");
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<Flight>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT flight_number, departure_airport, arrival_airport,
                    departure_time, arrival_time, delay_minutes, duration_minutes
             FROM flights
             ORDER BY departure_sort IS NULL, departure_sort DESC, departure_time DESC
             LIMIT ?1",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

fn map_row(row: &Row) -> rusqlite::Result<Flight> {
    Ok(Flight {
        flight_number: row.get("flight_number")?,
        departure_airport: row.get("departure_airport")?,
        arrival_airport: row.get("arrival_airport")?,
        departure_time: row.get("departure_time")?,
        arrival_time: row.get("arrival_time")?,
        delay_minutes: row.get("delay_minutes")?,
        duration_minutes: row.get("duration_minutes")?,
    })
}
