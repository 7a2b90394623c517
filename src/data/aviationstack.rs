//! aviationstack flights API client
//!
//! This module provides functionality to fetch real-time flight records from
//! the aviationstack REST API. Every field of the response is optional; the
//! lookup flow decides which records are usable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Base URL for the aviationstack API
pub const AVIATIONSTACK_BASE_URL: &str = "https://api.aviationstack.com/v1";

/// Errors that can occur when fetching flight data
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The API answered with an error object
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    /// The request URL could not be built
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Top-level response envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    /// Flight records, absent when the request failed
    #[serde(default)]
    pub data: Option<Vec<FlightData>>,
    /// Error object, set when the request failed
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Error object returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single flight record from the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightData {
    #[serde(default)]
    pub flight: Option<FlightInfo>,
    #[serde(default)]
    pub departure: Option<AirportInfo>,
    #[serde(default)]
    pub arrival: Option<AirportInfo>,
    #[serde(default)]
    pub airline: Option<AirlineInfo>,
    /// Flight status as sent by aviationstack (e.g. "scheduled", "landed")
    #[serde(default)]
    pub flight_status: Option<String>,
    /// Flight status under its short key
    #[serde(default)]
    pub status: Option<String>,
}

impl FlightData {
    /// Returns the flight status, preferring `flight_status` over `status`
    pub fn current_status(&self) -> Option<&str> {
        self.flight_status.as_deref().or(self.status.as_deref())
    }
}

/// Flight identifiers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightInfo {
    /// Numeric designator, sent as either a string or a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub number: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
}

/// Departure or arrival airport details
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirportInfo {
    #[serde(default)]
    pub airport: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub gate: Option<String>,
    #[serde(default)]
    pub scheduled: Option<String>,
    #[serde(default)]
    pub estimated: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    /// Delay in minutes
    #[serde(default)]
    pub delay: Option<i64>,
}

/// Airline details
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirlineInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
}

/// Reads an optional value that may be a JSON string or a JSON number
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

/// Parameters for a flights request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    /// Maximum number of records the server should return
    pub limit: u32,
    /// Departure airport IATA code
    pub departure: Option<String>,
    /// Arrival airport IATA code
    pub arrival: Option<String>,
}

/// A source of remote flight records
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Fetches flight records matching the query
    async fn fetch_flights(&self, query: &FlightQuery) -> Result<ApiResponse, SourceError>;
}

/// Client for fetching flights from the aviationstack API
#[derive(Debug, Clone)]
pub struct AviationstackClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AviationstackClient {
    /// Creates a new client with the given API key and default timeouts
    pub fn new(api_key: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .read_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, api_key))
    }

    /// Creates a new client from the application configuration
    ///
    /// # Arguments
    /// * `config` - Supplies base URL and transport timeouts
    /// * `api_key` - The aviationstack access key
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .build()?;
        Ok(Self::with_client(client, api_key).with_base_url(config.base_url.clone()))
    }

    /// Creates a new client with a custom HTTP client
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: AVIATIONSTACK_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the flights endpoint URL for a query
    fn flights_url(&self, query: &FlightQuery) -> Result<Url, SourceError> {
        let endpoint = format!("{}/flights", self.base_url.trim_end_matches('/'));

        let mut params = vec![
            ("access_key", self.api_key.clone()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(ref dep) = query.departure {
            params.push(("dep_iata", dep.clone()));
        }
        if let Some(ref arr) = query.arrival {
            params.push(("arr_iata", arr.clone()));
        }

        Url::parse_with_params(&endpoint, &params).map_err(|e| SourceError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl FlightSource for AviationstackClient {
    async fn fetch_flights(&self, query: &FlightQuery) -> Result<ApiResponse, SourceError> {
        let url = self.flights_url(query)?;
        debug!(
            departure = ?query.departure,
            arrival = ?query.arrival,
            limit = query.limit,
            api_key = %mask_key(&self.api_key),
            "requesting flights"
        );

        let response = self.client.get(url).send().await?;
        let text = response.text().await?;
        parse_response(&text)
    }
}

/// Parses a response body, turning an API error object into an error
pub fn parse_response(body: &str) -> Result<ApiResponse, SourceError> {
    let response: ApiResponse = serde_json::from_str(body)?;

    if let Some(ref error) = response.error {
        return Err(SourceError::Api {
            code: error.code.clone().unwrap_or_else(|| "unknown".to_string()),
            message: error.message.clone().unwrap_or_default(),
        });
    }

    debug!(
        count = response.data.as_ref().map_or(0, Vec::len),
        "flights response received"
    );
    Ok(response)
}

/// Shortens an API key for logging (first and last five characters)
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}...{}", head, tail)
}
