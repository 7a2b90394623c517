//! Lenient timestamp handling for upstream flight data
//!
//! The flight API is not consistent about how it writes timestamps, so values
//! are matched against a fixed, ordered list of input patterns and the first
//! pattern that parses wins. Nothing in here fails: an unparsable value gives
//! a zero duration and is displayed as-is.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tracing::{debug, warn};

/// Output format for display strings (e.g., "01 Jan 2024 10:00")
pub const DISPLAY_FORMAT: &str = "%d %b %Y %H:%M";

/// A single accepted input pattern
#[derive(Debug, Clone, Copy)]
enum InputPattern {
    /// Date-time without offset, e.g. "2024-01-01T10:00:00"
    Naive(&'static str),
    /// Date-time with offset, e.g. "2024-01-01T10:00:00+00:00"
    WithOffset(&'static str),
}

/// Accepted input patterns, tried in order
const INPUT_PATTERNS: [InputPattern; 3] = [
    InputPattern::Naive("%Y-%m-%dT%H:%M:%S"),
    InputPattern::WithOffset("%Y-%m-%dT%H:%M:%S%z"),
    InputPattern::Naive("%Y-%m-%d %H:%M"),
];

impl InputPattern {
    fn parse(self, value: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            InputPattern::Naive(fmt) => NaiveDateTime::parse_from_str(value, fmt)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset()),
            InputPattern::WithOffset(fmt) => DateTime::parse_from_str(value, fmt).ok(),
        }
    }
}

/// Parses a timestamp using the first input pattern that matches
///
/// Values without an offset are treated as UTC so that they can be compared
/// with offset-aware ones.
///
/// # Returns
/// * `Some(DateTime<FixedOffset>)` for the first matching pattern
/// * `None` if no pattern matches
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    INPUT_PATTERNS.iter().find_map(|pattern| pattern.parse(value))
}

/// Calculates the flight duration in whole minutes between two timestamps
///
/// Returns 0 when either value cannot be parsed or when the arrival is
/// earlier than the departure.
pub fn duration_minutes(departure: &str, arrival: &str) -> u32 {
    let (Some(start), Some(end)) = (parse_timestamp(departure), parse_timestamp(arrival)) else {
        warn!(departure, arrival, "could not parse flight timestamps");
        return 0;
    };

    let minutes = end
        .with_timezone(&Utc)
        .signed_duration_since(start.with_timezone(&Utc))
        .num_minutes()
        .clamp(0, i64::from(u32::MAX));

    debug!(departure, arrival, minutes, "calculated flight duration");
    minutes as u32
}

/// Formats a timestamp for display, keeping its local wall-clock time
///
/// Falls back to the raw input when no pattern matches.
pub fn format_display(value: &str) -> String {
    match parse_timestamp(value) {
        Some(parsed) => parsed.naive_local().format(DISPLAY_FORMAT).to_string(),
        None => {
            warn!(value, "could not format timestamp");
            value.to_string()
        }
    }
}

/// Parses a display string produced by [`format_display`] back into a
/// date-time, used to order cached flights chronologically
pub fn parse_display(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DISPLAY_FORMAT).ok()
}
