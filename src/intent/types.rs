//! Intent record types

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instant carried by input rows. The offset is kept so the trading day is the
/// exchange-local calendar date.
pub type Timestamp = DateTime<FixedOffset>;

/// Proposed action for a ticker at a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Open a position
    Buy,
    /// Close an open position
    Sell,
    /// Price observation only
    #[default]
    None,
}

impl Action {
    /// Parse a raw action cell. Anything other than `buy`/`sell` is treated as no action.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("buy") => Action::Buy,
            Some("sell") => Action::Sell,
            _ => Action::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::None => "",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped trade intent produced by a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Bar timestamp
    pub timestamp: Timestamp,
    /// Ticker symbol
    pub ticker: String,
    /// Execution price for this bar
    pub price: Decimal,
    /// Requested action
    pub action: Action,
}

impl Intent {
    /// Create a new intent
    pub fn new(
        timestamp: Timestamp,
        ticker: impl Into<String>,
        price: Decimal,
        action: Action,
    ) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            price,
            action,
        }
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a timestamp cell.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS±HH:MM`, and naive date-times which are
/// taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Convert a UTC instant into the crate's timestamp type
pub fn from_utc(ts: DateTime<Utc>) -> Timestamp {
    ts.fixed_offset()
}
