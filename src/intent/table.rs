//! Validated, time-ordered intent table

use super::types::{Intent, Timestamp};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Largest accepted price. Keeps a day's cash arithmetic far from the
/// `Decimal` range limit.
pub const MAX_PRICE: Decimal = dec!(1000000000000000);

/// Structural problems with an input table.
///
/// `row` is the 1-based data row, not counting a header line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A required column is absent
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    /// Column exists but has a type we cannot read
    #[error("Column {column} has unsupported type {found}")]
    UnsupportedColumnType { column: String, found: String },
    /// A required cell is empty
    #[error("Data row {row}: missing value in column {column}")]
    MissingValue { row: usize, column: String },
    /// Timestamp cell could not be parsed
    #[error("Data row {row}: unparseable timestamp {value:?}")]
    UnparseableTimestamp { row: usize, value: String },
    /// Timestamps must be non-decreasing
    #[error("Data row {row}: timestamp {timestamp} is earlier than the previous row")]
    NonMonotonicTimestamp { row: usize, timestamp: String },
    /// Local trading dates must be non-decreasing
    #[error("Data row {row}: local date {date} is earlier than the previous row's {previous}")]
    DateRegression {
        row: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },
    /// Cell could not be read as the column's type
    #[error("Data row {row}: invalid value {value:?} in column {column}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    /// Price is unparseable, not strictly positive or above `MAX_PRICE`
    #[error("Data row {row}: price {value:?} in column {column} is not a positive decimal within range")]
    InvalidPrice {
        row: usize,
        column: String,
        value: String,
    },
}

/// Ordered sequence of intents.
///
/// Construction is the only place input is validated; once an `IntentTable`
/// exists the engine can process it without failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentTable {
    intents: Vec<Intent>,
}

/// The intents of one calendar day, in table order
#[derive(Debug, Clone)]
pub struct DaySlice<'a> {
    pub date: NaiveDate,
    pub intents: Vec<&'a Intent>,
}

impl<'a> DaySlice<'a> {
    /// Timestamp of the last row of the day
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.intents.last().map(|i| i.timestamp)
    }

    /// Last observed price for a ticker within the day
    pub fn last_price(&self, ticker: &str) -> Option<Decimal> {
        self.intents
            .iter()
            .rev()
            .find(|i| i.ticker == ticker)
            .map(|i| i.price)
    }
}

impl IntentTable {
    /// Build a table from rows that are already in timestamp order
    pub fn new(intents: Vec<Intent>) -> Result<Self, TableError> {
        validate(&intents)?;
        Ok(Self { intents })
    }

    /// Build a table from rows in any order. Rows are stably sorted by
    /// timestamp, so equal timestamps keep their input order.
    pub fn from_unordered(mut intents: Vec<Intent>) -> Result<Self, TableError> {
        intents.sort_by_key(|i| i.timestamp);
        Self::new(intents)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter()
    }

    pub fn as_slice(&self) -> &[Intent] {
        &self.intents
    }

    /// Group rows by local calendar date. Dates never decrease within a
    /// table, so each day is one contiguous run of rows.
    pub fn days(&self) -> Vec<DaySlice<'_>> {
        let mut days: Vec<DaySlice<'_>> = Vec::new();
        for intent in &self.intents {
            let date = intent.timestamp.date_naive();
            match days.last_mut() {
                Some(day) if day.date == date => day.intents.push(intent),
                _ => days.push(DaySlice {
                    date,
                    intents: vec![intent],
                }),
            }
        }
        days
    }
}

fn validate(intents: &[Intent]) -> Result<(), TableError> {
    let mut previous: Option<Timestamp> = None;
    for (idx, intent) in intents.iter().enumerate() {
        let row = idx + 1;
        if intent.ticker.trim().is_empty() {
            return Err(TableError::MissingValue {
                row,
                column: "ticker".to_string(),
            });
        }
        if intent.price <= Decimal::ZERO || intent.price > MAX_PRICE {
            return Err(TableError::InvalidPrice {
                row,
                column: "price".to_string(),
                value: intent.price.to_string(),
            });
        }
        if let Some(prev) = previous {
            if intent.timestamp < prev {
                return Err(TableError::NonMonotonicTimestamp {
                    row,
                    timestamp: intent.timestamp.to_rfc3339(),
                });
            }
            // Mixed offsets can move a later instant onto an earlier local date
            if intent.timestamp.date_naive() < prev.date_naive() {
                return Err(TableError::DateRegression {
                    row,
                    date: intent.timestamp.date_naive(),
                    previous: prev.date_naive(),
                });
            }
        }
        previous = Some(intent.timestamp);
    }
    Ok(())
}
