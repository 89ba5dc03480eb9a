//! Cell-level conversions shared by the CSV and Parquet readers

use crate::intent::{parse_timestamp, Action, TableError, Timestamp, MAX_PRICE};
use rust_decimal::Decimal;
use std::str::FromStr;

/// One input row after type conversion
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RawRow {
    pub timestamp: Timestamp,
    pub ticker: Option<String>,
    pub price: Decimal,
    pub action: Action,
    pub score: Option<f64>,
}

pub(super) fn require<T>(value: Option<T>, row: usize, column: &str) -> Result<T, TableError> {
    value.ok_or_else(|| TableError::MissingValue {
        row,
        column: column.to_string(),
    })
}

pub(super) fn timestamp_from_str(raw: &str, row: usize) -> Result<Timestamp, TableError> {
    parse_timestamp(raw).ok_or_else(|| TableError::UnparseableTimestamp {
        row,
        value: raw.to_string(),
    })
}

/// Parse a decimal price written as text, e.g. `101.25` or `1.0125e2`
pub(super) fn price_from_str(raw: &str, row: usize, column: &str) -> Result<Decimal, TableError> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| invalid_price(raw, row, column))
        .and_then(|price| positive(price, row, column))
}

pub(super) fn price_from_f64(raw: f64, row: usize, column: &str) -> Result<Decimal, TableError> {
    Decimal::try_from(raw)
        .map_err(|_| invalid_price(&raw.to_string(), row, column))
        .and_then(|price| positive(price, row, column))
}

pub(super) fn positive(price: Decimal, row: usize, column: &str) -> Result<Decimal, TableError> {
    if price > Decimal::ZERO && price <= MAX_PRICE {
        Ok(price)
    } else {
        Err(invalid_price(&price.to_string(), row, column))
    }
}

fn invalid_price(raw: &str, row: usize, column: &str) -> TableError {
    TableError::InvalidPrice {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    }
}

/// Empty cells are a missing score; anything else must parse as a float
pub(super) fn score_from_str(
    raw: Option<&str>,
    row: usize,
    column: &str,
) -> Result<Option<f64>, TableError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    f64::from_str(raw)
        .map(Some)
        .map_err(|_| TableError::InvalidValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}
