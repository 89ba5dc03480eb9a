//! CSV table reading and ledger writing

use super::cells::{self, RawRow};
use super::{DataError, TableColumns};
use crate::backtest::Ledger;
use crate::intent::{Action, TableError};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Header of written ledgers
pub const LEDGER_HEADER: [&str; 7] = [
    "timestamp",
    "action",
    "ticker",
    "price",
    "budget",
    "daily_pnl",
    "fund_value",
];

pub(super) fn read_rows(path: &Path, columns: &TableColumns) -> Result<Vec<RawRow>, DataError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    };
    let ts_idx = find(&columns.timestamp)?;
    let price_idx = find(&columns.price)?;
    let ticker_idx = columns.ticker.as_deref().map(find).transpose()?;
    let action_idx = columns.action.as_deref().map(find).transpose()?;
    let score_idx = columns.score.as_deref().map(find).transpose()?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let row = idx + 1;
        let record = record?;
        let cell = |idx: usize| record.get(idx).filter(|s| !s.is_empty());

        let timestamp = cells::timestamp_from_str(
            cells::require(cell(ts_idx), row, &columns.timestamp)?,
            row,
        )?;
        let price = cells::price_from_str(
            cells::require(cell(price_idx), row, &columns.price)?,
            row,
            &columns.price,
        )?;
        let ticker = match (ticker_idx, columns.ticker.as_deref()) {
            (Some(idx), Some(name)) => Some(cells::require(cell(idx), row, name)?.to_string()),
            _ => None,
        };
        let action = action_idx.map_or(Action::None, |idx| Action::parse(cell(idx)));
        let score = match (score_idx, columns.score.as_deref()) {
            (Some(idx), Some(name)) => cells::score_from_str(cell(idx), row, name)?,
            _ => None,
        };

        rows.push(RawRow {
            timestamp,
            ticker,
            price,
            action,
            score,
        });
    }

    Ok(rows)
}

/// Write ledger rows as CSV. Summary rows leave ticker, price and budget empty.
pub fn write_ledger<W: Write>(writer: W, ledger: &Ledger) -> Result<(), DataError> {
    let mut writer = ::csv::Writer::from_writer(writer);
    writer.write_record(LEDGER_HEADER)?;

    for entry in ledger.iter() {
        let price = entry.price.map(|p| p.to_string()).unwrap_or_default();
        let budget = entry
            .running_budget
            .map(|b| b.to_string())
            .unwrap_or_default();
        writer.write_record([
            entry.timestamp.to_rfc3339().as_str(),
            entry.action.as_str(),
            entry.ticker.as_deref().unwrap_or(""),
            price.as_str(),
            budget.as_str(),
            entry.daily_pnl.to_string().as_str(),
            entry.fund_value.to_string().as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the ledger to a CSV file, creating parent directories
pub fn write_ledger_csv(path: &Path, ledger: &Ledger) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_ledger(File::create(path)?, ledger)?;
    tracing::debug!(path = ?path, rows = ledger.len(), "Wrote ledger to CSV");
    Ok(())
}
