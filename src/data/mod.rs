//! Data module
//!
//! Reads intent tables and scored bars from CSV or Parquet, and persists
//! ledgers and summaries

mod cells;
mod csv;
mod loader;
mod parquet;

pub use self::csv::{write_ledger, write_ledger_csv};
pub use self::loader::{
    load_scored_bars, read_tickers, LoadOutcome, LoadReport, SkipReason, TimeWindow,
};
pub use self::parquet::{ledger_schema, write_ledger_parquet};

use crate::backtest::{BacktestSummary, Ledger};
use crate::intent::{Intent, IntentTable, TableError};
use crate::strategy::ScoredBar;
use cells::RawRow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing tabular data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed table: {0}")]
    Table(#[from] TableError),
    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// On-disk table format
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(TableFormat::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Ok(TableFormat::Parquet),
            _ => Err(DataError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

/// Column names to read from an input table.
///
/// `None` means the column is not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumns {
    pub timestamp: String,
    pub ticker: Option<String>,
    pub price: String,
    pub action: Option<String>,
    pub score: Option<String>,
}

impl TableColumns {
    /// Columns of an intent table
    pub fn intents(price_col: &str) -> Self {
        Self {
            timestamp: "timestamp".to_string(),
            ticker: Some("ticker".to_string()),
            price: price_col.to_string(),
            action: Some("action".to_string()),
            score: None,
        }
    }

    /// Columns of a per-ticker scored bar file
    pub fn scored_bars(timestamp_col: &str, price_col: &str, score_col: &str) -> Self {
        Self {
            timestamp: timestamp_col.to_string(),
            ticker: None,
            price: price_col.to_string(),
            action: None,
            score: Some(score_col.to_string()),
        }
    }

    fn required(&self) -> Vec<&str> {
        let mut names = vec![self.timestamp.as_str(), self.price.as_str()];
        names.extend(self.ticker.as_deref());
        names.extend(self.action.as_deref());
        names.extend(self.score.as_deref());
        names
    }
}

fn read_rows(path: &Path, columns: &TableColumns) -> Result<Vec<RawRow>, DataError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => self::csv::read_rows(path, columns),
        TableFormat::Parquet => self::parquet::read_rows(path, columns),
    }
}

/// Read an intent table. Rows must already be in timestamp order.
pub fn read_intent_table(path: &Path, price_col: &str) -> Result<IntentTable, DataError> {
    let columns = TableColumns::intents(price_col);
    let rows = read_rows(path, &columns)?;
    let intents = rows
        .into_iter()
        .map(|row| Intent::new(row.timestamp, row.ticker.unwrap_or_default(), row.price, row.action))
        .collect();
    let table = IntentTable::new(intents)?;
    tracing::debug!(path = ?path, rows = table.len(), "Read intent table");
    Ok(table)
}

/// Read scored bars for one ticker
pub fn read_scored_bars(
    path: &Path,
    ticker: &str,
    columns: &TableColumns,
) -> Result<Vec<ScoredBar>, DataError> {
    let rows = read_rows(path, columns)?;
    Ok(rows
        .into_iter()
        .map(|row| ScoredBar::new(row.timestamp, ticker, row.price, row.score))
        .collect())
}

/// Write the ledger in the format implied by the path's extension
pub fn write_ledger_file(path: &Path, ledger: &Ledger) -> Result<(), DataError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => write_ledger_csv(path, ledger),
        TableFormat::Parquet => write_ledger_parquet(path, ledger),
    }
}

/// Write the run summary as pretty JSON
pub fn write_summary_json(path: &Path, summary: &BacktestSummary) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}
