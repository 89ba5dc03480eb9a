//! Per-ticker scored bar loading

use super::{read_scored_bars, DataError, TableColumns, TableFormat};
use crate::intent::Timestamp;
use crate::strategy::ScoredBar;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Inclusive range of local trading dates. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TimeWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: &Timestamp) -> bool {
        let date = timestamp.date_naive();
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Why a ticker contributed no bars
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingFile,
    Unreadable(String),
    Malformed(String),
    EmptyAfterFilter,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFile => write!(f, "no data file"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
            SkipReason::Malformed(e) => write!(f, "malformed: {e}"),
            SkipReason::EmptyAfterFilter => write!(f, "no rows in window"),
        }
    }
}

/// Result of loading one ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { rows: usize },
    Skipped { reason: SkipReason },
}

/// Per-ticker outcomes of a load, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub outcomes: Vec<(String, LoadOutcome)>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, LoadOutcome::Loaded { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.outcomes.iter().filter_map(|(ticker, o)| match o {
            LoadOutcome::Skipped { reason } => Some((ticker.as_str(), reason)),
            LoadOutcome::Loaded { .. } => None,
        })
    }

    pub fn total_rows(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                LoadOutcome::Loaded { rows } => *rows,
                LoadOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}

/// Read a tickers file: one symbol per line, blank lines ignored
pub fn read_tickers(path: &Path) -> Result<Vec<String>, DataError> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn ticker_file(dir: &Path, ticker: &str) -> Option<PathBuf> {
    [TableFormat::Csv, TableFormat::Parquet]
        .iter()
        .map(|format| dir.join(format!("{ticker}.{}", format.extension())))
        .find(|path| path.is_file())
}

fn load_one(
    dir: &Path,
    ticker: &str,
    columns: &TableColumns,
    window: &TimeWindow,
) -> Result<Vec<ScoredBar>, SkipReason> {
    let path = ticker_file(dir, ticker).ok_or(SkipReason::MissingFile)?;
    let bars = read_scored_bars(&path, ticker, columns).map_err(|e| match e {
        DataError::Table(e) => SkipReason::Malformed(e.to_string()),
        other => SkipReason::Unreadable(other.to_string()),
    })?;

    let bars: Vec<ScoredBar> = bars
        .into_iter()
        .filter(|bar| window.contains(&bar.timestamp))
        .collect();
    if bars.is_empty() {
        return Err(SkipReason::EmptyAfterFilter);
    }
    Ok(bars)
}

/// Load scored bars for each ticker from `<dir>/<TICKER>.csv` or `.parquet`.
///
/// Failures are recorded per ticker and never abort the load.
pub fn load_scored_bars(
    dir: &Path,
    tickers: &[String],
    columns: &TableColumns,
    window: &TimeWindow,
) -> (Vec<ScoredBar>, LoadReport) {
    let mut bars = Vec::new();
    let mut report = LoadReport::default();

    for ticker in tickers {
        let outcome = match load_one(dir, ticker, columns, window) {
            Ok(loaded) => {
                let rows = loaded.len();
                bars.extend(loaded);
                LoadOutcome::Loaded { rows }
            }
            Err(reason) => {
                warn!(ticker = %ticker, reason = %reason, "Skipping ticker");
                LoadOutcome::Skipped { reason }
            }
        };
        report.outcomes.push((ticker.clone(), outcome));
    }

    info!(
        dir = ?dir,
        requested = tickers.len(),
        loaded = report.loaded(),
        rows = report.total_rows(),
        "Loaded scored bars"
    );

    (bars, report)
}
