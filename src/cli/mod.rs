//! CLI interface for intraday-backtest
//!
//! Provides subcommands for:
//! - `run`: Replay an intent table through the engine
//! - `signal`: Generate intents from scored bars and replay them
//! - `sweep`: Compare the configured strategies on the same bars
//! - `config`: Show the effective configuration

mod run;
mod signal;
mod sweep;

pub use run::RunArgs;
pub use signal::SignalArgs;
pub use sweep::{run_strategies, SaveTarget, SweepArgs, SweepResult};

use crate::backtest::{BacktestRun, BacktestSummary};
use crate::config::Config;
use crate::data::{self, load_scored_bars, read_tickers, TableColumns, TableFormat, TimeWindow};
use crate::strategy::ScoredBar;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "intraday-backtest")]
#[command(about = "Day-segmented intraday backtester for scored trading signals")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an intent table
    Run(RunArgs),
    /// Generate intents from scored bars with the configured strategy
    Signal(SignalArgs),
    /// Run every sweep strategy and compare results
    Sweep(SweepArgs),
    /// Show configuration
    Config,
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Where scored bars come from; unset fields fall back to configuration
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BarSource {
    /// Directory of per-ticker scored bar files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// File listing one ticker per line
    #[arg(long)]
    pub tickers: Option<PathBuf>,

    /// First trading date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last trading date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl BarSource {
    /// Load bars for every listed ticker. Fails only if nothing loads.
    pub fn load(&self, config: &Config) -> anyhow::Result<Vec<ScoredBar>> {
        let data_dir = self.data_dir.as_ref().unwrap_or(&config.data.data_dir);
        let tickers_file = self.tickers.as_ref().unwrap_or(&config.data.tickers_file);
        let tickers = read_tickers(tickers_file).map_err(|e| {
            anyhow::anyhow!("Failed to read tickers from {}: {}", tickers_file.display(), e)
        })?;

        let columns = TableColumns::scored_bars(
            &config.data.timestamp_col,
            &config.backtest.price_col,
            &config.data.score_col,
        );
        let window = TimeWindow::new(self.start, self.end);
        let (bars, report) = load_scored_bars(data_dir, &tickers, &columns, &window);

        if report.loaded() == 0 {
            anyhow::bail!(
                "No scored bars loaded from {} ({} tickers requested)",
                data_dir.display(),
                tickers.len()
            );
        }
        Ok(bars)
    }
}

#[derive(Serialize)]
struct RunRecord<'a> {
    run_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ledger: Option<&'a Path>,
    summary: &'a BacktestSummary,
}

/// Ledger path with the configured format applied when no known extension is given
fn ledger_path(output: &Path, default_format: TableFormat) -> PathBuf {
    match TableFormat::from_path(output) {
        Ok(_) => output.to_path_buf(),
        Err(_) => output.with_extension(default_format.extension()),
    }
}

/// Persist and print a finished run
fn emit_run(
    run: &BacktestRun,
    strategy: Option<&str>,
    output: Option<&Path>,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<BacktestSummary> {
    let run_id = Uuid::new_v4();
    let summary = BacktestSummary::from_run(run);

    let ledger = output.map(|p| ledger_path(p, config.data.ledger_format));
    if let Some(ref path) = ledger {
        data::write_ledger_file(path, &run.ledger)?;
        data::write_summary_json(&path.with_extension("summary.json"), &summary)?;
        tracing::info!(run_id = %run_id, path = ?path, "Wrote ledger");
    }

    match format {
        OutputFormat::Table => {
            if let Some(name) = strategy {
                println!("Strategy: {name}");
            }
            println!("{}", summary.format_table());
        }
        OutputFormat::Json => {
            let record = RunRecord {
                run_id,
                strategy,
                ledger: ledger.as_deref(),
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(summary)
}
