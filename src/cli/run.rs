//! Run command implementation

use super::{emit_run, OutputFormat};
use crate::backtest::{BacktestSummary, ExecutionEngine};
use crate::config::Config;
use crate::data::read_intent_table;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Intent table (CSV or Parquet) with timestamp, ticker, price and action columns
    #[arg(long)]
    pub intents: PathBuf,

    /// Starting cash
    #[arg(long)]
    pub initial_budget: Option<Decimal>,

    /// Minimum hold time in hours before an intraday sell is honored
    #[arg(long)]
    pub cooldown_hours: Option<Decimal>,

    /// Column holding the execution price
    #[arg(long)]
    pub price_col: Option<String>,

    /// Ledger output file (.csv or .parquet)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<BacktestSummary> {
        let mut engine_config = config.backtest.clone();
        if let Some(budget) = self.initial_budget {
            engine_config.initial_budget = budget;
        }
        if let Some(hours) = self.cooldown_hours {
            engine_config.cooldown_hours = hours;
        }
        if let Some(ref col) = self.price_col {
            engine_config.price_col = col.clone();
        }

        let engine = ExecutionEngine::new(engine_config)?;
        let table = read_intent_table(&self.intents, &engine.config().price_col)?;
        tracing::info!(path = ?self.intents, rows = table.len(), "Running backtest");

        let run = engine.run(&table);
        emit_run(&run, None, self.output.as_deref(), self.format, config)
    }
}
