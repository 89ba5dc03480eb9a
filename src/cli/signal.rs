//! Signal command implementation

use super::{emit_run, BarSource, OutputFormat};
use crate::backtest::{BacktestSummary, ExecutionEngine};
use crate::config::Config;
use crate::strategy::IntentPolicy;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SignalArgs {
    #[command(flatten)]
    pub source: BarSource,

    /// Ledger output file (.csv or .parquet)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl SignalArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<BacktestSummary> {
        let engine = ExecutionEngine::new(config.backtest.clone())?;
        let bars = self.source.load(config)?;

        let strategy = &config.strategy;
        let table = strategy.generate(&bars)?;
        tracing::info!(
            strategy = %strategy.label(),
            bars = bars.len(),
            intents = table.len(),
            "Generated intents"
        );

        let run = engine.run(&table);
        emit_run(
            &run,
            Some(&strategy.label()),
            self.output.as_deref(),
            self.format,
            config,
        )
    }
}
