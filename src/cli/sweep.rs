//! Sweep command implementation

use super::{BarSource, OutputFormat};
use crate::backtest::{BacktestSummary, ExecutionEngine};
use crate::config::Config;
use crate::data::{self, TableFormat};
use crate::strategy::{IntentPolicy, ScoredBar, StrategyConfig};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub source: BarSource,

    /// Write each strategy's ledger to the configured output directory
    #[arg(long)]
    pub save: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Outcome of one strategy in a sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub strategy: String,
    pub summary: BacktestSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<PathBuf>,
}

impl SweepArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<Vec<SweepResult>> {
        if config.sweep.is_empty() {
            anyhow::bail!("No [[sweep]] strategies configured");
        }

        let engine = Arc::new(ExecutionEngine::new(config.backtest.clone())?);
        let bars = Arc::new(self.source.load(config)?);

        let save = self.save.then(|| SaveTarget {
            dir: config.data.output_dir.clone(),
            format: config.data.ledger_format,
        });
        let results = run_strategies(engine, bars, config.sweep.clone(), save).await?;

        match self.format {
            OutputFormat::Table => println!("{}", format_comparison(&results)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        }
        Ok(results)
    }
}

/// Directory and format for persisted sweep ledgers
#[derive(Debug, Clone)]
pub struct SaveTarget {
    pub dir: PathBuf,
    pub format: TableFormat,
}

impl SaveTarget {
    fn path(&self, position: usize, strategy: &StrategyConfig) -> PathBuf {
        self.dir.join(format!(
            "{:02}_{}.{}",
            position,
            strategy.name(),
            self.format.extension()
        ))
    }
}

/// Run each strategy on its own blocking task; results keep input order
pub async fn run_strategies(
    engine: Arc<ExecutionEngine>,
    bars: Arc<Vec<ScoredBar>>,
    strategies: Vec<StrategyConfig>,
    save: Option<SaveTarget>,
) -> anyhow::Result<Vec<SweepResult>> {
    let handles: Vec<_> = strategies
        .into_iter()
        .enumerate()
        .map(|(position, strategy)| {
            let engine = Arc::clone(&engine);
            let bars = Arc::clone(&bars);
            let ledger = save.as_ref().map(|target| target.path(position, &strategy));
            tokio::task::spawn_blocking(move || -> anyhow::Result<SweepResult> {
                let table = strategy.generate(&bars)?;
                let run = engine.run(&table);
                let summary = BacktestSummary::from_run(&run);
                if let Some(ref path) = ledger {
                    data::write_ledger_file(path, &run.ledger)?;
                }
                tracing::info!(
                    strategy = %strategy.label(),
                    final_fund_value = %summary.final_fund_value,
                    "Strategy finished"
                );
                Ok(SweepResult {
                    strategy: strategy.label(),
                    summary,
                    ledger,
                })
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await??);
    }
    Ok(results)
}

fn format_comparison(results: &[SweepResult]) -> String {
    let mut out = String::new();
    out.push_str("══════════════════════════════════════════════════════════════════════════════\n");
    out.push_str("                            STRATEGY COMPARISON\n");
    out.push_str("══════════════════════════════════════════════════════════════════════════════\n");
    out.push_str(&format!(
        "{:<40} {:>12} {:>12} {:>9} {:>6}\n",
        "Strategy", "Final Value", "P&L", "Return%", "Buys"
    ));
    out.push_str("──────────────────────────────────────────────────────────────────────────────\n");
    for r in results {
        let s = &r.summary;
        out.push_str(&format!(
            "{:<40} {:>12.2} {:>+12.2} {:>+9.2} {:>6}\n",
            r.strategy,
            s.final_fund_value,
            s.total_pnl,
            s.return_pct.saturating_mul(rust_decimal_macros::dec!(100)),
            s.buys
        ));
    }
    out
}
