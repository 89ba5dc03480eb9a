//! Integration tests

mod invariants;
mod pipeline;
mod scenarios;

use intraday_backtest::backtest::{BacktestRun, EngineConfig, ExecutionEngine};
use intraday_backtest::intent::{parse_timestamp, Action, Intent, IntentTable};
use rust_decimal::Decimal;

pub fn at(ts: &str, ticker: &str, price: Decimal, action: Action) -> Intent {
    Intent::new(parse_timestamp(ts).unwrap(), ticker, price, action)
}

pub fn run_with(budget: Decimal, rows: Vec<Intent>) -> BacktestRun {
    let engine = ExecutionEngine::new(EngineConfig {
        initial_budget: budget,
        ..EngineConfig::default()
    })
    .unwrap();
    engine.run(&IntentTable::new(rows).unwrap())
}
