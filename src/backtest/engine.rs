//! Day-segmented execution engine

use super::ledger::{Ledger, LedgerAction};
use super::session::{DataGap, DaySession, RejectReason};
use super::{ConfigError, EngineConfig};
use crate::intent::{Action, IntentTable};
use crate::telemetry::{self, GaugeMetric};
use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Counters collected while replaying an intent table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Calendar days processed
    pub trading_days: usize,
    /// Buy and sell intents seen
    pub actionable_intents: usize,
    /// Intents absorbed by a guard, by reason
    pub rejections: BTreeMap<RejectReason, usize>,
}

impl RunStats {
    pub fn rejected(&self, reason: RejectReason) -> usize {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_rejected(&self) -> usize {
        self.rejections.values().sum()
    }
}

/// Output of one engine run
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub initial_budget: Decimal,
    pub ledger: Ledger,
    pub stats: RunStats,
    /// Positions closed at end of day without an exit price
    pub data_gaps: Vec<DataGap>,
}

/// Replays intents through per-day sessions.
///
/// Holds no state between runs, so one engine may be reused and independent
/// engines may run in parallel.
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    config: EngineConfig,
    cooldown: Duration,
}

impl ExecutionEngine {
    /// Create a new engine, rejecting invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let cooldown = config.validate()?;
        Ok(Self { config, cooldown })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Run the backtest over a whole table
    pub fn run(&self, table: &IntentTable) -> BacktestRun {
        let mut ledger = Ledger::new();
        let mut stats = RunStats::default();
        let mut data_gaps = Vec::new();
        let mut budget = self.config.initial_budget;

        info!(
            intents = table.len(),
            initial_budget = %budget,
            cooldown_secs = self.cooldown.num_seconds(),
            "Starting backtest"
        );

        for day in table.days() {
            let mut session = DaySession::open(day.date, budget);

            for intent in &day.intents {
                let outcome = match intent.action {
                    Action::Buy => session.buy(intent, &mut ledger),
                    Action::Sell => session.sell(intent, self.cooldown, &mut ledger),
                    Action::None => continue,
                };
                stats.actionable_intents += 1;

                match outcome {
                    Ok(()) => {
                        let kind = match intent.action {
                            Action::Buy => LedgerAction::Buy,
                            _ => LedgerAction::SellIntraday,
                        };
                        telemetry::record_executed_intent();
                        telemetry::record_fill(kind, 1);
                    }
                    Err(reason) => {
                        debug!(
                            timestamp = %intent.timestamp,
                            ticker = %intent.ticker,
                            action = %intent.action,
                            ?reason,
                            "Intent rejected"
                        );
                        *stats.rejections.entry(reason).or_insert(0) += 1;
                        telemetry::record_rejected_intent(reason);
                    }
                }
            }

            let held = session.open_count();
            telemetry::set_gauge(GaugeMetric::OpenPositions, held as f64);
            let gaps = session.settle(&day, &mut ledger);
            telemetry::record_fill(LedgerAction::SellEod, (held - gaps.len()) as u64);
            for gap in &gaps {
                warn!(
                    date = %gap.date,
                    ticker = %gap.position.ticker,
                    buy_price = %gap.position.buy_price,
                    "No price for held ticker at end of day, closing without exit price"
                );
                telemetry::record_data_gap();
            }
            data_gaps.extend(gaps);

            let day_start = budget;
            budget = session.close(day.last_timestamp(), &mut ledger);
            stats.trading_days += 1;

            let daily_pnl = budget - day_start;
            telemetry::set_gauge(GaugeMetric::FundValue, budget.to_f64().unwrap_or_default());
            telemetry::set_gauge(GaugeMetric::DailyPnl, daily_pnl.to_f64().unwrap_or_default());
            info!(date = %day.date, %daily_pnl, fund_value = %budget, "Day closed");
        }

        info!(
            days = stats.trading_days,
            rows = ledger.len(),
            rejected = stats.total_rejected(),
            final_fund_value = %budget,
            "Backtest complete"
        );

        BacktestRun {
            initial_budget: self.config.initial_budget,
            ledger,
            stats,
            data_gaps,
        }
    }
}
