//! Ledger reporting and summary statistics

use super::engine::BacktestRun;
use super::ledger::{Ledger, LedgerAction};
use super::session::RejectReason;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Read-only view over a finished ledger
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    ledger: &'a Ledger,
    initial_budget: Decimal,
}

impl<'a> Reporter<'a> {
    pub fn new(ledger: &'a Ledger, initial_budget: Decimal) -> Self {
        Self {
            ledger,
            initial_budget,
        }
    }

    /// Fund value of the last ledger row, or the initial budget if nothing was recorded
    pub fn final_fund_value(&self) -> Decimal {
        self.ledger
            .last()
            .map(|entry| entry.fund_value)
            .unwrap_or(self.initial_budget)
    }

    pub fn total_profit_loss(&self) -> Decimal {
        self.final_fund_value() - self.initial_budget
    }

    /// Total P&L as a fraction of the initial budget. Saturates at the
    /// `Decimal` range when the budget is tiny relative to the P&L.
    pub fn return_pct(&self) -> Decimal {
        if self.initial_budget.is_zero() {
            return Decimal::ZERO;
        }
        let pnl = self.total_profit_loss();
        pnl.checked_div(self.initial_budget).unwrap_or(if pnl.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
    }

    /// Largest peak-to-trough fall in end-of-day fund value
    pub fn max_drawdown(&self) -> Decimal {
        let mut peak = self.initial_budget;
        let mut max_drawdown = Decimal::ZERO;
        for entry in self.ledger.daily_summaries() {
            peak = peak.max(entry.fund_value);
            max_drawdown = max_drawdown.max(peak - entry.fund_value);
        }
        max_drawdown
    }

    fn count(&self, action: LedgerAction) -> usize {
        self.ledger.with_action(action).count()
    }
}

/// Summary statistics from a backtest run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub initial_budget: Decimal,
    pub final_fund_value: Decimal,
    pub total_pnl: Decimal,
    /// Fraction of the initial budget
    pub return_pct: Decimal,
    pub max_drawdown: Decimal,
    pub trading_days: usize,
    pub buys: usize,
    pub intraday_sells: usize,
    pub eod_sells: usize,
    pub rejected_insufficient_funds: usize,
    pub rejected_already_held: usize,
    pub rejected_sold_today: usize,
    pub rejected_cooldown: usize,
    pub rejected_not_held: usize,
    pub data_gaps: usize,
}

impl BacktestSummary {
    /// Summarize a finished run
    pub fn from_run(run: &BacktestRun) -> Self {
        let reporter = Reporter::new(&run.ledger, run.initial_budget);
        Self {
            initial_budget: run.initial_budget,
            final_fund_value: reporter.final_fund_value(),
            total_pnl: reporter.total_profit_loss(),
            return_pct: reporter.return_pct(),
            max_drawdown: reporter.max_drawdown(),
            trading_days: run.stats.trading_days,
            buys: reporter.count(LedgerAction::Buy),
            intraday_sells: reporter.count(LedgerAction::SellIntraday),
            eod_sells: reporter.count(LedgerAction::SellEod),
            rejected_insufficient_funds: run.stats.rejected(RejectReason::InsufficientFunds),
            rejected_already_held: run.stats.rejected(RejectReason::AlreadyHeld),
            rejected_sold_today: run.stats.rejected(RejectReason::SoldToday),
            rejected_cooldown: run.stats.rejected(RejectReason::CooldownActive),
            rejected_not_held: run.stats.rejected(RejectReason::NotHeld),
            data_gaps: run.data_gaps.len(),
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST RESULTS
══════════════════════════════════════════════════════

PERFORMANCE
───────────────────────────────────────────────────────
Initial Budget:   {:.2}
Final Fund Value: {:.2}
Total P&L:        {:+.2} ({:+.2}%)
Max Drawdown:     {:.2}

ACTIVITY
───────────────────────────────────────────────────────
Trading Days:     {}
Buys:             {}
Intraday Sells:   {}
EOD Sells:        {}
Data Gaps:        {}

REJECTED INTENTS
───────────────────────────────────────────────────────
Insufficient Funds: {}
Already Held:       {}
Sold Today:         {}
Cooldown Active:    {}
Not Held:           {}
══════════════════════════════════════════════════════
"#,
            self.initial_budget,
            self.final_fund_value,
            self.total_pnl,
            self.return_pct.saturating_mul(dec!(100)),
            self.max_drawdown,
            self.trading_days,
            self.buys,
            self.intraday_sells,
            self.eod_sells,
            self.data_gaps,
            self.rejected_insufficient_funds,
            self.rejected_already_held,
            self.rejected_sold_today,
            self.rejected_cooldown,
            self.rejected_not_held,
        )
    }
}
