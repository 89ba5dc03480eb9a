//! Backtest metrics
//!
//! Emitted through the `metrics` facade; nothing is recorded unless the
//! embedding application installs a recorder.

use crate::backtest::{LedgerAction, RejectReason};

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Fund value at the latest day close
    FundValue,
    /// P&L of the latest closed day
    DailyPnl,
    /// Open positions before end-of-day settlement
    OpenPositions,
}

impl GaugeMetric {
    fn name(&self) -> &'static str {
        match self {
            GaugeMetric::FundValue => "backtest_fund_value",
            GaugeMetric::DailyPnl => "backtest_daily_pnl",
            GaugeMetric::OpenPositions => "backtest_open_positions",
        }
    }
}

/// Count an intent that changed engine state
pub fn record_executed_intent() {
    metrics::counter!("backtest_intents_total", "outcome" => "executed").increment(1);
}

/// Count an intent absorbed by a guard
pub fn record_rejected_intent(reason: RejectReason) {
    let reason = match reason {
        RejectReason::InsufficientFunds => "insufficient_funds",
        RejectReason::AlreadyHeld => "already_held",
        RejectReason::SoldToday => "sold_today",
        RejectReason::CooldownActive => "cooldown_active",
        RejectReason::NotHeld => "not_held",
    };
    metrics::counter!("backtest_intents_total", "outcome" => "rejected", "reason" => reason)
        .increment(1);
}

/// Count ledger rows by kind
pub fn record_fill(action: LedgerAction, count: u64) {
    metrics::counter!("backtest_fills_total", "kind" => action.as_str()).increment(count);
}

/// Count positions closed without an exit price
pub fn record_data_gap() {
    metrics::counter!("backtest_data_gaps_total").increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
    tracing::trace!(metric = metric.name(), value, "Setting gauge");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_executed_intent();
        record_rejected_intent(RejectReason::CooldownActive);
        record_fill(LedgerAction::SellEod, 2);
        record_data_gap();
        set_gauge(GaugeMetric::FundValue, 1010.0);
    }

    #[test]
    fn test_gauge_names() {
        assert_eq!(GaugeMetric::FundValue.name(), "backtest_fund_value");
        assert_eq!(GaugeMetric::DailyPnl.name(), "backtest_daily_pnl");
        assert_eq!(GaugeMetric::OpenPositions.name(), "backtest_open_positions");
    }
}
