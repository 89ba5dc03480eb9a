//! Append-only trade ledger

use crate::intent::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAction {
    /// Position opened
    Buy,
    /// Position closed by a sell intent
    SellIntraday,
    /// Position force-closed at end of day
    SellEod,
    /// One row per trading day
    EodSummary,
}

impl LedgerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerAction::Buy => "buy",
            LedgerAction::SellIntraday => "sell_intraday",
            LedgerAction::SellEod => "sell_eod",
            LedgerAction::EodSummary => "eod_summary",
        }
    }
}

impl fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: Timestamp,
    pub action: LedgerAction,
    /// `None` for summary rows
    pub ticker: Option<String>,
    /// `None` for summary rows
    pub price: Option<Decimal>,
    /// Cash available for buys; `None` for summary rows
    pub running_budget: Option<Decimal>,
    pub daily_pnl: Decimal,
    /// Day-start budget plus daily P&L
    pub fund_value: Decimal,
}

/// Ordered ledger rows for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LedgerEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows of a given kind
    pub fn with_action(&self, action: LedgerAction) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.action == action)
    }

    /// End-of-day summary rows, one per trading day
    pub fn daily_summaries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.with_action(LedgerAction::EodSummary)
    }
}
