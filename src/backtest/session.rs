//! Per-day position and cash state

use super::ledger::{Ledger, LedgerAction, LedgerEntry};
use crate::intent::{DaySlice, Intent, Timestamp};
use chrono::{Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An open holding of one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub buy_price: Decimal,
    pub buy_time: Timestamp,
}

/// Why an intent did not change state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Running budget below the buy price
    InsufficientFunds,
    /// Ticker already has an open position
    AlreadyHeld,
    /// Ticker was sold earlier the same day
    SoldToday,
    /// Sell arrived before the cooldown elapsed
    CooldownActive,
    /// Sell for a ticker with no open position
    NotHeld,
}

/// Held position that had no price observation at end of day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataGap {
    pub date: NaiveDate,
    pub position: Position,
}

/// State of one trading day
#[derive(Debug)]
pub(crate) struct DaySession {
    date: NaiveDate,
    day_start_budget: Decimal,
    running_budget: Decimal,
    daily_pnl: Decimal,
    open_positions: BTreeMap<String, Position>,
    sold_today: BTreeSet<String>,
}

impl DaySession {
    pub fn open(date: NaiveDate, day_start_budget: Decimal) -> Self {
        Self {
            date,
            day_start_budget,
            running_budget: day_start_budget,
            daily_pnl: Decimal::ZERO,
            open_positions: BTreeMap::new(),
            sold_today: BTreeSet::new(),
        }
    }

    pub fn fund_value(&self) -> Decimal {
        self.day_start_budget + self.daily_pnl
    }

    pub fn running_budget(&self) -> Decimal {
        self.running_budget
    }

    pub fn open_count(&self) -> usize {
        self.open_positions.len()
    }

    /// FLAT -> HELD
    pub fn buy(&mut self, intent: &Intent, ledger: &mut Ledger) -> Result<(), RejectReason> {
        if self.open_positions.contains_key(&intent.ticker) {
            return Err(RejectReason::AlreadyHeld);
        }
        if self.sold_today.contains(&intent.ticker) {
            return Err(RejectReason::SoldToday);
        }
        if self.running_budget < intent.price {
            return Err(RejectReason::InsufficientFunds);
        }

        self.running_budget -= intent.price;
        self.daily_pnl -= intent.price;
        self.open_positions.insert(
            intent.ticker.clone(),
            Position {
                ticker: intent.ticker.clone(),
                buy_price: intent.price,
                buy_time: intent.timestamp,
            },
        );
        self.record(ledger, intent.timestamp, LedgerAction::Buy, &intent.ticker, intent.price);
        Ok(())
    }

    /// HELD -> FLAT once the cooldown has elapsed.
    ///
    /// Proceeds go to daily P&L only; the running budget is replenished at the
    /// next day's open.
    pub fn sell(
        &mut self,
        intent: &Intent,
        cooldown: Duration,
        ledger: &mut Ledger,
    ) -> Result<(), RejectReason> {
        let position = self
            .open_positions
            .get(&intent.ticker)
            .ok_or(RejectReason::NotHeld)?;
        if intent.timestamp - position.buy_time < cooldown {
            return Err(RejectReason::CooldownActive);
        }

        self.open_positions.remove(&intent.ticker);
        self.daily_pnl += intent.price;
        self.sold_today.insert(intent.ticker.clone());
        self.record(
            ledger,
            intent.timestamp,
            LedgerAction::SellIntraday,
            &intent.ticker,
            intent.price,
        );
        Ok(())
    }

    /// Force-close every open position at the ticker's last price of the day.
    /// Returns positions that had no price to close at.
    pub fn settle(&mut self, day: &DaySlice<'_>, ledger: &mut Ledger) -> Vec<DataGap> {
        let mut gaps = Vec::new();
        let close_time = day.last_timestamp();

        for (ticker, position) in std::mem::take(&mut self.open_positions) {
            match close_time.zip(day.last_price(&ticker)) {
                Some((close_time, price)) => {
                    self.running_budget += price;
                    self.daily_pnl += price;
                    self.record(ledger, close_time, LedgerAction::SellEod, &ticker, price);
                }
                None => gaps.push(DataGap {
                    date: self.date,
                    position,
                }),
            }
        }
        gaps
    }

    /// Append the day's summary row and return the fund value carried forward
    pub fn close(self, offset_hint: Option<Timestamp>, ledger: &mut Ledger) -> Decimal {
        let fund_value = self.fund_value();
        ledger.push(LedgerEntry {
            timestamp: local_midnight(self.date, offset_hint),
            action: LedgerAction::EodSummary,
            ticker: None,
            price: None,
            running_budget: None,
            daily_pnl: self.daily_pnl,
            fund_value,
        });
        fund_value
    }

    fn record(
        &self,
        ledger: &mut Ledger,
        timestamp: Timestamp,
        action: LedgerAction,
        ticker: &str,
        price: Decimal,
    ) {
        ledger.push(LedgerEntry {
            timestamp,
            action,
            ticker: Some(ticker.to_string()),
            price: Some(price),
            running_budget: Some(self.running_budget),
            daily_pnl: self.daily_pnl,
            fund_value: self.fund_value(),
        });
    }
}

/// Midnight of `date` in the offset of the day's data (UTC if unknown)
fn local_midnight(date: NaiveDate, offset_hint: Option<Timestamp>) -> Timestamp {
    let offset = offset_hint
        .map(|ts| *ts.offset())
        .unwrap_or_else(|| Utc.fix());
    let local = date.and_time(NaiveTime::MIN);
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    offset.from_utc_datetime(&utc)
}
