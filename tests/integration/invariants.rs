//! Property tests over randomly generated intent tables

use chrono::{Duration, NaiveDate};
use intraday_backtest::backtest::{EngineConfig, ExecutionEngine, LedgerAction, Reporter};
use intraday_backtest::data::write_ledger;
use intraday_backtest::intent::{from_utc, Action, Intent, IntentTable};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

const TICKERS: [&str; 3] = ["AAA", "BBB", "CCC"];

/// (day, minute after 09:00, ticker index, price, action code)
fn row() -> impl Strategy<Value = (i64, i64, usize, i64, u8)> {
    (0i64..3, 0i64..480, 0usize..3, 1i64..200, 0u8..3)
}

fn table(rows: &[(i64, i64, usize, i64, u8)]) -> IntentTable {
    let start = NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
        .and_utc();
    let intents = rows
        .iter()
        .map(|&(day, minute, ticker, price, code)| {
            let action = match code {
                0 => Action::Buy,
                1 => Action::Sell,
                _ => Action::None,
            };
            let ts = from_utc(start + Duration::days(day) + Duration::minutes(minute));
            Intent::new(ts, TICKERS[ticker], Decimal::from(price), action)
        })
        .collect();
    IntentTable::from_unordered(intents).unwrap()
}

fn engine(budget: i64, cooldown_hours: i64) -> ExecutionEngine {
    ExecutionEngine::new(EngineConfig {
        initial_budget: Decimal::from(budget),
        cooldown_hours: Decimal::from(cooldown_hours),
        ..EngineConfig::default()
    })
    .unwrap()
}

proptest! {
    #[test]
    fn ledger_respects_position_rules(
        rows in prop::collection::vec(row(), 0..80),
        budget in 0i64..1000,
        cooldown_hours in 0i64..5,
    ) {
        let engine = engine(budget, cooldown_hours);
        let run = engine.run(&table(&rows));

        let mut held: HashMap<String, chrono::DateTime<chrono::FixedOffset>> = HashMap::new();
        let mut sold_today: HashSet<String> = HashSet::new();

        for entry in run.ledger.iter() {
            if let Some(budget) = entry.running_budget {
                prop_assert!(budget >= Decimal::ZERO);
            }
            match entry.action {
                LedgerAction::Buy => {
                    let ticker = entry.ticker.clone().unwrap();
                    prop_assert!(!sold_today.contains(&ticker));
                    prop_assert!(held.insert(ticker, entry.timestamp).is_none());
                }
                LedgerAction::SellIntraday => {
                    let ticker = entry.ticker.clone().unwrap();
                    let bought = held.remove(&ticker);
                    prop_assert!(bought.is_some());
                    if let Some(bought) = bought {
                        prop_assert!(entry.timestamp - bought >= engine.cooldown());
                    }
                    sold_today.insert(ticker);
                }
                LedgerAction::SellEod => {
                    let ticker = entry.ticker.clone().unwrap();
                    prop_assert!(held.remove(&ticker).is_some());
                }
                LedgerAction::EodSummary => {
                    prop_assert!(held.is_empty());
                    sold_today.clear();
                }
            }
        }
        prop_assert!(held.is_empty());
        prop_assert!(run.data_gaps.is_empty());
    }

    #[test]
    fn fund_value_chains_across_days(
        rows in prop::collection::vec(row(), 0..80),
        budget in 0i64..1000,
    ) {
        let run = engine(budget, 3).run(&table(&rows));

        let mut fund = Decimal::from(budget);
        for summary in run.ledger.daily_summaries() {
            prop_assert_eq!(summary.fund_value, fund + summary.daily_pnl);
            fund = summary.fund_value;
        }

        let reporter = Reporter::new(&run.ledger, run.initial_budget);
        prop_assert_eq!(reporter.final_fund_value(), fund);
        prop_assert_eq!(reporter.total_profit_loss(), fund - Decimal::from(budget));
    }

    #[test]
    fn replay_is_byte_identical(rows in prop::collection::vec(row(), 0..60)) {
        let table = table(&rows);
        let engine = engine(500, 2);

        let mut first = Vec::new();
        let mut second = Vec::new();
        write_ledger(&mut first, &engine.run(&table).ledger).unwrap();
        write_ledger(&mut second, &engine.run(&table).ledger).unwrap();
        prop_assert_eq!(first, second);
    }
}
