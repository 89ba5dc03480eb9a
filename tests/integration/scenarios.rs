//! Worked backtest scenarios

use crate::{at, run_with};
use intraday_backtest::backtest::{LedgerAction, RejectReason, Reporter};
use intraday_backtest::intent::Action;
use rust_decimal_macros::dec;

#[test]
fn test_sell_before_cooldown_is_dropped() {
    let run = run_with(
        dec!(1000),
        vec![
            at("2024-01-02 09:00:00", "X", dec!(100), Action::Buy),
            at("2024-01-02 10:00:00", "X", dec!(100), Action::Sell),
            at("2024-01-02 13:00:00", "X", dec!(100), Action::Sell),
        ],
    );

    let rows = run.ledger.entries();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].action, LedgerAction::Buy);
    assert_eq!(rows[1].action, LedgerAction::SellIntraday);
    assert_eq!(rows[1].timestamp.format("%H:%M").to_string(), "13:00");
    assert_eq!(rows[1].daily_pnl, dec!(0));
    // Intraday proceeds are not spendable until the next day
    assert_eq!(rows[1].running_budget, Some(dec!(900)));
    assert_eq!(rows[2].action, LedgerAction::EodSummary);
    assert_eq!(rows[2].fund_value, dec!(1000));
    assert_eq!(run.stats.rejected(RejectReason::CooldownActive), 1);
}

#[test]
fn test_unsold_position_liquidated_at_last_price() {
    let run = run_with(
        dec!(1000),
        vec![
            at("2024-01-02 09:00:00", "X", dec!(100), Action::Buy),
            at("2024-01-02 16:00:00", "X", dec!(110), Action::None),
            at("2024-01-03 09:00:00", "X", dec!(110), Action::Buy),
        ],
    );

    let eod: Vec<_> = run.ledger.with_action(LedgerAction::SellEod).collect();
    assert_eq!(eod[0].price, Some(dec!(110)));
    assert_eq!(eod[0].daily_pnl, dec!(10));
    assert_eq!(eod[0].timestamp.format("%H:%M").to_string(), "16:00");

    let summaries: Vec<_> = run.ledger.daily_summaries().collect();
    assert_eq!(summaries[0].fund_value, dec!(1010));

    // Second day starts from 1010
    let buys: Vec<_> = run.ledger.with_action(LedgerAction::Buy).collect();
    assert_eq!(buys[1].running_budget, Some(dec!(900)));
    assert_eq!(buys[1].fund_value, dec!(900));
}

#[test]
fn test_unaffordable_buy_leaves_no_row() {
    let run = run_with(
        dec!(50),
        vec![at("2024-01-02 09:00:00", "X", dec!(100), Action::Buy)],
    );

    assert_eq!(run.ledger.with_action(LedgerAction::Buy).count(), 0);
    assert_eq!(run.stats.rejected(RejectReason::InsufficientFunds), 1);
    let reporter = Reporter::new(&run.ledger, run.initial_budget);
    assert_eq!(reporter.final_fund_value(), dec!(50));
}

#[test]
fn test_second_buy_of_held_ticker_is_noop() {
    let run = run_with(
        dec!(1000),
        vec![
            at("2024-01-02 09:00:00", "X", dec!(100), Action::Buy),
            at("2024-01-02 11:00:00", "X", dec!(101), Action::Buy),
        ],
    );

    assert_eq!(run.ledger.with_action(LedgerAction::Buy).count(), 1);
    assert_eq!(run.ledger.with_action(LedgerAction::SellEod).count(), 1);
    assert_eq!(run.stats.rejected(RejectReason::AlreadyHeld), 1);
    // Closed at 101, bought at 100
    assert_eq!(
        Reporter::new(&run.ledger, run.initial_budget).final_fund_value(),
        dec!(1001)
    );
}

#[test]
fn test_empty_table_reports_initial_budget() {
    let run = run_with(dec!(1000), Vec::new());
    let reporter = Reporter::new(&run.ledger, run.initial_budget);

    assert!(run.ledger.is_empty());
    assert_eq!(reporter.final_fund_value(), dec!(1000));
    assert_eq!(reporter.total_profit_loss(), dec!(0));
}

#[test]
fn test_ticker_cannot_be_rebought_after_intraday_sell() {
    let run = run_with(
        dec!(1000),
        vec![
            at("2024-01-02 09:00:00", "X", dec!(100), Action::Buy),
            at("2024-01-02 12:00:00", "X", dec!(105), Action::Sell),
            at("2024-01-02 13:00:00", "X", dec!(104), Action::Buy),
        ],
    );

    assert_eq!(run.ledger.with_action(LedgerAction::Buy).count(), 1);
    assert_eq!(run.stats.rejected(RejectReason::SoldToday), 1);
    assert_eq!(run.ledger.daily_summaries().next().unwrap().fund_value, dec!(1005));
}
