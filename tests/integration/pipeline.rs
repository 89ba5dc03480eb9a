//! File-to-report tests through the CLI commands

use intraday_backtest::cli::{BarSource, OutputFormat, RunArgs, SignalArgs, SweepArgs};
use intraday_backtest::config::Config;
use intraday_backtest::strategy::{BasicBuy, HoldNHours, StrategyConfig, ThresholdHold};
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn scored_data(dir: &TempDir) -> BarSource {
    let data = dir.path().join("bars");
    write(
        &data.join("A.csv"),
        "Datetime,Close,predicted_prob\n\
         2024-01-02 09:00:00,100,0.9\n\
         2024-01-02 12:00:00,105,0.2\n",
    );
    write(
        &data.join("B.csv"),
        "Datetime,Close,predicted_prob\n\
         2024-01-02 09:00:00,50,0.3\n\
         2024-01-02 12:00:00,55,0.8\n",
    );
    let tickers = dir.path().join("tickers.txt");
    write(&tickers, "A\nB\nMISSING\n");

    BarSource {
        data_dir: Some(data),
        tickers: Some(tickers),
        start: None,
        end: None,
    }
}

#[test]
fn test_run_command_writes_ledger_and_summary() {
    let dir = TempDir::new().unwrap();
    let intents = dir.path().join("intents.csv");
    write(
        &intents,
        "timestamp,ticker,Close,action\n\
         2024-01-02 09:00:00,X,100,buy\n\
         2024-01-02 16:00:00,X,110,\n\
         2024-01-03 09:00:00,X,110,buy\n\
         2024-01-03 12:30:00,X,120,sell\n",
    );
    let output = dir.path().join("out/ledger.csv");

    let args = RunArgs {
        intents,
        initial_budget: None,
        cooldown_hours: None,
        price_col: None,
        output: Some(output.clone()),
        format: OutputFormat::Json,
    };
    let summary = tokio_test::block_on(args.execute(&Config::default())).unwrap();

    assert_eq!(summary.trading_days, 2);
    assert_eq!(summary.final_fund_value, dec!(1020));
    assert_eq!(summary.total_pnl, dec!(20));

    let ledger = fs::read_to_string(&output).unwrap();
    assert_eq!(ledger.lines().count(), 1 + 6);
    assert!(dir.path().join("out/ledger.summary.json").is_file());
}

#[test]
fn test_run_command_overrides_config() {
    let dir = TempDir::new().unwrap();
    let intents = dir.path().join("intents.csv");
    write(
        &intents,
        "timestamp,ticker,Open,action\n\
         2024-01-02 09:00:00,X,100,buy\n\
         2024-01-02 10:00:00,X,130,sell\n",
    );

    let args = RunArgs {
        intents,
        initial_budget: Some(dec!(200)),
        cooldown_hours: Some(dec!(0.5)),
        price_col: Some("Open".to_string()),
        output: None,
        format: OutputFormat::Table,
    };
    let summary = tokio_test::block_on(args.execute(&Config::default())).unwrap();

    assert_eq!(summary.intraday_sells, 1);
    assert_eq!(summary.final_fund_value, dec!(230));
}

#[test]
fn test_run_command_rejects_unordered_input() {
    let dir = TempDir::new().unwrap();
    let intents = dir.path().join("intents.csv");
    write(
        &intents,
        "timestamp,ticker,Close,action\n\
         2024-01-02 10:00:00,X,100,buy\n\
         2024-01-02 09:00:00,X,100,sell\n",
    );

    let args = RunArgs {
        intents,
        initial_budget: None,
        cooldown_hours: None,
        price_col: None,
        output: None,
        format: OutputFormat::Table,
    };
    assert!(tokio_test::block_on(args.execute(&Config::default())).is_err());
}

#[test]
fn test_signal_command_skips_missing_tickers() {
    let dir = TempDir::new().unwrap();
    let args = SignalArgs {
        source: scored_data(&dir),
        output: Some(dir.path().join("signal/ledger.parquet")),
        format: OutputFormat::Json,
    };
    let config = Config {
        strategy: StrategyConfig::BasicBuy(BasicBuy { top_k: 1 }),
        ..Config::default()
    };

    let summary = tokio_test::block_on(args.execute(&config)).unwrap();

    // Buys A at 100 then B at 55, both closed at their last prices
    assert_eq!(summary.buys, 2);
    assert_eq!(summary.eod_sells, 2);
    assert_eq!(summary.final_fund_value, dec!(1005));
    assert!(dir.path().join("signal/ledger.parquet").is_file());
}

#[test]
fn test_signal_command_fails_when_nothing_loads() {
    let dir = TempDir::new().unwrap();
    let tickers = dir.path().join("tickers.txt");
    write(&tickers, "NOPE\n");

    let args = SignalArgs {
        source: BarSource {
            data_dir: Some(dir.path().to_path_buf()),
            tickers: Some(tickers),
            start: None,
            end: None,
        },
        output: None,
        format: OutputFormat::Table,
    };
    assert!(tokio_test::block_on(args.execute(&Config::default())).is_err());
}

#[test]
fn test_sweep_compares_configured_strategies() {
    let dir = TempDir::new().unwrap();
    let args = SweepArgs {
        source: scored_data(&dir),
        save: false,
        format: OutputFormat::Json,
    };
    let config = Config {
        sweep: vec![
            StrategyConfig::BasicBuy(BasicBuy { top_k: 1 }),
            StrategyConfig::HoldNHours(HoldNHours {
                top_k: 1,
                hold_hours: 3,
            }),
            StrategyConfig::ThresholdHold(ThresholdHold {
                threshold: 0.85,
                hold_hours: 3,
            }),
        ],
        ..Config::default()
    };

    let results = tokio_test::block_on(args.execute(&config)).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].summary.final_fund_value, dec!(1005));
    // Sells A at 105 after three hours; B is bought at 55 and closed at 55
    assert_eq!(results[1].summary.intraday_sells, 1);
    assert_eq!(results[1].summary.final_fund_value, dec!(1005));
    // Only A clears the threshold
    assert_eq!(results[2].summary.buys, 1);
}

#[test]
fn test_sweep_requires_strategies() {
    let dir = TempDir::new().unwrap();
    let args = SweepArgs {
        source: scored_data(&dir),
        save: false,
        format: OutputFormat::Table,
    };
    assert!(tokio_test::block_on(args.execute(&Config::default())).is_err());
}
