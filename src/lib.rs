//! intraday-backtest: Day-segmented intraday backtester for scored trading signals
//!
//! This library provides the core components for:
//! - Intent tables of timestamped buy/sell/no-op rows
//! - An execution engine with per-day budgets, a sell cooldown and
//!   end-of-day liquidation
//! - A cash-accurate trade ledger and run reporting
//! - Strategies that turn model scores into intents
//! - CSV and Parquet input and ledger persistence
//! - Structured logging and metrics

pub mod backtest;
pub mod cli;
pub mod config;
pub mod data;
pub mod intent;
pub mod strategy;
pub mod telemetry;
