//! Configuration types for intraday-backtest

use crate::backtest::EngineConfig;
use crate::data::TableFormat;
use crate::strategy::StrategyConfig;
use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backtest: EngineConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Strategies compared by `sweep`
    #[serde(default)]
    pub sweep: Vec<StrategyConfig>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Directory of per-ticker scored bar files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// One ticker per line
    #[serde(default = "default_tickers_file")]
    pub tickers_file: PathBuf,

    #[serde(default = "default_timestamp_col")]
    pub timestamp_col: String,

    /// Model score column used by strategies
    #[serde(default = "default_score_col")]
    pub score_col: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_ledger_format")]
    pub ledger_format: TableFormat,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_tickers_file() -> PathBuf {
    PathBuf::from("./tickers.txt")
}
fn default_timestamp_col() -> String {
    "Datetime".to_string()
}
fn default_score_col() -> String {
    "predicted_prob".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}
fn default_ledger_format() -> TableFormat {
    TableFormat::Csv
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tickers_file: default_tickers_file(),
            timestamp_col: default_timestamp_col(),
            score_col: default_score_col(),
            output_dir: default_output_dir(),
            ledger_format: default_ledger_format(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
