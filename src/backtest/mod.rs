//! Backtesting module
//!
//! Replays an intent table day by day through the execution engine and
//! produces a cash-accurate trade ledger

mod engine;
mod ledger;
mod report;
mod session;

pub use engine::{BacktestRun, ExecutionEngine, RunStats};
pub use ledger::{Ledger, LedgerAction, LedgerEntry};
pub use report::{BacktestSummary, Reporter};
pub use session::{DataGap, Position, RejectReason};

use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted initial budget
pub const MAX_INITIAL_BUDGET: Decimal = dec!(1000000000000000000);

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting cash
    #[serde(default = "default_initial_budget")]
    pub initial_budget: Decimal,
    /// Minimum hold time before an intraday sell is honored
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: Decimal,
    /// Input column that supplies the execution price
    #[serde(default = "default_price_col")]
    pub price_col: String,
}

fn default_initial_budget() -> Decimal {
    Decimal::new(1000, 0)
}
fn default_cooldown_hours() -> Decimal {
    Decimal::new(3, 0)
}
fn default_price_col() -> String {
    "Close".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_budget: default_initial_budget(),
            cooldown_hours: default_cooldown_hours(),
            price_col: default_price_col(),
        }
    }
}

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Initial budget must be non-negative, got {0}")]
    NegativeBudget(Decimal),
    #[error("Initial budget {0} exceeds the limit of {max}", max = MAX_INITIAL_BUDGET)]
    BudgetOutOfRange(Decimal),
    #[error("Cooldown must be non-negative, got {0}h")]
    NegativeCooldown(Decimal),
    #[error("Cooldown of {0}h is out of range")]
    CooldownOutOfRange(Decimal),
    #[error("Price column name must not be empty")]
    EmptyPriceColumn,
}

impl EngineConfig {
    /// Check the configuration and resolve the cooldown into a duration
    pub fn validate(&self) -> Result<Duration, ConfigError> {
        if self.initial_budget < Decimal::ZERO {
            return Err(ConfigError::NegativeBudget(self.initial_budget));
        }
        if self.initial_budget > MAX_INITIAL_BUDGET {
            return Err(ConfigError::BudgetOutOfRange(self.initial_budget));
        }
        if self.cooldown_hours < Decimal::ZERO {
            return Err(ConfigError::NegativeCooldown(self.cooldown_hours));
        }
        if self.price_col.trim().is_empty() {
            return Err(ConfigError::EmptyPriceColumn);
        }
        // Round up so a positive cooldown never resolves to zero
        self.cooldown_hours
            .checked_mul(Decimal::from(3_600_000))
            .and_then(|millis| millis.ceil().to_i64())
            .and_then(Duration::try_milliseconds)
            .ok_or(ConfigError::CooldownOutOfRange(self.cooldown_hours))
    }
}
