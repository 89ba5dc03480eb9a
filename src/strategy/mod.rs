//! Intent-generation strategies
//!
//! Turn model-scored bars into an intent table for the execution engine

mod timed_exit;
mod top_k;
mod types;

pub use timed_exit::{HoldNHours, ThresholdHold};
pub use top_k::BasicBuy;
pub use types::ScoredBar;

use crate::intent::{Action, Intent, IntentTable, TableError};
use serde::{Deserialize, Serialize};

/// Capability shared by every strategy
pub trait IntentPolicy {
    /// Stable strategy name
    fn name(&self) -> &'static str;

    /// One action per input bar, aligned by index
    fn mark(&self, bars: &[ScoredBar]) -> Vec<Action>;

    /// Build the intent table for a set of bars
    fn generate(&self, bars: &[ScoredBar]) -> Result<IntentTable, TableError> {
        let actions = self.mark(bars);
        let intents = bars
            .iter()
            .zip(actions)
            .map(|(bar, action)| Intent::new(bar.timestamp, bar.ticker.clone(), bar.price, action))
            .collect();
        IntentTable::from_unordered(intents)
    }
}

/// Supported strategies, selected by `kind` in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    BasicBuy(BasicBuy),
    HoldNHours(HoldNHours),
    ThresholdHold(ThresholdHold),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::BasicBuy(BasicBuy::default())
    }
}

impl StrategyConfig {
    fn policy(&self) -> &dyn IntentPolicy {
        match self {
            StrategyConfig::BasicBuy(s) => s,
            StrategyConfig::HoldNHours(s) => s,
            StrategyConfig::ThresholdHold(s) => s,
        }
    }

    /// Human-readable label including parameters
    pub fn label(&self) -> String {
        match self {
            StrategyConfig::BasicBuy(s) => format!("basic_buy(top_k={})", s.top_k),
            StrategyConfig::HoldNHours(s) => {
                format!("hold_n_hours(top_k={}, hold={}h)", s.top_k, s.hold_hours)
            }
            StrategyConfig::ThresholdHold(s) => {
                format!("threshold_hold(threshold={}, hold={}h)", s.threshold, s.hold_hours)
            }
        }
    }
}

impl IntentPolicy for StrategyConfig {
    fn name(&self) -> &'static str {
        self.policy().name()
    }

    fn mark(&self, bars: &[ScoredBar]) -> Vec<Action> {
        self.policy().mark(bars)
    }
}
