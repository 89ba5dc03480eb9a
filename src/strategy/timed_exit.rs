//! Strategies that exit a fixed number of hours after entry

use super::top_k::{default_top_k, top_k_indices};
use super::{IntentPolicy, ScoredBar};
use crate::intent::{Action, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_hold_hours() -> u32 {
    3
}
fn default_threshold() -> f64 {
    0.7
}

/// Top-k buys, each sold `hold_hours` later if that bar exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldNHours {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_hold_hours")]
    pub hold_hours: u32,
}

impl Default for HoldNHours {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            hold_hours: default_hold_hours(),
        }
    }
}

impl IntentPolicy for HoldNHours {
    fn name(&self) -> &'static str {
        "hold_n_hours"
    }

    fn mark(&self, bars: &[ScoredBar]) -> Vec<Action> {
        let buys = top_k_indices(bars, self.top_k);
        mark_with_exits(bars, &buys, self.hold_hours)
    }
}

/// Buy whenever the score exceeds `threshold`, sell `hold_hours` later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdHold {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_hold_hours")]
    pub hold_hours: u32,
}

impl Default for ThresholdHold {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            hold_hours: default_hold_hours(),
        }
    }
}

impl IntentPolicy for ThresholdHold {
    fn name(&self) -> &'static str {
        "threshold_hold"
    }

    fn mark(&self, bars: &[ScoredBar]) -> Vec<Action> {
        let buys: Vec<usize> = bars
            .iter()
            .enumerate()
            .filter(|(_, bar)| bar.usable_score().is_some_and(|s| s > self.threshold))
            .map(|(idx, _)| idx)
            .collect();
        mark_with_exits(bars, &buys, self.hold_hours)
    }
}

/// Mark `buys` as buys, then mark the same ticker's bar exactly `hold_hours`
/// after each buy as a sell. A sell mark overwrites a buy mark.
fn mark_with_exits(bars: &[ScoredBar], buys: &[usize], hold_hours: u32) -> Vec<Action> {
    let mut actions = vec![Action::None; bars.len()];
    for &idx in buys {
        actions[idx] = Action::Buy;
    }

    let mut index: HashMap<(&str, Timestamp), Vec<usize>> = HashMap::new();
    for (idx, bar) in bars.iter().enumerate() {
        index
            .entry((bar.ticker.as_str(), bar.timestamp))
            .or_default()
            .push(idx);
    }

    let hold = Duration::hours(i64::from(hold_hours));
    for &idx in buys {
        let bar = &bars[idx];
        if let Some(exits) = index.get(&(bar.ticker.as_str(), bar.timestamp + hold)) {
            for &exit in exits {
                actions[exit] = Action::Sell;
            }
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::parse_timestamp;
    use rust_decimal_macros::dec;

    fn bar(ts: &str, ticker: &str, score: f64) -> ScoredBar {
        ScoredBar::new(parse_timestamp(ts).unwrap(), ticker, dec!(10), Some(score))
    }

    #[test]
    fn test_hold_n_hours_marks_exit() {
        let bars = vec![
            bar("2024-01-02 09:00:00", "A", 0.9),
            bar("2024-01-02 10:00:00", "A", 0.1),
            bar("2024-01-02 12:00:00", "A", 0.1),
        ];
        let policy = HoldNHours {
            top_k: 1,
            hold_hours: 3,
        };
        // Every timestamp has a single bar, so each is a top-1 buy; the 12:00
        // bar is also the exit for the 09:00 buy.
        assert_eq!(
            policy.mark(&bars),
            vec![Action::Buy, Action::Buy, Action::Sell]
        );
    }

    #[test]
    fn test_missing_exit_bar_leaves_position_to_eod() {
        let bars = vec![
            bar("2024-01-02 09:00:00", "A", 0.9),
            bar("2024-01-02 11:00:00", "B", 0.1),
        ];
        let policy = ThresholdHold {
            threshold: 0.5,
            hold_hours: 2,
        };
        // Exit bar exists only for a different ticker
        assert_eq!(policy.mark(&bars), vec![Action::Buy, Action::None]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let bars = vec![
            bar("2024-01-02 09:00:00", "A", 0.7),
            bar("2024-01-02 09:00:00", "B", 0.71),
            bar("2024-01-02 12:00:00", "B", 0.0),
        ];
        let policy = ThresholdHold::default();
        assert_eq!(
            policy.mark(&bars),
            vec![Action::None, Action::Buy, Action::Sell]
        );
    }

    #[test]
    fn test_exit_matches_instant_across_offsets() {
        let bars = vec![
            bar("2024-01-02T09:00:00-05:00", "A", 0.9),
            bar("2024-01-02T17:00:00+00:00", "A", 0.0),
        ];
        let policy = ThresholdHold {
            threshold: 0.5,
            hold_hours: 3,
        };
        assert_eq!(policy.mark(&bars), vec![Action::Buy, Action::Sell]);
    }
}
