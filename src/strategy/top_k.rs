//! Top-k buy selection per timestamp

use super::{IntentPolicy, ScoredBar};
use crate::intent::{Action, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Buy the `top_k` highest-scored tickers at every timestamp.
/// Exits are left to end-of-day liquidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBuy {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

pub(super) fn default_top_k() -> usize {
    3
}

impl Default for BasicBuy {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl IntentPolicy for BasicBuy {
    fn name(&self) -> &'static str {
        "basic_buy"
    }

    fn mark(&self, bars: &[ScoredBar]) -> Vec<Action> {
        let mut actions = vec![Action::None; bars.len()];
        for idx in top_k_indices(bars, self.top_k) {
            actions[idx] = Action::Buy;
        }
        actions
    }
}

/// Indices of the `k` best-scored bars at each timestamp. Ties keep input
/// order; unscored bars are never selected.
pub(super) fn top_k_indices(bars: &[ScoredBar], k: usize) -> Vec<usize> {
    let mut by_time: BTreeMap<Timestamp, Vec<usize>> = BTreeMap::new();
    for (idx, bar) in bars.iter().enumerate() {
        by_time.entry(bar.timestamp).or_default().push(idx);
    }

    let mut selected = Vec::new();
    for mut group in by_time.into_values() {
        group.retain(|&idx| bars[idx].usable_score().is_some());
        group.sort_by(|&a, &b| {
            let (sa, sb) = (bars[a].usable_score(), bars[b].usable_score());
            sb.unwrap_or(f64::MIN).total_cmp(&sa.unwrap_or(f64::MIN))
        });
        selected.extend(group.into_iter().take(k));
    }
    selected.sort_unstable();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::parse_timestamp;
    use rust_decimal_macros::dec;

    fn bar(ts: &str, ticker: &str, score: Option<f64>) -> ScoredBar {
        ScoredBar::new(parse_timestamp(ts).unwrap(), ticker, dec!(10), score)
    }

    #[test]
    fn test_top_k_per_timestamp() {
        let bars = vec![
            bar("2024-01-02 09:00:00", "A", Some(0.2)),
            bar("2024-01-02 09:00:00", "B", Some(0.9)),
            bar("2024-01-02 09:00:00", "C", Some(0.5)),
            bar("2024-01-02 10:00:00", "A", Some(0.1)),
        ];
        let actions = BasicBuy { top_k: 2 }.mark(&bars);
        assert_eq!(
            actions,
            vec![Action::None, Action::Buy, Action::Buy, Action::Buy]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let bars = vec![
            bar("2024-01-02 09:00:00", "A", Some(0.5)),
            bar("2024-01-02 09:00:00", "B", Some(0.5)),
        ];
        assert_eq!(top_k_indices(&bars, 1), vec![0]);
    }

    #[test]
    fn test_unscored_bars_never_selected() {
        let bars = vec![
            bar("2024-01-02 09:00:00", "A", None),
            bar("2024-01-02 09:00:00", "B", Some(f64::NAN)),
            bar("2024-01-02 09:00:00", "C", Some(0.1)),
        ];
        assert_eq!(top_k_indices(&bars, 3), vec![2]);
    }

    #[test]
    fn test_zero_k_selects_nothing() {
        let bars = vec![bar("2024-01-02 09:00:00", "A", Some(0.5))];
        assert!(top_k_indices(&bars, 0).is_empty());
    }
}
