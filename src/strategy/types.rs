//! Strategy input types

use crate::intent::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One model-scored price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBar {
    pub timestamp: Timestamp,
    pub ticker: String,
    pub price: Decimal,
    /// Model score, e.g. predicted probability of an up move
    pub score: Option<f64>,
}

impl ScoredBar {
    pub fn new(
        timestamp: Timestamp,
        ticker: impl Into<String>,
        price: Decimal,
        score: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            price,
            score,
        }
    }

    /// Score usable for ranking; NaN counts as missing
    pub fn usable_score(&self) -> Option<f64> {
        self.score.filter(|s| !s.is_nan())
    }
}
