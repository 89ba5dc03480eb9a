//! Intent table module
//!
//! Timestamped buy/sell intents produced by strategies and consumed by the
//! execution engine

mod table;
mod types;

pub use table::{DaySlice, IntentTable, TableError, MAX_PRICE};
pub use types::{from_utc, parse_timestamp, Action, Intent, Timestamp};
