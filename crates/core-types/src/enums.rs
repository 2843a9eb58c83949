use serde::{Deserialize, Serialize};
use std::fmt;

/// How price columns fetched independently are joined onto one date index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Keep only the dates on which every instrument has a close.
    #[default]
    Intersection,
    /// Union of all dates, carrying the last close forward. Leading rows
    /// before every instrument has started trading are dropped.
    ForwardFill,
}

/// The side taken on each leg when entering a spread trade.
///
/// The spread is always `B - A`, so a low z-score means B is cheap relative
/// to A and the trade expects the spread to widen back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Spread too low: buy A, sell B.
    LongAShortB,
    /// Spread too high: buy B, sell A.
    LongBShortA,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LongAShortB => write!(f, "LONG A, SHORT B"),
            Direction::LongBShortA => write!(f, "LONG B, SHORT A"),
        }
    }
}
