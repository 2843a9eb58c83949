//! # Core Types
//!
//! Foundational data structures shared by every crate in the workspace: the
//! date-aligned `PriceTable` and the `TradeSignal` events emitted by the
//! spread backtest. This crate has no knowledge of providers, statistics or
//! rendering.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AlignmentPolicy, Direction};
pub use error::CoreError;
pub use structs::{instrument_label, PriceSeries, PriceTable, SignalKind, TradeSignal};
