//! # FX Pairs Strategy Library
//!
//! The rolling z-score mean-reversion strategy on the spread of two
//! instruments.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no rendering. The strategy turns a
//!   `PriceTable` into structured `TradeSignal` events; what happens to them
//!   is the caller's business.
//! - **Explicit state:** the position is a tagged `SignalState`
//!   (`Flat | Holding(z)`), driven by the `ZScoreReversion` machine, which can
//!   be tested without any price data.
//!
//! ## Public API
//!
//! - `SignalScan`: the lazy iterator over a table.
//! - `ZScoreReversion`, `SignalState`, `WindowStats`: the building blocks.
//! - `StrategyError`: everything that can stop a scan.

pub mod error;
pub mod scan;
pub mod zscore_reversion;

pub use error::StrategyError;
pub use scan::SignalScan;
pub use zscore_reversion::{SignalState, WindowStats, ZScoreReversion};
