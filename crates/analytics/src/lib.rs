//! # FX Pairs Analytics
//!
//! Statistics behind the pairs reports: descriptive moments, Pearson
//! correlation, the augmented Dickey-Fuller test and the Engle-Granger
//! cointegration test.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O. Everything works on `f64` slices or on a
//!   `core_types::PriceTable`.
//! - **Deterministic:** identical input yields bit-identical reports.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: builds `CrossPairReport` and `PairReport`.
//! - `adf_test`, `engle_granger`, `half_life`: the individual tests.
//! - `AnalyticsError`: the error type for every fallible calculation.

pub mod cointegration;
pub mod engine;
pub mod error;
pub mod regression;
pub mod report;
pub mod stationarity;
pub mod stats;

pub use cointegration::{engle_granger, half_life, CointegrationResult};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{CrossPairReport, PairReport, ReturnStats};
pub use stationarity::{adf_test, mackinnon_crit, mackinnon_p, AdfResult, CriticalValues};
