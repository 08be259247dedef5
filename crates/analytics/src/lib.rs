//! # Driftscope Analytics Engine
//!
//! This crate provides the statistics behind a stationarity study of a daily price
//! series: transforms, descriptive statistics, autocorrelation, moving averages, unit-root
//! and stationarity tests, and the informal modeling recommendations derived from them.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of files, networks or terminals.
//!   It depends only on `core-types` and on the `AnalysisSettings` from `configuration`.
//! - **Stateless Calculation:** Every function takes slices and returns values. The
//!   `AnalyticsEngine` only sequences them into a `StationarityReport`. This makes the
//!   crate easy to test with synthetic series.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Runs the full analysis of one column of a `PriceTable`.
//! - `StationarityReport`: The serializable result, one `TransformAnalysis` per transform.
//! - The building blocks (`transforms`, `summary`, `acf`, `rolling`, `stationarity`,
//!   `recommend`) are public for callers that need a single statistic.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod acf;
pub mod engine;
pub mod error;
pub mod recommend;
pub mod report;
pub mod rolling;
pub mod stationarity;
pub mod summary;
pub mod transforms;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export the key components to create a clean, public-facing API.
pub use acf::LjungBox;
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use recommend::{Recommendation, RecommendationKind};
pub use report::{ColumnSummary, RollingStats, SquaredReturns, StationarityReport, TransformAnalysis};
pub use stationarity::{AdfResult, CriticalValues, KpssResult, Stability, StationarityCheck, Verdict};
pub use summary::Summary;

/// The smallest series the unit-root tests accept.
pub const MIN_OBSERVATIONS: usize = 10;
