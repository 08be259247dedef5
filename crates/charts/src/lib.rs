//! # Driftscope Charts
//!
//! Plain-text plots for terminals and log files: a line chart of a series with an optional
//! overlay (the moving average), and a horizontal bar chart of autocorrelation coefficients.
//! Every renderer returns a `String`; printing is left to the caller.

pub mod acf;
pub mod error;
pub mod line;

pub use acf::acf_chart;
pub use error::ChartError;
pub use line::{line_chart, ChartOptions};

/// Smallest accepted chart width, in characters.
pub const MIN_WIDTH: usize = 10;
/// Smallest accepted line-chart height, in rows.
pub const MIN_HEIGHT: usize = 4;
