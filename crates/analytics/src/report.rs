use crate::acf::LjungBox;
use crate::recommend::Recommendation;
use crate::stationarity::StationarityCheck;
use crate::summary::Summary;
use chrono::NaiveDate;
use core_types::{PriceField, Series, Transform};
use serde::Serialize;

/// Everything computed for one transform of the analysed column.
#[derive(Debug, Clone, Serialize)]
pub struct TransformAnalysis {
    pub transform: Transform,
    pub series: Series,
    pub observations: usize,
    pub summary: Summary,
    pub acf: Vec<f64>,
    pub pacf: Vec<f64>,
    /// Half-width of the white-noise band at the configured confidence.
    pub acf_bound: f64,
    pub significant_acf_lags: Vec<usize>,
    pub significant_pacf_lags: Vec<usize>,
    pub ljung_box: LjungBox,
    pub stationarity: StationarityCheck,
}

impl TransformAnalysis {
    pub fn is_stationary(&self) -> bool {
        self.stationarity.verdict.is_stationary()
    }
}

/// Moving average and rolling standard deviation of the level, aligned with its dates.
#[derive(Debug, Clone, Serialize)]
pub struct RollingStats {
    pub window: usize,
    /// Window of the rolling standard deviation, at least 2.
    pub std_window: usize,
    pub sma: Vec<Option<f64>>,
    pub std: Vec<Option<f64>>,
}

/// Autocorrelation of squared log returns, a proxy for volatility clustering.
#[derive(Debug, Clone, Serialize)]
pub struct SquaredReturns {
    pub acf: Vec<f64>,
    pub acf_bound: f64,
    pub significant_lags: Vec<usize>,
    pub ljung_box: LjungBox,
}

/// One row of the `describe` output.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub field: PriceField,
    /// `None` when the column has no values at all.
    pub summary: Option<Summary>,
    pub missing: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationarityReport {
    pub symbol: String,
    pub field: PriceField,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub observations: usize,
    pub rolling: RollingStats,
    pub transforms: Vec<TransformAnalysis>,
    pub squared_returns: Option<SquaredReturns>,
    pub recommendations: Vec<Recommendation>,
}

impl StationarityReport {
    pub fn transform(&self, transform: Transform) -> Option<&TransformAnalysis> {
        self.transforms.iter().find(|t| t.transform == transform)
    }

    pub fn level(&self) -> Option<&TransformAnalysis> {
        self.transform(Transform::Level)
    }
}
