use crate::error::ConfigError;
use core_types::{MissingPolicy, PriceField};
use serde::Deserialize;
use std::path::PathBuf;

/// Smallest chart the text renderer can lay out.
pub const MIN_CHART_WIDTH: usize = 10;
pub const MIN_CHART_HEIGHT: usize = 4;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its `Default` impl, so an empty (or absent) file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub analysis: AnalysisSettings,
    pub charts: ChartSettings,
    pub fetch: FetchSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Rejects values that would make the analysis meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.charts.validate()?;

        if self.fetch.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.concurrency must be at least 1".to_string(),
            ));
        }
        if self.data.symbol.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "data.symbol must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the price history lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Path of the daily price CSV.
    pub input: PathBuf,
    /// The asset symbol, used in report headers and as the exchange pair when fetching.
    pub symbol: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/prices.csv"),
            symbol: "BTCUSDT".to_string(),
        }
    }
}

/// Parameters of the stationarity analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// The column that is analysed.
    pub field: PriceField,
    /// Largest lag of the ACF/PACF and of the Ljung-Box test.
    pub max_lag: usize,
    /// Window of the simple moving average and rolling standard deviation.
    pub sma_window: usize,
    /// Confidence level of the ACF significance bounds, e.g. 0.95.
    pub confidence: f64,
    /// Fixed lag order for the ADF regression. `None` picks one from the sample size.
    pub adf_max_lag: Option<usize>,
    pub missing_policy: MissingPolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            field: PriceField::Close,
            max_lag: 30,
            sma_window: 30,
            confidence: 0.95,
            adf_max_lag: None,
            missing_policy: MissingPolicy::Drop,
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lag == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.max_lag must be at least 1".to_string(),
            ));
        }
        if self.sma_window == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.sma_window must be at least 1".to_string(),
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "analysis.confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// Text chart rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub enabled: bool,
    pub width: usize,
    pub height: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 72,
            height: 14,
        }
    }
}

impl ChartSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_CHART_WIDTH || self.height < MIN_CHART_HEIGHT {
            return Err(ConfigError::ValidationError(format!(
                "charts must be at least {}x{}, got {}x{}",
                MIN_CHART_WIDTH, MIN_CHART_HEIGHT, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Settings for downloading daily history from the exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Base URL of the public spot REST API.
    pub base_url: String,
    /// Maximum number of monthly windows requested at the same time.
    pub concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            concurrency: 4,
        }
    }
}

/// Log output. `RUST_LOG` takes precedence over `level` when it is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "driftscope.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn zero_lag_and_window_are_rejected() {
        let mut analysis = AnalysisSettings::default();
        analysis.max_lag = 0;
        assert!(analysis.validate().is_err());

        let mut analysis = AnalysisSettings::default();
        analysis.sma_window = 0;
        assert!(analysis.validate().is_err());
    }

    #[test]
    fn confidence_must_be_a_probability() {
        for confidence in [0.0, 1.0, -0.2, f64::NAN] {
            let analysis = AnalysisSettings {
                confidence,
                ..AnalysisSettings::default()
            };
            assert!(analysis.validate().is_err(), "accepted {}", confidence);
        }
    }

    #[test]
    fn tiny_charts_are_rejected() {
        let charts = ChartSettings {
            width: 5,
            ..ChartSettings::default()
        };
        assert!(charts.validate().is_err());
    }
}
