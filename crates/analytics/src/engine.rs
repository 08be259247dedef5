use crate::acf::{acf, confidence_bound, ljung_box, pacf, significant_lags};
use crate::error::AnalyticsError;
use crate::recommend::recommend;
use crate::report::{ColumnSummary, RollingStats, SquaredReturns, StationarityReport, TransformAnalysis};
use crate::rolling::{rolling_std, sma};
use crate::stationarity::assess;
use crate::summary::describe;
use crate::transforms::apply;
use crate::MIN_OBSERVATIONS;
use configuration::AnalysisSettings;
use core_types::{PriceField, PriceTable, Series, Transform};
use tracing::{debug, info, warn};

/// A stateless orchestrator that turns one column of a `PriceTable` into a `StationarityReport`.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for the stationarity study.
    ///
    /// # Arguments
    ///
    /// * `table` - The loaded price history.
    /// * `settings` - Column, lags, windows and the missing-value policy.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `StationarityReport` or an `AnalyticsError`. Failures on the
    /// level propagate; a transform that cannot be computed (non-positive prices for the log,
    /// a constant difference) is skipped with a warning.
    pub fn analyze(
        &self,
        table: &PriceTable,
        settings: &AnalysisSettings,
    ) -> Result<StationarityReport, AnalyticsError> {
        let level = table.series(settings.field, settings.missing_policy)?;
        if level.len() < MIN_OBSERVATIONS {
            return Err(AnalyticsError::NotEnoughData(format!(
                "{} has {} usable observations, at least {} are needed",
                settings.field,
                level.len(),
                MIN_OBSERVATIONS
            )));
        }
        let dropped = table.len() - level.len();
        if dropped > 0 {
            warn!(field = %settings.field, dropped, "Rows without a value were left out");
        }

        let std_window = settings.sma_window.max(2);
        let rolling = RollingStats {
            window: settings.sma_window,
            std_window,
            sma: sma(level.values(), settings.sma_window)?,
            std: rolling_std(level.values(), std_window)?,
        };

        let mut transforms = Vec::with_capacity(Transform::ALL.len());
        for transform in Transform::ALL {
            if transform == Transform::Level {
                transforms.push(self.analyze_transform(transform, level.clone(), settings)?);
                continue;
            }
            match apply(transform, &level)
                .and_then(|series| self.analyze_transform(transform, series, settings))
            {
                Ok(analysis) => transforms.push(analysis),
                Err(e) => warn!(%transform, error = %e, "Skipping transform"),
            }
        }

        let squared_returns = match transforms.iter().find(|t| t.transform == Transform::LogDiff) {
            Some(log_diff) => self.squared_returns(log_diff.series.values(), settings)?,
            None => None,
        };

        let recommendations = recommend(&transforms, squared_returns.as_ref());

        info!(
            symbol = table.symbol(),
            field = %settings.field,
            observations = level.len(),
            transforms = transforms.len(),
            "Stationarity analysis complete"
        );

        Ok(StationarityReport {
            symbol: table.symbol().to_string(),
            field: settings.field,
            first_date: level.dates()[0],
            last_date: level.dates()[level.len() - 1],
            observations: level.len(),
            rolling,
            transforms,
            squared_returns,
            recommendations,
        })
    }

    /// Descriptive statistics of every column, ignoring missing cells.
    pub fn describe_table(&self, table: &PriceTable) -> Vec<ColumnSummary> {
        PriceField::ALL
            .iter()
            .map(|&field| {
                let values: Vec<f64> = table.column(field).into_iter().flatten().collect();
                ColumnSummary {
                    field,
                    summary: describe(&values).ok(),
                    missing: table.missing(field),
                }
            })
            .collect()
    }

    fn analyze_transform(
        &self,
        transform: Transform,
        series: Series,
        settings: &AnalysisSettings,
    ) -> Result<TransformAnalysis, AnalyticsError> {
        let n = series.len();
        if n < MIN_OBSERVATIONS {
            return Err(AnalyticsError::NotEnoughData(format!(
                "{} has {} observations",
                series.name(),
                n
            )));
        }
        let xs = series.values();
        let max_lag = settings.max_lag.min(n - 1);

        let summary = describe(xs)?;
        let acf_values = acf(xs, max_lag)?;
        let pacf_values = pacf(xs, max_lag)?;
        let bound = confidence_bound(n, settings.confidence)?;
        let ljung_box = ljung_box(xs, max_lag)?;
        let stationarity = assess(xs, max_lag, settings.adf_max_lag)?;

        debug!(
            %transform,
            n,
            verdict = %stationarity.verdict,
            "Transform analysed"
        );

        Ok(TransformAnalysis {
            transform,
            observations: n,
            summary,
            significant_acf_lags: significant_lags(&acf_values, bound),
            significant_pacf_lags: significant_lags(&pacf_values, bound),
            acf: acf_values,
            pacf: pacf_values,
            acf_bound: bound,
            ljung_box,
            stationarity,
            series,
        })
    }

    fn squared_returns(
        &self,
        returns: &[f64],
        settings: &AnalysisSettings,
    ) -> Result<Option<SquaredReturns>, AnalyticsError> {
        let squared: Vec<f64> = returns.iter().map(|r| r * r).collect();
        let max_lag = settings.max_lag.min(squared.len() - 1);
        let acf_bound = confidence_bound(squared.len(), settings.confidence)?;
        match (acf(&squared, max_lag), ljung_box(&squared, max_lag)) {
            (Ok(acf), Ok(ljung_box)) => Ok(Some(SquaredReturns {
                significant_lags: significant_lags(&acf, acf_bound),
                acf,
                acf_bound,
                ljung_box,
            })),
            (Err(AnalyticsError::ZeroVariance(_)), _) | (_, Err(AnalyticsError::ZeroVariance(_))) => {
                Ok(None)
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }
}
