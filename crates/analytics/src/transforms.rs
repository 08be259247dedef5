use crate::error::AnalyticsError;
use core_types::{Series, Transform};

/// `x_t - x_{t-lag}`. The output is `lag` elements shorter than the input.
pub fn diff(xs: &[f64], lag: usize) -> Result<Vec<f64>, AnalyticsError> {
    if lag == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "difference lag must be at least 1".to_string(),
        ));
    }
    if xs.len() <= lag {
        return Ok(Vec::new());
    }
    Ok(xs[lag..].iter().zip(xs).map(|(a, b)| a - b).collect())
}

/// Natural logarithm of every value.
pub fn log(xs: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    xs.iter()
        .enumerate()
        .map(|(index, &value)| {
            if value > 0.0 {
                Ok(value.ln())
            } else {
                Err(AnalyticsError::NonPositive { index, value })
            }
        })
        .collect()
}

/// Log returns, `ln x_t - ln x_{t-1}`.
pub fn log_diff(xs: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    diff(&log(xs)?, 1)
}

/// Inverts a first difference: a running sum of `diffs` starting from `first`.
pub fn undiff(first: f64, diffs: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(diffs.len() + 1);
    out.push(first);
    let mut level = first;
    for d in diffs {
        level += d;
        out.push(level);
    }
    out
}

/// Simple returns, `x_t / x_{t-1} - 1`.
pub fn pct_change(xs: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    xs.windows(2)
        .map(|w| {
            if w[0] == 0.0 {
                Err(AnalyticsError::DivisionByZero("pct_change".to_string()))
            } else {
                Ok(w[1] / w[0] - 1.0)
            }
        })
        .collect()
}

/// Applies `transform` to a series, keeping dates aligned with the values.
/// Differencing drops the first date.
pub fn apply(transform: Transform, series: &Series) -> Result<Series, AnalyticsError> {
    let values = match transform {
        Transform::Level => return Ok(series.clone()),
        Transform::Log => log(series.values())?,
        Transform::Diff => diff(series.values(), 1)?,
        Transform::LogDiff => log_diff(series.values())?,
    };

    let skip = series.len() - values.len();
    let dates = series.dates()[skip..].to_vec();
    let name = format!("{}_{}", series.name(), transform.label());
    Ok(Series::new(name, dates, values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::random_walk;
    use chrono::NaiveDate;

    fn close(e: f64, a: f64) -> bool {
        (e - a).abs() < 1e-9
    }

    #[test]
    fn first_difference() {
        assert_eq!(diff(&[1.0, 4.0, 9.0, 16.0], 1).unwrap(), vec![3.0, 5.0, 7.0]);
        assert_eq!(diff(&[1.0, 4.0, 9.0, 16.0], 2).unwrap(), vec![8.0, 12.0]);
        assert!(diff(&[1.0], 1).unwrap().is_empty());
        assert!(diff(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn differencing_then_summing_reconstructs_the_series() {
        let xs = random_walk(250, 11, 100.0);
        let rebuilt = undiff(xs[0], &diff(&xs, 1).unwrap());
        assert_eq!(rebuilt.len(), xs.len());
        for (a, b) in xs.iter().zip(&rebuilt) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn log_diff_is_log_of_gross_return() {
        let xs = [100.0, 110.0, 99.0];
        let r = log_diff(&xs).unwrap();
        assert!(close((1.1f64).ln(), r[0]));
        assert!(close((0.9f64).ln(), r[1]));

        let pct = pct_change(&xs).unwrap();
        assert!(close(0.1, pct[0]));
        assert!(close(-0.1, pct[1]));
    }

    #[test]
    fn log_rejects_non_positive_values() {
        assert_eq!(
            log(&[1.0, 0.0, 2.0]).unwrap_err(),
            AnalyticsError::NonPositive {
                index: 1,
                value: 0.0
            }
        );
        assert!(pct_change(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn apply_keeps_dates_aligned() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let series = Series::new("close", vec![d(1), d(2), d(3)], vec![1.0, 2.0, 4.0]).unwrap();

        let level = apply(Transform::Level, &series).unwrap();
        assert_eq!(level, series);

        let diffed = apply(Transform::Diff, &series).unwrap();
        assert_eq!(diffed.name(), "close_diff");
        assert_eq!(diffed.dates(), &[d(2), d(3)]);
        assert_eq!(diffed.values(), &[1.0, 2.0]);

        let logged = apply(Transform::Log, &series).unwrap();
        assert_eq!(logged.dates(), series.dates());

        let returns = apply(Transform::LogDiff, &series).unwrap();
        assert_eq!(returns.len(), 2);
        assert!(close(returns.values()[1], (2.0f64).ln()));
    }
}
