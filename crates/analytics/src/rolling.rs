use crate::error::AnalyticsError;
use crate::summary::std_dev;
use ta::indicators::SimpleMovingAverage as Sma;
use ta::Next;

/// Simple moving average aligned with the input.
///
/// The first `window - 1` positions are `None` because the window is not yet full. The
/// `ta` indicator would report a partial average there, which is misleading on a chart.
pub fn sma(xs: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "moving average window must be at least 1".to_string(),
        ));
    }
    let mut indicator =
        Sma::new(window).map_err(|e| AnalyticsError::InvalidParameter(format!("{:?}", e)))?;

    Ok(xs
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let value = indicator.next(x);
            (i + 1 >= window).then_some(value)
        })
        .collect())
}

/// Rolling sample standard deviation, aligned like [`sma`].
pub fn rolling_std(xs: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    if window < 2 {
        return Err(AnalyticsError::InvalidParameter(
            "rolling standard deviation needs a window of at least 2".to_string(),
        ));
    }

    let mut out = vec![None; xs.len()];
    for (end, w) in xs.windows(window).enumerate() {
        out[end + window - 1] = Some(std_dev(w));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            match (a, e) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "{} != {}", a, e),
                (None, None) => {}
                _ => panic!("{:?} != {:?}", actual, expected),
            }
        }
    }

    #[test]
    fn sma_is_aligned_and_warms_up() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_close(&out, &[None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn sma_of_window_one_is_the_series() {
        let xs = [3.0, 1.0, 4.0];
        assert_close(&sma(&xs, 1).unwrap(), &[Some(3.0), Some(1.0), Some(4.0)]);
    }

    #[test]
    fn window_longer_than_series_yields_nothing() {
        assert!(sma(&[1.0, 2.0], 5).unwrap().iter().all(Option::is_none));
        assert!(rolling_std(&[1.0, 2.0], 5).unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn rejects_degenerate_windows() {
        assert!(sma(&[1.0], 0).is_err());
        assert!(rolling_std(&[1.0, 2.0], 1).is_err());
    }

    #[test]
    fn rolling_std_uses_sample_deviation() {
        let out = rolling_std(&[1.0, 3.0, 5.0, 5.0], 2).unwrap();
        let s = 2.0f64.sqrt();
        assert_close(&out, &[None, Some(s), Some(s), Some(0.0)]);
    }
}
