use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a series, in the spirit of a dataframe `describe()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1). Zero for a single observation.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
}

pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample variance (n - 1).
pub fn variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64
}

pub fn std_dev(xs: &[f64]) -> f64 {
    variance(xs).sqrt()
}

/// Quantile of an ascending slice with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

pub fn describe(xs: &[f64]) -> Result<Summary, AnalyticsError> {
    if xs.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "cannot describe an empty series".to_string(),
        ));
    }
    if xs.iter().any(|x| !x.is_finite()) {
        return Err(AnalyticsError::Calculation(
            "series contains non-finite values".to_string(),
        ));
    }

    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = xs.len() as f64;
    let m = mean(xs);
    let m2 = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
    let m3 = xs.iter().map(|x| (x - m).powi(3)).sum::<f64>() / n;
    let m4 = xs.iter().map(|x| (x - m).powi(4)).sum::<f64>() / n;
    let (skewness, excess_kurtosis) = if m2 > 0.0 {
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    Ok(Summary {
        count: xs.len(),
        mean: m,
        std: std_dev(xs),
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
        skewness,
        excess_kurtosis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::white_noise;

    #[test]
    fn describes_a_small_sample() {
        let s = describe(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.mean, 3.0);
        assert!((s.std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!((s.min, s.q25, s.median, s.q75, s.max), (1.0, 2.0, 3.0, 4.0, 5.0));
        assert!(s.skewness.abs() < 1e-12);
    }

    #[test]
    fn quantiles_interpolate_between_ranks() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile(&sorted, 0.5), 25.0);
        assert_eq!(quantile(&sorted, 0.25), 17.5);
        assert_eq!(quantile(&sorted, 1.0), 40.0);
    }

    #[test]
    fn single_observation_has_zero_spread() {
        let s = describe(&[7.0]).unwrap();
        assert_eq!((s.std, s.min, s.median, s.max), (0.0, 7.0, 7.0, 7.0));
    }

    #[test]
    fn normal_noise_has_small_skew_and_kurtosis() {
        let s = describe(&white_noise(5000, 3)).unwrap();
        assert!(s.mean.abs() < 0.1);
        assert!((s.std - 1.0).abs() < 0.1);
        assert!(s.skewness.abs() < 0.2);
        assert!(s.excess_kurtosis.abs() < 0.3);
    }

    #[test]
    fn rejects_empty_and_non_finite_input() {
        assert!(describe(&[]).is_err());
        assert!(describe(&[1.0, f64::NAN]).is_err());
    }
}
