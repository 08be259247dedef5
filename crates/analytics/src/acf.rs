//! Autocorrelation analysis.

use crate::error::AnalyticsError;
use crate::summary::mean;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Autocorrelation function for lags `0..=max_lag`.
///
/// Uses the biased estimator `r_k = Σ(x_t - m)(x_{t-k} - m) / Σ(x_t - m)^2`, which keeps the
/// sequence positive semi-definite. `max_lag` is clamped to `n - 1`.
pub fn acf(xs: &[f64], max_lag: usize) -> Result<Vec<f64>, AnalyticsError> {
    let n = xs.len();
    if n < 2 {
        return Err(AnalyticsError::NotEnoughData(format!(
            "autocorrelation needs at least 2 observations, got {}",
            n
        )));
    }

    let max_lag = max_lag.min(n - 1);
    let m = mean(xs);
    let centered: Vec<f64> = xs.iter().map(|x| x - m).collect();
    let denominator: f64 = centered.iter().map(|c| c * c).sum();

    // RMS deviation indistinguishable from rounding noise around the mean.
    if (denominator / n as f64).sqrt() <= 1e-12 * m.abs().max(1.0) {
        return Err(AnalyticsError::ZeroVariance(format!("{} observations", n)));
    }

    Ok((0..=max_lag)
        .map(|lag| {
            if lag == 0 {
                return 1.0;
            }
            let sum: f64 = centered[lag..]
                .iter()
                .zip(&centered[..n - lag])
                .map(|(a, b)| a * b)
                .sum();
            sum / denominator
        })
        .collect())
}

/// Partial autocorrelation function via the Durbin-Levinson recursion.
pub fn pacf(xs: &[f64], max_lag: usize) -> Result<Vec<f64>, AnalyticsError> {
    let rho = acf(xs, max_lag)?;
    let max_lag = rho.len() - 1;
    let mut out = vec![0.0; max_lag + 1];
    out[0] = 1.0;
    if max_lag == 0 {
        return Ok(out);
    }

    // phi[k][j]: j-th coefficient of the AR(k) fit.
    let mut phi = vec![vec![0.0; max_lag + 1]; max_lag + 1];
    phi[1][1] = rho[1];
    out[1] = rho[1];

    for k in 2..=max_lag {
        let num = rho[k] - (1..k).map(|j| phi[k - 1][j] * rho[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi[k - 1][j] * rho[j]).sum::<f64>();
        if den.abs() < 1e-12 {
            break;
        }

        phi[k][k] = num / den;
        out[k] = phi[k][k];
        for j in 1..k {
            phi[k][j] = phi[k - 1][j] - phi[k][k] * phi[k - 1][k - j];
        }
    }

    Ok(out)
}

/// Half-width of the white-noise band for ACF/PACF plots: `z_{(1+level)/2} / sqrt(n)`.
pub fn confidence_bound(n: usize, level: f64) -> Result<f64, AnalyticsError> {
    if n == 0 {
        return Err(AnalyticsError::NotEnoughData(
            "confidence bound of an empty series".to_string(),
        ));
    }
    if !(level > 0.0 && level < 1.0) {
        return Err(AnalyticsError::InvalidParameter(format!(
            "confidence level must be in (0, 1), got {}",
            level
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Calculation(e.to_string()))?;
    let z = normal.inverse_cdf(0.5 + level / 2.0);
    Ok(z / (n as f64).sqrt())
}

/// Lags `k >= 1` whose coefficient lies outside `±bound`.
pub fn significant_lags(values: &[f64], bound: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, v)| v.abs() > bound)
        .map(|(lag, _)| lag)
        .collect()
}

/// Result of the Ljung-Box portmanteau test. H0: no autocorrelation up to `lags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LjungBox {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

impl LjungBox {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// `Q = n(n+2) Σ_{k=1}^{h} r_k^2 / (n-k)`, compared against `χ²(h)`.
pub fn ljung_box(xs: &[f64], lags: usize) -> Result<LjungBox, AnalyticsError> {
    if lags == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "Ljung-Box needs at least one lag".to_string(),
        ));
    }
    let rho = acf(xs, lags)?;
    let n = xs.len() as f64;
    let lags = rho.len() - 1;

    let q = n
        * (n + 2.0)
        * rho
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, r)| r * r / (n - k as f64))
            .sum::<f64>();

    let chi2 = ChiSquared::new(lags as f64).map_err(|e| AnalyticsError::Calculation(e.to_string()))?;
    let p_value = chi2.sf(q).clamp(0.0, 1.0);

    Ok(LjungBox {
        statistic: q,
        p_value,
        lags,
    })
}
