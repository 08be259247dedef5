//! Unit-root and stationarity tests.
//!
//! The two tests have opposite null hypotheses: ADF assumes a unit root, KPSS assumes
//! level stationarity. A series is only called stationary when both agree.

use crate::acf::acf;
use crate::error::AnalyticsError;
use crate::summary::{mean, variance};
use crate::transforms::diff;
use crate::MIN_OBSERVATIONS;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;

/// Significance level used for the verdict.
pub const ALPHA: f64 = 0.05;

/// Lag at which a still-large ACF is read as slow decay.
const SLOW_DECAY_LAG: usize = 10;

// MacKinnon (2010) response surface, constant only: b0 + b1/T + b2/T^2 + b3/T^3.
const ADF_CRITICAL_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const ADF_CRITICAL_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const ADF_CRITICAL_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

// MacKinnon (1994) p-value approximation, constant only.
const ADF_TAU_MAX: f64 = 2.74;
const ADF_TAU_MIN: f64 = -18.83;
const ADF_TAU_STAR: f64 = -1.61;
const ADF_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const ADF_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// Kwiatkowski et al. (1992), level stationarity.
const KPSS_CRITICAL: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const KPSS_P: [f64; 4] = [0.10, 0.05, 0.025, 0.01];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-statistic of the lagged level coefficient.
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    /// Observations in the regression after lagging.
    pub n_obs: usize,
    pub critical_values: CriticalValues,
}

impl AdfResult {
    /// True when the unit-root hypothesis is rejected at `alpha`.
    pub fn rejects_unit_root(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpssResult {
    pub statistic: f64,
    /// Interpolated from the critical-value table, so bounded to `[0.01, 0.10]`.
    pub p_value: f64,
    pub lags: usize,
    pub critical_values: CriticalValues,
}

impl KpssResult {
    /// True when level stationarity is rejected at `alpha`.
    pub fn rejects_stationarity(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// First half against second half of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stability {
    pub first_mean: f64,
    pub second_mean: f64,
    pub first_std: f64,
    pub second_std: f64,
    /// `|second_mean - first_mean|` in units of the pooled standard deviation.
    pub mean_shift: f64,
    /// Larger half variance over smaller; 1 means equal.
    pub variance_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Stationary,
    NonStationary,
    Inconclusive,
}

impl Verdict {
    pub fn from_tests(adf: &AdfResult, kpss: &KpssResult) -> Self {
        let adf_stationary = adf.rejects_unit_root(ALPHA);
        let kpss_stationary = !kpss.rejects_stationarity(ALPHA);
        match (adf_stationary, kpss_stationary) {
            (true, true) => Verdict::Stationary,
            (false, false) => Verdict::NonStationary,
            _ => Verdict::Inconclusive,
        }
    }

    pub fn is_stationary(self) -> bool {
        self == Verdict::Stationary
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Stationary => "stationary",
            Verdict::NonStationary => "non-stationary",
            Verdict::Inconclusive => "inconclusive",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityCheck {
    pub adf: AdfResult,
    pub kpss: KpssResult,
    pub stability: Stability,
    pub acf_lag1: f64,
    /// ACF still above 0.5 at lag 10 (or the last available lag).
    pub acf_slow_decay: bool,
    pub verdict: Verdict,
}

/// Augmented Dickey-Fuller test with a constant:
/// `Δy_t = α + β y_{t-1} + Σ_{i=1}^{p} γ_i Δy_{t-i} + ε_t`.
///
/// Without `max_lag` the lag order is `floor(12 (n/100)^{1/4})` (Schwert). Either way it is
/// capped so that the regression keeps at least a few residual degrees of freedom.
pub fn adf(xs: &[f64], max_lag: Option<usize>) -> Result<AdfResult, AnalyticsError> {
    let n = xs.len();
    if n < MIN_OBSERVATIONS {
        return Err(AnalyticsError::NotEnoughData(format!(
            "ADF needs at least {} observations, got {}",
            MIN_OBSERVATIONS, n
        )));
    }

    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
    // n - 1 - p observations against p + 2 regressors, keeping > 2 degrees of freedom.
    let cap = (n - 6) / 2;
    let lag = max_lag.unwrap_or(schwert).min(cap);

    let dy = diff(xs, 1)?;
    let n_obs = dy.len() - lag;
    let k = 2 + lag;

    let mut rows = Vec::with_capacity(n_obs * k);
    for t in lag..dy.len() {
        rows.push(1.0);
        rows.push(xs[t]);
        for i in 1..=lag {
            rows.push(dy[t - i]);
        }
    }
    let x = DMatrix::from_row_slice(n_obs, k, &rows);
    let y = DVector::from_column_slice(&dy[lag..]);

    let xtx_inv = (x.transpose() * &x).try_inverse().ok_or_else(|| {
        AnalyticsError::Calculation("ADF regression matrix is singular".to_string())
    })?;
    let beta = &xtx_inv * (x.transpose() * &y);
    let residuals = &y - &x * &beta;
    let sigma2 = residuals.norm_squared() / (n_obs - k) as f64;
    let se = (sigma2 * xtx_inv[(1, 1)]).sqrt();
    if !se.is_finite() || se <= 0.0 {
        return Err(AnalyticsError::DivisionByZero("adf standard error".to_string()));
    }
    let statistic = beta[1] / se;

    tracing::debug!(statistic, lag, n_obs, "ADF regression fitted");

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p(statistic)?,
        used_lag: lag,
        n_obs,
        critical_values: adf_critical_values(n_obs),
    })
}

/// Finite-sample ADF critical values for `n_obs` regression observations.
pub fn adf_critical_values(n_obs: usize) -> CriticalValues {
    let t = n_obs as f64;
    let surface = |b: [f64; 4]| b[0] + b[1] / t + b[2] / t.powi(2) + b[3] / t.powi(3);
    CriticalValues {
        one_pct: surface(ADF_CRITICAL_1),
        five_pct: surface(ADF_CRITICAL_5),
        ten_pct: surface(ADF_CRITICAL_10),
    }
}

fn mackinnon_p(statistic: f64) -> Result<f64, AnalyticsError> {
    if statistic > ADF_TAU_MAX {
        return Ok(1.0);
    }
    if statistic < ADF_TAU_MIN {
        return Ok(0.0);
    }
    let coefficients: &[f64] = if statistic <= ADF_TAU_STAR {
        &ADF_SMALL_P
    } else {
        &ADF_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Calculation(e.to_string()))?;
    Ok(normal.cdf(z))
}

/// KPSS test for level stationarity with a Bartlett-kernel (Newey-West) long-run variance.
pub fn kpss(xs: &[f64]) -> Result<KpssResult, AnalyticsError> {
    let n = xs.len();
    if n < MIN_OBSERVATIONS {
        return Err(AnalyticsError::NotEnoughData(format!(
            "KPSS needs at least {} observations, got {}",
            MIN_OBSERVATIONS, n
        )));
    }

    let m = mean(xs);
    let residuals: Vec<f64> = xs.iter().map(|x| x - m).collect();
    let lags = ((4.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize).min(n - 1);

    let autocov = |l: usize| -> f64 {
        residuals[l..]
            .iter()
            .zip(&residuals[..n - l])
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / n as f64
    };
    let mut long_run = autocov(0);
    for l in 1..=lags {
        let weight = 1.0 - l as f64 / (lags + 1) as f64;
        long_run += 2.0 * weight * autocov(l);
    }
    if long_run <= 0.0 {
        return Err(AnalyticsError::ZeroVariance(
            "KPSS long-run variance".to_string(),
        ));
    }

    let mut partial = 0.0;
    let eta: f64 = residuals
        .iter()
        .map(|r| {
            partial += r;
            partial * partial
        })
        .sum();
    let statistic = eta / ((n * n) as f64 * long_run);

    Ok(KpssResult {
        statistic,
        p_value: kpss_p(statistic),
        lags,
        critical_values: CriticalValues {
            one_pct: KPSS_CRITICAL[3],
            five_pct: KPSS_CRITICAL[1],
            ten_pct: KPSS_CRITICAL[0],
        },
    })
}

fn kpss_p(statistic: f64) -> f64 {
    if statistic <= KPSS_CRITICAL[0] {
        return KPSS_P[0];
    }
    for i in 1..KPSS_CRITICAL.len() {
        if statistic <= KPSS_CRITICAL[i] {
            let (c0, c1) = (KPSS_CRITICAL[i - 1], KPSS_CRITICAL[i]);
            let (p0, p1) = (KPSS_P[i - 1], KPSS_P[i]);
            return p0 + (statistic - c0) / (c1 - c0) * (p1 - p0);
        }
    }
    KPSS_P[KPSS_P.len() - 1]
}

/// Compares the first and second halves of the series.
pub fn stability(xs: &[f64]) -> Result<Stability, AnalyticsError> {
    if xs.len() < 4 {
        return Err(AnalyticsError::NotEnoughData(format!(
            "stability needs at least 4 observations, got {}",
            xs.len()
        )));
    }
    let (first, second) = xs.split_at(xs.len() / 2);
    let (v1, v2) = (variance(first), variance(second));
    if v1 <= 0.0 || v2 <= 0.0 {
        return Err(AnalyticsError::DivisionByZero(
            "variance ratio of a constant half".to_string(),
        ));
    }

    let (first_mean, second_mean) = (mean(first), mean(second));
    let pooled = ((v1 + v2) / 2.0).sqrt();
    Ok(Stability {
        first_mean,
        second_mean,
        first_std: v1.sqrt(),
        second_std: v2.sqrt(),
        mean_shift: (second_mean - first_mean).abs() / pooled,
        variance_ratio: v1.max(v2) / v1.min(v2),
    })
}

/// Runs every test on one series and combines them into a verdict.
pub fn assess(
    xs: &[f64],
    max_lag: usize,
    adf_max_lag: Option<usize>,
) -> Result<StationarityCheck, AnalyticsError> {
    let adf = adf(xs, adf_max_lag)?;
    let kpss = kpss(xs)?;
    let stability = stability(xs)?;

    let rho = acf(xs, max_lag.max(SLOW_DECAY_LAG))?;
    let acf_lag1 = rho.get(1).copied().unwrap_or(0.0);
    let decay_lag = SLOW_DECAY_LAG.min(rho.len() - 1);
    let acf_slow_decay = rho[decay_lag] > 0.5;

    let verdict = Verdict::from_tests(&adf, &kpss);
    tracing::debug!(
        adf_p = adf.p_value,
        kpss_p = kpss.p_value,
        %verdict,
        "Stationarity assessed"
    );

    Ok(StationarityCheck {
        adf,
        kpss,
        stability,
        acf_lag1,
        acf_slow_decay,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{random_walk, white_noise};

    fn adf_with_p(p_value: f64) -> AdfResult {
        AdfResult {
            statistic: 0.0,
            p_value,
            used_lag: 0,
            n_obs: 100,
            critical_values: adf_critical_values(100),
        }
    }

    fn kpss_with_p(p_value: f64) -> KpssResult {
        KpssResult {
            statistic: 0.0,
            p_value,
            lags: 0,
            critical_values: CriticalValues {
                one_pct: 0.739,
                five_pct: 0.463,
                ten_pct: 0.347,
            },
        }
    }

    #[test]
    fn critical_values_approach_the_asymptotic_ones() {
        let cv = adf_critical_values(100_000);
        assert!((cv.one_pct + 3.43).abs() < 0.01);
        assert!((cv.five_pct + 2.86).abs() < 0.01);
        assert!((cv.ten_pct + 2.57).abs() < 0.01);

        let small = adf_critical_values(50);
        assert!(small.one_pct < cv.one_pct);
    }

    #[test]
    fn mackinnon_p_is_monotone_and_matches_the_five_percent_point() {
        let p5 = mackinnon_p(-2.8615).unwrap();
        assert!((p5 - 0.05).abs() < 0.01, "p at the 5% critical value was {}", p5);
        assert!(mackinnon_p(-4.0).unwrap() < mackinnon_p(-2.0).unwrap());
        assert_eq!(mackinnon_p(-25.0).unwrap(), 0.0);
        assert_eq!(mackinnon_p(3.0).unwrap(), 1.0);
    }

    #[test]
    fn adf_rejects_unit_root_for_white_noise() {
        let xs = white_noise(500, 7);
        let result = adf(&xs, None).unwrap();
        assert!(result.statistic < result.critical_values.one_pct);
        assert!(result.rejects_unit_root(0.01));
        assert_eq!(result.used_lag, 17);
        assert_eq!(result.n_obs, 499 - 17);
    }

    #[test]
    fn adf_does_not_reject_for_random_walk() {
        let xs = random_walk(500, 11, 100.0);
        let result = adf(&xs, Some(1)).unwrap();
        assert!(!result.rejects_unit_root(0.01), "p = {}", result.p_value);
    }

    #[test]
    fn adf_caps_the_lag_on_short_series() {
        let xs = white_noise(12, 3);
        let result = adf(&xs, Some(50)).unwrap();
        assert_eq!(result.used_lag, 3);
        assert!(adf(&xs[..9], None).is_err());
    }

    #[test]
    fn kpss_accepts_white_noise_and_rejects_random_walk() {
        let noise = kpss(&white_noise(500, 5)).unwrap();
        assert!(!noise.rejects_stationarity(0.01), "stat = {}", noise.statistic);

        let walk = kpss(&random_walk(500, 5, 0.0)).unwrap();
        assert!(walk.rejects_stationarity(ALPHA), "stat = {}", walk.statistic);
        assert_eq!(walk.p_value, 0.01);
    }

    #[test]
    fn kpss_p_interpolates_between_table_points() {
        assert_eq!(kpss_p(0.1), 0.10);
        assert_eq!(kpss_p(2.0), 0.01);
        let mid = kpss_p((0.347 + 0.463) / 2.0);
        assert!((mid - 0.075).abs() < 1e-12);
    }

    #[test]
    fn stability_detects_a_level_shift() {
        let mut xs = white_noise(200, 9);
        for x in xs.iter_mut().skip(100) {
            *x += 10.0;
        }
        let s = stability(&xs).unwrap();
        assert!(s.mean_shift > 5.0);
        assert!(s.variance_ratio >= 1.0);

        assert!(stability(&[1.0, 1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn verdict_requires_both_tests_to_agree() {
        assert_eq!(
            Verdict::from_tests(&adf_with_p(0.01), &kpss_with_p(0.10)),
            Verdict::Stationary
        );
        assert_eq!(
            Verdict::from_tests(&adf_with_p(0.40), &kpss_with_p(0.01)),
            Verdict::NonStationary
        );
        assert_eq!(
            Verdict::from_tests(&adf_with_p(0.01), &kpss_with_p(0.01)),
            Verdict::Inconclusive
        );
        assert_eq!(
            Verdict::from_tests(&adf_with_p(0.40), &kpss_with_p(0.10)),
            Verdict::Inconclusive
        );
    }

    #[test]
    fn assess_flags_slow_decay_on_a_random_walk() {
        let check = assess(&random_walk(400, 21, 50.0), 20, None).unwrap();
        assert!(check.acf_lag1 > 0.9);
        assert!(check.acf_slow_decay);
        assert_ne!(check.verdict, Verdict::Stationary);

        let noise = assess(&white_noise(400, 21), 20, None).unwrap();
        assert!(!noise.acf_slow_decay);
        assert!(noise.adf.rejects_unit_root(ALPHA));
    }
}
