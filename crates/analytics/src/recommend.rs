//! Informal modeling recommendations read off the per-transform checks.

use crate::report::{SquaredReturns, TransformAnalysis};
use crate::stationarity::ALPHA;
use core_types::Transform;
use serde::Serialize;
use std::fmt;

/// Order hints are only given for short lags.
pub const MAX_ORDER_HINT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// The level has a unit root that differencing removes.
    Integrate { order: usize },
    LevelStationary,
    PreferLogReturns,
    ArOrder { p: usize },
    MaOrder { q: usize },
    RandomWalkBaseline,
    VolatilityClustering,
    NoStationaryTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub fn recommend(
    transforms: &[TransformAnalysis],
    squared_returns: Option<&SquaredReturns>,
) -> Vec<Recommendation> {
    let find = |t: Transform| transforms.iter().find(|a| a.transform == t);
    let level = find(Transform::Level);
    let diff = find(Transform::Diff);
    let log_diff = find(Transform::LogDiff);

    let mut out = Vec::new();
    let level_stationary = level.is_some_and(TransformAnalysis::is_stationary);
    let diff_stationary = diff.is_some_and(TransformAnalysis::is_stationary);
    let log_diff_stationary = log_diff.is_some_and(TransformAnalysis::is_stationary);

    if level_stationary {
        out.push(Recommendation::new(
            RecommendationKind::LevelStationary,
            "The level is already stationary; model it directly (d = 0).",
        ));
    } else if diff_stationary || log_diff_stationary {
        out.push(Recommendation::new(
            RecommendationKind::Integrate { order: 1 },
            "The level has a unit root but its first difference is stationary; \
             use an integrated model (d = 1).",
        ));
    }

    let prefer_log = match (diff, log_diff) {
        (Some(d), Some(l)) => {
            l.stationarity.stability.variance_ratio < d.stationarity.stability.variance_ratio
        }
        _ => false,
    };
    if prefer_log {
        out.push(Recommendation::new(
            RecommendationKind::PreferLogReturns,
            "Log returns have more stable variance than raw differences; prefer them.",
        ));
    }

    let chosen = if level_stationary {
        level
    } else if log_diff_stationary && (prefer_log || !diff_stationary) {
        log_diff
    } else if diff_stationary {
        diff
    } else {
        None
    };

    match chosen {
        Some(analysis) => out.extend(order_hints(analysis)),
        None => out.push(Recommendation::new(
            RecommendationKind::NoStationaryTransform,
            "No transform passed both tests; try a longer history or look for seasonality \
             and structural breaks.",
        )),
    }

    if let Some(squared) = squared_returns.filter(|s| !s.significant_lags.is_empty()) {
        out.push(Recommendation::new(
            RecommendationKind::VolatilityClustering,
            format!(
                "Squared log returns are autocorrelated at lags [{}] (Ljung-Box p = {:.4}); \
                 volatility clusters, consider a GARCH-type model.",
                squared
                    .significant_lags
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                squared.ljung_box.p_value
            ),
        ));
    }

    tracing::debug!(count = out.len(), "Recommendations derived");
    out
}

fn order_hints(analysis: &TransformAnalysis) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let name = analysis.transform.label();

    let ar = analysis
        .significant_pacf_lags
        .iter()
        .copied()
        .filter(|&lag| lag <= MAX_ORDER_HINT)
        .max();
    if let Some(p) = ar {
        out.push(Recommendation::new(
            RecommendationKind::ArOrder { p },
            format!("PACF of {} is significant up to lag {}; try AR({}).", name, p, p),
        ));
    }

    // A cut-off: every significant ACF lag falls within the short range.
    let acf_lags = &analysis.significant_acf_lags;
    if let Some(&q) = acf_lags.iter().max() {
        if q <= MAX_ORDER_HINT {
            out.push(Recommendation::new(
                RecommendationKind::MaOrder { q },
                format!("ACF of {} cuts off after lag {}; try MA({}).", name, q, q),
            ));
        }
    }

    if !analysis.ljung_box.is_significant(ALPHA) {
        let baseline = if analysis.transform.is_differenced() {
            "a random walk on the level is the baseline to beat"
        } else {
            "its mean is the baseline to beat"
        };
        out.push(Recommendation::new(
            RecommendationKind::RandomWalkBaseline,
            format!(
                "{} shows no significant autocorrelation (Ljung-Box p = {:.4}); {}.",
                name, analysis.ljung_box.p_value, baseline
            ),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acf::LjungBox;
    use crate::stationarity::{
        adf_critical_values, AdfResult, CriticalValues, KpssResult, Stability, StationarityCheck,
        Verdict,
    };
    use crate::summary::describe;
    use chrono::NaiveDate;
    use core_types::Series;

    struct Case {
        transform: Transform,
        verdict: Verdict,
        variance_ratio: f64,
        acf_lags: Vec<usize>,
        pacf_lags: Vec<usize>,
        ljung_box_p: f64,
    }

    fn case(transform: Transform, verdict: Verdict) -> Case {
        Case {
            transform,
            verdict,
            variance_ratio: 1.5,
            acf_lags: vec![],
            pacf_lags: vec![],
            ljung_box_p: 0.5,
        }
    }

    fn analysis(c: Case) -> TransformAnalysis {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = vec![start, start.succ_opt().unwrap()];
        let series = Series::new("close", dates, vec![1.0, 2.0]).unwrap();
        let ljung_box = LjungBox {
            statistic: 1.0,
            p_value: c.ljung_box_p,
            lags: 10,
        };
        TransformAnalysis {
            transform: c.transform,
            summary: describe(series.values()).unwrap(),
            series,
            observations: 100,
            acf: vec![1.0],
            pacf: vec![1.0],
            acf_bound: 0.2,
            significant_acf_lags: c.acf_lags,
            significant_pacf_lags: c.pacf_lags,
            ljung_box,
            stationarity: StationarityCheck {
                adf: AdfResult {
                    statistic: -1.0,
                    p_value: 0.5,
                    used_lag: 1,
                    n_obs: 98,
                    critical_values: adf_critical_values(98),
                },
                kpss: KpssResult {
                    statistic: 0.1,
                    p_value: 0.1,
                    lags: 4,
                    critical_values: CriticalValues {
                        one_pct: 0.739,
                        five_pct: 0.463,
                        ten_pct: 0.347,
                    },
                },
                stability: Stability {
                    first_mean: 0.0,
                    second_mean: 0.0,
                    first_std: 1.0,
                    second_std: 1.0,
                    mean_shift: 0.0,
                    variance_ratio: c.variance_ratio,
                },
                acf_lag1: 0.0,
                acf_slow_decay: false,
                verdict: c.verdict,
            },
        }
    }

    fn kinds(recs: &[Recommendation]) -> Vec<RecommendationKind> {
        recs.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn random_walk_prices_get_integration_and_baseline() {
        let transforms = vec![
            analysis(case(Transform::Level, Verdict::NonStationary)),
            analysis(case(Transform::Diff, Verdict::Stationary)),
            analysis(Case {
                variance_ratio: 1.1,
                ..case(Transform::LogDiff, Verdict::Stationary)
            }),
        ];
        let recs = recommend(&transforms, None);
        assert_eq!(
            kinds(&recs),
            vec![
                RecommendationKind::Integrate { order: 1 },
                RecommendationKind::PreferLogReturns,
                RecommendationKind::RandomWalkBaseline,
            ]
        );
        assert!(recs[2].message.contains("log_diff"));
    }

    #[test]
    fn stationary_level_is_modelled_directly() {
        let transforms = vec![analysis(Case {
            pacf_lags: vec![1, 2, 9],
            acf_lags: vec![1, 2, 3, 4, 5, 6, 7],
            ljung_box_p: 0.0,
            ..case(Transform::Level, Verdict::Stationary)
        })];
        let recs = recommend(&transforms, None);
        assert_eq!(
            kinds(&recs),
            vec![
                RecommendationKind::LevelStationary,
                RecommendationKind::ArOrder { p: 2 },
            ]
        );
    }

    #[test]
    fn short_acf_cut_off_suggests_ma_order() {
        let transforms = vec![
            analysis(case(Transform::Level, Verdict::NonStationary)),
            analysis(Case {
                acf_lags: vec![1],
                ljung_box_p: 0.001,
                ..case(Transform::Diff, Verdict::Stationary)
            }),
        ];
        let recs = recommend(&transforms, None);
        assert_eq!(
            kinds(&recs),
            vec![
                RecommendationKind::Integrate { order: 1 },
                RecommendationKind::MaOrder { q: 1 },
            ]
        );
    }

    #[test]
    fn nothing_stationary_is_reported() {
        let transforms = vec![
            analysis(case(Transform::Level, Verdict::NonStationary)),
            analysis(case(Transform::Diff, Verdict::Inconclusive)),
        ];
        let recs = recommend(&transforms, None);
        assert_eq!(kinds(&recs), vec![RecommendationKind::NoStationaryTransform]);
    }

    #[test]
    fn white_noise_level_gets_a_baseline() {
        let transforms = vec![analysis(Case {
            ljung_box_p: 0.8,
            ..case(Transform::Level, Verdict::Stationary)
        })];
        let recs = recommend(&transforms, None);
        assert_eq!(
            kinds(&recs),
            vec![
                RecommendationKind::LevelStationary,
                RecommendationKind::RandomWalkBaseline,
            ]
        );
        assert!(recs[1].message.contains("mean"));
    }

    fn squared(significant_lags: Vec<usize>, p_value: f64) -> SquaredReturns {
        SquaredReturns {
            acf: vec![1.0, 0.3, 0.25],
            acf_bound: 0.2,
            significant_lags,
            ljung_box: LjungBox {
                statistic: 80.0,
                p_value,
                lags: 10,
            },
        }
    }

    #[test]
    fn autocorrelated_squared_returns_flag_volatility_clustering() {
        let transforms = vec![analysis(case(Transform::Level, Verdict::Stationary))];
        let recs = recommend(&transforms, Some(&squared(vec![1, 2], 0.0001)));
        let last = recs.last().unwrap();
        assert_eq!(last.kind, RecommendationKind::VolatilityClustering);
        assert!(last.message.contains("[1, 2]"));
    }

    #[test]
    fn volatility_clustering_follows_the_squared_acf() {
        let transforms = vec![analysis(case(Transform::Level, Verdict::Stationary))];

        // A significant portmanteau test alone is not enough.
        let recs = recommend(&transforms, Some(&squared(vec![], 0.0001)));
        assert!(!kinds(&recs).contains(&RecommendationKind::VolatilityClustering));

        let recs = recommend(&transforms, Some(&squared(vec![3], 0.4)));
        assert!(kinds(&recs).contains(&RecommendationKind::VolatilityClustering));
    }
}
