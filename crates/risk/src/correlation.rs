use crate::stats::covariance;
use serde::{Deserialize, Serialize};
use vigil_ports::{RiskError, RiskResult};

/// Default threshold above which two holdings count as concentrated
/// in the same risk.
pub const HIGH_CORRELATION_THRESHOLD: f64 = 0.7;

/// Two holdings whose returns move together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub ticker_a: String,
    pub ticker_b: String,
    pub correlation: f64,
}

/// Pearson correlation matrix of aligned return series (one row per
/// asset). An asset with zero variance correlates 0 with everything
/// and 1 with itself.
pub fn correlation_matrix(series: &[Vec<f64>]) -> RiskResult<Vec<Vec<f64>>> {
    let n = series.len();
    if n == 0 {
        return Err(RiskError::InputShape("no return series".to_string()));
    }
    let n_obs = series[0].len();
    if n_obs < 2 {
        return Err(RiskError::InputShape(format!(
            "need at least 2 observations, got {n_obs}"
        )));
    }
    if let Some(bad) = series.iter().find(|s| s.len() != n_obs) {
        return Err(RiskError::InputShape(format!(
            "series lengths differ: expected {}, found {}",
            n_obs,
            bad.len()
        )));
    }

    let cov = covariance(series);
    let std_devs: Vec<f64> = (0..n).map(|i| cov[i][i].sqrt()).collect();

    let mut corr = vec![vec![0.0; n]; n];
    for (i, row) in corr.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = if i == j {
                1.0
            } else if std_devs[i] > 0.0 && std_devs[j] > 0.0 {
                (cov[i][j] / (std_devs[i] * std_devs[j])).clamp(-1.0, 1.0)
            } else {
                0.0
            };
        }
    }
    Ok(corr)
}

/// Pairs whose absolute correlation exceeds `threshold`, ordered by
/// strength so the report leads with the worst concentration.
pub fn high_correlation_pairs(
    tickers: &[String],
    series: &[Vec<f64>],
    threshold: f64,
) -> RiskResult<Vec<CorrelatedPair>> {
    if tickers.len() != series.len() {
        return Err(RiskError::InputShape(format!(
            "{} tickers for {} return series",
            tickers.len(),
            series.len()
        )));
    }
    let corr = correlation_matrix(series)?;

    let mut pairs = Vec::new();
    for i in 0..tickers.len() {
        for j in (i + 1)..tickers.len() {
            if corr[i][j].abs() > threshold {
                pairs.push(CorrelatedPair {
                    ticker_a: tickers[i].clone(),
                    ticker_b: tickers[j].clone(),
                    correlation: corr[i][j],
                });
            }
        }
    }
    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn identical_series_correlate_perfectly() {
        let series = vec![vec![0.01, -0.02, 0.03, 0.005], vec![0.01, -0.02, 0.03, 0.005]];
        let corr = correlation_matrix(&series).unwrap();
        assert!((corr[0][1] - 1.0).abs() < 1e-12);
        assert!((corr[0][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mirrored_series_correlate_negatively() {
        let a = vec![0.01, -0.02, 0.03, 0.005];
        let b: Vec<f64> = a.iter().map(|r| -r).collect();
        let corr = correlation_matrix(&[a, b].to_vec()).unwrap();
        assert!((corr[0][1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_series_correlates_zero() {
        let series = vec![vec![0.01, -0.02, 0.03], vec![0.0, 0.0, 0.0]];
        let corr = correlation_matrix(&series).unwrap();
        assert_eq!(corr[0][1], 0.0);
        assert_eq!(corr[1][1], 1.0);
    }

    #[test]
    fn only_pairs_above_threshold_are_reported() {
        let a = vec![0.010, -0.020, 0.030, 0.005, -0.010, 0.020];
        let b = a.clone(); // correlation 1.0 with a
        let c = vec![0.003, 0.021, -0.014, 0.002, 0.017, -0.009];
        let pairs = high_correlation_pairs(
            &tickers(&["AAA", "BBB", "CCC"]),
            &[a, b, c].to_vec(),
            HIGH_CORRELATION_THRESHOLD,
        )
        .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].ticker_a, "AAA");
        assert_eq!(pairs[0].ticker_b, "BBB");
        assert!(pairs[0].correlation > 0.99);
    }

    #[test]
    fn strongest_pair_comes_first() {
        let a = vec![0.010, -0.020, 0.030, 0.005, -0.010, 0.020];
        let b = a.clone();
        let c: Vec<f64> = a.iter().map(|r| -r).collect();
        let pairs =
            high_correlation_pairs(&tickers(&["AAA", "BBB", "CCC"]), &[a, b, c].to_vec(), 0.5)
                .unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs[0].correlation.abs() >= pairs[2].correlation.abs());
    }

    #[test]
    fn short_series_are_rejected() {
        let err = correlation_matrix(&[vec![0.01]]).unwrap_err();
        assert!(matches!(err, RiskError::InputShape(_)));
    }

    #[test]
    fn ticker_count_must_match_series_count() {
        let err = high_correlation_pairs(&tickers(&["AAA"]), &[], 0.7).unwrap_err();
        assert!(matches!(err, RiskError::InputShape(_)));
    }
}
