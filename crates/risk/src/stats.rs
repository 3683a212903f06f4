//! Small numerical helpers shared across the engine.

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentile with linear interpolation between closest ranks,
/// matching the numpy default. `pct` is in [0, 100].
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Per-asset mean of a returns matrix (one row per asset).
pub fn mean_returns(series: &[Vec<f64>]) -> Vec<f64> {
    series.iter().map(|row| mean(row)).collect()
}

/// Sample covariance matrix of a returns matrix (one row per asset,
/// columns aligned in time). Rows must be equal length and at least
/// two observations long; shorter input yields a zero matrix.
pub fn covariance(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n_assets = series.len();
    let mut cov = vec![vec![0.0; n_assets]; n_assets];
    let n_obs = series.first().map(|s| s.len()).unwrap_or(0);
    if n_obs < 2 || series.iter().any(|s| s.len() != n_obs) {
        return cov;
    }

    let means = mean_returns(series);
    for i in 0..n_assets {
        for j in i..n_assets {
            let mut acc = 0.0;
            for t in 0..n_obs {
                acc += (series[i][t] - means[i]) * (series[j][t] - means[j]);
            }
            let c = acc / (n_obs - 1) as f64;
            cov[i][j] = c;
            cov[j][i] = c;
        }
    }
    cov
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_linearly() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&values, 100.0) - 4.0).abs() < 1e-12);
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
        // numpy: percentile([1,2,3,4], 25) == 1.75
        assert!((percentile(&values, 25.0) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn percentile_handles_unsorted_input() {
        let values = vec![4.0, 1.0, 3.0, 2.0];
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn covariance_of_identical_series_is_variance() {
        let series = vec![vec![0.01, -0.02, 0.03], vec![0.01, -0.02, 0.03]];
        let cov = covariance(&series);
        assert!((cov[0][0] - cov[0][1]).abs() < 1e-12);
        assert!((cov[0][0] - cov[1][1]).abs() < 1e-12);
        assert!(cov[0][0] > 0.0);
    }

    #[test]
    fn covariance_is_symmetric() {
        let series = vec![
            vec![0.01, -0.02, 0.03, 0.005],
            vec![-0.01, 0.01, -0.02, 0.002],
        ];
        let cov = covariance(&series);
        assert!((cov[0][1] - cov[1][0]).abs() < 1e-12);
    }
}
