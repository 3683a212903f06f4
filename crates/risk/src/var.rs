use crate::stats::{mean, percentile};
use crate::types::{VaRMethod, VaRResult};
use vigil_ports::{RiskError, RiskResult};

/// z-scores of the standard normal at the supported confidence levels.
/// Fixed lookup instead of an inverse-CDF dependency.
const Z_SCORES: [(f64, f64); 2] = [(0.95, -1.6449), (0.99, -2.3263)];

/// Parametric CVaR shortcut: for the confidences supported here the
/// normal-tail expectation is close to 1.2x the VaR.
const CVAR_APPROX_FACTOR: f64 = 1.2;

fn z_score(confidence: f64) -> RiskResult<f64> {
    Z_SCORES
        .iter()
        .find(|(c, _)| (confidence - c).abs() < 1e-9)
        .map(|(_, z)| *z)
        .ok_or(RiskError::UnsupportedConfidence(confidence))
}

fn check_holding_period(days: u32) -> RiskResult<()> {
    if days < 1 {
        return Err(RiskError::InvalidParameter(
            "holding period must be at least one day".to_string(),
        ));
    }
    Ok(())
}

/// Historical-simulation VaR over aligned per-asset return series.
///
/// The portfolio daily return is the weighted sum of per-asset daily
/// returns; VaR is the (1-confidence) percentile of that series and
/// CVaR the mean of returns at or below it. Both scale by
/// sqrt(holding period).
pub fn historical_var(
    weights: &[f64],
    return_series: &[Vec<f64>],
    confidence: f64,
    holding_period_days: u32,
) -> RiskResult<VaRResult> {
    check_holding_period(holding_period_days)?;
    if !(0.0..1.0).contains(&confidence) || confidence <= 0.0 {
        return Err(RiskError::InvalidParameter(format!(
            "confidence {} is not in (0, 1)",
            confidence
        )));
    }
    if weights.len() != return_series.len() {
        return Err(RiskError::InputShape(format!(
            "{} weights for {} return series",
            weights.len(),
            return_series.len()
        )));
    }
    let n_obs = return_series.first().map(|s| s.len()).unwrap_or(0);
    if n_obs == 0 {
        return Err(RiskError::InputShape("empty return series".to_string()));
    }
    if let Some(bad) = return_series.iter().find(|s| s.len() != n_obs) {
        return Err(RiskError::InputShape(format!(
            "series lengths differ: expected {}, found {}",
            n_obs,
            bad.len()
        )));
    }

    let mut portfolio_returns = vec![0.0; n_obs];
    for (w, series) in weights.iter().zip(return_series) {
        for (acc, r) in portfolio_returns.iter_mut().zip(series) {
            *acc += w * r;
        }
    }

    let var_pct = percentile(&portfolio_returns, (1.0 - confidence) * 100.0);
    let tail: Vec<f64> = portfolio_returns
        .iter()
        .copied()
        .filter(|r| *r <= var_pct)
        .collect();
    // Degenerate small samples can leave the tail empty.
    let cvar_pct = if tail.is_empty() { var_pct } else { mean(&tail) };

    let scale = (holding_period_days as f64).sqrt();
    Ok(VaRResult {
        method: VaRMethod::Historical,
        confidence,
        holding_period_days,
        var_pct: var_pct * scale * 100.0,
        cvar_pct: cvar_pct * scale * 100.0,
    })
}

/// Variance-covariance (parametric) VaR under a normality assumption.
///
/// `VaR% = z * sqrt(w' Sigma w) * sqrt(holding period)`, with z taken
/// from the fixed two-level lookup.
pub fn parametric_var(
    weights: &[f64],
    mean_returns: &[f64],
    covariance: &[Vec<f64>],
    confidence: f64,
    holding_period_days: u32,
) -> RiskResult<VaRResult> {
    check_holding_period(holding_period_days)?;
    let z = z_score(confidence)?;
    let n = weights.len();
    if mean_returns.len() != n {
        return Err(RiskError::InputShape(format!(
            "{} weights for {} mean returns",
            n,
            mean_returns.len()
        )));
    }
    if covariance.len() != n || covariance.iter().any(|row| row.len() != n) {
        return Err(RiskError::InputShape(format!(
            "covariance matrix is not {n}x{n}"
        )));
    }

    // w' Sigma w
    let mut variance = 0.0;
    for i in 0..n {
        for j in 0..n {
            variance += weights[i] * covariance[i][j] * weights[j];
        }
    }
    if variance < 0.0 {
        return Err(RiskError::NonPositiveVariance(variance));
    }

    let scale = (holding_period_days as f64).sqrt();
    let var_pct = z * variance.sqrt() * scale * 100.0;
    Ok(VaRResult {
        method: VaRMethod::Parametric,
        confidence,
        holding_period_days,
        var_pct,
        cvar_pct: var_pct * CVAR_APPROX_FACTOR,
    })
}
