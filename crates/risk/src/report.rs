use crate::correlation::{HIGH_CORRELATION_THRESHOLD, correlation_matrix, high_correlation_pairs};
use crate::grade::{RiskFactors, grade};
use crate::monte_carlo::run_monte_carlo;
use crate::stats::{covariance, mean_returns};
use crate::stress::{StressHolding, default_scenarios, run_stress_test};
use crate::types::RiskReport;
use crate::var::{historical_var, parametric_var};
use log::{debug, warn};
use vigil_core::Timestamp;
use vigil_ports::{RiskError, RiskResult};

/// One holding as the report generator sees it: valuation, the sector
/// used by the stress tester, and its daily return history.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHolding {
    pub ticker: String,
    pub sector: String,
    pub market_value: f64,
    pub returns: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportInputs {
    pub holdings: Vec<ReportHolding>,
}

/// Tunables for one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskEngineConfig {
    pub confidence: f64,
    pub holding_period_days: u32,
    pub mc_simulations: usize,
    pub mc_horizon_days: u32,
    pub correlation_threshold: f64,
}

impl Default for RiskEngineConfig {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            holding_period_days: 1,
            mc_simulations: 10_000,
            mc_horizon_days: 20,
            correlation_threshold: HIGH_CORRELATION_THRESHOLD,
        }
    }
}

/// Runs every section of the risk report, degrading instead of
/// failing: a section whose computation errors is logged and left out,
/// and the grade is built from whatever factors remain. Only inputs
/// that make every section impossible are a hard error.
pub fn generate_report(
    inputs: &ReportInputs,
    config: &RiskEngineConfig,
    now: Timestamp,
) -> RiskResult<RiskReport> {
    if inputs.holdings.is_empty() {
        return Err(RiskError::InputShape("no holdings".to_string()));
    }
    let portfolio_value: f64 = inputs.holdings.iter().map(|h| h.market_value).sum();
    if portfolio_value <= 0.0 {
        return Err(RiskError::InvalidParameter(format!(
            "portfolio value {portfolio_value} is not positive"
        )));
    }

    let weights: Vec<f64> = inputs
        .holdings
        .iter()
        .map(|h| h.market_value / portfolio_value)
        .collect();
    let tickers: Vec<String> = inputs.holdings.iter().map(|h| h.ticker.clone()).collect();
    let series = aligned_series(&inputs.holdings);

    let hist = historical_var(&weights, &series, config.confidence, config.holding_period_days)
        .map_err(|e| warn!("historical VaR unavailable: {e}"))
        .ok();

    let means = mean_returns(&series);
    let cov = covariance(&series);
    let param = parametric_var(
        &weights,
        &means,
        &cov,
        config.confidence,
        config.holding_period_days,
    )
    .map_err(|e| warn!("parametric VaR unavailable: {e}"))
    .ok();

    let monte_carlo = run_monte_carlo(
        &weights,
        &means,
        &cov,
        config.mc_horizon_days,
        config.mc_simulations,
    )
    .map_err(|e| warn!("Monte Carlo unavailable: {e}"))
    .ok();

    let high_correlations =
        high_correlation_pairs(&tickers, &series, config.correlation_threshold)
            .map_err(|e| warn!("correlation scan unavailable: {e}"))
            .unwrap_or_default();

    let stress_holdings: Vec<StressHolding> = inputs
        .holdings
        .iter()
        .map(|h| StressHolding {
            ticker: h.ticker.clone(),
            sector: h.sector.clone(),
            market_value: h.market_value,
        })
        .collect();
    let mut stress_results = Vec::new();
    for scenario in default_scenarios().values() {
        match run_stress_test(scenario, &stress_holdings) {
            Ok(result) => stress_results.push(result),
            Err(e) => warn!("stress scenario {} unavailable: {e}", scenario.name),
        }
    }

    let factors = RiskFactors {
        var95_pct: hist
            .as_ref()
            .or(param.as_ref())
            .map(|v| v.var_pct / (v.holding_period_days as f64).sqrt()),
        max_drawdown_pct: max_drawdown_pct(&weights, &series),
        concentration: weights.iter().copied().fold(None, |acc: Option<f64>, w| {
            Some(acc.map_or(w, |a| a.max(w)))
        }),
        avg_correlation: average_abs_correlation(&series),
        worst_stress_pct: stress_results
            .iter()
            .map(|s| s.portfolio_impact_pct)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v)))),
    };
    let (score, letter) = grade(&factors);

    Ok(RiskReport {
        generated_at: now,
        portfolio_value,
        historical_var: hist,
        parametric_var: param,
        monte_carlo,
        high_correlations,
        stress_results,
        grade: letter,
        score,
    })
}

/// Truncates ragged histories to the shortest one so every section
/// sees a rectangular matrix.
fn aligned_series(holdings: &[ReportHolding]) -> Vec<Vec<f64>> {
    let min_len = holdings.iter().map(|h| h.returns.len()).min().unwrap_or(0);
    if holdings.iter().any(|h| h.returns.len() != min_len) {
        debug!("truncating return histories to {min_len} observations");
    }
    holdings
        .iter()
        .map(|h| h.returns[..min_len].to_vec())
        .collect()
}

/// Worst peak-to-trough move of the compounded portfolio return path,
/// in percent (zero or negative).
fn max_drawdown_pct(weights: &[f64], series: &[Vec<f64>]) -> Option<f64> {
    let n_obs = series.first().map(|s| s.len())?;
    if n_obs == 0 {
        return None;
    }
    let mut value = 1.0;
    let mut peak = 1.0f64;
    let mut worst = 0.0f64;
    for t in 0..n_obs {
        let daily: f64 = weights
            .iter()
            .zip(series)
            .map(|(w, s)| w * s[t])
            .sum();
        value *= 1.0 + daily;
        peak = peak.max(value);
        worst = worst.min(value / peak - 1.0);
    }
    Some(worst * 100.0)
}

/// Mean absolute off-diagonal correlation; `None` below two assets.
fn average_abs_correlation(series: &[Vec<f64>]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let corr = correlation_matrix(series).ok()?;
    let n = corr.len();
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            sum += corr[i][j].abs();
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::RiskGrade;
    use chrono::Utc;

    fn holding(ticker: &str, value: f64, returns: Vec<f64>) -> ReportHolding {
        ReportHolding {
            ticker: ticker.to_string(),
            sector: "technology".to_string(),
            market_value: value,
            returns,
        }
    }

    fn small_config() -> RiskEngineConfig {
        RiskEngineConfig {
            mc_simulations: 200,
            mc_horizon_days: 5,
            ..RiskEngineConfig::default()
        }
    }

    fn two_holdings() -> ReportInputs {
        ReportInputs {
            holdings: vec![
                holding(
                    "AAA",
                    6000.0,
                    vec![0.010, -0.020, 0.015, -0.030, 0.005, 0.025, -0.010, 0.000],
                ),
                holding(
                    "BBB",
                    4000.0,
                    vec![-0.005, 0.010, -0.010, 0.020, 0.000, -0.015, 0.012, 0.003],
                ),
            ],
        }
    }

    #[test]
    fn full_inputs_produce_every_section() {
        let report = generate_report(&two_holdings(), &small_config(), Utc::now()).unwrap();
        assert!(report.unavailable_sections().is_empty());
        assert_eq!(report.stress_results.len(), 5);
        assert!((report.portfolio_value - 10_000.0).abs() < 1e-9);
        assert!(report.score <= 100);
    }

    #[test]
    fn ragged_histories_are_truncated_not_rejected() {
        let mut inputs = two_holdings();
        inputs.holdings[1].returns.truncate(5);
        let report = generate_report(&inputs, &small_config(), Utc::now()).unwrap();
        assert!(report.historical_var.is_some());
    }

    #[test]
    fn single_observation_degrades_without_failing() {
        let inputs = ReportInputs {
            holdings: vec![holding("AAA", 1000.0, vec![0.01])],
        };
        let report = generate_report(&inputs, &small_config(), Utc::now()).unwrap();
        // Not enough data to correlate, but the report still lands.
        assert!(report.high_correlations.is_empty());
        assert!(report.historical_var.is_some());
        assert_eq!(report.stress_results.len(), 5);
    }

    #[test]
    fn empty_holdings_are_a_hard_error() {
        let err = generate_report(&ReportInputs::default(), &small_config(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, RiskError::InputShape(_)));
    }

    #[test]
    fn worthless_portfolio_is_a_hard_error() {
        let inputs = ReportInputs {
            holdings: vec![holding("AAA", 0.0, vec![0.01, 0.02])],
        };
        let err = generate_report(&inputs, &small_config(), Utc::now()).unwrap_err();
        assert!(matches!(err, RiskError::InvalidParameter(_)));
    }

    #[test]
    fn calm_portfolio_grades_better_than_a_wild_one() {
        let calm = ReportInputs {
            holdings: vec![
                holding("AAA", 5000.0, vec![0.001, -0.001, 0.002, -0.001, 0.001, 0.000]),
                holding("BBB", 5000.0, vec![-0.001, 0.001, -0.001, 0.002, 0.000, 0.001]),
            ],
        };
        let wild = ReportInputs {
            holdings: vec![
                holding("AAA", 9000.0, vec![0.08, -0.09, 0.07, -0.10, 0.06, -0.08]),
                holding("BBB", 1000.0, vec![0.07, -0.08, 0.06, -0.09, 0.05, -0.07]),
            ],
        };
        let calm_report = generate_report(&calm, &small_config(), Utc::now()).unwrap();
        let wild_report = generate_report(&wild, &small_config(), Utc::now()).unwrap();
        assert!(calm_report.score < wild_report.score);
        assert_ne!(wild_report.grade, RiskGrade::A);
    }

    #[test]
    fn max_drawdown_tracks_peak_to_trough() {
        // +10% then -50%: trough sits 50% below the 1.10 peak.
        let dd = max_drawdown_pct(&[1.0], &[vec![0.10, -0.50]].to_vec()).unwrap();
        assert!((dd - (-50.0)).abs() < 1e-9);
    }
}
