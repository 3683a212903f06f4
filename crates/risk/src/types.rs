use crate::correlation::CorrelatedPair;
use crate::grade::RiskGrade;
use serde::{Deserialize, Serialize};
use vigil_core::Timestamp;

/// How a VaR figure was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaRMethod {
    Historical,
    Parametric,
}

/// Value-at-Risk figure, in percent of portfolio value
///
/// Negative values are losses; `var_pct = -2.5` reads "with the given
/// confidence, the loss over the holding period does not exceed 2.5%".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaRResult {
    pub method: VaRMethod,
    pub confidence: f64,
    pub holding_period_days: u32,
    pub var_pct: f64,
    pub cvar_pct: f64,
}

/// Monte Carlo loss-distribution summary, in percent of portfolio value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Median simulated total return
    pub expected_return_pct: f64,
    /// 95th percentile of the simulated distribution
    pub best_case_pct: f64,
    /// 5th percentile of the simulated distribution
    pub worst_case_pct: f64,
    pub var95_pct: f64,
    pub var99_pct: f64,
    pub cvar95_pct: f64,
    pub simulations: usize,
    pub horizon_days: u32,
    /// Reduced distribution for display, at most 100 buckets
    pub histogram: Vec<u32>,
}

/// Per-holding impact under one stress scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingImpact {
    pub ticker: String,
    pub impact_pct: f64,
}

/// Outcome of one stress scenario over the whole portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    pub scenario: String,
    pub portfolio_impact_pct: f64,
    pub portfolio_impact_amount: f64,
    pub per_holding: Vec<HoldingImpact>,
    pub recovery_days_estimate: u32,
}

/// Aggregated risk report, produced per invocation and never persisted
///
/// Sections that failed to compute are `None`; the report names them in
/// `unavailable_sections` instead of dropping them silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub generated_at: Timestamp,
    pub portfolio_value: f64,
    pub historical_var: Option<VaRResult>,
    pub parametric_var: Option<VaRResult>,
    pub monte_carlo: Option<MonteCarloResult>,
    pub high_correlations: Vec<CorrelatedPair>,
    pub stress_results: Vec<StressTestResult>,
    pub grade: RiskGrade,
    pub score: u8,
}

impl RiskReport {
    /// Names of the sections that could not be computed this cycle.
    pub fn unavailable_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.historical_var.is_none() {
            missing.push("historical_var");
        }
        if self.parametric_var.is_none() {
            missing.push("parametric_var");
        }
        if self.monte_carlo.is_none() {
            missing.push("monte_carlo");
        }
        if self.stress_results.is_empty() {
            missing.push("stress_test");
        }
        missing
    }
}
