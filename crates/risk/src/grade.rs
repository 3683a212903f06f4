use serde::{Deserialize, Serialize};

/// Letter grade summarizing the composite risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskGrade {
    A,
    B,
    C,
    D,
    F,
}

impl RiskGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskGrade::A => "A",
            RiskGrade::B => "B",
            RiskGrade::C => "C",
            RiskGrade::D => "D",
            RiskGrade::F => "F",
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            0..=20 => RiskGrade::A,
            21..=40 => RiskGrade::B,
            41..=60 => RiskGrade::C,
            61..=80 => RiskGrade::D,
            _ => RiskGrade::F,
        }
    }
}

impl std::fmt::Display for RiskGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the composite grade. Any factor the report failed to
/// compute stays `None` and contributes zero, so a degraded report
/// grades optimistically rather than not at all.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskFactors {
    /// One-day 95% VaR, percent (negative is a loss)
    pub var95_pct: Option<f64>,
    /// Worst historical peak-to-trough drawdown, percent
    pub max_drawdown_pct: Option<f64>,
    /// Largest single-holding weight, in [0, 1]
    pub concentration: Option<f64>,
    /// Mean absolute pairwise correlation, in [0, 1]
    pub avg_correlation: Option<f64>,
    /// Worst stress-scenario portfolio impact, percent
    pub worst_stress_pct: Option<f64>,
}

/// Composite 0-100 risk score and its letter grade.
///
/// Each factor maps linearly onto a capped band: VaR up to 25 points,
/// drawdown up to 25, concentration and correlation up to 15 each,
/// stress up to 20. Higher scores mean more risk.
pub fn grade(factors: &RiskFactors) -> (u8, RiskGrade) {
    let mut score = 0.0;
    if let Some(var) = factors.var95_pct {
        score += (var.abs() * 10.0).min(25.0);
    }
    if let Some(mdd) = factors.max_drawdown_pct {
        score += (mdd.abs() * 2.5).min(25.0);
    }
    if let Some(conc) = factors.concentration {
        score += (conc.clamp(0.0, 1.0) * 15.0).min(15.0);
    }
    if let Some(corr) = factors.avg_correlation {
        score += (corr.clamp(0.0, 1.0) * 15.0).min(15.0);
    }
    if let Some(stress) = factors.worst_stress_pct {
        score += (stress.abs() * 0.5).min(20.0);
    }
    let score = score.round().clamp(0.0, 100.0) as u8;
    (score, RiskGrade::from_score(score))
}
