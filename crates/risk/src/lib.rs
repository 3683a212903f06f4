//! Vigil Risk Engine
//!
//! Pure portfolio risk analytics. No network access and no suspension
//! points: callers fetch price histories through the market-data port
//! first, then hand plain arrays in. Every operation returns a typed
//! error to the caller, who decides whether to degrade the report or
//! surface the failure.
//!
//! ```text
//!  return series ──► historical_var ─┐
//!  mean + cov ─────► parametric_var ─┤
//!  mean + cov ─────► run_monte_carlo ├──► RiskReport ──► grade
//!  sector weights ─► run_stress_test ─┘
//! ```

pub mod correlation;
pub mod grade;
pub mod monte_carlo;
pub mod report;
pub mod stats;
pub mod stress;
pub mod types;
pub mod var;

pub use correlation::{CorrelatedPair, correlation_matrix, high_correlation_pairs};
pub use grade::{RiskFactors, RiskGrade, grade};
pub use monte_carlo::{run_monte_carlo, run_monte_carlo_with_rng};
pub use report::{ReportHolding, ReportInputs, RiskEngineConfig, generate_report};
pub use stress::{StressHolding, StressScenario, default_scenarios, run_stress_test};
pub use types::{HoldingImpact, MonteCarloResult, RiskReport, StressTestResult, VaRMethod, VaRResult};
pub use var::{historical_var, parametric_var};

pub use vigil_ports::{RiskError, RiskResult};
