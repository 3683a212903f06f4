use crate::types::{HoldingImpact, StressTestResult};
use std::collections::BTreeMap;
use vigil_ports::{ConfigError, RiskError, RiskResult};

/// One holding as the stress tester sees it: market value plus the
/// sector used to look up the scenario multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct StressHolding {
    pub ticker: String,
    pub sector: String,
    pub market_value: f64,
}

/// A hypothetical market shock.
///
/// `market_impact` is the broad-market move as a fraction (-0.33 is a
/// 33% drawdown); `sector_multipliers` scale it per sector, with the
/// `"other"` entry as the fallback for unlisted sectors.
#[derive(Debug, Clone, PartialEq)]
pub struct StressScenario {
    pub name: String,
    pub description: String,
    pub market_impact: f64,
    pub sector_multipliers: BTreeMap<String, f64>,
    pub recovery_days_estimate: u32,
}

impl StressScenario {
    /// Rejects shocks outside (-1, 0] and negative multipliers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market_impact > 0.0 || self.market_impact <= -1.0 {
            return Err(ConfigError::BadScenario(
                self.name.clone(),
                format!("market impact {} must be in (-1, 0]", self.market_impact),
            ));
        }
        if let Some((sector, m)) = self
            .sector_multipliers
            .iter()
            .find(|(_, m)| **m < 0.0 || !m.is_finite())
        {
            return Err(ConfigError::BadScenario(
                self.name.clone(),
                format!("multiplier {m} for sector {sector} must be finite and non-negative"),
            ));
        }
        Ok(())
    }

    fn multiplier_for(&self, sector: &str) -> f64 {
        self.sector_multipliers
            .get(sector)
            .or_else(|| self.sector_multipliers.get("other"))
            .copied()
            .unwrap_or(1.0)
    }
}

/// The built-in scenario book. Keyed by name so config overrides can
/// replace individual entries.
pub fn default_scenarios() -> BTreeMap<String, StressScenario> {
    let mut book = BTreeMap::new();
    for scenario in [
        StressScenario {
            name: "pandemic_crash".to_string(),
            description: "2020-style pandemic shock, fast and broad".to_string(),
            market_impact: -0.33,
            sector_multipliers: multipliers(&[
                ("technology", 0.9),
                ("healthcare", 0.6),
                ("financials", 1.2),
                ("energy", 1.4),
                ("consumer", 1.1),
                ("other", 1.0),
            ]),
            recovery_days_estimate: 120,
        },
        StressScenario {
            name: "credit_crisis".to_string(),
            description: "2008-style credit freeze with deep drawdown".to_string(),
            market_impact: -0.45,
            sector_multipliers: multipliers(&[
                ("financials", 1.6),
                ("technology", 1.0),
                ("healthcare", 0.7),
                ("energy", 1.1),
                ("consumer", 1.0),
                ("other", 1.0),
            ]),
            recovery_days_estimate: 365,
        },
        StressScenario {
            name: "export_slowdown".to_string(),
            description: "major trading-partner demand contraction".to_string(),
            market_impact: -0.15,
            sector_multipliers: multipliers(&[
                ("technology", 1.3),
                ("industrials", 1.2),
                ("consumer", 0.9),
                ("other", 0.8),
            ]),
            recovery_days_estimate: 60,
        },
        StressScenario {
            name: "rate_surge".to_string(),
            description: "rapid policy-rate tightening".to_string(),
            market_impact: -0.12,
            sector_multipliers: multipliers(&[
                ("technology", 1.4),
                ("financials", 0.7),
                ("utilities", 1.2),
                ("other", 1.0),
            ]),
            recovery_days_estimate: 90,
        },
        StressScenario {
            name: "fx_crisis".to_string(),
            description: "sharp domestic-currency depreciation".to_string(),
            market_impact: -0.18,
            sector_multipliers: multipliers(&[
                ("financials", 1.3),
                ("energy", 1.2),
                ("technology", 0.9),
                ("other", 1.0),
            ]),
            recovery_days_estimate: 45,
        },
    ] {
        book.insert(scenario.name.clone(), scenario);
    }
    book
}

fn multipliers(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

/// Applies one scenario to the holdings.
///
/// Each holding loses `market_impact * multiplier(sector)`; the
/// portfolio figure is the value-weighted sum of those losses.
pub fn run_stress_test(
    scenario: &StressScenario,
    holdings: &[StressHolding],
) -> RiskResult<StressTestResult> {
    if holdings.is_empty() {
        return Err(RiskError::InputShape("no holdings to stress".to_string()));
    }
    let portfolio_value: f64 = holdings.iter().map(|h| h.market_value).sum();
    if portfolio_value <= 0.0 {
        return Err(RiskError::InvalidParameter(format!(
            "portfolio value {portfolio_value} is not positive"
        )));
    }

    let mut per_holding = Vec::with_capacity(holdings.len());
    let mut impact_amount = 0.0;
    for holding in holdings {
        let impact = scenario.market_impact * scenario.multiplier_for(&holding.sector);
        impact_amount += holding.market_value * impact;
        per_holding.push(HoldingImpact {
            ticker: holding.ticker.clone(),
            impact_pct: impact * 100.0,
        });
    }

    Ok(StressTestResult {
        scenario: scenario.name.clone(),
        portfolio_impact_pct: impact_amount / portfolio_value * 100.0,
        portfolio_impact_amount: impact_amount,
        per_holding,
        recovery_days_estimate: scenario.recovery_days_estimate,
    })
}
