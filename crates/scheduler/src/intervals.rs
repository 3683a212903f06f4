use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use vigil_core::Regime;
use vigil_ports::ConfigError;

/// Per-regime execution intervals for the adaptive jobs
///
/// Immutable after startup validation. Intervals are stored in whole
/// seconds because that is what the config surface speaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalTable {
    entries: HashMap<Regime, HashMap<String, u64>>,
}

impl IntervalTable {
    pub fn new(entries: HashMap<Regime, HashMap<String, u64>>) -> Self {
        Self { entries }
    }

    /// Look up the interval for a job under a regime.
    pub fn interval(&self, regime: Regime, job: &str) -> Option<Duration> {
        self.entries
            .get(&regime)
            .and_then(|jobs| jobs.get(job))
            .map(|secs| Duration::from_secs(*secs))
    }

    /// Job names configured under `regime`.
    pub fn jobs_for(&self, regime: Regime) -> impl Iterator<Item = &str> {
        self.entries
            .get(&regime)
            .into_iter()
            .flat_map(|jobs| jobs.keys().map(String::as_str))
    }

    /// Ensure every regime carries a positive interval for every
    /// adaptive job. Run once at startup; failures are fatal.
    pub fn validate(&self, adaptive_jobs: &[&str]) -> Result<(), ConfigError> {
        for regime in [Regime::Calm, Regime::Normal, Regime::Fear, Regime::Panic] {
            for job in adaptive_jobs {
                match self.interval(regime, job) {
                    None => {
                        return Err(ConfigError::MissingInterval {
                            regime,
                            job: (*job).to_string(),
                        });
                    }
                    Some(d) if d.is_zero() => {
                        return Err(ConfigError::ZeroInterval {
                            regime,
                            job: (*job).to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

impl Default for IntervalTable {
    /// Default cadences: tighter monitoring as volatility climbs.
    fn default() -> Self {
        let mut entries = HashMap::new();
        let rows: [(Regime, u64, u64); 4] = [
            (Regime::Calm, 600, 3600),
            (Regime::Normal, 300, 1800),
            (Regime::Fear, 120, 900),
            (Regime::Panic, 60, 600),
        ];
        for (regime, monitor_secs, pulse_secs) in rows {
            let mut jobs = HashMap::new();
            jobs.insert("intraday_monitor".to_string(), monitor_secs);
            jobs.insert("market_pulse".to_string(), pulse_secs);
            entries.insert(regime, jobs);
        }
        Self { entries }
    }
}
