use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discretized market-volatility state driving scheduling cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Regime {
    Calm,
    Normal,
    Fear,
    Panic,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Regime::Calm => "calm",
            Regime::Normal => "normal",
            Regime::Fear => "fear",
            Regime::Panic => "panic",
        };
        write!(f, "{}", name)
    }
}

/// Current regime plus the observation that produced it
///
/// Process-wide singleton owned by the scheduler; starts at `Normal`
/// and lives for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeState {
    /// Active regime
    pub regime: Regime,

    /// Volatility index reading behind the last classification
    pub last_volatility: f64,

    /// When the current regime was entered
    pub transitioned_at: DateTime<Utc>,
}

impl RegimeState {
    /// Startup state: `Normal` until the first macro refresh says otherwise.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            regime: Regime::Normal,
            last_volatility: 0.0,
            transitioned_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_normal() {
        let state = RegimeState::initial(Utc::now());
        assert_eq!(state.regime, Regime::Normal);
    }

    #[test]
    fn regimes_order_by_severity() {
        assert!(Regime::Calm < Regime::Normal);
        assert!(Regime::Normal < Regime::Fear);
        assert!(Regime::Fear < Regime::Panic);
    }
}
