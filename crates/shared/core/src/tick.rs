use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dominant side of recent executions for a ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumePressure {
    Buy,
    Sell,
    Neutral,
}

/// A single streaming price update
///
/// Ephemeral: consumed once by the realtime processor, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTick {
    /// Ticker symbol
    pub ticker: String,

    /// Last traded price
    pub price: Decimal,

    /// Percent change from the prior session close
    pub change_pct: Decimal,

    /// Dominant execution side
    pub volume_pressure: VolumePressure,

    /// Exchange timestamp of the update
    pub timestamp: DateTime<Utc>,
}

impl PriceTick {
    pub fn new(
        ticker: impl Into<String>,
        price: Decimal,
        change_pct: Decimal,
        volume_pressure: VolumePressure,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            change_pct,
            volume_pressure,
            timestamp,
        }
    }
}
