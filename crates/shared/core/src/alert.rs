use crate::position::{HoldingClass, Position};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of event an alert intent describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    /// Price surged past the intraday threshold
    Surge,
    /// Change from entry reached the holding-class target
    TargetReached,
    /// Change from entry fell through the holding-class stop
    StopReached,
}

impl AlertKind {
    /// Stable identifier used in notification payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Surge => "surge",
            AlertKind::TargetReached => "target_reached",
            AlertKind::StopReached => "stop_reached",
        }
    }
}

/// Snapshot of holding state attached to an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub holding_class: HoldingClass,
    pub entry_price: Decimal,
    pub quantity: u32,
}

impl From<&Position> for HoldingSummary {
    fn from(p: &Position) -> Self {
        Self {
            holding_class: p.holding_class,
            entry_price: p.entry_price,
            quantity: p.quantity,
        }
    }
}

/// An alert the engine wants delivered
///
/// Immutable value object handed to the notification dispatcher.
/// Whether and how it reaches the user is the dispatcher's problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertIntent {
    /// Unique intent identifier
    pub id: Uuid,

    /// Event family
    pub kind: AlertKind,

    /// Ticker that triggered the alert
    pub ticker: String,

    /// Price at trigger time
    pub price: Decimal,

    /// Surge: change vs prior close. Sell: change vs entry.
    pub change_pct: Decimal,

    /// Present when the ticker is currently held
    pub holding: Option<HoldingSummary>,

    /// Composite score from the scan cache, when one existed
    pub score: Option<f64>,

    /// When the intent was created
    pub created_at: DateTime<Utc>,
}

impl AlertIntent {
    pub fn new(
        kind: AlertKind,
        ticker: impl Into<String>,
        price: Decimal,
        change_pct: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            ticker: ticker.into(),
            price,
            change_pct,
            holding: None,
            score: None,
            created_at,
        }
    }

    pub fn with_holding(mut self, holding: HoldingSummary) -> Self {
        self.holding = Some(holding);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}
