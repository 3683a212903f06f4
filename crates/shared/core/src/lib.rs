//! Vigil Core Domain
//!
//! Pure domain types for the Vigil monitoring engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod alert;
pub mod position;
pub mod regime;
pub mod tick;

// Re-export commonly used types at crate root
pub use alert::{AlertIntent, AlertKind, HoldingSummary};
pub use position::{HoldingClass, Position, PositionBook};
pub use regime::{Regime, RegimeState};
pub use tick::{PriceTick, VolumePressure};

/// Canonical timestamp type used across the system
pub type Timestamp = chrono::DateTime<chrono::Utc>;
