//! Vigil Realtime Monitor
//!
//! The single logical sink for the price-tick stream. Each tick runs
//! through two independent rule families:
//!
//! - **Surge**: large move off the prior close, inside the trading
//!   window, optionally filtered by a composite score
//! - **Sell**: change from entry vs the holding-class target/stop table
//!
//! Triggered rules emit [`AlertIntent`]s onto a bounded channel; a slow
//! notification path can never stall tick ingestion.

pub mod cooldown;
pub mod processor;
pub mod window;

pub use cooldown::{CooldownKey, CooldownKind, CooldownRegistry};
pub use processor::{MonitorConfig, RealtimeEventProcessor};
pub use window::TradingWindow;

pub use vigil_core::{AlertIntent, AlertKind};
