//! Vigil Runner - Engine Assembly
//!
//! Wires the scheduler, realtime monitor, and risk engine into one
//! running process:
//!
//! - **Config**: serde config surface, loaded from `VIGIL_CONFIG`
//! - **Jobs**: bodies of the recurring jobs (position refresh, market
//!   pulse, risk report)
//! - **Dispatch**: drains alert intents into the notifier
//! - **Engine**: startup, wiring, shutdown
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐ volatility ┌────────────────────┐
//!  │ Market Data  ├───────────►│ AdaptiveScheduler  │
//!  │ Provider     │            │  intraday_monitor ─┼─► position refresh
//!  └──────┬───────┘            │  market_pulse     ─┼─► reschedule
//!         │ ticks              │  risk_report      ─┼─► RiskReport ─► Notifier
//!         ▼                    └────────────────────┘
//!  ┌──────────────────────┐  intents  ┌─────────────────┐
//!  │ RealtimeEventProc.   ├──────────►│ AlertDispatcher ├─► Notifier
//!  └──────────────────────┘           └─────────────────┘
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod jobs;

pub use config::{ADAPTIVE_JOBS, Config, ENV_CONFIG_PATH, MonitorSettings, RiskSettings};
pub use dispatch::AlertDispatcher;
pub use engine::{EngineError, EnginePorts, VigilEngine};

/// Initialize env_logger with an info default. Call once, before the
/// engine starts.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
