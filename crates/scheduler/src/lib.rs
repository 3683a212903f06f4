//! Vigil Adaptive Scheduler
//!
//! Regime-driven scheduling for the monitoring pipeline:
//!
//! - [`classify`] maps a volatility index reading to a [`Regime`]
//! - [`IntervalTable`] holds the per-regime cadence for adaptive jobs
//! - [`AdaptiveScheduler`] owns recurring jobs and swaps their timers
//!   when the regime changes
//!
//! ```text
//!  volatility index ──► classify() ──► Regime ──► reschedule()
//!                                                     │
//!                                     cancel + reinstall affected timers
//! ```

pub mod classifier;
pub mod intervals;
pub mod scheduler;

pub use classifier::classify;
pub use intervals::IntervalTable;
pub use scheduler::{AdaptiveScheduler, JobBuilder, JobError};

pub use vigil_core::{Regime, RegimeState};
