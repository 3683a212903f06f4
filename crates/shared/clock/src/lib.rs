//! Vigil Clock Infrastructure
//!
//! Time sources behind the `Clock` port:
//!
//! - [`SystemClock`] — wall-clock time for production
//! - [`ManualClock`] — settable/advanceable time for deterministic
//!   cooldown and trading-window tests

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use vigil_ports::Clock;
