//! Vigil Ports
//!
//! Port definitions (traits) for the Vigil monitoring engine.
//! These define the boundaries between the engine and its external
//! collaborators: market data, the portfolio service, the scan cache,
//! and the notification dispatcher.

mod clock;
mod error;
mod market_data;
mod notify;
mod portfolio;

pub use clock::Clock;
pub use error::{
    ConfigError, ProviderError, ProviderResult, RiskError, RiskResult, SchedulerError,
    SchedulerResult,
};
pub use market_data::{MarketDataProvider, PricePoint};
pub use notify::Notifier;
pub use portfolio::{PortfolioReader, ScanCache};
