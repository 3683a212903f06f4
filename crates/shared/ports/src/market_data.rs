use crate::error::ProviderResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use vigil_core::PriceTick;

/// One historical closing price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
}

/// Port for the market-data collaborator
///
/// Implementations wrap whatever transport the data vendor speaks.
/// All failures surface as typed `ProviderError`s; the engine treats
/// them as "no update this cycle", never as fatal.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Open a streaming subscription for the given tickers.
    ///
    /// Ticks arrive on the returned channel until the provider drops
    /// the sending side.
    async fn subscribe(&self, tickers: Vec<String>) -> ProviderResult<mpsc::Receiver<PriceTick>>;

    /// Fetch a closing-price history for one ticker.
    ///
    /// `period` is a vendor-style range string such as "6mo" or "1y".
    async fn price_history(&self, ticker: &str, period: &str) -> ProviderResult<Vec<PricePoint>>;

    /// Current market volatility index reading.
    async fn volatility_index(&self) -> ProviderResult<f64>;
}
