use crate::error::ProviderResult;
use async_trait::async_trait;
use vigil_core::Position;

/// Read access to the externally managed portfolio
///
/// The engine never writes positions; it pulls fresh snapshots and
/// replaces its local `PositionBook` wholesale.
#[async_trait]
pub trait PortfolioReader: Send + Sync {
    async fn active_positions(&self) -> ProviderResult<Vec<Position>>;
}

/// Optional composite-score lookup used to filter low-quality surge alerts
///
/// A `None` means no score is known for the ticker, in which case the
/// surge rule alerts unconditionally.
pub trait ScanCache: Send + Sync {
    fn score(&self, ticker: &str) -> Option<f64>;
}
